//! # Cached weather snapshot.
//!
//! [`WeatherSnapshot`] is the value copied out to readers. Every field is
//! optional: the upstream provider may omit any of them, and absence is a
//! valid state distinct from zero. A freshly constructed cache holds an
//! empty snapshot (all fields `None`) until the first successful fetch.

use chrono::{DateTime, Local};

/// Latest fetched values, returned to readers **by value** so no lock
/// lifetime escapes the cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSnapshot {
    /// Air temperature in degrees Celsius.
    pub temperature_c: Option<f64>,
    /// Barometric pressure in hectopascals.
    pub pressure_hpa: Option<f64>,
    /// Relative humidity in percent.
    pub humidity_pct: Option<f64>,
    /// Precipitation over the last hour in millimetres.
    pub precipitation_mm: Option<f64>,
    /// Wind speed in metres per second.
    pub wind_speed_ms: Option<f64>,
    /// Wind direction in degrees (0 = north).
    pub wind_direction_deg: Option<f64>,
    /// Cloud cover in percent.
    pub cloud_cover_pct: Option<f64>,
    /// UV index.
    pub uv_index: Option<f64>,
    /// Provider-specific condition code.
    pub weather_code: Option<u16>,
    /// Sunrise time for the last observed day.
    pub sunrise: Option<DateTime<Local>>,
    /// Sunset time for the last observed day.
    pub sunset: Option<DateTime<Local>>,
    /// Free-text condition summary.
    pub summary: Option<String>,
    /// When the provider observed the current-condition fields.
    pub observed_at: Option<DateTime<Local>>,
}

impl WeatherSnapshot {
    /// True if no fetch has populated any field yet.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
