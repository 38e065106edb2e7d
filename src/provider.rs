//! # Weather provider collaborator contract.
//!
//! The acquisition core never talks to the network itself. It depends on a
//! [`WeatherProvider`] implemented elsewhere (HTTP transport + JSON decode)
//! and only consumes three queries:
//!
//! - [`daily_summary`](WeatherProvider::daily_summary) — civil date plus
//!   sunrise/sunset, refreshed once per day;
//! - [`current_stamp`](WeatherProvider::current_stamp) — a cheap
//!   timestamp-only probe used for change gating;
//! - [`current_details`](WeatherProvider::current_details) — the full
//!   current-conditions payload, fetched only when the probe advanced.
//!
//! Any transport or decode problem surfaces as a [`ProviderError`]; the
//! cache converts it to a fetch failure and never propagates it further.
//!
//! The common handle type is [`ProviderRef`], an `Arc<dyn WeatherProvider>`
//! suitable for sharing between the cache and tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};

use crate::error::ProviderError;

/// Shared handle to a provider implementation.
pub type ProviderRef = Arc<dyn WeatherProvider>;

/// Geographic location the provider is queried for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    /// Human-readable place name (used in logs only).
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Location {
    /// Creates a location from a name and coordinates.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Daily-resolution payload: the provider's civil date and sun times.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    /// The civil day this summary describes, in provider-local time.
    pub date: NaiveDate,
    /// Sunrise time for that day.
    pub sunrise: DateTime<Local>,
    /// Sunset time for that day.
    pub sunset: DateTime<Local>,
}

/// Current-resolution payload: the latest observed conditions.
///
/// Every field except the observation timestamp is optional — upstream
/// stations omit sensors they do not have, and absence is a valid state
/// distinct from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    /// When the provider observed these values.
    pub observed_at: DateTime<Local>,
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
    /// Free-text condition summary ("light rain", ...).
    pub summary: Option<String>,
}

/// # External weather data source.
///
/// Implementations own their transport, retries, and decoding; the core
/// calls each query at most once per fetch attempt and treats every error
/// as a transient failure to be retried on the short cadence.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use chrono::{DateTime, Local};
/// use meteovisor::{
///     CurrentConditions, DailySummary, Location, ProviderError, WeatherProvider,
/// };
///
/// struct Station;
///
/// #[async_trait]
/// impl WeatherProvider for Station {
///     async fn daily_summary(&self, _loc: &Location) -> Result<DailySummary, ProviderError> {
///         Err(ProviderError::transport("not wired up"))
///     }
///
///     async fn current_stamp(&self, _loc: &Location) -> Result<DateTime<Local>, ProviderError> {
///         Ok(Local::now())
///     }
///
///     async fn current_details(
///         &self,
///         _loc: &Location,
///     ) -> Result<CurrentConditions, ProviderError> {
///         Err(ProviderError::transport("not wired up"))
///     }
/// }
/// ```
#[async_trait]
pub trait WeatherProvider: Send + Sync + 'static {
    /// Fetches the daily summary (date, sunrise, sunset) for `location`.
    async fn daily_summary(&self, location: &Location) -> Result<DailySummary, ProviderError>;

    /// Fetches only the timestamp of the provider's latest observation.
    ///
    /// This is the cheap probe the cache uses to decide whether a full
    /// [`current_details`](Self::current_details) call is worthwhile.
    async fn current_stamp(&self, location: &Location) -> Result<DateTime<Local>, ProviderError>;

    /// Fetches the full current-conditions payload for `location`.
    async fn current_details(
        &self,
        location: &Location,
    ) -> Result<CurrentConditions, ProviderError>;
}
