//! # Acquisition runtime configuration.
//!
//! Provides [`AcquisitionConfig`], the centralized settings for the
//! scheduler/cache/machine trio.
//!
//! The config is consumed in two places:
//! 1. **Cache creation**: `WeatherCache::new(provider, location, lock_timeout)`
//! 2. **Machine creation**: `AcquisitionMachine::new(cfg, scheduler, cache)`
//!
//! ## Field semantics
//! - `current_interval`: steady-state cadence for current-conditions fetches
//!   (fire times are aligned to this boundary within the civil day)
//! - `retry_interval`: short cadence used after a failed or no-op fetch
//! - `lock_timeout`: bounded wait for the cache's reader/writer lock; a
//!   timed-out acquisition counts as a fetch failure, never a hang
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)

use std::time::Duration;

use crate::provider::Location;

/// Global configuration for the acquisition runtime.
#[derive(Clone, Debug)]
pub struct AcquisitionConfig {
    /// Location the provider is queried for.
    pub location: Location,

    /// Steady-state cadence for current-conditions fetches.
    ///
    /// Fire times are aligned to the next multiple of this interval within
    /// the civil day (15 minutes → :00/:15/:30/:45).
    pub current_interval: Duration,

    /// Retry cadence after a failed or no-op fetch.
    ///
    /// Applies identically to daily and current fetches; a fetch that did
    /// not update the cache is re-armed this far out.
    pub retry_interval: Duration,

    /// Bounded wait for the cache's reader/writer lock.
    ///
    /// Writers that miss this window report the fetch as failed; readers
    /// get [`CacheError::Busy`](crate::CacheError). The system degrades to
    /// "stale read" or "skipped write" instead of blocking indefinitely.
    pub lock_timeout: Duration,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events
    /// observe `Lagged` and skip older items. Minimum value is 1.
    pub bus_capacity: usize,
}

impl AcquisitionConfig {
    /// Creates a config for `location` with default cadences.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the current-fetch cadence clamped to a minimum of one second.
    ///
    /// Boundary alignment works in whole seconds of the civil day; anything
    /// below one second would alias to "now".
    #[inline]
    pub fn current_interval_clamped(&self) -> Duration {
        self.current_interval.max(Duration::from_secs(1))
    }
}

impl Default for AcquisitionConfig {
    /// Default configuration:
    ///
    /// - `current_interval = 15m` (quarter-hour boundaries)
    /// - `retry_interval = 1m` (short retry after failure/no-op)
    /// - `lock_timeout = 250ms` (bounded lock wait)
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            location: Location::default(),
            current_interval: Duration::from_secs(15 * 60),
            retry_interval: Duration::from_secs(60),
            lock_timeout: Duration::from_millis(250),
            bus_capacity: 1024,
        }
    }
}
