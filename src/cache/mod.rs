//! # Shared weather snapshot cache.
//!
//! The cache sits between the acquisition machine (its only writer) and any
//! number of reader threads (the publishing layer that republishes cached
//! values). Writers take an exclusive lock, readers a shared one, both with
//! bounded acquisition timeouts so the system degrades to "stale read" or
//! "skipped write" instead of blocking indefinitely.
//!
//! ## Contents
//! - [`WeatherSnapshot`] — immutable-at-read-time aggregate of optional fields
//! - [`FetchOutcome`] — explicit three-way fetch result
//! - [`WeatherCache`] — gating state + snapshot behind a reader/writer lock

mod snapshot;
mod store;

pub use snapshot::WeatherSnapshot;
pub use store::{FetchOutcome, WeatherCache};
