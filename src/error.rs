//! Error types used by the acquisition core.
//!
//! This module defines three error enums:
//!
//! - [`ProviderError`] — errors raised by the external weather provider
//!   (transport and decode failures surfaced by the collaborator).
//! - [`CacheError`] — errors raised on the cache read path.
//! - [`RuntimeError`] — errors raised by the machine lifecycle itself.
//!
//! Provider errors never cross the cache boundary: `WeatherCache` folds them
//! into [`FetchOutcome::Failed`](crate::FetchOutcome), so the state machine
//! only ever sees a three-way fetch result.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the external weather provider.
///
/// The provider is a collaborator implemented elsewhere (HTTP transport +
/// JSON decoding). The acquisition core only distinguishes "the wire failed"
/// from "the payload was unusable"; both are retried on the short cadence.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The request did not complete (connect/timeout/IO failure).
    #[error("transport failure: {message}")]
    Transport {
        /// The underlying transport error message.
        message: String,
    },

    /// The response arrived but could not be decoded or validated.
    #[error("decode failure: {message}")]
    Decode {
        /// The underlying decode error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a transport-level error from any displayable source.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        ProviderError::Transport {
            message: err.to_string(),
        }
    }

    /// Creates a decode-level error from any displayable source.
    pub fn decode(err: impl std::fmt::Display) -> Self {
        ProviderError::Decode {
            message: err.to_string(),
        }
    }
}

/// # Errors produced on the cache read path.
///
/// A cold cache is **not** an error:
/// [`WeatherCache::snapshot`](crate::WeatherCache::snapshot) returns an empty
/// snapshot when no fetch has run yet. `Busy` is reserved for the bounded
/// lock acquisition timing out under writer contention, so readers can tell
/// "no data yet" apart from "try again shortly".
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CacheError {
    /// The shared lock was not acquired within the bounded wait.
    #[error("cache lock not acquired within {timeout:?}")]
    Busy {
        /// The configured bounded-wait duration that elapsed.
        timeout: Duration,
    },
}

impl CacheError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use meteovisor::CacheError;
    ///
    /// let err = CacheError::Busy { timeout: Duration::from_millis(250) };
    /// assert_eq!(err.as_label(), "cache_busy");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CacheError::Busy { .. } => "cache_busy",
        }
    }
}

/// # Errors produced by the machine lifecycle.
///
/// These represent misuse of [`AcquisitionMachine`](crate::AcquisitionMachine)
/// itself, not failures of the acquisition work (those travel as
/// [`FetchOutcome`](crate::FetchOutcome) and bus events).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// `run()` was called while a worker task is already running.
    #[error("machine is already running")]
    AlreadyRunning,
}
