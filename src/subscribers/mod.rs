//! # Event subscribers for the acquisition runtime.
//!
//! This module provides the [`Subscribe`] trait, the non-blocking
//! [`SubscriberSet`] fan-out, and a built-in [`LogWriter`] (behind the
//! `logging` feature).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   worker ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet
//!                                             │
//!                                        ┌────┴────┬─────────┐
//!                                        ▼         ▼         ▼
//!                                    LogWriter  Metrics   Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```rust
//! use async_trait::async_trait;
//! use meteovisor::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::FetchCompleted && ev.outcome == Some("failed") {
//!             // bump a counter, raise an alert, ...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "failure-counter"
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
