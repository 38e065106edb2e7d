//! # meteovisor
//!
//! Periodic weather-data acquisition built around a timed-event scheduler,
//! a reader/writer-locked cache, and an event-driven state machine.
//!
//! ```text
//!                    ┌────────────────────┐
//!   injected events  │ AcquisitionMachine │   bus events
//!  ─────────────────►│   worker task      ├──────────────► subscribers
//!                    └──────┬──────┬──────┘
//!                  arm/wait │      │ fetch (gated)
//!                    ┌──────▼───┐ ┌▼─────────────┐
//!                    │ Scheduler│ │ WeatherCache │◄── snapshot() readers
//!                    └──────────┘ └──────┬───────┘
//!                                        │ daily / current
//!                                  ┌─────▼───────────┐
//!                                  │ WeatherProvider │  (your impl)
//!                                  └─────────────────┘
//! ```
//!
//! The machine warms the cache on start, then re-arms itself: current
//! conditions on an aligned 15-minute grid, the daily summary at local
//! midnight, with a short retry after any fetch that did not update the
//! cache. Every notable step is published on a broadcast [`Bus`] as a
//! structured [`Event`]; attach [`Subscribe`] implementations (such as the
//! `logging`-feature [`LogWriter`]) to observe it.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use meteovisor::{
//!     AcquisitionConfig, AcquisitionMachine, Location, Scheduler, WeatherCache,
//! };
//! # use meteovisor::{CurrentConditions, DailySummary, ProviderError, WeatherProvider};
//! # use async_trait::async_trait;
//! # use chrono::{DateTime, Local};
//! # struct MyProvider;
//! # #[async_trait]
//! # impl WeatherProvider for MyProvider {
//! #     async fn daily_summary(&self, _: &Location) -> Result<DailySummary, ProviderError> {
//! #         unimplemented!()
//! #     }
//! #     async fn current_stamp(&self, _: &Location) -> Result<DateTime<Local>, ProviderError> {
//! #         unimplemented!()
//! #     }
//! #     async fn current_details(&self, _: &Location) -> Result<CurrentConditions, ProviderError> {
//! #         unimplemented!()
//! #     }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = AcquisitionConfig::new(Location::new("Berlin", 52.52, 13.405));
//!     let scheduler = Arc::new(Scheduler::new());
//!     let cache = Arc::new(WeatherCache::new(
//!         Arc::new(MyProvider),
//!         cfg.location.clone(),
//!         cfg.lock_timeout,
//!     ));
//!
//!     let mut machine = AcquisitionMachine::new(cfg, scheduler, cache.clone());
//!     machine.run()?;
//!     machine.initiate();
//!
//!     tokio::spawn(meteovisor::signal::shutdown_on_signal(machine.handle()));
//!
//!     // ... elsewhere, read the latest values:
//!     let snapshot = cache.snapshot().await?;
//!     println!("temperature: {:?}", snapshot.temperature_c);
//!
//!     machine.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature flags
//! - `logging`: enables [`LogWriter`], a subscriber that writes every bus
//!   event through the `log` facade.

mod cache;
mod config;
mod error;
mod events;
mod machine;
mod provider;
mod scheduler;
mod subscribers;

pub mod signal;

pub use cache::{FetchOutcome, WeatherCache, WeatherSnapshot};
pub use config::AcquisitionConfig;
pub use error::{CacheError, ProviderError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use machine::{AcquisitionMachine, MachineEvent, MachineHandle, MachineState};
pub use provider::{CurrentConditions, DailySummary, Location, ProviderRef, WeatherProvider};
pub use scheduler::{Scheduler, TimedEvent};
pub use subscribers::{Subscribe, SubscriberSet};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
