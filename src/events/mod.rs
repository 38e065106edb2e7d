//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the acquisition machine's
//! worker (state entries, fetch outcomes, scheduled times, shutdown).
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: the machine worker (all dispatch runs on it).
//! - **Consumers**: the machine's subscriber listener (fans out to a
//!   [`SubscriberSet`](crate::SubscriberSet)) and any external receiver
//!   obtained via [`AcquisitionMachine::subscribe`](crate::AcquisitionMachine::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
