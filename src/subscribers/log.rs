//! # Simple logging subscriber.
//!
//! [`LogWriter`] forwards runtime events to the `log` facade in a compact
//! human-readable format. Enabled via the `logging` feature; primarily
//! useful for development and service binaries that already install a `log`
//! backend.
//!
//! ## Output format
//! ```text
//! [state] entered=fetching_current
//! [fetch] stage=current outcome=failed reason="transport failure: ..."
//! [scheduled] stage=current at=2026-08-28T10:15:00+02:00
//! [idle] next=2026-08-28T10:15:00+02:00
//! [drained] cleared=2
//! [shutdown-requested]
//! [subscriber-overflow] subscriber=metrics reason=queue_full
//! ```
//!
//! Not intended as the only observability path — implement a custom
//! [`Subscribe`] for structured logging or metrics.

use async_trait::async_trait;
use log::{error, info, warn};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Built-in subscriber that writes events through the `log` facade.
#[derive(Debug, Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a new log writer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::MachineStarted => info!("[started]"),
            EventKind::StateEntered => {
                info!("[state] entered={}", e.state.unwrap_or("?"));
            }
            EventKind::FetchCompleted => match e.outcome {
                Some("failed") => warn!(
                    "[fetch] stage={} outcome=failed reason={:?}",
                    e.stage.unwrap_or("?"),
                    e.reason.as_deref().unwrap_or("")
                ),
                outcome => info!(
                    "[fetch] stage={} outcome={}",
                    e.stage.unwrap_or("?"),
                    outcome.unwrap_or("?")
                ),
            },
            EventKind::EventScheduled => {
                if let Some(at) = e.fire_at {
                    info!("[scheduled] stage={} at={}", e.stage.unwrap_or("?"), at);
                }
            }
            EventKind::IdleParked => match e.fire_at {
                Some(at) => info!("[idle] next={at}"),
                None => warn!("[idle] next=none (no further events scheduled)"),
            },
            EventKind::SchedulerDrained => {
                info!("[drained] cleared={}", e.cleared.unwrap_or(0));
            }
            EventKind::ShutdownRequested => info!("[shutdown-requested]"),
            EventKind::MachineStopped => info!("[stopped]"),
            EventKind::MachineTerminated => info!("[terminated]"),
            EventKind::WorkerStopped => info!("[worker-stopped]"),
            EventKind::EventDiscarded => {
                warn!(
                    "[discarded] state={} event={}",
                    e.state.unwrap_or("?"),
                    e.reason.as_deref().unwrap_or("?")
                );
            }
            EventKind::DispatchPanicked => {
                error!(
                    "[dispatch-panic] state={} reason={:?}",
                    e.state.unwrap_or("?"),
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::SubscriberOverflow => {
                warn!(
                    "[subscriber-overflow] subscriber={} reason={}",
                    e.subscriber.unwrap_or("?"),
                    e.reason.as_deref().unwrap_or("?")
                );
            }
            EventKind::SubscriberPanicked => {
                error!(
                    "[subscriber-panic] subscriber={} reason={:?}",
                    e.subscriber.unwrap_or("?"),
                    e.reason.as_deref().unwrap_or("")
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
