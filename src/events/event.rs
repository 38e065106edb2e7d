//! # Runtime events emitted by the acquisition machine.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: machine start/stop, state entries, shutdown
//! - **Acquisition events**: fetch outcomes and scheduled fire times
//! - **Fault events**: discarded events and panicking dispatch
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! state/stage labels, fetch outcomes, and scheduled times.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use meteovisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::FetchCompleted)
//!     .with_stage("current")
//!     .with_outcome("failed")
//!     .with_reason("transport failure: connection refused");
//!
//! assert_eq!(ev.kind, EventKind::FetchCompleted);
//! assert_eq!(ev.stage, Some("current"));
//! assert_eq!(ev.reason.as_deref(), Some("transport failure: connection refused"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Local};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Lifecycle events ===
    /// Worker task started; the machine is processing events.
    ///
    /// Sets: `at`, `seq`
    MachineStarted,

    /// The machine entered a new state.
    ///
    /// Sets: `state` (label of the entered state), `at`, `seq`
    StateEntered,

    /// Shutdown was requested while acquiring.
    ///
    /// Sets: `at`, `seq`
    ShutdownRequested,

    /// The machine reached `Off` and cleared its running state.
    ///
    /// Sets: `at`, `seq`
    MachineStopped,

    /// `Terminate` was received; the runtime token was cancelled.
    ///
    /// Sets: `at`, `seq`
    MachineTerminated,

    /// The worker loop exited.
    ///
    /// Sets: `at`, `seq`
    WorkerStopped,

    // === Acquisition events ===
    /// A fetch attempt finished.
    ///
    /// Sets:
    /// - `stage`: `"daily"` or `"current"`
    /// - `outcome`: `"updated"`, `"unchanged"`, or `"failed"`
    /// - `reason`: failure detail (only when failed)
    /// - `at`, `seq`
    FetchCompleted,

    /// A future machine event was registered with the scheduler.
    ///
    /// Sets:
    /// - `stage`: `"daily"` or `"current"`
    /// - `fire_at`: local fire time
    /// - `at`, `seq`
    EventScheduled,

    /// The machine parked in `Idle`.
    ///
    /// Sets:
    /// - `fire_at`: earliest pending fire time (absent if the queue is
    ///   empty — the "no further events" condition operators watch for)
    /// - `at`, `seq`
    IdleParked,

    /// All pending scheduler events were removed (entering `Stopping`).
    ///
    /// Sets:
    /// - `cleared`: number of events removed
    /// - `at`, `seq`
    SchedulerDrained,

    // === Fault events ===
    /// A machine event had no transition from the current state and was
    /// dropped.
    ///
    /// Sets:
    /// - `state`: current state label
    /// - `reason`: the discarded event's label
    /// - `at`, `seq`
    EventDiscarded,

    /// An entry action panicked; the event was dropped and the worker kept
    /// running.
    ///
    /// Sets:
    /// - `state`: state whose entry action panicked
    /// - `reason`: panic payload, if printable
    /// - `at`, `seq`
    DispatchPanicked,

    /// A subscriber's bounded queue was full (or its worker gone) and an
    /// event was dropped for it.
    ///
    /// Sets:
    /// - `subscriber`: name of the affected subscriber
    /// - `reason`: `"queue_full"` or `"worker_closed"`
    /// - `at`, `seq`
    SubscriberOverflow,

    /// A subscriber panicked while processing an event; its worker kept
    /// running.
    ///
    /// Sets:
    /// - `subscriber`: name of the panicking subscriber
    /// - `reason`: panic payload, if printable
    /// - `at`, `seq`
    SubscriberPanicked,
}

impl EventKind {
    /// True for events describing a fault inside the subscriber fan-out.
    ///
    /// These are published for external receivers but never re-delivered to
    /// the subscribers themselves, so a misbehaving subscriber cannot feed
    /// its own fault reports back into its queue.
    pub fn is_subscriber_fault(&self) -> bool {
        matches!(
            self,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// State label, if applicable.
    pub state: Option<&'static str>,
    /// Subscriber name, if applicable.
    pub subscriber: Option<&'static str>,
    /// Fetch stage label (`"daily"` / `"current"`), if applicable.
    pub stage: Option<&'static str>,
    /// Fetch outcome label, if applicable.
    pub outcome: Option<&'static str>,
    /// Human-readable reason (failure detail, panic payload, ...).
    pub reason: Option<Arc<str>>,
    /// Scheduled local fire time, if applicable.
    pub fire_at: Option<DateTime<Local>>,
    /// Number of scheduler events cleared, if applicable.
    pub cleared: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            state: None,
            subscriber: None,
            stage: None,
            outcome: None,
            reason: None,
            fire_at: None,
            cleared: None,
        }
    }

    /// Attaches a state label.
    #[inline]
    pub fn with_state(mut self, state: &'static str) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a subscriber name.
    #[inline]
    pub fn with_subscriber(mut self, subscriber: &'static str) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    /// Attaches a fetch stage label.
    #[inline]
    pub fn with_stage(mut self, stage: &'static str) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Attaches a fetch outcome label.
    #[inline]
    pub fn with_outcome(mut self, outcome: &'static str) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a scheduled fire time.
    #[inline]
    pub fn with_fire_at(mut self, at: DateTime<Local>) -> Self {
        self.fire_at = Some(at);
        self
    }

    /// Attaches a cleared-event count.
    #[inline]
    pub fn with_cleared(mut self, n: usize) -> Self {
        self.cleared = Some(n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::MachineStarted);
        let b = Event::new(EventKind::MachineStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_subscriber_fault_classification() {
        assert!(EventKind::SubscriberOverflow.is_subscriber_fault());
        assert!(EventKind::SubscriberPanicked.is_subscriber_fault());
        assert!(!EventKind::FetchCompleted.is_subscriber_fault());
        assert!(!EventKind::DispatchPanicked.is_subscriber_fault());
    }

    #[test]
    fn test_builders_set_fields() {
        let ev = Event::new(EventKind::EventScheduled)
            .with_stage("daily")
            .with_fire_at(Local::now())
            .with_state("idle");
        assert_eq!(ev.stage, Some("daily"));
        assert_eq!(ev.state, Some("idle"));
        assert!(ev.fire_at.is_some());
        assert!(ev.outcome.is_none());
    }
}
