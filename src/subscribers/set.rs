//! # SubscriberSet: non-blocking fan-out over multiple subscribers.
//!
//! [`SubscriberSet`] distributes each [`Event`](crate::events::Event) to
//! multiple subscribers **without awaiting** their processing. Faults in the
//! fan-out itself are first-class runtime events: a full queue publishes
//! [`EventKind::SubscriberOverflow`] and a panicking subscriber publishes
//! [`EventKind::SubscriberPanicked`] on the same [`Bus`] the machine uses,
//! so external receivers observe subscriber health alongside fetch outcomes.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and reported (isolation).
//! - Subscriber-fault events are **never re-delivered to subscribers**:
//!   a subscriber that panics on every event cannot feed its own panic
//!   reports back into its queue.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers.
//! - No retries on per-subscriber queue overflow (events are dropped for
//!   that subscriber, with one overflow event per drop).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │                        (Arc-clone per subscriber)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_event()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_event()
//!        └────────────────► [queue SN] ─► worker SN ─► on_event()
//!                │                            │
//!                └─ full: SubscriberOverflow  └─ panic: SubscriberPanicked
//!                             │                            │
//!                             └──────────► Bus ◄───────────┘
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};

use super::Subscribe;

/// Per-subscriber channel with metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    ///
    /// Fault events (overflow, panic) are published on `bus`.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let worker_bus = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(payload) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        worker_bus.publish(
                            Event::new(EventKind::SubscriberPanicked)
                                .with_subscriber(name)
                                .with_reason(panic_message(payload.as_ref())),
                        );
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Fan-out one event to all subscribers (non-blocking).
    ///
    /// If a subscriber's queue is **full** or **closed**, the event is
    /// dropped for it and a [`EventKind::SubscriberOverflow`] naming the
    /// subscriber is published instead. Subscriber-fault events are not
    /// fanned out (see the module docs).
    pub fn emit(&self, event: &Event) {
        if event.kind.is_subscriber_fault() {
            return;
        }
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "queue_full",
                Err(mpsc::error::TrySendError::Closed(_)) => "worker_closed",
            };
            self.bus.publish(
                Event::new(EventKind::SubscriberOverflow)
                    .with_subscriber(channel.name)
                    .with_reason(reason),
            );
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic payload not printable".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        seen: AtomicUsize,
    }

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _event: &Event) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counter"
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_all_subscribers() {
        let a = Arc::new(Counter {
            seen: AtomicUsize::new(0),
        });
        let b = Arc::new(Counter {
            seen: AtomicUsize::new(0),
        });
        let set = SubscriberSet::new(vec![a.clone(), b.clone()], Bus::new(8));
        assert_eq!(set.len(), 2);

        set.emit(&Event::new(EventKind::MachineStarted));
        set.emit(&Event::new(EventKind::WorkerStopped));
        set.shutdown().await;

        assert_eq!(a.seen.load(Ordering::SeqCst), 2);
        assert_eq!(b.seen.load(Ordering::SeqCst), 2);
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    #[tokio::test]
    async fn test_panicking_subscriber_is_isolated_and_reported() {
        let ok = Arc::new(Counter {
            seen: AtomicUsize::new(0),
        });
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(
            vec![Arc::new(Panicker) as Arc<dyn Subscribe>, ok.clone()],
            bus,
        );

        set.emit(&Event::new(EventKind::MachineStarted));
        set.shutdown().await;

        assert_eq!(ok.seen.load(Ordering::SeqCst), 1);

        let fault = rx.try_recv().expect("fault event");
        assert_eq!(fault.kind, EventKind::SubscriberPanicked);
        assert_eq!(fault.subscriber, Some("panicker"));
        assert_eq!(fault.reason.as_deref(), Some("boom"));
    }

    struct Stuck;

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _event: &Event) {
            futures::future::pending::<()>().await;
        }

        fn name(&self) -> &'static str {
            "stuck"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn test_queue_overflow_is_reported_per_drop() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        // Current-thread runtime: the worker has not run yet, so the queue
        // (capacity 1) absorbs exactly one event.
        let set = SubscriberSet::new(vec![Arc::new(Stuck) as Arc<dyn Subscribe>], bus);

        set.emit(&Event::new(EventKind::MachineStarted));
        set.emit(&Event::new(EventKind::StateEntered));
        set.emit(&Event::new(EventKind::IdleParked));

        let mut overflows = 0;
        while let Ok(ev) = rx.try_recv() {
            assert_eq!(ev.kind, EventKind::SubscriberOverflow);
            assert_eq!(ev.subscriber, Some("stuck"));
            assert_eq!(ev.reason.as_deref(), Some("queue_full"));
            overflows += 1;
        }
        assert_eq!(overflows, 2);
        drop(set);
    }

    #[tokio::test]
    async fn test_fault_events_are_not_fanned_out() {
        let ok = Arc::new(Counter {
            seen: AtomicUsize::new(0),
        });
        let set = SubscriberSet::new(vec![ok.clone()], Bus::new(8));

        set.emit(
            &Event::new(EventKind::SubscriberPanicked)
                .with_subscriber("panicker")
                .with_reason("boom"),
        );
        set.emit(&Event::new(EventKind::SubscriberOverflow).with_subscriber("stuck"));
        set.emit(&Event::new(EventKind::MachineStarted));
        set.shutdown().await;

        assert_eq!(ok.seen.load(Ordering::SeqCst), 1);
    }
}
