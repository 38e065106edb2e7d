//! # Scheduler: thread-safe min-priority queue of timed events.
//!
//! The queue's root is always the minimum fire time among contained events.
//! All mutation happens under one mutex with bounded critical sections;
//! waiting is expressed with a [`tokio::sync::Notify`] instead of a raw
//! condition variable, and cancellation with a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) instead of a
//! shared running flag.
//!
//! ## Consumer protocol
//! One dedicated consumer calls [`wait_next_event`](Scheduler::wait_next_event)
//! in a loop; after each wake it drains everything currently due via
//! [`poll_event`](Scheduler::poll_event) before sleeping again. Producers on
//! any task call [`add_event`](Scheduler::add_event) / [`clear_events`](Scheduler::clear_events).
//!
//! ## Wake-up hook
//! [`set_wakeup`](Scheduler::set_wakeup) installs an optional hook invoked
//! whenever a newly added event becomes the new earliest entry (or the queue
//! is cleared). The hook runs **after** the scheduler's lock is released and
//! must itself be non-blocking — a channel `try_send` or a `Notify` — so a
//! producer holding unrelated locks can never deadlock against the consumer.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::Notify;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::event::{QueueEntry, TimedEvent};

/// Non-blocking callback invoked when the earliest entry changes.
type WakeupHook = Arc<dyn Fn() + Send + Sync + 'static>;

/// Thread-safe min-priority queue of [`TimedEvent`]s.
///
/// ### Properties
/// - `add_event`/`clear_events` never block (bounded critical section).
/// - `peek_next_fire_time` is O(1).
/// - `wait_next_event` suspends only inside its own notify wait; it never
///   holds the queue lock across an await point.
pub struct Scheduler {
    queue: Mutex<Queue>,
    wakeup: Mutex<Option<WakeupHook>>,
    notify: Notify,
}

struct Queue {
    heap: BinaryHeap<Reverse<QueueEntry>>,
    next_seq: u64,
}

impl Scheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Queue {
                heap: BinaryHeap::new(),
                next_seq: 0,
            }),
            wakeup: Mutex::new(None),
            notify: Notify::new(),
        }
    }

    /// Inserts an event into the queue.
    ///
    /// If the new event fires earlier than the current earliest entry (or
    /// the queue was empty), the wake-up hook is invoked outside the lock.
    /// The internal waiter is always notified before returning.
    pub fn add_event(&self, event: TimedEvent) {
        let became_head = {
            let mut q = self.lock_queue();
            let became_head = match q.heap.peek() {
                None => true,
                Some(Reverse(head)) => event.fire_at() < head.event.fire_at(),
            };
            let seq = q.next_seq;
            q.next_seq += 1;
            q.heap.push(Reverse(QueueEntry { seq, event }));
            became_head
        };
        if became_head {
            self.invoke_wakeup();
        }
        self.notify.notify_one();
    }

    /// Empties the queue, returning how many events were removed.
    ///
    /// If anything was removed, triggers the same wake-up/notify path as
    /// [`add_event`](Self::add_event). Used when the machine leaves the
    /// acquiring super-state so stale retries never fire after shutdown.
    pub fn clear_events(&self) -> usize {
        let cleared = {
            let mut q = self.lock_queue();
            let n = q.heap.len();
            q.heap.clear();
            n
        };
        if cleared > 0 {
            self.invoke_wakeup();
            self.notify.notify_one();
        }
        cleared
    }

    /// Returns the earliest fire time, or `None` if the queue is empty.
    pub fn peek_next_fire_time(&self) -> Option<DateTime<Local>> {
        let q = self.lock_queue();
        q.heap.peek().map(|Reverse(e)| e.event.fire_at())
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.lock_queue().heap.len()
    }

    /// True if no events are queued.
    pub fn is_empty(&self) -> bool {
        self.lock_queue().heap.is_empty()
    }

    /// Installs the wake-up hook; at most one is active (last writer wins).
    ///
    /// The hook must be non-blocking (channel `try_send`, `Notify`, ...).
    pub fn set_wakeup(&self, hook: impl Fn() + Send + Sync + 'static) {
        let mut slot = self.lock_wakeup();
        *slot = Some(Arc::new(hook));
    }

    /// Pops the earliest event if it is already due; never blocks.
    ///
    /// Returns `None` when the token is cancelled, the queue is empty, or
    /// the earliest event is still in the future. Used in the drain loop
    /// after each wake to consume all currently-due events without
    /// re-sleeping between them.
    pub fn poll_event(&self, token: &CancellationToken) -> Option<TimedEvent> {
        if token.is_cancelled() {
            return None;
        }
        let mut q = self.lock_queue();
        let due = match q.heap.peek() {
            Some(Reverse(head)) => head.event.fire_at() <= Local::now(),
            None => false,
        };
        if due {
            q.heap.pop().map(|Reverse(e)| e.event)
        } else {
            None
        }
    }

    /// Blocks until the earliest event is due (popping and returning it),
    /// an earlier event arrives and becomes due, or the token is cancelled
    /// (returning `None`).
    ///
    /// Intended for a single dedicated consumer. If the queue is empty,
    /// waits indefinitely until an event is added or the token flips.
    pub async fn wait_next_event(&self, token: &CancellationToken) -> Option<TimedEvent> {
        loop {
            if token.is_cancelled() {
                return None;
            }

            // Register the waiter before inspecting the queue so an
            // `add_event` between unlock and await is never lost.
            let notified = self.notify.notified();
            tokio::pin!(notified);

            let wait = {
                let mut q = self.lock_queue();
                let next_at = q.heap.peek().map(|Reverse(e)| e.event.fire_at());
                match next_at {
                    Some(at) if at <= Local::now() => {
                        return q.heap.pop().map(|Reverse(e)| e.event);
                    }
                    Some(at) => Some((at - Local::now()).to_std().unwrap_or(Duration::ZERO)),
                    None => None,
                }
            };

            match wait {
                Some(d) => {
                    tokio::select! {
                        _ = sleep(d) => {}
                        _ = notified.as_mut() => {}
                        _ = token.cancelled() => return None,
                    }
                }
                None => {
                    tokio::select! {
                        _ = notified.as_mut() => {}
                        _ = token.cancelled() => return None,
                    }
                }
            }
        }
    }

    fn lock_queue(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_wakeup(&self) -> MutexGuard<'_, Option<WakeupHook>> {
        self.wakeup.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn invoke_wakeup(&self) {
        let hook = self.lock_wakeup().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
