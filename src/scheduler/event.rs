//! # Timed event: fire time + one-shot trigger.
//!
//! [`TimedEvent`] is the unit the scheduler queues. It is owned exclusively
//! by the scheduler's internal queue from insertion until it is popped and
//! handed to the consumer, which invokes the trigger exactly once.
//!
//! Ordering is by fire time ascending; the queue breaks ties by insertion
//! order so equal fire times pop FIFO.

use chrono::{DateTime, Local};

/// One-shot callback carried by a timed event.
pub type Trigger = Box<dyn FnOnce() + Send + 'static>;

/// A single future action: a local fire time and a trigger.
///
/// ## Example
/// ```rust
/// use chrono::Local;
/// use meteovisor::TimedEvent;
///
/// let ev = TimedEvent::new(Local::now(), || println!("due"));
/// ev.fire();
/// ```
pub struct TimedEvent {
    fire_at: DateTime<Local>,
    trigger: Trigger,
}

impl TimedEvent {
    /// Creates an event firing at `fire_at`.
    pub fn new(fire_at: DateTime<Local>, trigger: impl FnOnce() + Send + 'static) -> Self {
        Self {
            fire_at,
            trigger: Box::new(trigger),
        }
    }

    /// Returns the local time this event is due.
    pub fn fire_at(&self) -> DateTime<Local> {
        self.fire_at
    }

    /// Consumes the event and invokes its trigger.
    pub fn fire(self) {
        (self.trigger)();
    }
}

impl std::fmt::Debug for TimedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedEvent")
            .field("fire_at", &self.fire_at)
            .finish_non_exhaustive()
    }
}

/// Heap entry: orders events by `(fire_at, seq)` so the queue is a stable
/// min-heap (earlier fires first, FIFO among ties).
pub(crate) struct QueueEntry {
    pub(crate) seq: u64,
    pub(crate) event: TimedEvent,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.event.fire_at == other.event.fire_at && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.event
            .fire_at
            .cmp(&other.event.fire_at)
            .then(self.seq.cmp(&other.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(offset_secs: i64, seq: u64) -> QueueEntry {
        QueueEntry {
            seq,
            event: TimedEvent::new(Local::now() + Duration::seconds(offset_secs), || {}),
        }
    }

    #[test]
    fn test_orders_by_fire_time() {
        let early = entry(1, 5);
        let late = entry(10, 0);
        assert!(early < late);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let at = Local::now();
        let first = QueueEntry {
            seq: 1,
            event: TimedEvent::new(at, || {}),
        };
        let second = QueueEntry {
            seq: 2,
            event: TimedEvent::new(at, || {}),
        };
        assert!(first < second);
    }
}
