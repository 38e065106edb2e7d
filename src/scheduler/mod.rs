//! # Timed-event scheduler.
//!
//! A thread-safe min-priority queue of future actions. Each
//! [`TimedEvent`] pairs a local fire time with a one-shot trigger; the
//! [`Scheduler`] keeps them ordered by fire time and lets a single dedicated
//! consumer block until the next one is due.
//!
//! ## Contents
//! - [`TimedEvent`] — fire time + one-shot trigger
//! - [`Scheduler`] — add/clear/peek plus blocking wait and non-blocking poll
//!
//! ## Quick wiring
//! ```text
//! producers ──► add_event / clear_events ──► [min-heap under Mutex]
//!                                                 │  notify / wakeup hook
//! consumer  ──► wait_next_event(&token) ◄─────────┘
//!          └──► poll_event(&token)   (drain loop after each wake)
//! ```

mod event;
mod queue;

pub use event::TimedEvent;
pub use queue::Scheduler;
