//! # Worker: the single task that drives the machine.
//!
//! The worker owns the current [`MachineState`] and is the only place it
//! mutates, so dispatch needs no locking. It multiplexes three inputs:
//!
//! ```text
//!             ┌ cancellation token ── break
//! select! ────┼ injection queue ───── dispatch_guarded(event)
//!             └ scheduler wait ────── fire due trigger(s)
//! ```
//!
//! Timed triggers do not dispatch directly; they push their machine event
//! onto the injection queue, so every event, timed or injected, flows
//! through the same dispatch path in arrival order.
//!
//! Dispatch is guarded: a panicking entry action is caught, reported on
//! the bus, and the worker keeps running.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Local};
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cache::{FetchOutcome, WeatherCache};
use crate::config::AcquisitionConfig;
use crate::events::{Bus, Event, EventKind};
use crate::machine::cadence::{next_aligned, next_midnight};
use crate::machine::state::{transition, MachineEvent, MachineState};
use crate::scheduler::{Scheduler, TimedEvent};

pub(crate) struct Worker {
    state: MachineState,
    cfg: AcquisitionConfig,
    scheduler: Arc<Scheduler>,
    cache: Arc<WeatherCache>,
    bus: Bus,
    tx: mpsc::UnboundedSender<MachineEvent>,
    token: CancellationToken,
}

impl Worker {
    pub(crate) fn new(
        cfg: AcquisitionConfig,
        scheduler: Arc<Scheduler>,
        cache: Arc<WeatherCache>,
        bus: Bus,
        tx: mpsc::UnboundedSender<MachineEvent>,
        token: CancellationToken,
    ) -> Self {
        Self {
            state: MachineState::Off,
            cfg,
            scheduler,
            cache,
            bus,
            tx,
            token,
        }
    }

    /// Runs until the token is cancelled or the injection queue closes.
    pub(crate) async fn run(mut self, mut rx: mpsc::UnboundedReceiver<MachineEvent>) {
        loop {
            tokio::select! {
                _ = self.token.cancelled() => break,

                maybe = rx.recv() => match maybe {
                    Some(ev) => self.dispatch_guarded(ev).await,
                    None => break,
                },

                fired = self.scheduler.wait_next_event(&self.token) => match fired {
                    Some(due) => {
                        due.fire();
                        // A burst of events due at the same instant fires
                        // as one batch before dispatch resumes.
                        while let Some(due) = self.scheduler.poll_event(&self.token) {
                            due.fire();
                        }
                    }
                    None => break,
                },
            }
        }
        self.bus.publish(Event::new(EventKind::WorkerStopped));
    }

    /// Dispatches one event, catching panics from entry actions.
    async fn dispatch_guarded(&mut self, ev: MachineEvent) {
        let entered = self.state;
        if let Err(payload) = AssertUnwindSafe(self.dispatch(ev)).catch_unwind().await {
            let reason: &str = if let Some(s) = payload.downcast_ref::<&str>() {
                s
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s
            } else {
                "panic payload not printable"
            };
            self.bus.publish(
                Event::new(EventKind::DispatchPanicked)
                    .with_state(entered.as_label())
                    .with_reason(reason.to_string()),
            );
        }
    }

    /// Core dispatch: transition, publish, run the entry action, and feed
    /// any follow-up event back through the same path.
    async fn dispatch(&mut self, ev: MachineEvent) {
        if ev == MachineEvent::Terminate {
            self.bus.publish(Event::new(EventKind::MachineTerminated));
            self.token.cancel();
            return;
        }

        let mut pending = Some(ev);
        while let Some(ev) = pending.take() {
            if ev == MachineEvent::Shutdown && self.state.is_acquiring() {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
            }

            let Some(next) = transition(self.state, ev) else {
                self.bus.publish(
                    Event::new(EventKind::EventDiscarded)
                        .with_state(self.state.as_label())
                        .with_reason(ev.as_label()),
                );
                continue;
            };

            self.state = next;
            self.bus
                .publish(Event::new(EventKind::StateEntered).with_state(next.as_label()));
            pending = self.enter(next).await;
        }
    }

    /// Entry action of `state`; returns the follow-up event, if any.
    async fn enter(&mut self, state: MachineState) -> Option<MachineEvent> {
        match state {
            MachineState::Starting => {
                // Warm-up fills the cache best-effort; failures surface on
                // the bus and the cadence retries them.
                let outcome = self.cache.fetch_daily().await;
                self.publish_fetch("daily", &outcome);
                let outcome = self.cache.fetch_current().await;
                self.publish_fetch("current", &outcome);

                let now = Local::now();
                self.schedule(
                    MachineEvent::ReadCurrent,
                    "current",
                    next_aligned(now, self.cfg.current_interval_clamped()),
                );
                self.schedule(MachineEvent::Daily, "daily", next_midnight(now));
                Some(MachineEvent::Idle)
            }

            MachineState::Idle => {
                let ev = Event::new(EventKind::IdleParked);
                let ev = match self.scheduler.peek_next_fire_time() {
                    Some(t) => ev.with_fire_at(t),
                    None => ev,
                };
                self.bus.publish(ev);
                None
            }

            MachineState::FetchingDaily => {
                let outcome = self.cache.fetch_daily().await;
                self.publish_fetch("daily", &outcome);
                let fire_at = if outcome.is_updated() {
                    next_midnight(Local::now())
                } else {
                    Local::now() + self.cfg.retry_interval
                };
                self.schedule(MachineEvent::Daily, "daily", fire_at);
                Some(MachineEvent::Idle)
            }

            MachineState::FetchingCurrent => {
                let outcome = self.cache.fetch_current().await;
                self.publish_fetch("current", &outcome);
                let fire_at = if outcome.is_updated() {
                    next_aligned(Local::now(), self.cfg.current_interval_clamped())
                } else {
                    Local::now() + self.cfg.retry_interval
                };
                self.schedule(MachineEvent::ReadCurrent, "current", fire_at);
                Some(MachineEvent::Idle)
            }

            MachineState::Stopping => {
                let cleared = self.scheduler.clear_events();
                self.bus
                    .publish(Event::new(EventKind::SchedulerDrained).with_cleared(cleared));
                Some(MachineEvent::Shutdown)
            }

            MachineState::Off => {
                self.bus.publish(Event::new(EventKind::MachineStopped));
                self.token.cancel();
                None
            }
        }
    }

    /// Registers a timed trigger that feeds `ev` back into the queue.
    fn schedule(&self, ev: MachineEvent, stage: &'static str, fire_at: DateTime<Local>) {
        let tx = self.tx.clone();
        self.scheduler.add_event(TimedEvent::new(fire_at, move || {
            let _ = tx.send(ev);
        }));
        self.bus.publish(
            Event::new(EventKind::EventScheduled)
                .with_stage(stage)
                .with_fire_at(fire_at),
        );
    }

    fn publish_fetch(&self, stage: &'static str, outcome: &FetchOutcome) {
        let ev = Event::new(EventKind::FetchCompleted)
            .with_stage(stage)
            .with_outcome(outcome.as_label());
        let ev = match outcome {
            FetchOutcome::Failed { reason } => ev.with_reason(reason.clone()),
            _ => ev,
        };
        self.bus.publish(ev);
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> MachineState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: MachineState) {
        self.state = state;
    }
}
