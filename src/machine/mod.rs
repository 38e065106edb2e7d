//! # AcquisitionMachine: the runtime surface of the state machine.
//!
//! Construction wires the scheduler, the cache, and the event bus
//! together; [`AcquisitionMachine::run`] spawns the worker task (and, when
//! subscribers are attached, a listener task fanning bus events out to
//! them). [`AcquisitionMachine::initiate`] injects `Start`, after which
//! the machine warms up and settles into the timed acquisition cycle.
//!
//! ## Lifecycle
//! ```text
//! new() ─► run() ─► initiate() ─► ... acquiring ... ─► stop().await
//!                                        │
//!              handle().shutdown() ──────┘  (or a process signal)
//! ```
//!
//! ## Rules
//! - `run` may be called once; a second call returns
//!   [`RuntimeError::AlreadyRunning`].
//! - `stop` is idempotent: it cancels the runtime token and joins the
//!   worker, and further calls are no-ops.
//! - [`MachineHandle`] is a cheap clone for injecting events from other
//!   tasks (signal handlers, tests, an admin surface).

mod cadence;
mod state;
mod worker;

pub use state::{MachineEvent, MachineState};

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::WeatherCache;
use crate::config::AcquisitionConfig;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::scheduler::Scheduler;
use crate::subscribers::{Subscribe, SubscriberSet};
use worker::Worker;

/// Cloneable handle for driving a running machine from other tasks.
#[derive(Clone)]
pub struct MachineHandle {
    tx: mpsc::UnboundedSender<MachineEvent>,
    token: CancellationToken,
}

impl MachineHandle {
    /// Injects an event into the machine's queue.
    ///
    /// Silently dropped once the worker has stopped.
    pub fn inject(&self, event: MachineEvent) {
        let _ = self.tx.send(event);
    }

    /// Requests an orderly wind-down (injects [`MachineEvent::Shutdown`]).
    pub fn shutdown(&self) {
        self.inject(MachineEvent::Shutdown);
    }

    /// True once the runtime token has been cancelled.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Periodic weather-acquisition state machine.
pub struct AcquisitionMachine {
    cfg: AcquisitionConfig,
    scheduler: Arc<Scheduler>,
    cache: Arc<WeatherCache>,
    bus: Bus,
    tx: mpsc::UnboundedSender<MachineEvent>,
    rx: Option<mpsc::UnboundedReceiver<MachineEvent>>,
    token: CancellationToken,
    worker: Option<JoinHandle<()>>,
    listener: Option<JoinHandle<()>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl AcquisitionMachine {
    /// Wires a machine over an existing scheduler and cache.
    pub fn new(cfg: AcquisitionConfig, scheduler: Arc<Scheduler>, cache: Arc<WeatherCache>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            cfg,
            scheduler,
            cache,
            bus,
            tx,
            rx: Some(rx),
            token: CancellationToken::new(),
            worker: None,
            listener: None,
            subscribers: Vec::new(),
        }
    }

    /// Attaches subscribers fed from the bus while the machine runs.
    pub fn with_subscribers(mut self, subs: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subs;
        self
    }

    /// Spawns the worker (and the subscriber listener, if any).
    ///
    /// The machine stays in `Off` until [`initiate`](Self::initiate) is
    /// called.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let rx = self.rx.take().ok_or(RuntimeError::AlreadyRunning)?;

        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers.clone(), self.bus.clone());
            let mut bus_rx = self.bus.subscribe();
            let token = self.token.clone();
            self.listener = Some(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        recv = bus_rx.recv() => match recv {
                            Ok(ev) => set.emit(&ev),
                            Err(broadcast::error::RecvError::Lagged(_)) => continue,
                            Err(broadcast::error::RecvError::Closed) => break,
                        },
                    }
                }
                set.shutdown().await;
            }));
        }

        let worker = Worker::new(
            self.cfg.clone(),
            self.scheduler.clone(),
            self.cache.clone(),
            self.bus.clone(),
            self.tx.clone(),
            self.token.clone(),
        );
        self.worker = Some(tokio::spawn(worker.run(rx)));
        self.bus.publish(Event::new(EventKind::MachineStarted));
        Ok(())
    }

    /// Injects `Start`, beginning the warm-up.
    pub fn initiate(&self) {
        self.inject(MachineEvent::Start);
    }

    /// Injects an arbitrary event.
    pub fn inject(&self, event: MachineEvent) {
        let _ = self.tx.send(event);
    }

    /// Cancels the runtime token and joins the spawned tasks.
    ///
    /// Safe to call any number of times, before or after the worker has
    /// already stopped on its own.
    pub async fn stop(&mut self) {
        self.token.cancel();
        if let Some(h) = self.worker.take() {
            let _ = h.await;
        }
        if let Some(h) = self.listener.take() {
            let _ = h.await;
        }
    }

    /// Returns a handle for injecting events from other tasks.
    pub fn handle(&self) -> MachineHandle {
        MachineHandle {
            tx: self.tx.clone(),
            token: self.token.clone(),
        }
    }

    /// Opens a new bus subscription.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// The cache this machine writes into.
    pub fn cache(&self) -> &Arc<WeatherCache> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::{CurrentConditions, DailySummary, Location, WeatherProvider};
    use async_trait::async_trait;
    use chrono::{DateTime, Local};
    use std::time::Duration;

    struct StillProvider;

    #[async_trait]
    impl WeatherProvider for StillProvider {
        async fn daily_summary(&self, _loc: &Location) -> Result<DailySummary, ProviderError> {
            let now = Local::now();
            Ok(DailySummary {
                date: now.date_naive(),
                sunrise: now,
                sunset: now,
            })
        }

        async fn current_stamp(&self, _loc: &Location) -> Result<DateTime<Local>, ProviderError> {
            Ok(Local::now())
        }

        async fn current_details(
            &self,
            _loc: &Location,
        ) -> Result<CurrentConditions, ProviderError> {
            Ok(CurrentConditions {
                observed_at: Local::now(),
                temperature_c: Some(4.2),
                pressure_hpa: None,
                humidity_pct: None,
                precipitation_mm: None,
                wind_speed_ms: None,
                wind_direction_deg: None,
                cloud_cover_pct: None,
                uv_index: None,
                weather_code: None,
                summary: None,
            })
        }
    }

    fn machine() -> AcquisitionMachine {
        let cfg = AcquisitionConfig::default();
        let scheduler = Arc::new(Scheduler::new());
        let cache = Arc::new(WeatherCache::new(
            Arc::new(StillProvider),
            cfg.location.clone(),
            cfg.lock_timeout,
        ));
        AcquisitionMachine::new(cfg, scheduler, cache)
    }

    async fn recv_kind(
        rx: &mut broadcast::Receiver<Event>,
        kind: EventKind,
    ) -> Event {
        loop {
            let ev = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("bus timed out")
                .expect("bus closed");
            if ev.kind == kind {
                return ev;
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_warms_up_and_parks() {
        let mut m = machine();
        let mut rx = m.subscribe();

        m.run().expect("first run");
        m.initiate();

        recv_kind(&mut rx, EventKind::IdleParked).await;
        let snap = m.cache().snapshot().await.expect("snapshot");
        assert_eq!(snap.temperature_c, Some(4.2));
        assert!(!m.scheduler.is_empty());

        m.stop().await;
    }

    #[tokio::test]
    async fn test_second_run_is_rejected() {
        let mut m = machine();
        m.run().expect("first run");
        assert!(matches!(m.run(), Err(RuntimeError::AlreadyRunning)));
        m.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_drains_pending_events() {
        let mut m = machine();
        let mut rx = m.subscribe();
        let handle = m.handle();

        m.run().expect("run");
        m.initiate();
        recv_kind(&mut rx, EventKind::IdleParked).await;

        handle.shutdown();
        recv_kind(&mut rx, EventKind::MachineStopped).await;
        m.stop().await;

        assert!(m.scheduler.is_empty());
        assert!(handle.is_stopped());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_is_idempotent() {
        let mut m = machine();
        m.run().expect("run");
        m.initiate();

        m.stop().await;
        m.stop().await;
        assert!(m.handle().is_stopped());
    }
}
