//! # WeatherCache: gated fetch operations over a reader/writer lock.
//!
//! The cache owns the gating state (last observed civil day, last observed
//! provider timestamp) and the [`WeatherSnapshot`], all behind one
//! `tokio::sync::RwLock`. Lock acquisition is bounded by the configured
//! timeout; a miss is reported as a failure, never a hang.
//!
//! ## Fetch flow
//! ```text
//! fetch_daily:
//!   last_day == today ──────────────► Unchanged (nothing to do)
//!   provider.daily_summary() ─ Err ─► Failed (reason folded in)
//!   summary.date != today ──────────► Failed (clock/provider skew)
//!   write lock timed out ───────────► Failed (retry later)
//!   else: sunrise/sunset + last_day updated together ─► Updated
//!
//! fetch_current:
//!   provider.current_stamp() ─ Err ─► Failed
//!   stamp not newer than last ──────► Unchanged (probe only, no full fetch)
//!   provider.current_details() Err ─► Failed
//!   write lock timed out ───────────► Failed
//!   else: snapshot fields + last_stamp replaced atomically ─► Updated
//! ```
//!
//! ## Rules
//! - Provider errors never propagate past this boundary; they become
//!   [`FetchOutcome::Failed`] with the reason preserved for the logs.
//! - Readers copy the snapshot out under the shared lock; a reader never
//!   blocks another reader, only a concurrent writer.
//! - A cold cache is a valid empty snapshot, not an error.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};
use tokio::sync::RwLock;
use tokio::time::timeout;

use crate::cache::snapshot::WeatherSnapshot;
use crate::error::CacheError;
use crate::provider::{Location, ProviderRef};

/// Explicit three-way result of a fetch operation.
///
/// The state machine re-arms on the normal cadence after `Updated` and on
/// the short retry cadence after `Unchanged` or `Failed`; the split still
/// matters for logs and tests, which is why it is not a boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The snapshot and gating state were updated.
    Updated,
    /// The upstream source had nothing newer; no mutation happened.
    Unchanged,
    /// The fetch did not complete (transport, decode, skew, or lock
    /// contention); no mutation happened.
    Failed {
        /// Human-readable failure detail for the logs.
        reason: String,
    },
}

impl FetchOutcome {
    /// True if the cache was updated.
    pub fn is_updated(&self) -> bool {
        matches!(self, FetchOutcome::Updated)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchOutcome::Updated => "updated",
            FetchOutcome::Unchanged => "unchanged",
            FetchOutcome::Failed { .. } => "failed",
        }
    }

    fn failed(reason: impl std::fmt::Display) -> Self {
        FetchOutcome::Failed {
            reason: reason.to_string(),
        }
    }

    fn lock_timed_out(timeout: Duration) -> Self {
        FetchOutcome::Failed {
            reason: format!("cache lock not acquired within {timeout:?}"),
        }
    }
}

/// Gating state and snapshot guarded by the reader/writer lock.
struct CacheInner {
    last_day: Option<NaiveDate>,
    last_stamp: Option<DateTime<Local>>,
    snapshot: WeatherSnapshot,
}

/// Thread-safe store of the latest fetched values.
///
/// Constructed once at startup holding no data; the machine's worker is the
/// only writer, while the publishing layer reads snapshots from arbitrary
/// tasks.
pub struct WeatherCache {
    provider: ProviderRef,
    location: Location,
    lock_timeout: Duration,
    inner: RwLock<CacheInner>,
}

impl WeatherCache {
    /// Creates an empty cache over `provider` for `location`.
    pub fn new(provider: ProviderRef, location: Location, lock_timeout: Duration) -> Self {
        Self {
            provider,
            location,
            lock_timeout,
            inner: RwLock::new(CacheInner {
                last_day: None,
                last_stamp: None,
                snapshot: WeatherSnapshot::default(),
            }),
        }
    }

    /// Performs one daily-resolution fetch attempt.
    ///
    /// Gated on the local civil day: once a summary for "today" has been
    /// stored, further calls return [`FetchOutcome::Unchanged`] without
    /// touching the provider. A summary for any other day than today is
    /// treated as clock/provider skew and fails without mutating state.
    pub async fn fetch_daily(&self) -> FetchOutcome {
        let today = Local::now().date_naive();

        let gate = match timeout(self.lock_timeout, self.inner.read()).await {
            Ok(guard) => guard.last_day,
            Err(_) => return FetchOutcome::lock_timed_out(self.lock_timeout),
        };
        // Fetch only when the stored day is unset or strictly behind today;
        // a stored day at or past today means there is nothing to do.
        if gate.is_some_and(|d| d >= today) {
            return FetchOutcome::Unchanged;
        }

        let summary = match self.provider.daily_summary(&self.location).await {
            Ok(s) => s,
            Err(e) => return FetchOutcome::failed(e),
        };
        if summary.date != today {
            return FetchOutcome::failed(format!(
                "provider returned day {} instead of {today}",
                summary.date
            ));
        }

        match timeout(self.lock_timeout, self.inner.write()).await {
            Ok(mut guard) => {
                guard.snapshot.sunrise = Some(summary.sunrise);
                guard.snapshot.sunset = Some(summary.sunset);
                guard.last_day = Some(today);
                FetchOutcome::Updated
            }
            Err(_) => FetchOutcome::lock_timed_out(self.lock_timeout),
        }
    }

    /// Performs one current-resolution fetch attempt.
    ///
    /// Probes the provider's timestamp first; the full details query only
    /// runs when the probe is strictly newer than the last observed stamp.
    /// Daily fields (sunrise/sunset) are preserved across updates.
    pub async fn fetch_current(&self) -> FetchOutcome {
        let stamp = match self.provider.current_stamp(&self.location).await {
            Ok(s) => s,
            Err(e) => return FetchOutcome::failed(e),
        };

        let gate = match timeout(self.lock_timeout, self.inner.read()).await {
            Ok(guard) => guard.last_stamp,
            Err(_) => return FetchOutcome::lock_timed_out(self.lock_timeout),
        };
        if let Some(prev) = gate {
            if stamp <= prev {
                return FetchOutcome::Unchanged;
            }
        }

        let details = match self.provider.current_details(&self.location).await {
            Ok(d) => d,
            Err(e) => return FetchOutcome::failed(e),
        };

        match timeout(self.lock_timeout, self.inner.write()).await {
            Ok(mut guard) => {
                let snap = &mut guard.snapshot;
                snap.temperature_c = details.temperature_c;
                snap.pressure_hpa = details.pressure_hpa;
                snap.humidity_pct = details.humidity_pct;
                snap.precipitation_mm = details.precipitation_mm;
                snap.wind_speed_ms = details.wind_speed_ms;
                snap.wind_direction_deg = details.wind_direction_deg;
                snap.cloud_cover_pct = details.cloud_cover_pct;
                snap.uv_index = details.uv_index;
                snap.weather_code = details.weather_code;
                snap.summary = details.summary;
                snap.observed_at = Some(details.observed_at);
                guard.last_stamp = Some(details.observed_at);
                FetchOutcome::Updated
            }
            Err(_) => FetchOutcome::lock_timed_out(self.lock_timeout),
        }
    }

    /// Returns a copy of the current snapshot.
    ///
    /// Takes the shared lock with the bounded timeout. A cold cache yields
    /// an empty snapshot (`Ok`); only lock contention yields
    /// [`CacheError::Busy`].
    pub async fn snapshot(&self) -> Result<WeatherSnapshot, CacheError> {
        match timeout(self.lock_timeout, self.inner.read()).await {
            Ok(guard) => Ok(guard.snapshot.clone()),
            Err(_) => Err(CacheError::Busy {
                timeout: self.lock_timeout,
            }),
        }
    }

    /// Returns the last civil day a daily summary was stored for.
    pub async fn last_observed_day(&self) -> Result<Option<NaiveDate>, CacheError> {
        match timeout(self.lock_timeout, self.inner.read()).await {
            Ok(guard) => Ok(guard.last_day),
            Err(_) => Err(CacheError::Busy {
                timeout: self.lock_timeout,
            }),
        }
    }

    /// Returns the last provider observation timestamp stored.
    pub async fn last_observed_stamp(&self) -> Result<Option<DateTime<Local>>, CacheError> {
        match timeout(self.lock_timeout, self.inner.read()).await {
            Ok(guard) => Ok(guard.last_stamp),
            Err(_) => Err(CacheError::Busy {
                timeout: self.lock_timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::{CurrentConditions, DailySummary, WeatherProvider};
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const LOCK_TIMEOUT: Duration = Duration::from_millis(250);

    /// Configurable provider double with call counters.
    struct MockProvider {
        daily_calls: AtomicUsize,
        stamp_calls: AtomicUsize,
        details_calls: AtomicUsize,
        fail_daily: bool,
        skew_daily: bool,
        fail_stamp: bool,
        fail_details: bool,
        stamp: Mutex<DateTime<Local>>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                daily_calls: AtomicUsize::new(0),
                stamp_calls: AtomicUsize::new(0),
                details_calls: AtomicUsize::new(0),
                fail_daily: false,
                skew_daily: false,
                fail_stamp: false,
                fail_details: false,
                stamp: Mutex::new(Local::now()),
            }
        }

        fn advance_stamp(&self, secs: i64) {
            let mut s = self.stamp.lock().expect("mock stamp lock");
            *s += ChronoDuration::seconds(secs);
        }

        fn current_stamp_value(&self) -> DateTime<Local> {
            *self.stamp.lock().expect("mock stamp lock")
        }
    }

    #[async_trait]
    impl WeatherProvider for MockProvider {
        async fn daily_summary(&self, _loc: &Location) -> Result<DailySummary, ProviderError> {
            self.daily_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_daily {
                return Err(ProviderError::transport("daily endpoint down"));
            }
            let now = Local::now();
            let date = if self.skew_daily {
                now.date_naive().pred_opt().expect("previous day")
            } else {
                now.date_naive()
            };
            Ok(DailySummary {
                date,
                sunrise: now - ChronoDuration::hours(6),
                sunset: now + ChronoDuration::hours(6),
            })
        }

        async fn current_stamp(&self, _loc: &Location) -> Result<DateTime<Local>, ProviderError> {
            self.stamp_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_stamp {
                return Err(ProviderError::transport("probe endpoint down"));
            }
            Ok(self.current_stamp_value())
        }

        async fn current_details(
            &self,
            _loc: &Location,
        ) -> Result<CurrentConditions, ProviderError> {
            self.details_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_details {
                return Err(ProviderError::decode("malformed payload"));
            }
            Ok(CurrentConditions {
                observed_at: self.current_stamp_value(),
                temperature_c: Some(21.5),
                pressure_hpa: Some(1013.2),
                humidity_pct: Some(48.0),
                precipitation_mm: None,
                wind_speed_ms: Some(3.1),
                wind_direction_deg: Some(270.0),
                cloud_cover_pct: Some(25.0),
                uv_index: None,
                weather_code: Some(2),
                summary: Some("scattered clouds".into()),
            })
        }
    }

    fn cache_with(provider: MockProvider) -> (Arc<MockProvider>, WeatherCache) {
        let provider = Arc::new(provider);
        let cache = WeatherCache::new(
            provider.clone(),
            Location::new("test", 52.52, 13.405),
            LOCK_TIMEOUT,
        );
        (provider, cache)
    }

    #[tokio::test]
    async fn test_daily_gates_on_calendar_day() {
        let (provider, cache) = cache_with(MockProvider::new());

        assert_eq!(cache.fetch_daily().await, FetchOutcome::Updated);
        assert_eq!(cache.fetch_daily().await, FetchOutcome::Unchanged);
        assert_eq!(provider.daily_calls.load(Ordering::SeqCst), 1);

        let snap = cache.snapshot().await.expect("snapshot");
        assert!(snap.sunrise.is_some());
        assert!(snap.sunset.is_some());
        assert_eq!(
            cache.last_observed_day().await.expect("read"),
            Some(Local::now().date_naive())
        );
    }

    #[tokio::test]
    async fn test_daily_skew_fails_without_mutation() {
        let mut mock = MockProvider::new();
        mock.skew_daily = true;
        let (provider, cache) = cache_with(mock);

        assert!(matches!(
            cache.fetch_daily().await,
            FetchOutcome::Failed { .. }
        ));
        assert_eq!(cache.last_observed_day().await.expect("read"), None);
        assert!(cache.snapshot().await.expect("snapshot").is_empty());

        // Gate is still open, so the provider is consulted again.
        let _ = cache.fetch_daily().await;
        assert_eq!(provider.daily_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_daily_provider_error_becomes_failed() {
        let mut mock = MockProvider::new();
        mock.fail_daily = true;
        let (_, cache) = cache_with(mock);

        match cache.fetch_daily().await {
            FetchOutcome::Failed { reason } => assert!(reason.contains("daily endpoint down")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_current_gates_on_provider_stamp() {
        let (provider, cache) = cache_with(MockProvider::new());

        assert_eq!(cache.fetch_current().await, FetchOutcome::Updated);
        // Probe unchanged: no details call.
        assert_eq!(cache.fetch_current().await, FetchOutcome::Unchanged);
        assert_eq!(provider.stamp_calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.details_calls.load(Ordering::SeqCst), 1);

        provider.advance_stamp(60);
        assert_eq!(cache.fetch_current().await, FetchOutcome::Updated);
        assert_eq!(provider.details_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_current_probe_error_skips_details() {
        let mut mock = MockProvider::new();
        mock.fail_stamp = true;
        let (provider, cache) = cache_with(mock);

        assert!(matches!(
            cache.fetch_current().await,
            FetchOutcome::Failed { .. }
        ));
        assert_eq!(provider.details_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_current_details_error_leaves_gate_open() {
        let mut mock = MockProvider::new();
        mock.fail_details = true;
        let (provider, cache) = cache_with(mock);

        assert!(matches!(
            cache.fetch_current().await,
            FetchOutcome::Failed { .. }
        ));
        assert_eq!(cache.last_observed_stamp().await.expect("read"), None);

        // Next attempt probes and tries the full fetch again.
        let _ = cache.fetch_current().await;
        assert_eq!(provider.details_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_current_preserves_daily_fields() {
        let (_, cache) = cache_with(MockProvider::new());

        assert_eq!(cache.fetch_daily().await, FetchOutcome::Updated);
        assert_eq!(cache.fetch_current().await, FetchOutcome::Updated);

        let snap = cache.snapshot().await.expect("snapshot");
        assert!(snap.sunrise.is_some());
        assert_eq!(snap.temperature_c, Some(21.5));
        assert_eq!(snap.summary.as_deref(), Some("scattered clouds"));
        assert!(snap.observed_at.is_some());
    }

    #[tokio::test]
    async fn test_cold_cache_yields_empty_snapshot() {
        let (_, cache) = cache_with(MockProvider::new());
        let snap = cache.snapshot().await.expect("cold read must succeed");
        assert!(snap.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_readers_do_not_block() {
        let (_, cache) = cache_with(MockProvider::new());
        let _ = cache.fetch_current().await;

        let (a, b) = tokio::join!(cache.snapshot(), cache.snapshot());
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(a.expect("a"), b.expect("b"));
    }
}
