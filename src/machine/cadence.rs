//! Wall-clock cadence helpers.
//!
//! Timed fetches are aligned to the local civil day so that runs started
//! at different moments converge onto the same firing grid: a 15-minute
//! interval fires at :00, :15, :30, :45 regardless of when the machine
//! came up, and the daily fetch fires at local midnight.

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone, Timelike};

/// Next boundary of `interval` within the civil day, strictly after `now`.
///
/// Boundaries are counted in whole seconds from local midnight; a boundary
/// that lands on or past the end of the day rolls over to the next
/// midnight.
pub(crate) fn next_aligned(now: DateTime<Local>, interval: Duration) -> DateTime<Local> {
    let step = interval.as_secs().max(1);
    let elapsed = u64::from(now.num_seconds_from_midnight());
    let next = (elapsed / step + 1) * step;
    if next >= 86_400 {
        return next_midnight(now);
    }

    let naive = now.date_naive().and_hms_opt(0, 0, 0).map(|midnight| {
        midnight + ChronoDuration::seconds(next as i64)
    });
    match naive.and_then(localize) {
        Some(t) => t,
        // DST gap: the boundary does not exist on the local clock.
        None => now + ChronoDuration::seconds(step as i64),
    }
}

/// Start of the next civil day, strictly after `now`.
pub(crate) fn next_midnight(now: DateTime<Local>) -> DateTime<Local> {
    let naive = now
        .date_naive()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0));
    match naive.and_then(localize) {
        Some(t) => t,
        None => now + ChronoDuration::days(1),
    }
}

/// Resolves a naive local time, taking the earlier instant when the
/// clock change makes it ambiguous.
fn localize(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    match Local.from_local_datetime(&naive) {
        chrono::LocalResult::Single(t) => Some(t),
        chrono::LocalResult::Ambiguous(earliest, _) => Some(earliest),
        chrono::LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUARTER_HOUR: Duration = Duration::from_secs(15 * 60);

    #[test]
    fn test_aligned_boundary_is_strictly_in_the_future() {
        let now = Local::now();
        let next = next_aligned(now, QUARTER_HOUR);
        assert!(next > now);
        assert!(next - now <= ChronoDuration::seconds(15 * 60));
    }

    #[test]
    fn test_aligned_boundary_sits_on_the_grid() {
        let now = Local::now();
        let next = next_aligned(now, QUARTER_HOUR);
        let from_midnight = next.num_seconds_from_midnight();
        // Midnight rollover reports zero seconds, which is also on grid.
        assert_eq!(from_midnight % (15 * 60), 0);
    }

    #[test]
    fn test_consecutive_boundaries_are_one_step_apart() {
        let now = Local::now();
        let first = next_aligned(now, QUARTER_HOUR);
        let second = next_aligned(first, QUARTER_HOUR);
        assert_eq!(second - first, ChronoDuration::seconds(15 * 60));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let now = Local::now();
        let next = next_aligned(now, Duration::ZERO);
        assert!(next > now);
        assert!(next - now <= ChronoDuration::seconds(1));
    }

    #[test]
    fn test_next_midnight_is_tomorrow_at_zero() {
        let now = Local::now();
        let midnight = next_midnight(now);
        assert!(midnight > now);
        assert_eq!(midnight.num_seconds_from_midnight(), 0);
        assert_eq!(midnight.date_naive(), now.date_naive().succ_opt().unwrap());
    }

    #[test]
    fn test_interval_larger_than_day_rolls_to_midnight() {
        let now = Local::now();
        let next = next_aligned(now, Duration::from_secs(7 * 86_400));
        assert_eq!(next, next_midnight(now));
    }
}
