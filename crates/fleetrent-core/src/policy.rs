//! # Cancellation Policy
//!
//! A rental can be cancelled only while its start (midnight of the start
//! date, local business time) is at least [`CANCELLATION_WINDOW_HOURS`] away.
//!
//! ```text
//!   now ─────────────── ≥ 4h ───────────────► start_date 00:00   ✅ cancel
//!   now ──── < 4h ────► start_date 00:00                          ❌ expired
//!   start_date 00:00 ◄──── now (already started)                  ❌ expired
//! ```
//!
//! `now` is passed in by the caller. Nothing here reads a clock.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

pub use crate::CANCELLATION_WINDOW_HOURS;

/// Start of the rental as a timestamp (the start date at 00:00).
pub fn rental_starts_at(start_date: NaiveDate) -> NaiveDateTime {
    start_date.and_time(NaiveTime::MIN)
}

/// Signed time remaining until the rental starts. Negative once started.
pub fn time_until_start(start_date: NaiveDate, now: NaiveDateTime) -> Duration {
    rental_starts_at(start_date) - now
}

/// Whether the cancellation window is still open. Exactly four hours of
/// lead time is still allowed.
pub fn can_cancel(start_date: NaiveDate, now: NaiveDateTime) -> bool {
    time_until_start(start_date, now) >= Duration::hours(CANCELLATION_WINDOW_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_five_hours_before_is_allowed() {
        let now = rental_starts_at(start()) - Duration::hours(5);
        assert!(can_cancel(start(), now));
    }

    #[test]
    fn test_three_hours_before_is_expired() {
        let now = rental_starts_at(start()) - Duration::hours(3);
        assert!(!can_cancel(start(), now));
    }

    #[test]
    fn test_boundary_exactly_four_hours() {
        let now = rental_starts_at(start()) - Duration::hours(4);
        assert!(can_cancel(start(), now));

        let now = now + Duration::seconds(1);
        assert!(!can_cancel(start(), now));
    }

    #[test]
    fn test_after_start_is_expired() {
        let now = rental_starts_at(start()) + Duration::hours(10);
        assert!(!can_cancel(start(), now));
        assert!(time_until_start(start(), now) < Duration::zero());
    }

    #[test]
    fn test_evening_before_start() {
        // 21:00 the day before is 3h ahead of midnight
        let now = NaiveDate::from_ymd_opt(2025, 6, 14)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap();
        assert_eq!(time_until_start(start(), now), Duration::hours(3));
        assert!(!can_cancel(start(), now));
    }
}
