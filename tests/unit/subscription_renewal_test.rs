// Renewal scheduling: the next renewal date advances one period at a time
// until it is strictly in the future, month arithmetic clamps at short
// month ends, and each step re-anchors on the previous (possibly clamped)
// date rather than the original day of month.

use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;

use spendbase::core::AppError;
use spendbase::modules::subscriptions::models::RenewalFrequency;
use spendbase::modules::subscriptions::services::RenewalCalculator;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Jan 31 clamps to Feb 28 and the March step re-anchors on the 28th,
/// not back on the 31st.
#[test]
fn test_month_end_clamps_and_reanchors() {
    let renewal = RenewalCalculator::advance_into_future(
        d(2025, 1, 31),
        RenewalFrequency::Monthly,
        d(2025, 3, 15),
    )
    .unwrap();
    assert_eq!(renewal, d(2025, 3, 28));
}

/// A yearly renewal anchored on leap day lands on Feb 28 the next year.
#[test]
fn test_leap_day_anniversary_clamps() {
    let next = RenewalFrequency::Yearly.next(d(2024, 2, 29)).unwrap();
    assert_eq!(next, d(2025, 2, 28));
}

/// A subscription started 40 days ago on a monthly cycle has missed one
/// renewal; the date advances two periods to clear today.
#[test]
fn test_monthly_catch_up_after_forty_days() {
    let renewal = RenewalCalculator::advance_into_future(
        d(2025, 4, 10),
        RenewalFrequency::Monthly,
        d(2025, 5, 20),
    )
    .unwrap();
    assert_eq!(renewal, d(2025, 6, 10));
}

/// A renewal date equal to today is due now, so it advances one period;
/// one already in the future is left alone.
#[test]
fn test_renewal_date_is_always_strictly_future() {
    let today = d(2025, 5, 20);

    let due_today =
        RenewalCalculator::advance_into_future(today, RenewalFrequency::Weekly, today).unwrap();
    assert_eq!(due_today, d(2025, 5, 27));

    let future = RenewalCalculator::advance_into_future(
        d(2025, 8, 1),
        RenewalFrequency::Weekly,
        today,
    )
    .unwrap();
    assert_eq!(future, d(2025, 8, 1));
}

/// New subscriptions: a past or today start owes its first expense and
/// schedules the renewal beyond today; a future start owes nothing and
/// renews on the start date itself.
#[test]
fn test_initial_schedule() {
    let today = d(2025, 5, 20);

    let (renewal, owes) =
        RenewalCalculator::initial_schedule(d(2025, 4, 10), RenewalFrequency::Monthly, today)
            .unwrap();
    assert_eq!(renewal, d(2025, 6, 10));
    assert!(owes);

    let (renewal, owes) =
        RenewalCalculator::initial_schedule(today, RenewalFrequency::Monthly, today).unwrap();
    assert_eq!(renewal, d(2025, 6, 20));
    assert!(owes);

    let (renewal, owes) =
        RenewalCalculator::initial_schedule(d(2025, 7, 1), RenewalFrequency::Monthly, today)
            .unwrap();
    assert_eq!(renewal, d(2025, 7, 1));
    assert!(!owes);
}

/// The reminder fires `reminder_days` before the renewal; zero means the
/// renewal day itself and out-of-range inputs clamp there too.
#[test]
fn test_reminder_date_clamps() {
    assert_eq!(
        RenewalCalculator::reminder_date(d(2025, 6, 10), 3),
        d(2025, 6, 7)
    );
    assert_eq!(
        RenewalCalculator::reminder_date(d(2025, 6, 10), 0),
        d(2025, 6, 10)
    );
    assert_eq!(
        RenewalCalculator::reminder_date(d(2025, 6, 10), -14),
        d(2025, 6, 10)
    );
}

/// A client-supplied renewal date earlier than today is rejected; today
/// itself and future dates pass.
#[test]
fn test_past_renewal_date_rejected() {
    let today = d(2025, 5, 20);

    let err = RenewalCalculator::ensure_not_past(d(2025, 5, 19), today).unwrap_err();
    assert!(matches!(err, AppError::PastRenewalDate(_)));

    assert!(RenewalCalculator::ensure_not_past(today, today).is_ok());
    assert!(RenewalCalculator::ensure_not_past(d(2025, 6, 1), today).is_ok());
}

/// Date arithmetic at the edge of the representable range fails instead of
/// wrapping.
#[test]
fn test_next_beyond_calendar_range_fails() {
    let err = RenewalFrequency::Weekly.next(NaiveDate::MAX).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

proptest! {
    /// However stale the start date, the advanced weekly renewal is
    /// strictly after today and a whole number of weeks from the start.
    #[test]
    fn prop_weekly_advancement_lands_on_cycle(days_stale in 0i64..1500i64) {
        let today = d(2025, 5, 20);
        let start = today - Duration::days(days_stale);

        let renewal =
            RenewalCalculator::advance_into_future(start, RenewalFrequency::Weekly, today)
                .unwrap();

        prop_assert!(renewal > today);
        prop_assert!(renewal - start <= Duration::days(days_stale + 7));
        prop_assert_eq!((renewal - start).num_days() % 7, 0);
    }

    /// Monthly renewals anchored on days 1-28 never clamp, so the day of
    /// month survives any amount of catching up.
    #[test]
    fn prop_monthly_advancement_keeps_anchor_day(
        month in 1u32..=12u32,
        day in 1u32..=28u32,
    ) {
        let today = d(2025, 12, 31);
        let start = d(2025, month, day);

        let renewal =
            RenewalCalculator::advance_into_future(start, RenewalFrequency::Monthly, today)
                .unwrap();

        prop_assert!(renewal > today);
        prop_assert_eq!(renewal.day(), day);
    }
}
