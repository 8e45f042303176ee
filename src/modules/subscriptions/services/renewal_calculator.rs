use chrono::{Days, NaiveDate};

use crate::core::{AppError, Result};
use crate::modules::subscriptions::models::RenewalFrequency;

/// Pure renewal-date arithmetic. The async service orchestrates persistence
/// around these rules; nothing here touches the database.
pub struct RenewalCalculator;

impl RenewalCalculator {
    /// Advances a renewal date one period at a time until it is strictly
    /// after `today`. A date already in the future comes back unchanged.
    ///
    /// Each step re-anchors on the previous, possibly clamped, date:
    /// Jan 31 → Feb 28 → Mar 28.
    pub fn advance_into_future(
        from: NaiveDate,
        frequency: RenewalFrequency,
        today: NaiveDate,
    ) -> Result<NaiveDate> {
        let mut date = from;
        while date <= today {
            date = frequency.next(date)?;
        }
        Ok(date)
    }

    /// Decides the initial schedule for a new subscription.
    ///
    /// Starts in the past or today: the first period is already due, so the
    /// renewal advances into the future and one expense is owed for the
    /// start date. Starts in the future: the start date is the first
    /// renewal and nothing has been billed yet.
    pub fn initial_schedule(
        start_date: NaiveDate,
        frequency: RenewalFrequency,
        today: NaiveDate,
    ) -> Result<(NaiveDate, bool)> {
        if start_date > today {
            Ok((start_date, false))
        } else {
            let renewal = Self::advance_into_future(start_date, frequency, today)?;
            Ok((renewal, true))
        }
    }

    /// Rejects a client-supplied renewal date already in the past. Today is
    /// allowed: the cycle is due, not missed.
    pub fn ensure_not_past(renewal_date: NaiveDate, today: NaiveDate) -> Result<()> {
        if renewal_date < today {
            return Err(AppError::PastRenewalDate(format!(
                "Renewal date {} is in the past",
                renewal_date
            )));
        }
        Ok(())
    }

    /// The date the reminder fires: `renewal_date - reminder_days`. Clamped
    /// at the renewal date itself for out-of-range inputs.
    pub fn reminder_date(renewal_date: NaiveDate, reminder_days: i32) -> NaiveDate {
        let days = u64::try_from(reminder_days).unwrap_or(0);
        renewal_date
            .checked_sub_days(Days::new(days))
            .unwrap_or(renewal_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_future_date_is_unchanged() {
        let renewal = RenewalCalculator::advance_into_future(
            d(2025, 6, 1),
            RenewalFrequency::Monthly,
            d(2025, 5, 20),
        )
        .unwrap();
        assert_eq!(renewal, d(2025, 6, 1));
    }

    #[test]
    fn test_start_forty_days_ago_monthly_advances_twice() {
        let today = d(2025, 5, 20);
        let start = d(2025, 4, 10);
        let renewal =
            RenewalCalculator::advance_into_future(start, RenewalFrequency::Monthly, today)
                .unwrap();
        assert_eq!(renewal, d(2025, 6, 10));
    }

    #[test]
    fn test_today_advances_one_period() {
        let today = d(2025, 5, 20);
        let renewal =
            RenewalCalculator::advance_into_future(today, RenewalFrequency::Weekly, today).unwrap();
        assert_eq!(renewal, d(2025, 5, 27));
    }

    #[test]
    fn test_long_neglect_weekly() {
        let today = d(2025, 5, 20);
        let start = d(2025, 1, 1);
        let renewal =
            RenewalCalculator::advance_into_future(start, RenewalFrequency::Weekly, today).unwrap();
        assert!(renewal > today);
        assert!(renewal - start == chrono::Duration::days(140));
    }

    #[test]
    fn test_initial_schedule_past_start_owes_expense() {
        let (renewal, owes) = RenewalCalculator::initial_schedule(
            d(2025, 4, 10),
            RenewalFrequency::Monthly,
            d(2025, 5, 20),
        )
        .unwrap();
        assert_eq!(renewal, d(2025, 6, 10));
        assert!(owes);
    }

    #[test]
    fn test_initial_schedule_future_start_owes_nothing() {
        let (renewal, owes) = RenewalCalculator::initial_schedule(
            d(2025, 7, 1),
            RenewalFrequency::Monthly,
            d(2025, 5, 20),
        )
        .unwrap();
        assert_eq!(renewal, d(2025, 7, 1));
        assert!(!owes);
    }

    #[test]
    fn test_reminder_date_subtraction() {
        assert_eq!(
            RenewalCalculator::reminder_date(d(2025, 6, 10), 3),
            d(2025, 6, 7)
        );
        assert_eq!(
            RenewalCalculator::reminder_date(d(2025, 6, 10), 0),
            d(2025, 6, 10)
        );
    }

    #[test]
    fn test_reminder_date_negative_days_clamps() {
        assert_eq!(
            RenewalCalculator::reminder_date(d(2025, 6, 10), -5),
            d(2025, 6, 10)
        );
    }
}
