use crate::core::money::RateType;
use crate::core::{AppError, CurrencyCode, Result};
use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How often a subscription renews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalFrequency {
    Weekly,
    Monthly,
    Yearly,
}

impl RenewalFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenewalFrequency::Weekly => "weekly",
            RenewalFrequency::Monthly => "monthly",
            RenewalFrequency::Yearly => "yearly",
        }
    }

    /// The renewal date one period after `date`. Month arithmetic clamps to
    /// the last day of shorter months (Jan 31 + 1 month = Feb 28).
    pub fn next(&self, date: NaiveDate) -> Result<NaiveDate> {
        let next = match self {
            RenewalFrequency::Weekly => date.checked_add_days(Days::new(7)),
            RenewalFrequency::Monthly => date.checked_add_months(Months::new(1)),
            RenewalFrequency::Yearly => date.checked_add_months(Months::new(12)),
        };

        next.ok_or_else(|| AppError::validation("Renewal date out of representable range"))
    }
}

impl std::fmt::Display for RenewalFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for RenewalFrequency {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "weekly" => Ok(RenewalFrequency::Weekly),
            "monthly" => Ok(RenewalFrequency::Monthly),
            "yearly" => Ok(RenewalFrequency::Yearly),
            other => Err(AppError::validation(format!(
                "Invalid renewal frequency: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Paused,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for SubscriptionStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "paused" => Ok(SubscriptionStatus::Paused),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            other => Err(AppError::validation(format!(
                "Invalid subscription status: {}",
                other
            ))),
        }
    }
}

/// A recurring commitment under an account. `renewal_date` always points at
/// the next (strictly future at write time) billing day; billed periods
/// become linked auto-generated expenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub rate_type: RateType,
    pub conversion_rate: Option<Decimal>,
    pub base_amount: Option<Decimal>,
    pub start_date: NaiveDate,
    pub renewal_date: NaiveDate,
    pub renewal_frequency: RenewalFrequency,
    pub reminder_days: i32,
    pub next_reminder_date: NaiveDate,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub account_id: String,
    pub name: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub rate_type: RateType,
    pub conversion_rate: Option<Decimal>,
    pub start_date: NaiveDate,
    pub renewal_frequency: RenewalFrequency,
    #[serde(default = "default_reminder_days")]
    pub reminder_days: i32,
}

fn default_reminder_days() -> i32 {
    3
}

/// Partial update. Status here only toggles active/paused; cancellation has
/// its own route.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub rate_type: Option<RateType>,
    pub conversion_rate: Option<Decimal>,
    pub renewal_date: Option<NaiveDate>,
    pub reminder_days: Option<i32>,
    pub status: Option<SubscriptionStatus>,
}

impl UpdateSubscriptionRequest {
    pub fn touches_money(&self) -> bool {
        self.amount.is_some()
            || self.currency.is_some()
            || self.rate_type.is_some()
            || self.conversion_rate.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_next_weekly() {
        assert_eq!(
            RenewalFrequency::Weekly.next(d(2025, 3, 25)).unwrap(),
            d(2025, 4, 1)
        );
    }

    #[test]
    fn test_next_monthly_clamps_end_of_month() {
        assert_eq!(
            RenewalFrequency::Monthly.next(d(2025, 1, 31)).unwrap(),
            d(2025, 2, 28)
        );
    }

    #[test]
    fn test_next_yearly_handles_leap_day() {
        assert_eq!(
            RenewalFrequency::Yearly.next(d(2024, 2, 29)).unwrap(),
            d(2025, 2, 28)
        );
    }

    #[test]
    fn test_frequency_and_status_round_trip() {
        assert_eq!(
            RenewalFrequency::try_from("monthly".to_string()).unwrap(),
            RenewalFrequency::Monthly
        );
        assert_eq!(RenewalFrequency::Yearly.to_string(), "yearly");
        assert!(RenewalFrequency::try_from("daily".to_string()).is_err());

        assert_eq!(
            SubscriptionStatus::try_from("paused".to_string()).unwrap(),
            SubscriptionStatus::Paused
        );
        assert!(SubscriptionStatus::try_from("expired".to_string()).is_err());
    }

    #[test]
    fn test_default_reminder_days() {
        let request: CreateSubscriptionRequest = serde_json::from_str(
            r#"{
                "account_id": "acc-1",
                "name": "Hosting",
                "amount": "25.00",
                "currency": "USD",
                "start_date": "2025-04-01",
                "renewal_frequency": "monthly"
            }"#,
        )
        .unwrap();
        assert_eq!(request.reminder_days, 3);
    }
}
