use crate::core::money::RateType;
use crate::core::{AppError, CurrencyCode, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What kind of spending an expense records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    OneTime,
    Subscription,
    TeamSalary,
}

impl ExpenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::OneTime => "one_time",
            ExpenseType::Subscription => "subscription",
            ExpenseType::TeamSalary => "team_salary",
        }
    }
}

impl std::fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for ExpenseType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "one_time" => Ok(ExpenseType::OneTime),
            "subscription" => Ok(ExpenseType::Subscription),
            "team_salary" => Ok(ExpenseType::TeamSalary),
            other => Err(AppError::validation(format!(
                "Invalid expense type: {}",
                other
            ))),
        }
    }
}

/// One recorded expense. The monetary triple (`amount`, `conversion_rate`,
/// `base_amount`) is resolved once at write time; `base_amount` is nullable
/// only for rows that predate base-amount storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub account_id: String,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub rate_type: RateType,
    pub conversion_rate: Option<Decimal>,
    pub base_amount: Option<Decimal>,
    pub expense_date: NaiveDate,
    pub expense_type: ExpenseType,
    pub team_member_id: Option<String>,
    pub subscription_id: Option<String>,
    pub salary_month: Option<String>,
    pub auto_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Checks the type-specific link fields: team-salary expenses carry a
    /// member and a salary month, subscription expenses carry a subscription,
    /// one-time expenses carry neither.
    pub fn validate_links(&self) -> Result<()> {
        match self.expense_type {
            ExpenseType::TeamSalary => {
                if self.team_member_id.is_none() {
                    return Err(AppError::validation(
                        "Team salary expenses require team_member_id",
                    ));
                }
                match &self.salary_month {
                    None => {
                        return Err(AppError::validation(
                            "Team salary expenses require salary_month",
                        ))
                    }
                    Some(month) => validate_salary_month(month)?,
                }
                if self.subscription_id.is_some() {
                    return Err(AppError::validation(
                        "Team salary expenses cannot reference a subscription",
                    ));
                }
            }
            ExpenseType::Subscription => {
                if self.subscription_id.is_none() {
                    return Err(AppError::validation(
                        "Subscription expenses require subscription_id",
                    ));
                }
                if self.team_member_id.is_some() || self.salary_month.is_some() {
                    return Err(AppError::validation(
                        "Subscription expenses cannot carry team salary fields",
                    ));
                }
            }
            ExpenseType::OneTime => {
                if self.team_member_id.is_some()
                    || self.salary_month.is_some()
                    || self.subscription_id.is_some()
                {
                    return Err(AppError::validation(
                        "One-time expenses cannot carry team or subscription links",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Salary months are `YYYY-MM`.
pub fn validate_salary_month(value: &str) -> Result<()> {
    let well_formed = value.len() == 7
        && value.as_bytes()[4] == b'-'
        && NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").is_ok();

    if well_formed {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Invalid salary month '{}', expected YYYY-MM",
            value
        )))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpenseRequest {
    pub account_id: String,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub rate_type: RateType,
    pub conversion_rate: Option<Decimal>,
    pub expense_date: NaiveDate,
    pub expense_type: Option<ExpenseType>,
    pub team_member_id: Option<String>,
    pub subscription_id: Option<String>,
    pub salary_month: Option<String>,
}

/// Partial update. Supplying any of the monetary fields re-resolves the
/// whole triple against the current rate table.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateExpenseRequest {
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub rate_type: Option<RateType>,
    pub conversion_rate: Option<Decimal>,
    pub expense_date: Option<NaiveDate>,
}

impl UpdateExpenseRequest {
    pub fn touches_money(&self) -> bool {
        self.amount.is_some()
            || self.currency.is_some()
            || self.rate_type.is_some()
            || self.conversion_rate.is_some()
    }
}
