use crate::core::money::RateType;
use crate::core::{AppError, CurrencyCode, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of a loan.
///
/// Paid and Cancelled are terminal; Defaulted still accepts payments and
/// moves back to Partial when one lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Partial,
    Paid,
    Cancelled,
    Defaulted,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Partial => "partial",
            LoanStatus::Paid => "paid",
            LoanStatus::Cancelled => "cancelled",
            LoanStatus::Defaulted => "defaulted",
        }
    }

    /// Terminal states that reject further payments.
    pub fn is_closed(&self) -> bool {
        matches!(self, LoanStatus::Paid | LoanStatus::Cancelled)
    }

    /// States counted into a member's denormalized loan total.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, LoanStatus::Active | LoanStatus::Partial)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for LoanStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "active" => Ok(LoanStatus::Active),
            "partial" => Ok(LoanStatus::Partial),
            "paid" => Ok(LoanStatus::Paid),
            "cancelled" => Ok(LoanStatus::Cancelled),
            "defaulted" => Ok(LoanStatus::Defaulted),
            other => Err(AppError::validation(format!("Invalid loan status: {}", other))),
        }
    }
}

/// A loan issued from an account or directly to a team member.
///
/// `original_amount` stays in the entry currency; `principal_amount`,
/// `current_balance` and `accrued_interest` live in `ledger_currency`,
/// converted once at creation and never re-converted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub organization_id: String,
    pub account_id: Option<String>,
    pub team_member_id: Option<String>,
    pub original_amount: Decimal,
    pub currency: CurrencyCode,
    pub rate_type: RateType,
    pub conversion_rate: Option<Decimal>,
    pub base_amount: Option<Decimal>,
    pub ledger_currency: CurrencyCode,
    pub principal_amount: Decimal,
    pub current_balance: Decimal,
    pub accrued_interest: Decimal,
    pub status: LoanStatus,
    pub issued_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// What is still owed expressed in the original entry currency, as a
    /// ratio projection of the ledger balance. Not a live conversion: the
    /// entry stays anchored to its recorded rate.
    pub fn remaining_original(&self) -> Decimal {
        if self.principal_amount.is_zero() {
            return Decimal::ZERO;
        }
        self.original_amount * self.current_balance / self.principal_amount
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLoanRequest {
    pub account_id: Option<String>,
    pub team_member_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub rate_type: RateType,
    pub conversion_rate: Option<Decimal>,
    /// Interest owed at entry, in the ledger currency. Defaults to zero.
    pub interest_amount: Option<Decimal>,
    pub issued_date: NaiveDate,
    pub notes: Option<String>,
}

/// Loan plus derived figures the dashboard shows alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct LoanResponse {
    #[serde(flatten)]
    pub loan: Loan,
    pub remaining_original: Decimal,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        let remaining_original = loan.remaining_original();
        Self {
            loan,
            remaining_original,
        }
    }
}
