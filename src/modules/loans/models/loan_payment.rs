use crate::core::{AppError, CurrencyCode, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a payment is applied against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Principal,
    Interest,
    Both,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Principal => "principal",
            PaymentType::Interest => "interest",
            PaymentType::Both => "both",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for PaymentType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "principal" => Ok(PaymentType::Principal),
            "interest" => Ok(PaymentType::Interest),
            "both" => Ok(PaymentType::Both),
            other => Err(AppError::validation(format!(
                "Invalid payment type: {}",
                other
            ))),
        }
    }
}

/// One ledger entry against a loan. Append-only: rows are never edited, only
/// removed wholesale when their loan is hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPayment {
    pub id: String,
    pub loan_id: String,
    /// Amount as paid, in `currency`
    pub amount: Decimal,
    pub currency: CurrencyCode,
    /// Effective ledger-units-per-payment-unit rate; None when the payment
    /// was already in the ledger currency
    pub conversion_rate: Option<Decimal>,
    /// Amount in the loan's ledger currency, as applied to the balance
    pub applied_amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_type: PaymentType,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLoanPaymentRequest {
    pub amount: Decimal,
    /// Defaults to the loan's ledger currency
    pub currency: Option<String>,
    pub payment_date: NaiveDate,
    #[serde(default = "default_payment_type")]
    pub payment_type: PaymentType,
    pub notes: Option<String>,
}

fn default_payment_type() -> PaymentType {
    PaymentType::Both
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_type_round_trip() {
        assert_eq!(
            PaymentType::try_from("interest".to_string()).unwrap(),
            PaymentType::Interest
        );
        assert_eq!(PaymentType::Both.to_string(), "both");
        assert!(PaymentType::try_from("fees".to_string()).is_err());
    }

    #[test]
    fn test_request_defaults_to_both() {
        let request: CreateLoanPaymentRequest = serde_json::from_str(
            r#"{"amount": "50.00", "payment_date": "2025-05-01"}"#,
        )
        .unwrap();
        assert_eq!(request.payment_type, PaymentType::Both);
        assert!(request.currency.is_none());
    }
}
