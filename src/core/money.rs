use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::currency::{CurrencyCode, RateTable};
use crate::core::error::{AppError, Result};

/// How the conversion rate for a monetary input was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    /// The organization's stored rate at write time
    Default,
    /// A one-off rate supplied with the transaction
    Custom,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Custom => "custom",
        }
    }
}

impl Default for RateType {
    fn default() -> Self {
        RateType::Default
    }
}

impl std::fmt::Display for RateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for RateType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "default" => Ok(Self::Default),
            "custom" => Ok(Self::Custom),
            other => Err(AppError::validation(format!("Invalid rate type: {}", other))),
        }
    }
}

/// A monetary input as the user entered it: not yet resolved against any rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

impl MonetaryAmount {
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }
}

/// The triple persisted for every monetary record: the native amount, the
/// rate it was converted with, and the base-currency equivalent.
///
/// Resolution happens exactly once, when the record is written. Displays and
/// reports read these stored values back; they never recompute from live
/// rates, so later rate edits cannot rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAmount {
    /// Native amount, unchanged from the input
    pub amount: Decimal,
    /// Native currency
    pub currency: CurrencyCode,
    /// How the rate was chosen (stored alongside for reproducibility)
    pub rate_type: RateType,
    /// Units of `currency` per one base unit; `None` exactly when the input
    /// was already in the base currency
    pub conversion_rate: Option<Decimal>,
    /// Base-currency equivalent: `amount / conversion_rate`
    pub base_amount: Decimal,
}

impl ResolvedAmount {
    pub fn is_base(&self) -> bool {
        self.conversion_rate.is_none()
    }
}

/// Resolves a monetary input into the persistable triple.
///
/// - Base-currency inputs pass through with no rate.
/// - `RateType::Custom` uses the caller-supplied rate for the native-to-base
///   leg and persists it verbatim; it is never blended with the stored rate.
/// - `RateType::Default` looks up the organization's stored rate and fails
///   with `RateNotFound` when none exists.
pub fn resolve(
    input: &MonetaryAmount,
    rate_type: RateType,
    custom_rate: Option<Decimal>,
    table: &RateTable,
) -> Result<ResolvedAmount> {
    if input.amount < Decimal::ZERO {
        return Err(AppError::validation(format!(
            "Amount cannot be negative, got {}",
            input.amount
        )));
    }

    if input.currency == *table.base() {
        if custom_rate.is_some() {
            return Err(AppError::validation(format!(
                "A custom rate cannot be applied to the base currency {}",
                table.base()
            )));
        }
        return Ok(ResolvedAmount {
            amount: input.amount,
            currency: input.currency.clone(),
            rate_type,
            conversion_rate: None,
            base_amount: input.amount,
        });
    }

    let rate = match rate_type {
        RateType::Custom => {
            let rate = custom_rate.ok_or_else(|| {
                AppError::validation("Rate type is custom but no custom rate was supplied")
            })?;
            if rate <= Decimal::ZERO {
                return Err(AppError::invalid_rate(format!(
                    "Custom rate must be positive, got {}",
                    rate
                )));
            }
            rate
        }
        RateType::Default => {
            if custom_rate.is_some() {
                return Err(AppError::validation(
                    "A custom rate was supplied but the rate type is default",
                ));
            }
            table.rate_for(&input.currency).ok_or_else(|| {
                AppError::rate_not_found(format!(
                    "No stored rate for {} and no custom rate supplied",
                    input.currency
                ))
            })?
        }
    };

    if rate <= Decimal::ZERO {
        return Err(AppError::invalid_rate(format!(
            "Stored rate for {} is {}, refusing to convert",
            input.currency, rate
        )));
    }

    Ok(ResolvedAmount {
        amount: input.amount,
        currency: input.currency.clone(),
        rate_type,
        conversion_rate: Some(rate),
        base_amount: input.amount / rate,
    })
}
