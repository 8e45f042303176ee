use crate::core::{AppError, CurrencyCode, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placement of the currency symbol in formatted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    Before,
    After,
}

impl SymbolPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolPosition::Before => "before",
            SymbolPosition::After => "after",
        }
    }
}

impl std::fmt::Display for SymbolPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for SymbolPosition {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "before" => Ok(SymbolPosition::Before),
            "after" => Ok(SymbolPosition::After),
            other => Err(AppError::validation(format!(
                "Invalid symbol position: {}",
                other
            ))),
        }
    }
}

/// An organization's exchange rate for one currency, quoted against the
/// base: 1 base unit = `rate` units of `to_currency`. Display metadata rides
/// along so amounts can be rendered per-currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub id: String,
    pub organization_id: String,
    pub to_currency: CurrencyCode,
    pub rate: Decimal,
    pub symbol: String,
    pub symbol_position: SymbolPosition,
    pub separator: String,
    pub decimal_separator: String,
    pub updated_at: DateTime<Utc>,
}

impl CurrencyRate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        organization_id: String,
        to_currency: CurrencyCode,
        rate: Decimal,
        symbol: String,
        symbol_position: SymbolPosition,
        separator: String,
        decimal_separator: String,
    ) -> Result<Self> {
        if rate <= Decimal::ZERO {
            return Err(AppError::invalid_rate(format!(
                "Exchange rate for {} must be positive, got {}",
                to_currency, rate
            )));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            organization_id,
            to_currency,
            rate,
            symbol,
            symbol_position,
            separator,
            decimal_separator,
            updated_at: Utc::now(),
        })
    }

    /// Renders an amount with this currency's display metadata, rounded to
    /// two decimal places.
    pub fn format_amount(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp(2);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());

        let (int_part, frac_part) = match text.split_once('.') {
            Some(parts) => parts,
            None => (text.as_str(), "00"),
        };

        let grouped = group_thousands(int_part, &self.separator);
        let body = format!("{}{}{}", grouped, self.decimal_separator, frac_part);

        let formatted = match self.symbol_position {
            SymbolPosition::Before => format!("{}{}", self.symbol, body),
            SymbolPosition::After => format!("{}{}", body, self.symbol),
        };

        if negative {
            format!("-{}", formatted)
        } else {
            formatted
        }
    }
}

fn group_thousands(digits: &str, separator: &str) -> String {
    let mut groups: Vec<&str> = Vec::new();
    let mut end = digits.len();
    while end > 3 {
        groups.push(&digits[end - 3..end]);
        end -= 3;
    }
    groups.push(&digits[..end]);
    groups.reverse();
    groups.join(separator)
}

/// Payload for `PUT /currency-rates`. Display metadata is optional and
/// defaulted by the service when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertCurrencyRateRequest {
    pub to_currency: String,
    pub rate: Decimal,
    pub symbol: Option<String>,
    pub symbol_position: Option<SymbolPosition>,
    pub separator: Option<String>,
    pub decimal_separator: Option<String>,
}
