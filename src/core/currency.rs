use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::core::error::{AppError, Result};

/// ISO-4217 style currency code (three uppercase ASCII letters).
///
/// The set of currencies an organization may use is configuration, not a
/// closed enum: rates are stored per organization and the allow-list comes
/// from `SUPPORTED_CURRENCIES`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and validates a currency code, normalizing to uppercase.
    pub fn new(code: &str) -> Result<Self> {
        let normalized = code.trim().to_uppercase();
        if normalized.len() != 3 || !normalized.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(AppError::validation(format!(
                "Invalid currency code: '{}' (expected three letters)",
                code
            )));
        }
        Ok(CurrencyCode(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        CurrencyCode::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = AppError;

    fn try_from(s: String) -> Result<Self> {
        CurrencyCode::new(&s)
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = AppError;

    fn try_from(s: &str) -> Result<Self> {
        CurrencyCode::new(s)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An organization's conversion rates, all quoted against a single base
/// currency: `1 base = rate × currency`.
///
/// The base currency itself never appears as a key; its rate is implicitly 1.
/// Conversion between two non-base currencies always routes through the base
/// (two legs), so one stored rate per currency is sufficient.
#[derive(Debug, Clone)]
pub struct RateTable {
    base: CurrencyCode,
    rates: HashMap<CurrencyCode, Decimal>,
}

impl RateTable {
    /// Creates an empty table for the given base currency.
    pub fn new(base: CurrencyCode) -> Self {
        Self {
            base,
            rates: HashMap::new(),
        }
    }

    /// Builds a table from `(currency, rate)` pairs, validating each rate.
    pub fn with_rates<I>(base: CurrencyCode, rates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (CurrencyCode, Decimal)>,
    {
        let mut table = Self::new(base);
        for (currency, rate) in rates {
            table.insert(currency, rate)?;
        }
        Ok(table)
    }

    /// Adds or replaces the rate for a currency.
    ///
    /// Rates must be strictly positive; the base currency cannot be given an
    /// explicit rate.
    pub fn insert(&mut self, currency: CurrencyCode, rate: Decimal) -> Result<()> {
        if currency == self.base {
            return Err(AppError::validation(format!(
                "The base currency {} has an implicit rate of 1 and cannot be overridden",
                self.base
            )));
        }
        if rate <= Decimal::ZERO {
            return Err(AppError::invalid_rate(format!(
                "Rate for {} must be positive, got {}",
                currency, rate
            )));
        }
        self.rates.insert(currency, rate);
        Ok(())
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// True when the currency is the base or has a stored rate.
    pub fn supports(&self, currency: &CurrencyCode) -> bool {
        *currency == self.base || self.rates.contains_key(currency)
    }

    /// Stored rate for a non-base currency, if any.
    pub fn rate_for(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    /// Looks up the rate for a non-base currency, failing on missing or
    /// non-positive entries. A zero rate must never silently convert as 1.
    fn lookup(&self, currency: &CurrencyCode) -> Result<Decimal> {
        let rate = self
            .rates
            .get(currency)
            .copied()
            .ok_or_else(|| {
                AppError::rate_not_found(format!(
                    "No conversion rate stored for {} (base {})",
                    currency, self.base
                ))
            })?;
        if rate <= Decimal::ZERO {
            return Err(AppError::invalid_rate(format!(
                "Stored rate for {} is {}, refusing to convert",
                currency, rate
            )));
        }
        Ok(rate)
    }

    /// Converts an amount into the base currency.
    pub fn to_base(&self, amount: Decimal, from: &CurrencyCode) -> Result<Decimal> {
        if *from == self.base {
            return Ok(amount);
        }
        Ok(amount / self.lookup(from)?)
    }

    /// Converts a base-currency amount into another currency.
    pub fn from_base(&self, amount: Decimal, to: &CurrencyCode) -> Result<Decimal> {
        if *to == self.base {
            return Ok(amount);
        }
        Ok(amount * self.lookup(to)?)
    }

    /// Converts between any two supported currencies via the base.
    ///
    /// `from == to` returns the amount unchanged without any rate lookup.
    pub fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Decimal> {
        if from == to {
            return Ok(amount);
        }
        let in_base = self.to_base(amount, from)?;
        self.from_base(in_base, to)
    }
}
