use crate::config::ExpenseSettings;
use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::currencies::models::{CurrencyRate, SymbolPosition, UpsertCurrencyRateRequest};
use crate::modules::currencies::repositories::CurrencyRateRepository;
use tracing::info;

/// Business rules for the per-organization rate store.
pub struct CurrencyRateService {
    repository: CurrencyRateRepository,
    settings: ExpenseSettings,
}

impl CurrencyRateService {
    pub fn new(repository: CurrencyRateRepository, settings: ExpenseSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn base_currency(&self) -> &CurrencyCode {
        &self.settings.base_currency
    }

    pub async fn list(&self, organization_id: &str) -> Result<Vec<CurrencyRate>> {
        self.repository.list(organization_id).await
    }

    /// Stores or replaces the organization's rate for one currency.
    ///
    /// The currency must be on the supported list and must not be the base;
    /// the base always converts at 1 and never has a stored row.
    pub async fn upsert(
        &self,
        organization_id: &str,
        request: UpsertCurrencyRateRequest,
    ) -> Result<CurrencyRate> {
        let to_currency = CurrencyCode::new(&request.to_currency)?;

        if to_currency == self.settings.base_currency {
            return Err(AppError::validation(format!(
                "Cannot store a rate for the base currency {}",
                to_currency
            )));
        }
        if !self.settings.is_supported(&to_currency) {
            return Err(AppError::validation(format!(
                "Currency {} is not in the supported list",
                to_currency
            )));
        }

        let symbol = request
            .symbol
            .unwrap_or_else(|| format!("{} ", to_currency));
        let symbol_position = request.symbol_position.unwrap_or(SymbolPosition::Before);
        let separator = request.separator.unwrap_or_else(|| ",".to_string());
        let decimal_separator = request.decimal_separator.unwrap_or_else(|| ".".to_string());

        let rate = CurrencyRate::new(
            organization_id.to_string(),
            to_currency,
            request.rate,
            symbol,
            symbol_position,
            separator,
            decimal_separator,
        )?;

        let stored = self.repository.upsert(&rate).await?;
        info!(
            organization_id = %organization_id,
            currency = %stored.to_currency,
            rate = %stored.rate,
            "currency rate stored"
        );
        Ok(stored)
    }

    /// Removes a stored rate unless anything in the organization still uses
    /// the currency.
    pub async fn delete(&self, organization_id: &str, currency: &str) -> Result<()> {
        let code = CurrencyCode::new(currency)?;

        if code == self.settings.base_currency {
            return Err(AppError::validation(
                "The base currency has no stored rate to delete",
            ));
        }

        let references = self
            .repository
            .count_references(organization_id, &code)
            .await?;
        if references > 0 {
            return Err(AppError::CurrencyInUse(format!(
                "Currency {} is still used by {} record(s)",
                code, references
            )));
        }

        let deleted = self.repository.delete(organization_id, &code).await?;
        if !deleted {
            return Err(AppError::not_found(format!(
                "No stored rate for currency {}",
                code
            )));
        }

        info!(organization_id = %organization_id, currency = %code, "currency rate deleted");
        Ok(())
    }
}
