use crate::core::{AppError, CurrencyCode, RateTable, Result};
use crate::modules::currencies::models::{CurrencyRate, SymbolPosition};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlPool;

#[derive(sqlx::FromRow)]
struct CurrencyRateRow {
    id: String,
    organization_id: String,
    to_currency: String,
    rate: Decimal,
    symbol: String,
    symbol_position: String,
    separator: String,
    decimal_separator: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CurrencyRateRow> for CurrencyRate {
    type Error = AppError;

    fn try_from(row: CurrencyRateRow) -> Result<Self> {
        Ok(CurrencyRate {
            id: row.id,
            organization_id: row.organization_id,
            to_currency: CurrencyCode::new(&row.to_currency)?,
            rate: row.rate,
            symbol: row.symbol,
            symbol_position: SymbolPosition::try_from(row.symbol_position)?,
            separator: row.separator,
            decimal_separator: row.decimal_separator,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for per-organization currency rates.
pub struct CurrencyRateRepository {
    pool: MySqlPool,
}

impl CurrencyRateRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Inserts or updates the organization's rate for a currency. The
    /// `(organization_id, to_currency)` unique key makes this an upsert; the
    /// stored row is returned so callers see the surviving id.
    pub async fn upsert(&self, rate: &CurrencyRate) -> Result<CurrencyRate> {
        sqlx::query(
            r#"
            INSERT INTO currency_rates
                (id, organization_id, to_currency, rate, symbol, symbol_position,
                 separator, decimal_separator, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, NOW())
            ON DUPLICATE KEY UPDATE
                rate = VALUES(rate),
                symbol = VALUES(symbol),
                symbol_position = VALUES(symbol_position),
                separator = VALUES(separator),
                decimal_separator = VALUES(decimal_separator),
                updated_at = NOW()
            "#,
        )
        .bind(&rate.id)
        .bind(&rate.organization_id)
        .bind(rate.to_currency.as_str())
        .bind(rate.rate)
        .bind(&rate.symbol)
        .bind(rate.symbol_position.as_str())
        .bind(&rate.separator)
        .bind(&rate.decimal_separator)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.find(&rate.organization_id, &rate.to_currency)
            .await?
            .ok_or_else(|| AppError::internal("Upserted currency rate not found"))
    }

    pub async fn find(
        &self,
        organization_id: &str,
        to_currency: &CurrencyCode,
    ) -> Result<Option<CurrencyRate>> {
        let row = sqlx::query_as::<_, CurrencyRateRow>(
            r#"
            SELECT id, organization_id, to_currency, rate, symbol, symbol_position,
                   separator, decimal_separator, updated_at
            FROM currency_rates
            WHERE organization_id = ? AND to_currency = ?
            "#,
        )
        .bind(organization_id)
        .bind(to_currency.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(CurrencyRate::try_from).transpose()
    }

    pub async fn list(&self, organization_id: &str) -> Result<Vec<CurrencyRate>> {
        let rows = sqlx::query_as::<_, CurrencyRateRow>(
            r#"
            SELECT id, organization_id, to_currency, rate, symbol, symbol_position,
                   separator, decimal_separator, updated_at
            FROM currency_rates
            WHERE organization_id = ?
            ORDER BY to_currency
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(CurrencyRate::try_from).collect()
    }

    /// Deletes the stored rate. Returns false when no row matched.
    pub async fn delete(&self, organization_id: &str, to_currency: &CurrencyCode) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM currency_rates WHERE organization_id = ? AND to_currency = ?",
        )
        .bind(organization_id)
        .bind(to_currency.as_str())
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts records still denominated in the currency: accounts, expenses,
    /// subscriptions and loans. A deletable rate has zero references.
    pub async fn count_references(
        &self,
        organization_id: &str,
        currency: &CurrencyCode,
    ) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM expense_accounts
                 WHERE organization_id = ? AND currency = ?)
              + (SELECT COUNT(*) FROM expenses e
                 JOIN expense_accounts a ON a.id = e.account_id
                 WHERE a.organization_id = ? AND e.currency = ?)
              + (SELECT COUNT(*) FROM subscriptions s
                 JOIN expense_accounts a ON a.id = s.account_id
                 WHERE a.organization_id = ? AND s.currency = ?)
              + (SELECT COUNT(*) FROM loans
                 WHERE organization_id = ? AND currency = ?)
            "#,
        )
        .bind(organization_id)
        .bind(currency.as_str())
        .bind(organization_id)
        .bind(currency.as_str())
        .bind(organization_id)
        .bind(currency.as_str())
        .bind(organization_id)
        .bind(currency.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(total)
    }

    /// Loads the organization's rates into a table for conversion. The base
    /// currency is implicit and never stored as a row.
    pub async fn load_rate_table(
        &self,
        organization_id: &str,
        base: &CurrencyCode,
    ) -> Result<RateTable> {
        let rates = self.list(organization_id).await?;

        let mut table = RateTable::new(base.clone());
        for entry in rates {
            table.insert(entry.to_currency, entry.rate)?;
        }
        Ok(table)
    }
}
