use crate::core::{AppError, CurrencyCode, Result};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub expenses: ExpenseSettings,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// Monetary settings consumed by the conversion core.
///
/// These are passed explicitly into the rate table and amount resolver; the
/// core never reads process-wide state.
#[derive(Debug, Clone)]
pub struct ExpenseSettings {
    /// The fixed base currency every stored rate is quoted against
    pub base_currency: CurrencyCode,
    /// Allow-list for rate rows and monetary inputs; always contains the base
    pub supported_currencies: Vec<CurrencyCode>,
}

impl ExpenseSettings {
    pub fn is_supported(&self, currency: &CurrencyCode) -> bool {
        self.supported_currencies.contains(currency)
    }
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub rate_limit_per_minute: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let base_currency = CurrencyCode::new(
            &env::var("BASE_CURRENCY").unwrap_or_else(|_| "USD".to_string()),
        )
        .map_err(|e| AppError::Configuration(format!("Invalid BASE_CURRENCY: {}", e)))?;

        let supported_currencies = env::var("SUPPORTED_CURRENCIES")
            .unwrap_or_else(|_| "USD,EUR,GBP,INR".to_string())
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(CurrencyCode::new)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| AppError::Configuration(format!("Invalid SUPPORTED_CURRENCIES: {}", e)))?;

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            expenses: ExpenseSettings {
                base_currency,
                supported_currencies,
            },
            security: SecurityConfig {
                rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid RATE_LIMIT_PER_MINUTE".to_string())
                    })?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.expenses.supported_currencies.is_empty() {
            return Err(AppError::Configuration(
                "SUPPORTED_CURRENCIES must list at least one currency".to_string(),
            ));
        }

        if !self
            .expenses
            .supported_currencies
            .contains(&self.expenses.base_currency)
        {
            return Err(AppError::Configuration(format!(
                "Base currency {} must be in SUPPORTED_CURRENCIES",
                self.expenses.base_currency
            )));
        }

        if self.security.rate_limit_per_minute == 0 {
            return Err(AppError::Configuration(
                "Rate limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
