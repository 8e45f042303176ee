use crate::config::ExpenseSettings;
use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::accounts::models::{CreateAccountRequest, ExpenseAccount, UpdateAccountRequest};
use crate::modules::accounts::repositories::AccountRepository;
use crate::modules::currencies::repositories::CurrencyRateRepository;
use tracing::info;

pub struct AccountService {
    repository: AccountRepository,
    rates: CurrencyRateRepository,
    settings: ExpenseSettings,
}

impl AccountService {
    pub fn new(
        repository: AccountRepository,
        rates: CurrencyRateRepository,
        settings: ExpenseSettings,
    ) -> Self {
        Self {
            repository,
            rates,
            settings,
        }
    }

    /// Creates an account. The currency must be the base or have a stored
    /// rate, so everything recorded against the account stays convertible.
    pub async fn create(
        &self,
        organization_id: &str,
        request: CreateAccountRequest,
    ) -> Result<ExpenseAccount> {
        let currency = CurrencyCode::new(&request.currency)?;
        self.ensure_convertible(organization_id, &currency).await?;

        let account = ExpenseAccount::new(
            organization_id.to_string(),
            request.name,
            currency,
            request.account_type,
        )?;

        let created = self.repository.create(&account).await?;
        info!(
            organization_id = %organization_id,
            account_id = %created.id,
            currency = %created.currency,
            "expense account created"
        );
        Ok(created)
    }

    pub async fn get(&self, organization_id: &str, account_id: &str) -> Result<ExpenseAccount> {
        self.repository.require(organization_id, account_id).await
    }

    pub async fn list(&self, organization_id: &str) -> Result<Vec<ExpenseAccount>> {
        self.repository.list(organization_id).await
    }

    pub async fn update(
        &self,
        organization_id: &str,
        account_id: &str,
        request: UpdateAccountRequest,
    ) -> Result<ExpenseAccount> {
        let mut account = self.repository.require(organization_id, account_id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::validation("Account name cannot be empty"));
            }
            account.name = name;
        }
        if let Some(account_type) = request.account_type {
            account.account_type = account_type;
        }

        self.repository.update(&account).await
    }

    pub async fn delete(&self, organization_id: &str, account_id: &str) -> Result<()> {
        let deleted = self.repository.delete(organization_id, account_id).await?;
        if !deleted {
            return Err(AppError::not_found(format!(
                "Account {} not found",
                account_id
            )));
        }

        info!(organization_id = %organization_id, account_id = %account_id, "expense account deleted");
        Ok(())
    }

    async fn ensure_convertible(
        &self,
        organization_id: &str,
        currency: &CurrencyCode,
    ) -> Result<()> {
        if !self.settings.is_supported(currency) {
            return Err(AppError::validation(format!(
                "Currency {} is not in the supported list",
                currency
            )));
        }
        if *currency == self.settings.base_currency {
            return Ok(());
        }

        match self.rates.find(organization_id, currency).await? {
            Some(_) => Ok(()),
            None => Err(AppError::rate_not_found(format!(
                "No stored rate for currency {}; add one before using it",
                currency
            ))),
        }
    }
}
