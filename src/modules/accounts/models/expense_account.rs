use crate::core::{AppError, CurrencyCode, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of spending container an account represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Business,
    Personal,
    Project,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Business => "business",
            AccountType::Personal => "personal",
            AccountType::Project => "project",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for AccountType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "business" => Ok(AccountType::Business),
            "personal" => Ok(AccountType::Personal),
            "project" => Ok(AccountType::Project),
            other => Err(AppError::validation(format!(
                "Invalid account type: {}",
                other
            ))),
        }
    }
}

/// An expense account: the container expenses, subscriptions and loans hang
/// off. Its currency is fixed at creation; stored amounts reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseAccount {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub currency: CurrencyCode,
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExpenseAccount {
    pub fn new(
        organization_id: String,
        name: String,
        currency: CurrencyCode,
        account_type: AccountType,
    ) -> Result<Self> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Account name cannot be empty"));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            organization_id,
            name,
            currency,
            account_type,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    pub currency: String,
    pub account_type: AccountType,
}

/// Partial update; the currency is immutable once amounts reference it.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_and_requires_name() {
        let account = ExpenseAccount::new(
            "org-1".to_string(),
            "  Engineering  ".to_string(),
            CurrencyCode::new("USD").unwrap(),
            AccountType::Business,
        )
        .unwrap();
        assert_eq!(account.name, "Engineering");

        let err = ExpenseAccount::new(
            "org-1".to_string(),
            "   ".to_string(),
            CurrencyCode::new("USD").unwrap(),
            AccountType::Business,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_account_type_round_trip() {
        assert_eq!(
            AccountType::try_from("project".to_string()).unwrap(),
            AccountType::Project
        );
        assert_eq!(AccountType::Personal.to_string(), "personal");
        assert!(AccountType::try_from("corporate".to_string()).is_err());
    }
}
