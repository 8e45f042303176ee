use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::accounts::models::{AccountType, ExpenseAccount};
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    organization_id: String,
    name: String,
    currency: String,
    account_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for ExpenseAccount {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self> {
        Ok(ExpenseAccount {
            id: row.id,
            organization_id: row.organization_id,
            name: row.name,
            currency: CurrencyCode::new(&row.currency)?,
            account_type: AccountType::try_from(row.account_type)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct AccountRepository {
    pool: MySqlPool,
}

impl AccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, account: &ExpenseAccount) -> Result<ExpenseAccount> {
        sqlx::query(
            r#"
            INSERT INTO expense_accounts
                (id, organization_id, name, currency, account_type, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&account.id)
        .bind(&account.organization_id)
        .bind(&account.name)
        .bind(account.currency.as_str())
        .bind(account.account_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.require(&account.organization_id, &account.id).await
    }

    pub async fn find_by_id(
        &self,
        organization_id: &str,
        account_id: &str,
    ) -> Result<Option<ExpenseAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, organization_id, name, currency, account_type, created_at, updated_at
            FROM expense_accounts
            WHERE organization_id = ? AND id = ?
            "#,
        )
        .bind(organization_id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(ExpenseAccount::try_from).transpose()
    }

    /// Like `find_by_id` but a missing account is an error.
    pub async fn require(&self, organization_id: &str, account_id: &str) -> Result<ExpenseAccount> {
        self.find_by_id(organization_id, account_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Account {} not found", account_id)))
    }

    pub async fn list(&self, organization_id: &str) -> Result<Vec<ExpenseAccount>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, organization_id, name, currency, account_type, created_at, updated_at
            FROM expense_accounts
            WHERE organization_id = ?
            ORDER BY name
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(ExpenseAccount::try_from).collect()
    }

    pub async fn update(&self, account: &ExpenseAccount) -> Result<ExpenseAccount> {
        sqlx::query(
            r#"
            UPDATE expense_accounts
            SET name = ?, account_type = ?, updated_at = NOW()
            WHERE organization_id = ? AND id = ?
            "#,
        )
        .bind(&account.name)
        .bind(account.account_type.as_str())
        .bind(&account.organization_id)
        .bind(&account.id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.require(&account.organization_id, &account.id).await
    }

    /// Hard delete; expenses, subscriptions and loans under the account go
    /// with it via FK cascade. Members whose loans disappear get their
    /// denormalized loan total recomputed in the same transaction.
    pub async fn delete(&self, organization_id: &str, account_id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let member_ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT team_member_id FROM loans
            WHERE account_id = ? AND team_member_id IS NOT NULL
            "#,
        )
        .bind(account_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM expense_accounts WHERE organization_id = ? AND id = ?")
            .bind(organization_id)
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for member_id in &member_ids {
            sqlx::query(
                r#"
                UPDATE team_members SET total_loan_balance = (
                    SELECT COALESCE(SUM(current_balance), 0) FROM loans
                    WHERE team_member_id = ? AND status IN ('active', 'partial')
                ), updated_at = NOW()
                WHERE id = ?
                "#,
            )
            .bind(member_id)
            .bind(member_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
