use crate::core::money::RateType;
use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::expenses::models::{Expense, ExpenseType};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlPool;

#[derive(sqlx::FromRow)]
struct ExpenseRow {
    id: String,
    account_id: String,
    category_id: Option<String>,
    description: Option<String>,
    amount: Decimal,
    currency: String,
    rate_type: String,
    conversion_rate: Option<Decimal>,
    base_amount: Option<Decimal>,
    expense_date: NaiveDate,
    expense_type: String,
    team_member_id: Option<String>,
    subscription_id: Option<String>,
    salary_month: Option<String>,
    auto_generated: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = AppError;

    fn try_from(row: ExpenseRow) -> Result<Self> {
        Ok(Expense {
            id: row.id,
            account_id: row.account_id,
            category_id: row.category_id,
            description: row.description,
            amount: row.amount,
            currency: CurrencyCode::new(&row.currency)?,
            rate_type: RateType::try_from(row.rate_type)?,
            conversion_rate: row.conversion_rate,
            base_amount: row.base_amount,
            expense_date: row.expense_date,
            expense_type: ExpenseType::try_from(row.expense_type)?,
            team_member_id: row.team_member_id,
            subscription_id: row.subscription_id,
            salary_month: row.salary_month,
            auto_generated: row.auto_generated,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Filters for listing expenses. All optional; unset means unfiltered.
#[derive(Debug, Default, Clone)]
pub struct ExpenseFilters {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub expense_type: Option<ExpenseType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

const SELECT_EXPENSE: &str = r#"
SELECT e.id, e.account_id, e.category_id, e.description, e.amount, e.currency,
       e.rate_type, e.conversion_rate, e.base_amount, e.expense_date,
       e.expense_type, e.team_member_id, e.subscription_id, e.salary_month,
       e.auto_generated, e.created_at, e.updated_at
FROM expenses e
JOIN expense_accounts a ON a.id = e.account_id
"#;

/// Repository for expenses. Every query joins the owning account so results
/// never cross an organization boundary.
pub struct ExpenseRepository {
    pool: MySqlPool,
}

impl ExpenseRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, expense: &Expense) -> Result<Expense> {
        sqlx::query(
            r#"
            INSERT INTO expenses
                (id, account_id, category_id, description, amount, currency, rate_type,
                 conversion_rate, base_amount, expense_date, expense_type, team_member_id,
                 subscription_id, salary_month, auto_generated, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.account_id)
        .bind(&expense.category_id)
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.currency.as_str())
        .bind(expense.rate_type.as_str())
        .bind(expense.conversion_rate)
        .bind(expense.base_amount)
        .bind(expense.expense_date)
        .bind(expense.expense_type.as_str())
        .bind(&expense.team_member_id)
        .bind(&expense.subscription_id)
        .bind(&expense.salary_month)
        .bind(expense.auto_generated)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(expense.clone())
    }

    pub async fn find_by_id(
        &self,
        organization_id: &str,
        expense_id: &str,
    ) -> Result<Option<Expense>> {
        let sql = format!("{} WHERE a.organization_id = ? AND e.id = ?", SELECT_EXPENSE);
        let row = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(organization_id)
            .bind(expense_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.map(Expense::try_from).transpose()
    }

    pub async fn require(&self, organization_id: &str, expense_id: &str) -> Result<Expense> {
        self.find_by_id(organization_id, expense_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Expense {} not found", expense_id)))
    }

    pub async fn list(
        &self,
        organization_id: &str,
        filters: &ExpenseFilters,
    ) -> Result<Vec<Expense>> {
        let mut sql = format!("{} WHERE a.organization_id = ?", SELECT_EXPENSE);
        if filters.account_id.is_some() {
            sql.push_str(" AND e.account_id = ?");
        }
        if filters.category_id.is_some() {
            sql.push_str(" AND e.category_id = ?");
        }
        if filters.expense_type.is_some() {
            sql.push_str(" AND e.expense_type = ?");
        }
        if filters.from.is_some() {
            sql.push_str(" AND e.expense_date >= ?");
        }
        if filters.to.is_some() {
            sql.push_str(" AND e.expense_date <= ?");
        }
        sql.push_str(" ORDER BY e.expense_date DESC, e.created_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, ExpenseRow>(&sql).bind(organization_id);
        if let Some(ref account_id) = filters.account_id {
            query = query.bind(account_id);
        }
        if let Some(ref category_id) = filters.category_id {
            query = query.bind(category_id);
        }
        if let Some(expense_type) = filters.expense_type {
            query = query.bind(expense_type.as_str());
        }
        if let Some(from) = filters.from {
            query = query.bind(from);
        }
        if let Some(to) = filters.to {
            query = query.bind(to);
        }
        let rows = query
            .bind(filters.limit)
            .bind(filters.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        rows.into_iter().map(Expense::try_from).collect()
    }

    /// All expenses of an organization inside a date range, optionally for
    /// one account. Report generation reads through this.
    pub async fn list_for_period(
        &self,
        organization_id: &str,
        account_id: Option<&str>,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Vec<Expense>> {
        let mut sql = format!(
            "{} WHERE a.organization_id = ? AND e.expense_date >= ? AND e.expense_date <= ?",
            SELECT_EXPENSE
        );
        if account_id.is_some() {
            sql.push_str(" AND e.account_id = ?");
        }
        sql.push_str(" ORDER BY e.expense_date");

        let mut query = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(organization_id)
            .bind(period_start)
            .bind(period_end);
        if let Some(account_id) = account_id {
            query = query.bind(account_id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        rows.into_iter().map(Expense::try_from).collect()
    }

    pub async fn update(&self, organization_id: &str, expense: &Expense) -> Result<Expense> {
        sqlx::query(
            r#"
            UPDATE expenses e
            JOIN expense_accounts a ON a.id = e.account_id
            SET e.category_id = ?, e.description = ?, e.amount = ?, e.currency = ?,
                e.rate_type = ?, e.conversion_rate = ?, e.base_amount = ?,
                e.expense_date = ?, e.updated_at = NOW()
            WHERE a.organization_id = ? AND e.id = ?
            "#,
        )
        .bind(&expense.category_id)
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.currency.as_str())
        .bind(expense.rate_type.as_str())
        .bind(expense.conversion_rate)
        .bind(expense.base_amount)
        .bind(expense.expense_date)
        .bind(organization_id)
        .bind(&expense.id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.require(organization_id, &expense.id).await
    }

    pub async fn delete(&self, organization_id: &str, expense_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE e FROM expenses e
            JOIN expense_accounts a ON a.id = e.account_id
            WHERE a.organization_id = ? AND e.id = ?
            "#,
        )
        .bind(organization_id)
        .bind(expense_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn team_member_exists(&self, organization_id: &str, member_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM team_members WHERE organization_id = ? AND id = ?",
        )
        .bind(organization_id)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(count > 0)
    }

    pub async fn subscription_exists(
        &self,
        organization_id: &str,
        subscription_id: &str,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM subscriptions s
            JOIN expense_accounts a ON a.id = s.account_id
            WHERE a.organization_id = ? AND s.id = ?
            "#,
        )
        .bind(organization_id)
        .bind(subscription_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(count > 0)
    }
}
