use crate::core::money::RateType;
use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::subscriptions::models::{
    RenewalFrequency, Subscription, SubscriptionStatus,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlPool;

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    account_id: String,
    name: String,
    amount: Decimal,
    currency: String,
    rate_type: String,
    conversion_rate: Option<Decimal>,
    base_amount: Option<Decimal>,
    start_date: NaiveDate,
    renewal_date: NaiveDate,
    renewal_frequency: String,
    reminder_days: i32,
    next_reminder_date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = AppError;

    fn try_from(row: SubscriptionRow) -> Result<Self> {
        Ok(Subscription {
            id: row.id,
            account_id: row.account_id,
            name: row.name,
            amount: row.amount,
            currency: CurrencyCode::new(&row.currency)?,
            rate_type: RateType::try_from(row.rate_type)?,
            conversion_rate: row.conversion_rate,
            base_amount: row.base_amount,
            start_date: row.start_date,
            renewal_date: row.renewal_date,
            renewal_frequency: RenewalFrequency::try_from(row.renewal_frequency)?,
            reminder_days: row.reminder_days,
            next_reminder_date: row.next_reminder_date,
            status: SubscriptionStatus::try_from(row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_SUBSCRIPTION: &str = r#"
SELECT s.id, s.account_id, s.name, s.amount, s.currency, s.rate_type,
       s.conversion_rate, s.base_amount, s.start_date, s.renewal_date,
       s.renewal_frequency, s.reminder_days, s.next_reminder_date, s.status,
       s.created_at, s.updated_at
FROM subscriptions s
JOIN expense_accounts a ON a.id = s.account_id
"#;

/// Repository for subscriptions, organization-scoped through the owning
/// account.
pub struct SubscriptionRepository {
    pool: MySqlPool,
}

impl SubscriptionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, subscription: &Subscription) -> Result<Subscription> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions
                (id, account_id, name, amount, currency, rate_type, conversion_rate,
                 base_amount, start_date, renewal_date, renewal_frequency, reminder_days,
                 next_reminder_date, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&subscription.id)
        .bind(&subscription.account_id)
        .bind(&subscription.name)
        .bind(subscription.amount)
        .bind(subscription.currency.as_str())
        .bind(subscription.rate_type.as_str())
        .bind(subscription.conversion_rate)
        .bind(subscription.base_amount)
        .bind(subscription.start_date)
        .bind(subscription.renewal_date)
        .bind(subscription.renewal_frequency.as_str())
        .bind(subscription.reminder_days)
        .bind(subscription.next_reminder_date)
        .bind(subscription.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(subscription.clone())
    }

    pub async fn find_by_id(
        &self,
        organization_id: &str,
        subscription_id: &str,
    ) -> Result<Option<Subscription>> {
        let sql = format!(
            "{} WHERE a.organization_id = ? AND s.id = ?",
            SELECT_SUBSCRIPTION
        );
        let row = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(organization_id)
            .bind(subscription_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.map(Subscription::try_from).transpose()
    }

    pub async fn require(
        &self,
        organization_id: &str,
        subscription_id: &str,
    ) -> Result<Subscription> {
        self.find_by_id(organization_id, subscription_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Subscription {} not found", subscription_id))
            })
    }

    pub async fn list(
        &self,
        organization_id: &str,
        account_id: Option<&str>,
        status: Option<SubscriptionStatus>,
    ) -> Result<Vec<Subscription>> {
        let mut sql = format!("{} WHERE a.organization_id = ?", SELECT_SUBSCRIPTION);
        if account_id.is_some() {
            sql.push_str(" AND s.account_id = ?");
        }
        if status.is_some() {
            sql.push_str(" AND s.status = ?");
        }
        sql.push_str(" ORDER BY s.renewal_date, s.name");

        let mut query = sqlx::query_as::<_, SubscriptionRow>(&sql).bind(organization_id);
        if let Some(account_id) = account_id {
            query = query.bind(account_id);
        }
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    pub async fn update(
        &self,
        organization_id: &str,
        subscription: &Subscription,
    ) -> Result<Subscription> {
        sqlx::query(
            r#"
            UPDATE subscriptions s
            JOIN expense_accounts a ON a.id = s.account_id
            SET s.name = ?, s.amount = ?, s.currency = ?, s.rate_type = ?,
                s.conversion_rate = ?, s.base_amount = ?, s.renewal_date = ?,
                s.reminder_days = ?, s.next_reminder_date = ?, s.status = ?,
                s.updated_at = NOW()
            WHERE a.organization_id = ? AND s.id = ?
            "#,
        )
        .bind(&subscription.name)
        .bind(subscription.amount)
        .bind(subscription.currency.as_str())
        .bind(subscription.rate_type.as_str())
        .bind(subscription.conversion_rate)
        .bind(subscription.base_amount)
        .bind(subscription.renewal_date)
        .bind(subscription.reminder_days)
        .bind(subscription.next_reminder_date)
        .bind(subscription.status.as_str())
        .bind(organization_id)
        .bind(&subscription.id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.require(organization_id, &subscription.id).await
    }

    pub async fn delete(&self, organization_id: &str, subscription_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE s FROM subscriptions s
            JOIN expense_accounts a ON a.id = s.account_id
            WHERE a.organization_id = ? AND s.id = ?
            "#,
        )
        .bind(organization_id)
        .bind(subscription_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
