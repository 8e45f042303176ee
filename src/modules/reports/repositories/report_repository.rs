use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::reports::models::{ExpenseReport, ReportData};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::MySqlPool;

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: String,
    organization_id: String,
    account_id: Option<String>,
    period_start: NaiveDate,
    period_end: NaiveDate,
    report_currency: String,
    total_expenses: Decimal,
    report_data: Json<ReportData>,
    generated_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for ExpenseReport {
    type Error = AppError;

    fn try_from(row: ReportRow) -> Result<Self> {
        Ok(ExpenseReport {
            id: row.id,
            organization_id: row.organization_id,
            account_id: row.account_id,
            period_start: row.period_start,
            period_end: row.period_end,
            report_currency: CurrencyCode::new(&row.report_currency)?,
            total_expenses: row.total_expenses,
            report_data: row.report_data.0,
            generated_at: row.generated_at,
        })
    }
}

const SELECT_REPORT: &str = r#"
SELECT id, organization_id, account_id, period_start, period_end,
       report_currency, total_expenses, report_data, generated_at
FROM expense_reports
"#;

/// Repository for persisted report snapshots. Insert and read only; the
/// stored snapshot is never updated.
pub struct ReportRepository {
    pool: MySqlPool,
}

impl ReportRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, report: &ExpenseReport) -> Result<ExpenseReport> {
        sqlx::query(
            r#"
            INSERT INTO expense_reports
                (id, organization_id, account_id, period_start, period_end,
                 report_currency, total_expenses, report_data, generated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&report.id)
        .bind(&report.organization_id)
        .bind(&report.account_id)
        .bind(report.period_start)
        .bind(report.period_end)
        .bind(report.report_currency.as_str())
        .bind(report.total_expenses)
        .bind(Json(&report.report_data))
        .bind(report.generated_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(report.clone())
    }

    pub async fn find_by_id(
        &self,
        organization_id: &str,
        report_id: &str,
    ) -> Result<Option<ExpenseReport>> {
        let sql = format!("{} WHERE organization_id = ? AND id = ?", SELECT_REPORT);
        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(organization_id)
            .bind(report_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.map(ExpenseReport::try_from).transpose()
    }

    pub async fn require(&self, organization_id: &str, report_id: &str) -> Result<ExpenseReport> {
        self.find_by_id(organization_id, report_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Report {} not found", report_id)))
    }

    pub async fn list(
        &self,
        organization_id: &str,
        account_id: Option<&str>,
    ) -> Result<Vec<ExpenseReport>> {
        let mut sql = format!("{} WHERE organization_id = ?", SELECT_REPORT);
        if account_id.is_some() {
            sql.push_str(" AND account_id = ?");
        }
        sql.push_str(" ORDER BY generated_at DESC");

        let mut query = sqlx::query_as::<_, ReportRow>(&sql).bind(organization_id);
        if let Some(account_id) = account_id {
            query = query.bind(account_id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        rows.into_iter().map(ExpenseReport::try_from).collect()
    }

    pub async fn delete(&self, organization_id: &str, report_id: &str) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM expense_reports WHERE organization_id = ? AND id = ?")
                .bind(organization_id)
                .bind(report_id)
                .execute(&self.pool)
                .await
                .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Report {} not found",
                report_id
            )));
        }
        Ok(())
    }
}
