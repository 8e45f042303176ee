use crate::core::money::RateType;
use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::loans::models::{Loan, LoanPayment, LoanStatus, PaymentType};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, Transaction};

#[derive(sqlx::FromRow)]
struct LoanRow {
    id: String,
    organization_id: String,
    account_id: Option<String>,
    team_member_id: Option<String>,
    original_amount: Decimal,
    currency: String,
    rate_type: String,
    conversion_rate: Option<Decimal>,
    base_amount: Option<Decimal>,
    ledger_currency: String,
    principal_amount: Decimal,
    current_balance: Decimal,
    accrued_interest: Decimal,
    status: String,
    issued_date: NaiveDate,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LoanRow> for Loan {
    type Error = AppError;

    fn try_from(row: LoanRow) -> Result<Self> {
        Ok(Loan {
            id: row.id,
            organization_id: row.organization_id,
            account_id: row.account_id,
            team_member_id: row.team_member_id,
            original_amount: row.original_amount,
            currency: CurrencyCode::new(&row.currency)?,
            rate_type: RateType::try_from(row.rate_type)?,
            conversion_rate: row.conversion_rate,
            base_amount: row.base_amount,
            ledger_currency: CurrencyCode::new(&row.ledger_currency)?,
            principal_amount: row.principal_amount,
            current_balance: row.current_balance,
            accrued_interest: row.accrued_interest,
            status: LoanStatus::try_from(row.status)?,
            issued_date: row.issued_date,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LoanPaymentRow {
    id: String,
    loan_id: String,
    amount: Decimal,
    currency: String,
    conversion_rate: Option<Decimal>,
    applied_amount: Decimal,
    payment_date: NaiveDate,
    payment_type: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LoanPaymentRow> for LoanPayment {
    type Error = AppError;

    fn try_from(row: LoanPaymentRow) -> Result<Self> {
        Ok(LoanPayment {
            id: row.id,
            loan_id: row.loan_id,
            amount: row.amount,
            currency: CurrencyCode::new(&row.currency)?,
            conversion_rate: row.conversion_rate,
            applied_amount: row.applied_amount,
            payment_date: row.payment_date,
            payment_type: PaymentType::try_from(row.payment_type)?,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

const SELECT_LOAN: &str = r#"
SELECT id, organization_id, account_id, team_member_id, original_amount, currency,
       rate_type, conversion_rate, base_amount, ledger_currency, principal_amount,
       current_balance, accrued_interest, status, issued_date, notes,
       created_at, updated_at
FROM loans
"#;

/// Filters for listing loans.
#[derive(Debug, Default, Clone)]
pub struct LoanFilters {
    pub account_id: Option<String>,
    pub team_member_id: Option<String>,
    pub status: Option<LoanStatus>,
}

/// Repository for loans and their payment ledger. Balance-changing writes
/// run in one transaction together with the member-total recompute, so the
/// denormalized total can never drift from the loans it summarizes.
pub struct LoanRepository {
    pool: MySqlPool,
}

impl LoanRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, loan: &Loan) -> Result<Loan> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO loans
                (id, organization_id, account_id, team_member_id, original_amount, currency,
                 rate_type, conversion_rate, base_amount, ledger_currency, principal_amount,
                 current_balance, accrued_interest, status, issued_date, notes,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&loan.id)
        .bind(&loan.organization_id)
        .bind(&loan.account_id)
        .bind(&loan.team_member_id)
        .bind(loan.original_amount)
        .bind(loan.currency.as_str())
        .bind(loan.rate_type.as_str())
        .bind(loan.conversion_rate)
        .bind(loan.base_amount)
        .bind(loan.ledger_currency.as_str())
        .bind(loan.principal_amount)
        .bind(loan.current_balance)
        .bind(loan.accrued_interest)
        .bind(loan.status.as_str())
        .bind(loan.issued_date)
        .bind(&loan.notes)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if let Some(ref member_id) = loan.team_member_id {
            Self::recompute_member_total(&mut tx, member_id).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(loan.clone())
    }

    pub async fn find_by_id(&self, organization_id: &str, loan_id: &str) -> Result<Option<Loan>> {
        let sql = format!("{} WHERE organization_id = ? AND id = ?", SELECT_LOAN);
        let row = sqlx::query_as::<_, LoanRow>(&sql)
            .bind(organization_id)
            .bind(loan_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.map(Loan::try_from).transpose()
    }

    pub async fn require(&self, organization_id: &str, loan_id: &str) -> Result<Loan> {
        self.find_by_id(organization_id, loan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Loan {} not found", loan_id)))
    }

    pub async fn list(&self, organization_id: &str, filters: &LoanFilters) -> Result<Vec<Loan>> {
        let mut sql = format!("{} WHERE organization_id = ?", SELECT_LOAN);
        if filters.account_id.is_some() {
            sql.push_str(" AND account_id = ?");
        }
        if filters.team_member_id.is_some() {
            sql.push_str(" AND team_member_id = ?");
        }
        if filters.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY issued_date DESC, created_at DESC");

        let mut query = sqlx::query_as::<_, LoanRow>(&sql).bind(organization_id);
        if let Some(ref account_id) = filters.account_id {
            query = query.bind(account_id);
        }
        if let Some(ref member_id) = filters.team_member_id {
            query = query.bind(member_id);
        }
        if let Some(status) = filters.status {
            query = query.bind(status.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        rows.into_iter().map(Loan::try_from).collect()
    }

    /// Persists one applied payment: ledger insert, loan figures update and
    /// member-total recompute, all in a single transaction.
    pub async fn record_payment(&self, loan: &Loan, payment: &LoanPayment) -> Result<LoanPayment> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO loan_payments
                (id, loan_id, amount, currency, conversion_rate, applied_amount,
                 payment_date, payment_type, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.loan_id)
        .bind(payment.amount)
        .bind(payment.currency.as_str())
        .bind(payment.conversion_rate)
        .bind(payment.applied_amount)
        .bind(payment.payment_date)
        .bind(payment.payment_type.as_str())
        .bind(&payment.notes)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        Self::update_loan_figures(&mut tx, loan).await?;

        if let Some(ref member_id) = loan.team_member_id {
            Self::recompute_member_total(&mut tx, member_id).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(payment.clone())
    }

    /// Persists a status flip (cancel, default) plus the member recompute.
    pub async fn save_status(&self, loan: &Loan) -> Result<Loan> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        Self::update_loan_figures(&mut tx, loan).await?;
        if let Some(ref member_id) = loan.team_member_id {
            Self::recompute_member_total(&mut tx, member_id).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        self.require(&loan.organization_id, &loan.id).await
    }

    /// Hard delete of a loan and its whole payment ledger.
    pub async fn delete(&self, organization_id: &str, loan: &Loan) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM loan_payments WHERE loan_id = ?")
            .bind(&loan.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("DELETE FROM loans WHERE organization_id = ? AND id = ?")
            .bind(organization_id)
            .bind(&loan.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if let Some(ref member_id) = loan.team_member_id {
            Self::recompute_member_total(&mut tx, member_id).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    pub async fn list_payments(
        &self,
        organization_id: &str,
        loan_id: &str,
    ) -> Result<Vec<LoanPayment>> {
        let rows = sqlx::query_as::<_, LoanPaymentRow>(
            r#"
            SELECT p.id, p.loan_id, p.amount, p.currency, p.conversion_rate,
                   p.applied_amount, p.payment_date, p.payment_type, p.notes, p.created_at
            FROM loan_payments p
            JOIN loans l ON l.id = p.loan_id
            WHERE l.organization_id = ? AND p.loan_id = ?
            ORDER BY p.payment_date, p.created_at
            "#,
        )
        .bind(organization_id)
        .bind(loan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(LoanPayment::try_from).collect()
    }

    pub async fn team_member_exists(
        &self,
        organization_id: &str,
        team_member_id: &str,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM team_members WHERE organization_id = ? AND id = ?",
        )
        .bind(organization_id)
        .bind(team_member_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(count > 0)
    }

    async fn update_loan_figures(tx: &mut Transaction<'_, MySql>, loan: &Loan) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE loans
            SET current_balance = ?, accrued_interest = ?, status = ?, updated_at = NOW()
            WHERE organization_id = ? AND id = ?
            "#,
        )
        .bind(loan.current_balance)
        .bind(loan.accrued_interest)
        .bind(loan.status.as_str())
        .bind(&loan.organization_id)
        .bind(&loan.id)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    async fn recompute_member_total(
        tx: &mut Transaction<'_, MySql>,
        team_member_id: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE team_members SET total_loan_balance = (
                SELECT COALESCE(SUM(current_balance), 0) FROM loans
                WHERE team_member_id = ? AND status IN ('active', 'partial')
            ), updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(team_member_id)
        .bind(team_member_id)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }
}
