use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::team::models::{TeamMember, TeamMemberAccount};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlPool;

#[derive(sqlx::FromRow)]
struct TeamMemberRow {
    id: String,
    organization_id: String,
    name: String,
    email: Option<String>,
    monthly_salary: Option<Decimal>,
    salary_currency: Option<String>,
    total_loan_balance: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TeamMemberRow> for TeamMember {
    type Error = AppError;

    fn try_from(row: TeamMemberRow) -> Result<Self> {
        let salary_currency = row
            .salary_currency
            .as_deref()
            .map(CurrencyCode::new)
            .transpose()?;

        Ok(TeamMember {
            id: row.id,
            organization_id: row.organization_id,
            name: row.name,
            email: row.email,
            monthly_salary: row.monthly_salary,
            salary_currency,
            total_loan_balance: row.total_loan_balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    id: String,
    team_member_id: String,
    account_id: String,
    salary: Decimal,
    position: String,
    created_at: DateTime<Utc>,
}

impl From<AssignmentRow> for TeamMemberAccount {
    fn from(row: AssignmentRow) -> Self {
        TeamMemberAccount {
            id: row.id,
            team_member_id: row.team_member_id,
            account_id: row.account_id,
            salary: row.salary,
            position: row.position,
            created_at: row.created_at,
        }
    }
}

const SELECT_MEMBER: &str = r#"
SELECT id, organization_id, name, email, monthly_salary, salary_currency,
       total_loan_balance, created_at, updated_at
FROM team_members
"#;

pub struct TeamRepository {
    pool: MySqlPool,
}

impl TeamRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, member: &TeamMember) -> Result<TeamMember> {
        sqlx::query(
            r#"
            INSERT INTO team_members
                (id, organization_id, name, email, monthly_salary, salary_currency,
                 total_loan_balance, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&member.id)
        .bind(&member.organization_id)
        .bind(&member.name)
        .bind(&member.email)
        .bind(member.monthly_salary)
        .bind(member.salary_currency.as_ref().map(|c| c.as_str().to_string()))
        .bind(member.total_loan_balance)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(member.clone())
    }

    pub async fn find_by_id(
        &self,
        organization_id: &str,
        member_id: &str,
    ) -> Result<Option<TeamMember>> {
        let sql = format!("{} WHERE organization_id = ? AND id = ?", SELECT_MEMBER);
        let row = sqlx::query_as::<_, TeamMemberRow>(&sql)
            .bind(organization_id)
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.map(TeamMember::try_from).transpose()
    }

    pub async fn require(&self, organization_id: &str, member_id: &str) -> Result<TeamMember> {
        self.find_by_id(organization_id, member_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Team member {} not found", member_id)))
    }

    pub async fn list(&self, organization_id: &str) -> Result<Vec<TeamMember>> {
        let sql = format!("{} WHERE organization_id = ? ORDER BY name", SELECT_MEMBER);
        let rows = sqlx::query_as::<_, TeamMemberRow>(&sql)
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        rows.into_iter().map(TeamMember::try_from).collect()
    }

    /// Full-row update of the editable fields. `total_loan_balance` is owned
    /// by the loan transactions and never written here.
    pub async fn update(&self, member: &TeamMember) -> Result<TeamMember> {
        sqlx::query(
            r#"
            UPDATE team_members
            SET name = ?, email = ?, monthly_salary = ?, salary_currency = ?, updated_at = NOW()
            WHERE organization_id = ? AND id = ?
            "#,
        )
        .bind(&member.name)
        .bind(&member.email)
        .bind(member.monthly_salary)
        .bind(member.salary_currency.as_ref().map(|c| c.as_str().to_string()))
        .bind(&member.organization_id)
        .bind(&member.id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.require(&member.organization_id, &member.id).await
    }

    pub async fn delete(&self, organization_id: &str, member_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM team_members WHERE organization_id = ? AND id = ?")
            .bind(organization_id)
            .bind(member_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Team member {} not found",
                member_id
            )));
        }
        Ok(())
    }

    pub async fn has_outstanding_loans(
        &self,
        organization_id: &str,
        member_id: &str,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM loans
            WHERE organization_id = ? AND team_member_id = ?
              AND status IN ('active', 'partial')
            "#,
        )
        .bind(organization_id)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(count > 0)
    }

    pub async fn assign_account(&self, assignment: &TeamMemberAccount) -> Result<TeamMemberAccount> {
        sqlx::query(
            r#"
            INSERT INTO team_member_accounts
                (id, team_member_id, account_id, salary, position, created_at)
            VALUES (?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(&assignment.id)
        .bind(&assignment.team_member_id)
        .bind(&assignment.account_id)
        .bind(assignment.salary)
        .bind(&assignment.position)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(assignment.clone())
    }

    pub async fn assignment_exists(&self, member_id: &str, account_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM team_member_accounts WHERE team_member_id = ? AND account_id = ?",
        )
        .bind(member_id)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(count > 0)
    }

    pub async fn remove_assignment(&self, member_id: &str, account_id: &str) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM team_member_accounts WHERE team_member_id = ? AND account_id = ?",
        )
        .bind(member_id)
        .bind(account_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Member {} is not assigned to account {}",
                member_id, account_id
            )));
        }
        Ok(())
    }

    pub async fn list_assignments(&self, member_id: &str) -> Result<Vec<TeamMemberAccount>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, team_member_id, account_id, salary, position, created_at
            FROM team_member_accounts
            WHERE team_member_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows.into_iter().map(TeamMemberAccount::from).collect())
    }
}
