use crate::config::ExpenseSettings;
use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::accounts::repositories::AccountRepository;
use crate::modules::team::models::{
    AssignAccountRequest, CreateTeamMemberRequest, TeamMember, TeamMemberAccount,
    TeamMemberDetail, UpdateTeamMemberRequest,
};
use crate::modules::team::repositories::TeamRepository;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

pub struct TeamService {
    members: TeamRepository,
    accounts: AccountRepository,
    settings: ExpenseSettings,
}

impl TeamService {
    pub fn new(
        members: TeamRepository,
        accounts: AccountRepository,
        settings: ExpenseSettings,
    ) -> Self {
        Self {
            members,
            accounts,
            settings,
        }
    }

    fn check_salary_currency(&self, code: &str) -> Result<CurrencyCode> {
        let currency = CurrencyCode::new(code)?;
        if !self.settings.is_supported(&currency) {
            return Err(AppError::validation(format!(
                "Currency {} is not in the supported list",
                currency
            )));
        }
        Ok(currency)
    }

    pub async fn create(
        &self,
        organization_id: &str,
        request: CreateTeamMemberRequest,
    ) -> Result<TeamMember> {
        let salary_currency = match request.salary_currency.as_deref() {
            Some(code) => Some(self.check_salary_currency(code)?),
            // A salary without a currency is booked in the org base.
            None if request.monthly_salary.is_some() => {
                Some(self.settings.base_currency.clone())
            }
            None => None,
        };

        let member = TeamMember::new(
            organization_id.to_string(),
            request.name,
            request.email,
            request.monthly_salary,
            salary_currency,
        )?;

        let created = self.members.create(&member).await?;
        info!(
            organization_id = %organization_id,
            member_id = %created.id,
            "team member created"
        );
        Ok(created)
    }

    pub async fn get(&self, organization_id: &str, member_id: &str) -> Result<TeamMemberDetail> {
        let member = self.members.require(organization_id, member_id).await?;
        let accounts = self.members.list_assignments(&member.id).await?;
        Ok(TeamMemberDetail { member, accounts })
    }

    pub async fn list(&self, organization_id: &str) -> Result<Vec<TeamMember>> {
        self.members.list(organization_id).await
    }

    pub async fn update(
        &self,
        organization_id: &str,
        member_id: &str,
        request: UpdateTeamMemberRequest,
    ) -> Result<TeamMember> {
        let mut member = self.members.require(organization_id, member_id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::validation("Member name cannot be empty"));
            }
            member.name = name;
        }
        if let Some(email) = request.email {
            let trimmed = email.trim().to_string();
            member.email = if trimmed.is_empty() {
                None
            } else if !trimmed.contains('@') {
                return Err(AppError::validation(format!(
                    "Invalid email address: {}",
                    trimmed
                )));
            } else {
                Some(trimmed)
            };
        }
        if let Some(salary) = request.monthly_salary {
            if salary < Decimal::ZERO {
                return Err(AppError::validation("Monthly salary cannot be negative"));
            }
            member.monthly_salary = Some(salary);
            if member.salary_currency.is_none() {
                member.salary_currency = Some(self.settings.base_currency.clone());
            }
        }
        if let Some(ref code) = request.salary_currency {
            member.salary_currency = Some(self.check_salary_currency(code)?);
        }

        let updated = self.members.update(&member).await?;
        info!(
            organization_id = %organization_id,
            member_id = %member_id,
            "team member updated"
        );
        Ok(updated)
    }

    /// Deletes a member. Refused while they still owe on any loan; closed
    /// loans keep their history with the member reference cleared.
    pub async fn delete(&self, organization_id: &str, member_id: &str) -> Result<()> {
        self.members.require(organization_id, member_id).await?;

        if self
            .members
            .has_outstanding_loans(organization_id, member_id)
            .await?
        {
            return Err(AppError::validation(
                "Team member has outstanding loans; settle or cancel them first",
            ));
        }

        self.members.delete(organization_id, member_id).await?;
        info!(
            organization_id = %organization_id,
            member_id = %member_id,
            "team member deleted"
        );
        Ok(())
    }

    pub async fn assign_account(
        &self,
        organization_id: &str,
        member_id: &str,
        request: AssignAccountRequest,
    ) -> Result<TeamMemberAccount> {
        let member = self.members.require(organization_id, member_id).await?;
        let account = self
            .accounts
            .require(organization_id, &request.account_id)
            .await?;

        let position = request.position.trim().to_string();
        if position.is_empty() {
            return Err(AppError::validation("Position cannot be empty"));
        }
        if request.salary < Decimal::ZERO {
            return Err(AppError::validation("Salary cannot be negative"));
        }
        if self.members.assignment_exists(&member.id, &account.id).await? {
            return Err(AppError::validation(format!(
                "Member {} is already assigned to account {}",
                member.id, account.id
            )));
        }

        let assignment = TeamMemberAccount {
            id: Uuid::new_v4().to_string(),
            team_member_id: member.id.clone(),
            account_id: account.id.clone(),
            salary: request.salary,
            position,
            created_at: Utc::now(),
        };

        let created = self.members.assign_account(&assignment).await?;
        info!(
            organization_id = %organization_id,
            member_id = %member_id,
            account_id = %created.account_id,
            "member assigned to account"
        );
        Ok(created)
    }

    pub async fn remove_assignment(
        &self,
        organization_id: &str,
        member_id: &str,
        account_id: &str,
    ) -> Result<()> {
        self.members.require(organization_id, member_id).await?;
        self.members.remove_assignment(member_id, account_id).await?;
        info!(
            organization_id = %organization_id,
            member_id = %member_id,
            account_id = %account_id,
            "member assignment removed"
        );
        Ok(())
    }
}
