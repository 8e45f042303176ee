use crate::core::{AppError, CurrencyCode, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person the organization tracks salaries and loans for.
/// `total_loan_balance` is denormalized from the loans table and recomputed
/// inside every balance-changing loan transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub email: Option<String>,
    pub monthly_salary: Option<Decimal>,
    pub salary_currency: Option<CurrencyCode>,
    pub total_loan_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn new(
        organization_id: String,
        name: String,
        email: Option<String>,
        monthly_salary: Option<Decimal>,
        salary_currency: Option<CurrencyCode>,
    ) -> Result<Self> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Member name cannot be empty"));
        }
        if let Some(salary) = monthly_salary {
            if salary < Decimal::ZERO {
                return Err(AppError::validation("Monthly salary cannot be negative"));
            }
        }
        let email = match email {
            Some(raw) => {
                let trimmed = raw.trim().to_string();
                if trimmed.is_empty() {
                    None
                } else if !trimmed.contains('@') {
                    return Err(AppError::validation(format!(
                        "Invalid email address: {}",
                        trimmed
                    )));
                } else {
                    Some(trimmed)
                }
            }
            None => None,
        };

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            organization_id,
            name,
            email,
            monthly_salary,
            salary_currency,
            total_loan_balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Links a member to an expense account, with the salary charged to that
/// account. Unique per (member, account).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMemberAccount {
    pub id: String,
    pub team_member_id: String,
    pub account_id: String,
    pub salary: Decimal,
    pub position: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamMemberRequest {
    pub name: String,
    pub email: Option<String>,
    pub monthly_salary: Option<Decimal>,
    pub salary_currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTeamMemberRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub monthly_salary: Option<Decimal>,
    pub salary_currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignAccountRequest {
    pub account_id: String,
    pub salary: Decimal,
    pub position: String,
}

/// Member detail enriched with their account assignments.
#[derive(Debug, Serialize)]
pub struct TeamMemberDetail {
    #[serde(flatten)]
    pub member: TeamMember,
    pub accounts: Vec<TeamMemberAccount>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_trims_name_and_email() {
        let member = TeamMember::new(
            "org-1".to_string(),
            "  Ada Lovelace  ".to_string(),
            Some("  ada@example.com ".to_string()),
            Some(dec!(5000)),
            Some(CurrencyCode::new("USD").unwrap()),
        )
        .unwrap();
        assert_eq!(member.name, "Ada Lovelace");
        assert_eq!(member.email.as_deref(), Some("ada@example.com"));
        assert_eq!(member.total_loan_balance, Decimal::ZERO);
    }

    #[test]
    fn test_new_rejects_bad_input() {
        let err = TeamMember::new("org-1".to_string(), "  ".to_string(), None, None, None)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = TeamMember::new(
            "org-1".to_string(),
            "Bob".to_string(),
            Some("not-an-email".to_string()),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = TeamMember::new(
            "org-1".to_string(),
            "Bob".to_string(),
            None,
            Some(dec!(-1)),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_blank_email_becomes_none() {
        let member = TeamMember::new(
            "org-1".to_string(),
            "Bob".to_string(),
            Some("   ".to_string()),
            None,
            None,
        )
        .unwrap();
        assert!(member.email.is_none());
    }
}
