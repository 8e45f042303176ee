use crate::core::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Expense category; names are unique within an organization.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExpenseCategory {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl ExpenseCategory {
    pub fn new(organization_id: String, name: String) -> Result<Self> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Category name cannot be empty"));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            organization_id,
            name,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}
