use crate::core::{AppError, Result};
use crate::modules::expenses::models::ExpenseCategory;
use sqlx::MySqlPool;

pub struct CategoryRepository {
    pool: MySqlPool,
}

impl CategoryRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, category: &ExpenseCategory) -> Result<ExpenseCategory> {
        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM expense_categories WHERE organization_id = ? AND name = ?",
        )
        .bind(&category.organization_id)
        .bind(&category.name)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if existing > 0 {
            return Err(AppError::validation(format!(
                "Category '{}' already exists",
                category.name
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO expense_categories (id, organization_id, name, created_at)
            VALUES (?, ?, ?, NOW())
            "#,
        )
        .bind(&category.id)
        .bind(&category.organization_id)
        .bind(&category.name)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(category.clone())
    }

    pub async fn find_by_id(
        &self,
        organization_id: &str,
        category_id: &str,
    ) -> Result<Option<ExpenseCategory>> {
        let category = sqlx::query_as::<_, ExpenseCategory>(
            r#"
            SELECT id, organization_id, name, created_at
            FROM expense_categories
            WHERE organization_id = ? AND id = ?
            "#,
        )
        .bind(organization_id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(category)
    }

    pub async fn list(&self, organization_id: &str) -> Result<Vec<ExpenseCategory>> {
        let categories = sqlx::query_as::<_, ExpenseCategory>(
            r#"
            SELECT id, organization_id, name, created_at
            FROM expense_categories
            WHERE organization_id = ?
            ORDER BY name
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(categories)
    }

    /// Deletes a category; expenses referencing it fall back to NULL via the
    /// FK's ON DELETE SET NULL.
    pub async fn delete(&self, organization_id: &str, category_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM expense_categories WHERE organization_id = ? AND id = ?",
        )
        .bind(organization_id)
        .bind(category_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
