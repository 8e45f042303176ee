use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::expenses::models::{CreateExpenseRequest, ExpenseType, UpdateExpenseRequest};
use crate::modules::expenses::repositories::ExpenseFilters;
use crate::modules::expenses::services::ExpenseService;
use crate::modules::organizations::OrgContext;

/// Query parameters for listing expenses
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub expense_type: Option<ExpenseType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl From<ListExpensesQuery> for ExpenseFilters {
    fn from(query: ListExpensesQuery) -> Self {
        ExpenseFilters {
            account_id: query.account_id,
            category_id: query.category_id,
            expense_type: query.expense_type,
            from: query.from,
            to: query.to,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

/// Record an expense
/// POST /expenses
pub async fn create_expense(
    service: web::Data<Arc<ExpenseService>>,
    ctx: OrgContext,
    request: web::Json<CreateExpenseRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let expense = service
        .create(&ctx.organization_id, request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(expense))
}

/// List expenses with optional filters
/// GET /expenses
pub async fn list_expenses(
    service: web::Data<Arc<ExpenseService>>,
    ctx: OrgContext,
    query: web::Query<ListExpensesQuery>,
) -> Result<HttpResponse, AppError> {
    let expenses = service
        .list(&ctx.organization_id, query.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(expenses))
}

/// Get one expense
/// GET /expenses/{id}
pub async fn get_expense(
    service: web::Data<Arc<ExpenseService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let expense = service.get(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(expense))
}

/// Update an expense
/// PATCH /expenses/{id}
pub async fn update_expense(
    service: web::Data<Arc<ExpenseService>>,
    ctx: OrgContext,
    path: web::Path<String>,
    request: web::Json<UpdateExpenseRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let expense = service
        .update(&ctx.organization_id, &path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(expense))
}

/// Delete an expense
/// DELETE /expenses/{id}
pub async fn delete_expense(
    service: web::Data<Arc<ExpenseService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    service.delete(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure expense routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/expenses")
            .route("", web::post().to(create_expense))
            .route("", web::get().to(list_expenses))
            .route("/{id}", web::get().to(get_expense))
            .route("/{id}", web::patch().to(update_expense))
            .route("/{id}", web::delete().to(delete_expense)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query: ListExpensesQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 0);
        assert!(query.account_id.is_none());
        assert!(query.expense_type.is_none());
    }

    #[test]
    fn test_list_query_parses_type_and_dates() {
        let query: ListExpensesQuery = serde_json::from_str(
            r#"{"expense_type": "team_salary", "from": "2025-01-01", "to": "2025-01-31"}"#,
        )
        .unwrap();
        assert_eq!(query.expense_type, Some(ExpenseType::TeamSalary));
        assert_eq!(query.from, Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert_eq!(query.to, Some(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()));
    }
}
