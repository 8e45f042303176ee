use actix_web::{web, HttpResponse};
use sqlx::MySqlPool;

use crate::core::error::AppError;
use crate::modules::expenses::models::{CreateCategoryRequest, ExpenseCategory};
use crate::modules::expenses::repositories::CategoryRepository;
use crate::modules::organizations::OrgContext;

/// Create a category
/// POST /categories
pub async fn create_category(
    pool: web::Data<MySqlPool>,
    ctx: OrgContext,
    request: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let repository = CategoryRepository::new(pool.get_ref().clone());
    let category = ExpenseCategory::new(ctx.organization_id.clone(), request.into_inner().name)?;
    let created = repository.create(&category).await?;

    Ok(HttpResponse::Created().json(created))
}

/// List categories
/// GET /categories
pub async fn list_categories(
    pool: web::Data<MySqlPool>,
    ctx: OrgContext,
) -> Result<HttpResponse, AppError> {
    let repository = CategoryRepository::new(pool.get_ref().clone());
    let categories = repository.list(&ctx.organization_id).await?;

    Ok(HttpResponse::Ok().json(categories))
}

/// Delete a category; expenses keep their rows with a cleared category
/// DELETE /categories/{id}
pub async fn delete_category(
    pool: web::Data<MySqlPool>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let repository = CategoryRepository::new(pool.get_ref().clone());
    let deleted = repository
        .delete(&ctx.organization_id, &path.into_inner())
        .await?;

    if !deleted {
        return Err(AppError::not_found("Category not found"));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Configure category routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/categories")
            .route("", web::post().to(create_category))
            .route("", web::get().to(list_categories))
            .route("/{id}", web::delete().to(delete_category)),
    );
}
