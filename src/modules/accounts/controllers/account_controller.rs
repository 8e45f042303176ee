use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::accounts::models::{CreateAccountRequest, UpdateAccountRequest};
use crate::modules::accounts::services::AccountService;
use crate::modules::organizations::OrgContext;

/// Create an expense account
/// POST /accounts
pub async fn create_account(
    service: web::Data<Arc<AccountService>>,
    ctx: OrgContext,
    request: web::Json<CreateAccountRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let account = service
        .create(&ctx.organization_id, request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(account))
}

/// List the organization's accounts
/// GET /accounts
pub async fn list_accounts(
    service: web::Data<Arc<AccountService>>,
    ctx: OrgContext,
) -> Result<HttpResponse, AppError> {
    let accounts = service.list(&ctx.organization_id).await?;

    Ok(HttpResponse::Ok().json(accounts))
}

/// Get one account
/// GET /accounts/{id}
pub async fn get_account(
    service: web::Data<Arc<AccountService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let account = service.get(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(account))
}

/// Update name or type
/// PATCH /accounts/{id}
pub async fn update_account(
    service: web::Data<Arc<AccountService>>,
    ctx: OrgContext,
    path: web::Path<String>,
    request: web::Json<UpdateAccountRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let account = service
        .update(&ctx.organization_id, &path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(account))
}

/// Delete an account and everything recorded under it
/// DELETE /accounts/{id}
pub async fn delete_account(
    service: web::Data<Arc<AccountService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    service.delete(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure account routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/accounts")
            .route("", web::post().to(create_account))
            .route("", web::get().to(list_accounts))
            .route("/{id}", web::get().to(get_account))
            .route("/{id}", web::patch().to(update_account))
            .route("/{id}", web::delete().to(delete_account)),
    );
}
