use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::organizations::OrgContext;
use crate::modules::subscriptions::models::{
    CreateSubscriptionRequest, SubscriptionStatus, UpdateSubscriptionRequest,
};
use crate::modules::subscriptions::services::SubscriptionService;

/// Query parameters for listing subscriptions
#[derive(Debug, Deserialize)]
pub struct ListSubscriptionsQuery {
    pub account_id: Option<String>,
    pub status: Option<SubscriptionStatus>,
}

/// Create a subscription
/// POST /subscriptions
pub async fn create_subscription(
    service: web::Data<Arc<SubscriptionService>>,
    ctx: OrgContext,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let subscription = service
        .create(&ctx.organization_id, request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(subscription))
}

/// List subscriptions
/// GET /subscriptions
pub async fn list_subscriptions(
    service: web::Data<Arc<SubscriptionService>>,
    ctx: OrgContext,
    query: web::Query<ListSubscriptionsQuery>,
) -> Result<HttpResponse, AppError> {
    let subscriptions = service
        .list(
            &ctx.organization_id,
            query.account_id.as_deref(),
            query.status,
        )
        .await?;

    Ok(HttpResponse::Ok().json(subscriptions))
}

/// Get one subscription
/// GET /subscriptions/{id}
pub async fn get_subscription(
    service: web::Data<Arc<SubscriptionService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let subscription = service.get(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(subscription))
}

/// Update a subscription
/// PATCH /subscriptions/{id}
pub async fn update_subscription(
    service: web::Data<Arc<SubscriptionService>>,
    ctx: OrgContext,
    path: web::Path<String>,
    request: web::Json<UpdateSubscriptionRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let subscription = service
        .update(&ctx.organization_id, &path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(subscription))
}

/// Bill the current cycle and advance the renewal date
/// POST /subscriptions/{id}/renew
pub async fn renew_subscription(
    service: web::Data<Arc<SubscriptionService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let subscription = service
        .renew(&ctx.organization_id, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(subscription))
}

/// Cancel a subscription
/// POST /subscriptions/{id}/cancel
pub async fn cancel_subscription(
    service: web::Data<Arc<SubscriptionService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let subscription = service
        .cancel(&ctx.organization_id, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(subscription))
}

/// Delete a subscription; billed expenses keep their history
/// DELETE /subscriptions/{id}
pub async fn delete_subscription(
    service: web::Data<Arc<SubscriptionService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    service.delete(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure subscription routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::post().to(create_subscription))
            .route("", web::get().to(list_subscriptions))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::patch().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription))
            .route("/{id}/renew", web::post().to(renew_subscription))
            .route("/{id}/cancel", web::post().to(cancel_subscription)),
    );
}
