use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::core::error::AppError;
use crate::modules::currencies::models::{CurrencyRate, UpsertCurrencyRateRequest};
use crate::modules::currencies::services::CurrencyRateService;
use crate::modules::organizations::OrgContext;

#[derive(Debug, Serialize)]
struct ListRatesResponse {
    base_currency: String,
    rates: Vec<CurrencyRate>,
}

/// List stored rates for the organization
/// GET /currency-rates
pub async fn list_rates(
    service: web::Data<Arc<CurrencyRateService>>,
    ctx: OrgContext,
) -> Result<HttpResponse, AppError> {
    let rates = service.list(&ctx.organization_id).await?;

    Ok(HttpResponse::Ok().json(ListRatesResponse {
        base_currency: service.base_currency().to_string(),
        rates,
    }))
}

/// Create or replace a rate
/// PUT /currency-rates
pub async fn upsert_rate(
    service: web::Data<Arc<CurrencyRateService>>,
    ctx: OrgContext,
    request: web::Json<UpsertCurrencyRateRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let rate = service
        .upsert(&ctx.organization_id, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(rate))
}

/// Delete a stored rate
/// DELETE /currency-rates/{currency}
pub async fn delete_rate(
    service: web::Data<Arc<CurrencyRateService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    service.delete(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure currency rate routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/currency-rates")
            .route("", web::get().to(list_rates))
            .route("", web::put().to(upsert_rate))
            .route("/{currency}", web::delete().to(delete_rate)),
    );
}
