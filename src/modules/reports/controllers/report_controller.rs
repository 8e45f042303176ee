use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::organizations::OrgContext;
use crate::modules::reports::models::CreateReportRequest;
use crate::modules::reports::services::ReportService;

/// Query parameters for listing reports
#[derive(Debug, Deserialize)]
pub struct ListReportsQuery {
    pub account_id: Option<String>,
}

/// Generate and persist a report snapshot
/// POST /reports
pub async fn generate_report(
    service: web::Data<Arc<ReportService>>,
    ctx: OrgContext,
    request: web::Json<CreateReportRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let report = service
        .generate(&ctx.organization_id, request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(report))
}

/// List stored reports
/// GET /reports
pub async fn list_reports(
    service: web::Data<Arc<ReportService>>,
    ctx: OrgContext,
    query: web::Query<ListReportsQuery>,
) -> Result<HttpResponse, AppError> {
    let reports = service
        .list(&ctx.organization_id, query.account_id.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(reports))
}

/// Get one stored report snapshot
/// GET /reports/{id}
pub async fn get_report(
    service: web::Data<Arc<ReportService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let report = service.get(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Delete a stored report
/// DELETE /reports/{id}
pub async fn delete_report(
    service: web::Data<Arc<ReportService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    service.delete(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure report routes. Reports are write-once; there is no update.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("", web::post().to(generate_report))
            .route("", web::get().to(list_reports))
            .route("/{id}", web::get().to(get_report))
            .route("/{id}", web::delete().to(delete_report)),
    );
}
