use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::core::error::AppError;
use crate::modules::loans::models::{
    CreateLoanPaymentRequest, CreateLoanRequest, LoanPayment, LoanResponse, LoanStatus,
};
use crate::modules::loans::repositories::LoanFilters;
use crate::modules::loans::services::LoanService;
use crate::modules::organizations::OrgContext;

/// Query parameters for listing loans
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    pub account_id: Option<String>,
    pub team_member_id: Option<String>,
    pub status: Option<LoanStatus>,
}

impl From<ListLoansQuery> for LoanFilters {
    fn from(query: ListLoansQuery) -> Self {
        LoanFilters {
            account_id: query.account_id,
            team_member_id: query.team_member_id,
            status: query.status,
        }
    }
}

/// Response for a recorded payment: the ledger row plus the loan it changed
#[derive(Debug, Serialize)]
pub struct PaymentRecordedResponse {
    pub payment: LoanPayment,
    pub loan: LoanResponse,
}

/// Issue a loan
/// POST /loans
pub async fn create_loan(
    service: web::Data<Arc<LoanService>>,
    ctx: OrgContext,
    request: web::Json<CreateLoanRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let loan = service
        .create(&ctx.organization_id, request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(loan))
}

/// List loans
/// GET /loans
pub async fn list_loans(
    service: web::Data<Arc<LoanService>>,
    ctx: OrgContext,
    query: web::Query<ListLoansQuery>,
) -> Result<HttpResponse, AppError> {
    let loans = service
        .list(&ctx.organization_id, query.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(loans))
}

/// Get one loan
/// GET /loans/{id}
pub async fn get_loan(
    service: web::Data<Arc<LoanService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let loan = service.get(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(loan))
}

/// Record a payment against a loan
/// POST /loans/{id}/payments
pub async fn record_payment(
    service: web::Data<Arc<LoanService>>,
    ctx: OrgContext,
    path: web::Path<String>,
    request: web::Json<CreateLoanPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let (payment, loan) = service
        .record_payment(&ctx.organization_id, &path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(PaymentRecordedResponse { payment, loan }))
}

/// List the payment ledger of a loan
/// GET /loans/{id}/payments
pub async fn list_payments(
    service: web::Data<Arc<LoanService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let payments = service
        .list_payments(&ctx.organization_id, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(payments))
}

/// Cancel a loan
/// POST /loans/{id}/cancel
pub async fn cancel_loan(
    service: web::Data<Arc<LoanService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let loan = service
        .cancel(&ctx.organization_id, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(loan))
}

/// Mark a loan defaulted
/// POST /loans/{id}/default
pub async fn mark_defaulted(
    service: web::Data<Arc<LoanService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let loan = service
        .mark_defaulted(&ctx.organization_id, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(loan))
}

/// Delete a loan and its payment history
/// DELETE /loans/{id}
pub async fn delete_loan(
    service: web::Data<Arc<LoanService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    service.delete(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure loan routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/loans")
            .route("", web::post().to(create_loan))
            .route("", web::get().to(list_loans))
            .route("/{id}", web::get().to(get_loan))
            .route("/{id}", web::delete().to(delete_loan))
            .route("/{id}/payments", web::post().to(record_payment))
            .route("/{id}/payments", web::get().to(list_payments))
            .route("/{id}/cancel", web::post().to(cancel_loan))
            .route("/{id}/default", web::post().to(mark_defaulted)),
    );
}
