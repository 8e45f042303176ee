use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::organizations::OrgContext;
use crate::modules::team::models::{
    AssignAccountRequest, CreateTeamMemberRequest, UpdateTeamMemberRequest,
};
use crate::modules::team::services::TeamService;

/// Create a team member
/// POST /team-members
pub async fn create_member(
    service: web::Data<Arc<TeamService>>,
    ctx: OrgContext,
    request: web::Json<CreateTeamMemberRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let member = service
        .create(&ctx.organization_id, request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(member))
}

/// List team members
/// GET /team-members
pub async fn list_members(
    service: web::Data<Arc<TeamService>>,
    ctx: OrgContext,
) -> Result<HttpResponse, AppError> {
    let members = service.list(&ctx.organization_id).await?;

    Ok(HttpResponse::Ok().json(members))
}

/// Get one member with their account assignments
/// GET /team-members/{id}
pub async fn get_member(
    service: web::Data<Arc<TeamService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let detail = service.get(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(detail))
}

/// Update a team member
/// PATCH /team-members/{id}
pub async fn update_member(
    service: web::Data<Arc<TeamService>>,
    ctx: OrgContext,
    path: web::Path<String>,
    request: web::Json<UpdateTeamMemberRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let member = service
        .update(&ctx.organization_id, &path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(member))
}

/// Delete a team member; rejected while loans are outstanding
/// DELETE /team-members/{id}
pub async fn delete_member(
    service: web::Data<Arc<TeamService>>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    service.delete(&ctx.organization_id, &path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Assign a member to an expense account
/// POST /team-members/{id}/accounts
pub async fn assign_account(
    service: web::Data<Arc<TeamService>>,
    ctx: OrgContext,
    path: web::Path<String>,
    request: web::Json<AssignAccountRequest>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let assignment = service
        .assign_account(&ctx.organization_id, &path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(assignment))
}

/// Remove a member's account assignment
/// DELETE /team-members/{id}/accounts/{account_id}
pub async fn remove_assignment(
    service: web::Data<Arc<TeamService>>,
    ctx: OrgContext,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    ctx.require_admin()?;

    let (member_id, account_id) = path.into_inner();
    service
        .remove_assignment(&ctx.organization_id, &member_id, &account_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure team member routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/team-members")
            .route("", web::post().to(create_member))
            .route("", web::get().to(list_members))
            .route("/{id}", web::get().to(get_member))
            .route("/{id}", web::patch().to(update_member))
            .route("/{id}", web::delete().to(delete_member))
            .route("/{id}/accounts", web::post().to(assign_account))
            .route("/{id}/accounts/{account_id}", web::delete().to(remove_assignment)),
    );
}
