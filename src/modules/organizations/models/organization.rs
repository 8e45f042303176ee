use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::core::{AppError, Result};

/// A tenant. Every record in the system hangs off exactly one organization,
/// and repositories always filter by its id.
///
/// Organizations themselves are provisioned by the external auth provider;
/// this service only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// Role of a member inside an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Owners and admins may mutate; plain members are read-only.
    pub fn can_mutate(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for MemberRole {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(AppError::validation(format!(
                "Invalid member role: {}",
                other
            ))),
        }
    }
}

/// Membership row linking a user to an organization with a role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationMember {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub role: MemberRole,
    pub created_at: NaiveDateTime,
}

/// The authenticated tenant scope for a request, resolved by the API-key
/// middleware and read by every handler.
#[derive(Debug, Clone)]
pub struct OrgContext {
    pub organization_id: String,
    pub member_id: String,
    pub role: MemberRole,
}

impl OrgContext {
    /// Guard for mutating endpoints: owner or admin role required.
    pub fn require_admin(&self) -> Result<()> {
        if self.role.can_mutate() {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "This operation requires the owner or admin role",
            ))
        }
    }
}

impl FromRequest for OrgContext {
    type Error = actix_web::Error;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<OrgContext>()
                .cloned()
                .ok_or_else(|| AppError::unauthorized("Missing organization context").into()),
        )
    }
}
