use crate::core::{AppError, Result};
use crate::modules::organizations::models::{MemberRole, OrgContext};
use sqlx::MySqlPool;
use tracing::warn;

/// An active API key joined with the membership it belongs to.
///
/// The secret is never stored; `key_hash` is the Argon2 hash the middleware
/// verifies the presented secret against.
#[derive(Debug, Clone)]
pub struct ApiKeyMembership {
    pub api_key_id: String,
    pub key_hash: String,
    pub organization_id: String,
    pub member_id: String,
    pub role: MemberRole,
}

impl ApiKeyMembership {
    pub fn into_context(self) -> OrgContext {
        OrgContext {
            organization_id: self.organization_id,
            member_id: self.member_id,
            role: self.role,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    api_key_id: String,
    key_hash: String,
    organization_id: String,
    member_id: String,
    role: String,
}

impl TryFrom<ApiKeyRow> for ApiKeyMembership {
    type Error = AppError;

    fn try_from(row: ApiKeyRow) -> Result<Self> {
        Ok(ApiKeyMembership {
            api_key_id: row.api_key_id,
            key_hash: row.key_hash,
            organization_id: row.organization_id,
            member_id: row.member_id,
            role: MemberRole::try_from(row.role)?,
        })
    }
}

/// Repository for organization memberships and their API keys.
pub struct MembershipRepository {
    pool: MySqlPool,
}

impl MembershipRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Looks up an active API key by its public id, joined with the owning
    /// membership. Unknown or inactive keys surface as `Unauthorized` so the
    /// caller cannot distinguish the two.
    pub async fn find_active_key(&self, key_id: &str) -> Result<ApiKeyMembership> {
        let row = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            SELECT ak.id AS api_key_id,
                   ak.key_hash,
                   om.organization_id,
                   om.id AS member_id,
                   om.role
            FROM api_keys ak
            JOIN organization_members om ON om.id = ak.member_id
            WHERE ak.id = ? AND ak.is_active = TRUE
            LIMIT 1
            "#,
        )
        .bind(key_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::unauthorized("Invalid API key"))?;

        ApiKeyMembership::try_from(row)
    }

    /// Updates the key's last_used_at timestamp. Failures are logged and
    /// swallowed; authentication already succeeded.
    pub async fn touch_api_key(&self, api_key_id: &str) {
        let result = sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = ?")
            .bind(api_key_id)
            .execute(&self.pool)
            .await;

        if let Err(e) = result {
            warn!(api_key_id = %api_key_id, error = %e, "failed to record API key use");
        }
    }
}
