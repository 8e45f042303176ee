use crate::core::AppError;
use crate::modules::organizations::MembershipRepository;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use futures_util::future::LocalBoxFuture;
use sqlx::MySqlPool;
use std::future::{ready, Ready};
use std::rc::Rc;
use tracing::{debug, warn};

/// API key authentication middleware.
///
/// Keys are presented as `X-API-Key: <key_id>.<secret>`. The key id locates
/// the stored record, the secret is verified against its Argon2 hash, and the
/// authenticated membership is inserted into request extensions as an
/// `OrgContext` for extractors downstream.
pub struct ApiKeyAuth {
    pool: MySqlPool,
}

impl ApiKeyAuth {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
            pool: self.pool.clone(),
        }))
    }
}

pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
    pool: MySqlPool,
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let pool = self.pool.clone();

        Box::pin(async move {
            // Probes, metrics and root stay unauthenticated
            let path = req.path();
            if path == "/health" || path == "/ready" || path == "/metrics" || path == "/" {
                return svc.call(req).await;
            }

            let presented = req
                .headers()
                .get("X-API-Key")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| {
                    Error::from(AppError::unauthorized("Missing X-API-Key header"))
                })?;

            // Keys are "<key_id>.<secret>"; only the Argon2 hash of the
            // secret is stored, so the id is needed for the lookup
            let (key_id, secret) = presented.split_once('.').ok_or_else(|| {
                debug!(path = %path, "rejected malformed API key");
                Error::from(AppError::unauthorized("Invalid API key"))
            })?;

            let repo = MembershipRepository::new(pool);
            let membership = repo.find_active_key(key_id).await.map_err(Error::from)?;

            if !verify_api_key(secret, &membership.key_hash)? {
                warn!(path = %path, api_key_id = %membership.api_key_id, "rejected API key with bad secret");
                return Err(Error::from(AppError::unauthorized("Invalid API key")));
            }

            repo.touch_api_key(&membership.api_key_id).await;

            debug!(
                organization_id = %membership.organization_id,
                member_id = %membership.member_id,
                "request authenticated"
            );

            // Store tenancy context in request extensions for use in handlers
            req.extensions_mut().insert(membership.into_context());

            svc.call(req).await
        })
    }
}

/// Helper function to hash API key secrets using Argon2
pub fn hash_api_key(secret: &str) -> crate::core::Result<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
        Argon2,
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Failed to hash API key: {}", e)))
}

/// Helper function to verify API key secrets using Argon2
pub fn verify_api_key(secret: &str, hash: &str) -> crate::core::Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(secret.as_bytes(), &parsed_hash)
        .is_ok())
}
