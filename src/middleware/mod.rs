pub mod auth;
pub mod metrics;
pub mod rate_limit;
pub mod request_id;

pub use auth::{hash_api_key, verify_api_key, ApiKeyAuth};
pub use metrics::{Metrics, MetricsCollector, MetricsMiddleware};
pub use rate_limit::RateLimiter;
pub use request_id::{RequestId, RequestIdValue};
