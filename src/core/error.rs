use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// A conversion needs a stored rate that does not exist for the organization
    #[error("Rate not found: {0}")]
    RateNotFound(String),

    /// Stored or custom rate is zero, negative, or malformed
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    /// Proposed loan payment exceeds the outstanding balance
    #[error("Payment exceeds balance: {0}")]
    PaymentExceedsBalance(String),

    /// Payment attempted on a paid or cancelled loan
    #[error("Loan closed: {0}")]
    LoanClosed(String),

    /// Subscription renewal date set earlier than today
    #[error("Past renewal date: {0}")]
    PastRenewalDate(String),

    /// Currency rate still referenced by accounts, expenses, subscriptions or loans
    #[error("Currency in use: {0}")]
    CurrencyInUse(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid API key
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but lacking the owner/admin role for a mutation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidRate(_) => StatusCode::BAD_REQUEST,
            AppError::PastRenewalDate(_) => StatusCode::BAD_REQUEST,
            AppError::RateNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PaymentExceedsBalance(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LoanClosed(_) => StatusCode::CONFLICT,
            AppError::CurrencyInUse(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn rate_not_found(msg: impl Into<String>) -> Self {
        AppError::RateNotFound(msg.into())
    }

    pub fn invalid_rate(msg: impl Into<String>) -> Self {
        AppError::InvalidRate(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
