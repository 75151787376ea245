/// Error types for Insights Service
///
/// Collaborator errors (store, classifier, LinkedIn, payment provider) are
/// converted into `AppError`, which renders as a JSON `{error, status}` body.
use crate::db::StoreError;
use crate::providers::{BillingError, ClassifierError, LinkedInError};
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for insights-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Post store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Sentiment classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Cache(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StoreUnavailable(_) | AppError::ClassifierUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            StoreError::InvalidRow(inner) => AppError::Internal(inner.to_string()),
        }
    }
}

impl From<ClassifierError> for AppError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::InvalidInput => AppError::Validation(err.to_string()),
            ClassifierError::Unavailable(msg) => AppError::ClassifierUnavailable(msg),
            ClassifierError::MalformedResponse(_) => AppError::Upstream(err.to_string()),
        }
    }
}

impl From<LinkedInError> for AppError {
    fn from(err: LinkedInError) -> Self {
        match err {
            LinkedInError::TokenExpired => AppError::Conflict(
                "LinkedIn authorization expired, reconnect the account".to_string(),
            ),
            LinkedInError::InvalidUrl(msg) => AppError::Internal(msg),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::UnknownPrice(_) => AppError::Validation(err.to_string()),
            BillingError::NotConfigured => AppError::Internal(err.to_string()),
            BillingError::Provider(_) => AppError::Upstream(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Cache(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
