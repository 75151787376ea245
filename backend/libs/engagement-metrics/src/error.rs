use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricsError {
    #[error("invalid post {id}: {reason}")]
    InvalidPost { id: Uuid, reason: String },

    #[error("unknown sentiment label: {0}")]
    UnknownLabel(String),
}

impl MetricsError {
    pub fn invalid_post(id: Uuid, reason: impl Into<String>) -> Self {
        MetricsError::InvalidPost {
            id,
            reason: reason.into(),
        }
    }
}
