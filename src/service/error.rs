//! Service error taxonomy

use crate::store::StoreError;
use crate::types::EncodingError;
use crate::validation::ValidationError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Distinct, inspectable failure kinds reported to the transport layer
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("statement not found: {0}")]
    NotFound(String),

    /// Found, but the stored record could not be decoded
    #[error("statement {id} is malformed: {reason}")]
    Malformed { id: String, reason: String },

    #[error("statement id already stored: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("store write failed: {0}")]
    StoreWriteFailure(String),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => ServiceError::NotFound(id),
            StoreError::Malformed { id, reason } => ServiceError::Malformed { id, reason },
            StoreError::Conflict { id } => ServiceError::Conflict(id),
            StoreError::Rejected(reason) => ServiceError::StoreWriteFailure(reason),
            StoreError::WriteFailed(e) => ServiceError::StoreWriteFailure(e.to_string()),
            StoreError::Encoding(e) => ServiceError::Encoding(e),
            StoreError::Unavailable(reason) => ServiceError::StoreUnavailable(reason),
        }
    }
}
