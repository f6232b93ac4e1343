//! Error types for the Rollcall system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RollcallError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Invalid operation: {reason}")]
    InvalidOperation { reason: String },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RollcallError {
    /// HTTP status code the API layer answers with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            RollcallError::NotFound { .. } => 404,
            RollcallError::PermissionDenied { .. } => 403,
            RollcallError::InvalidOperation { .. } => 400,
            RollcallError::AlreadyExists { .. } | RollcallError::Conflict { .. } => 409,
            RollcallError::Validation { .. } => 422,
            RollcallError::Database(_) | RollcallError::Internal(_) => 500,
        }
    }
}

pub type RollcallResult<T> = Result<T, RollcallError>;
