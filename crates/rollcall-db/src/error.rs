//! Database-specific error types and conversions.

use rollcall_core::error::RollcallError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed record: {0}")]
    InvalidRecord(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },
}

impl DbError {
    /// Classify a failed statement; unique index violations and record
    /// id collisions become [`DbError::AlreadyExists`].
    pub(crate) fn from_statement(err: surrealdb::Error, entity: &str) -> Self {
        let message = err.to_string();
        if message.contains("already contains") || message.contains("already exists") {
            DbError::AlreadyExists {
                entity: entity.to_string(),
            }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for RollcallError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RollcallError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => RollcallError::AlreadyExists { entity },
            other => RollcallError::Database(other.to_string()),
        }
    }
}
