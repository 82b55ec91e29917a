//! Database-specific error types and conversions.

use fleetgate_core::error::FleetError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<DbError> for FleetError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => FleetError::NotFound { entity, id },
            DbError::Conflict(msg) => FleetError::Conflict(msg),
            DbError::InvalidState(msg) => FleetError::InvalidState(msg),
            // Store/driver failures are retryable from the caller's
            // point of view.
            other => FleetError::Transient(other.to_string()),
        }
    }
}
