//! Error types for the fleetgate system.
//!
//! The five kinds mirror the propagation policy: the first four are
//! business-rule violations surfaced directly to the user and never
//! retried; `Transient` is safe to retry once before surfacing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transient store error: {0}")]
    Transient(String),
}

impl FleetError {
    /// True for failures that may be retried once by the caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, FleetError::Transient(_))
    }
}

pub type FleetResult<T> = Result<T, FleetError>;
