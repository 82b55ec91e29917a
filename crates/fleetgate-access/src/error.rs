//! Access-layer error types.

use fleetgate_core::error::FleetError;
use thiserror::Error;

/// Payment-proof validation failures, rejected before the object
/// store is ever invoked.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("unsupported proof file type: {0} (accepted: PDF, JPEG, PNG)")]
    UnsupportedType(String),

    #[error("proof file is {size} bytes, above the {max}-byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("proof file is empty")]
    Empty,
}

impl From<ProofError> for FleetError {
    fn from(err: ProofError) -> Self {
        FleetError::Validation(err.to_string())
    }
}

/// Onboarding progression failures.
#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("step {0} is outside the wizard range (1-4)")]
    StepOutOfRange(u8),

    #[error("onboarding is already completed")]
    AlreadyCompleted,

    #[error("onboarding requires an active tenant")]
    TenantNotActive,
}

impl From<OnboardingError> for FleetError {
    fn from(err: OnboardingError) -> Self {
        match err {
            OnboardingError::StepOutOfRange(_) => FleetError::Validation(err.to_string()),
            OnboardingError::AlreadyCompleted | OnboardingError::TenantNotActive => {
                FleetError::InvalidState(err.to_string())
            }
        }
    }
}
