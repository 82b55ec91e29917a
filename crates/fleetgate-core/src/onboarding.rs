//! Onboarding wizard step model and resume reconciliation.
//!
//! The 4-step wizard (welcome → agency-info → settings →
//! legal-terms/finalize) persists its step on the tenant; a local
//! resume cache exists only for resilience. On conflict the persisted
//! value wins — the cache is a UX optimization, never a source of
//! truth.

use serde::{Deserialize, Serialize};

pub const FIRST_STEP: u8 = 1;
pub const FINAL_STEP: u8 = 4;

/// Where a resume step was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSource {
    Persisted,
    LocalCache,
}

/// Resolved resume point for the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumePoint {
    /// Onboarding finished — never re-enter the wizard, regardless of
    /// whatever step a stale cache claims.
    Completed,
    Resume { source: StepSource, step: u8 },
}

/// True if `step` is a valid wizard step.
pub fn step_in_range(step: u8) -> bool {
    (FIRST_STEP..=FINAL_STEP).contains(&step)
}

/// Reconcile the persisted step with the local resume cache.
///
/// `persisted` is `None` when the store could not be read (the cache's
/// resilience role); `completed` comes from the persisted terminal
/// flag and wins over everything.
pub fn reconcile(
    persisted: Option<u8>,
    completed: bool,
    cached: Option<u8>,
) -> ResumePoint {
    if completed {
        return ResumePoint::Completed;
    }
    match persisted {
        Some(step) => ResumePoint::Resume {
            source: StepSource::Persisted,
            step: step.clamp(FIRST_STEP, FINAL_STEP),
        },
        None => match cached {
            Some(step) => ResumePoint::Resume {
                source: StepSource::LocalCache,
                step: step.clamp(FIRST_STEP, FINAL_STEP),
            },
            None => ResumePoint::Resume {
                source: StepSource::Persisted,
                step: FIRST_STEP,
            },
        },
    }
}
