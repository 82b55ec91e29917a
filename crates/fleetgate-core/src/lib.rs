//! Fleetgate Core — domain models, error taxonomy, repository traits,
//! and the pure decision logic of the tenant access-gating engine.
//!
//! This crate has no I/O: persistence lives in `fleetgate-db`,
//! orchestration in `fleetgate-access`.

pub mod error;
pub mod gate;
pub mod models;
pub mod onboarding;
pub mod pricing;
pub mod quota;
pub mod repository;

pub use error::{FleetError, FleetResult};
pub use gate::{GateDecision, RedirectTarget, evaluate_gate};
pub use quota::{ResourceKind, UsageSnapshot};
