//! Fleetgate Access — subscription lifecycle orchestration, the
//! gating guard, quota evaluation, and onboarding progression.
//!
//! Generic over the `fleetgate-core` repository traits so this layer
//! has no dependency on the database crate.

pub mod config;
pub mod error;
pub mod guard;
pub mod notify;
pub mod onboarding;
pub mod proof;
pub mod quota;
pub mod subscription;

pub use config::AccessConfig;
pub use guard::{GateOutcome, GatingGuard};
pub use notify::{Notice, NoticeKind, NotificationSink};
pub use onboarding::OnboardingService;
pub use proof::{ProofStore, ProofUpload};
pub use quota::QuotaService;
pub use subscription::{PriceQuote, SelectPlanInput, SubscriptionService};
