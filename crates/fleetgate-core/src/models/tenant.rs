//! Tenant (rental agency) domain model.
//!
//! The tenant `status` field is one half of the subscription state
//! machine; the other half lives on the current subscription record.
//! The two are kept reconcilable by writing them in the same store
//! transaction (see `fleetgate-db`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant lifecycle status.
///
/// `Suspended` and `Rejected` are absorbing for the tenant's own
/// actions: only an operator action (or a new plan selection creating
/// a fresh subscription) leads back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    PendingSelection,
    PendingPayment,
    AwaitingVerification,
    Active,
    Suspended,
    Rejected,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::PendingSelection => "pending_selection",
            TenantStatus::PendingPayment => "pending_payment",
            TenantStatus::AwaitingVerification => "awaiting_verification",
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
            TenantStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_selection" => Some(TenantStatus::PendingSelection),
            "pending_payment" => Some(TenantStatus::PendingPayment),
            "awaiting_verification" => Some(TenantStatus::AwaitingVerification),
            "active" => Some(TenantStatus::Active),
            "suspended" => Some(TenantStatus::Suspended),
            "rejected" => Some(TenantStatus::Rejected),
            _ => None,
        }
    }
}

/// A rental agency subscribed to the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Display name of the agency.
    pub name: String,
    /// URL-safe unique identifier (e.g. `acme-rentals`).
    pub slug: String,
    /// `None` for legacy/unset rows; the gate policy table routes
    /// those explicitly rather than treating them as an error.
    pub status: Option<TenantStatus>,
    /// Operator kill-switch, distinct from `status`: a tenant can be
    /// `Active` and still forcibly suspended via `is_active = false`.
    pub is_active: bool,
    /// Current wizard step (1–4); meaningful only while
    /// `onboarding_completed` is false.
    pub onboarding_step: u8,
    /// Terminal flag — once true, onboarding is never re-entered.
    pub onboarding_completed: bool,
    /// `None` while the tenant is in pre-subscription flow.
    pub plan_id: Option<Uuid>,
    /// Arbitrary agency settings (final onboarding payload lands here).
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a new tenant.
///
/// New tenants start in `PendingSelection` with onboarding at step 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub slug: String,
}
