//! Access-gating decision procedure.
//!
//! The tenant subscription state machine, expressed as a single pure
//! function over `(tenant.status, tenant.is_active, current
//! subscription)`. Callers (the gating guard) must re-read both
//! records fresh on every protected navigation (an operator can flip
//! tenant status between renders) and feed them here. This module
//! performs no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::subscription::{Subscription, SubscriptionStatus};
use crate::models::tenant::{Tenant, TenantStatus};

/// Named screen a gated navigation is redirected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "target")]
pub enum RedirectTarget {
    /// Plan-selection screen (no plan chosen yet).
    PlanSelection,
    /// Payment screen, carrying the pending subscription when one
    /// exists so the screen can resume it instead of starting over.
    Payment { subscription_id: Option<Uuid> },
    /// "Proof received, awaiting operator validation" screen.
    AwaitingValidation,
    /// Suspended screen (operator-forced or lapsed subscription).
    Suspended,
    /// Contact/support screen (proof was rejected).
    Contact,
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    Allow,
    Redirect(RedirectTarget),
}

/// Evaluate the gate policy table for one navigation.
///
/// Rows are evaluated in priority order, first match wins:
///
/// | condition                                  | result                  |
/// |--------------------------------------------|-------------------------|
/// | status = pending_selection                 | plan selection          |
/// | status = pending_payment                   | payment (+ pending id)  |
/// | status = awaiting_verification             | awaiting validation     |
/// | status = suspended                         | suspended               |
/// | status = rejected                          | contact                 |
/// | status = active, is_active = false         | suspended               |
/// | status = active, subscription lapsed       | suspended               |
/// | status = active, is_active = true          | allow                   |
/// | status unset, is_active = false            | plan selection          |
/// | status unset, is_active = true             | allow                   |
///
/// The lapse row is the time-driven `active → suspended` transition:
/// with no background scheduler, an `Active` subscription whose
/// `end_date < now` is treated as not-current right here, on every
/// read. The function is pure, so two evaluations with no intervening
/// writes always agree.
pub fn evaluate_gate(
    tenant: &Tenant,
    current: Option<&Subscription>,
    now: DateTime<Utc>,
) -> GateDecision {
    match tenant.status {
        Some(TenantStatus::PendingSelection) => GateDecision::Redirect(RedirectTarget::PlanSelection),
        Some(TenantStatus::PendingPayment) => {
            // Carry the pending subscription id when one exists, else
            // send the bare payment screen.
            let subscription_id = current
                .filter(|s| s.status == SubscriptionStatus::AwaitingPayment)
                .map(|s| s.id);
            GateDecision::Redirect(RedirectTarget::Payment { subscription_id })
        }
        Some(TenantStatus::AwaitingVerification) => {
            GateDecision::Redirect(RedirectTarget::AwaitingValidation)
        }
        Some(TenantStatus::Suspended) => GateDecision::Redirect(RedirectTarget::Suspended),
        Some(TenantStatus::Rejected) => GateDecision::Redirect(RedirectTarget::Contact),
        Some(TenantStatus::Active) => {
            if !tenant.is_active {
                return GateDecision::Redirect(RedirectTarget::Suspended);
            }
            match current {
                Some(s) if s.is_lapsed(now) => GateDecision::Redirect(RedirectTarget::Suspended),
                _ => GateDecision::Allow,
            }
        }
        None => {
            if tenant.is_active {
                GateDecision::Allow
            } else {
                GateDecision::Redirect(RedirectTarget::PlanSelection)
            }
        }
    }
}

/// Whether a `(tenant.status, current subscription.status)` pair is a
/// defined combination of the state machine.
///
/// The two fields are two views of one conceptual state; every write
/// path updates them in the same store transaction, so any pair
/// outside this mapping indicates a broken write path. Exposed for
/// tests and debug assertions.
pub fn reconcilable(
    tenant_status: Option<TenantStatus>,
    subscription_status: Option<SubscriptionStatus>,
) -> bool {
    match (tenant_status, subscription_status) {
        // Pre-subscription: no record yet.
        (Some(TenantStatus::PendingSelection), None) => true,
        // Unset legacy tenants are routed by the policy table whatever
        // their subscription history looks like.
        (None, _) => true,
        (Some(TenantStatus::PendingPayment), Some(SubscriptionStatus::AwaitingPayment)) => true,
        (
            Some(TenantStatus::AwaitingVerification),
            Some(SubscriptionStatus::AwaitingVerification),
        ) => true,
        // Active tenant, active subscription — possibly lapsed, which
        // the gate folds to expired on read.
        (Some(TenantStatus::Active), Some(SubscriptionStatus::Active)) => true,
        (Some(TenantStatus::Suspended), Some(SubscriptionStatus::Active)) => true,
        (Some(TenantStatus::Suspended), Some(SubscriptionStatus::Expired)) => true,
        (Some(TenantStatus::Rejected), Some(SubscriptionStatus::Rejected)) => true,
        _ => false,
    }
}
