//! Gating guard — the composition root invoked on every protected
//! navigation.
//!
//! Reads tenant and subscription state fresh each time (operator
//! actions can land between renders), feeds the pure policy function,
//! and fails closed: if state cannot be read, the user stays on the
//! current screen rather than being allowed through.

use chrono::Utc;
use fleetgate_core::error::FleetResult;
use fleetgate_core::gate::{GateDecision, RedirectTarget, evaluate_gate};
use fleetgate_core::models::subscription::Subscription;
use fleetgate_core::models::tenant::Tenant;
use fleetgate_core::repository::{SubscriptionRepository, TenantRepository};
use tracing::warn;
use uuid::Uuid;

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Allow,
    Redirect(RedirectTarget),
    /// State could not be read; retain the user on the current
    /// screen, never default to allow.
    Stay,
}

/// Navigation guard over the gate policy.
pub struct GatingGuard<T, S>
where
    T: TenantRepository,
    S: SubscriptionRepository,
{
    tenant_repo: T,
    sub_repo: S,
}

impl<T, S> GatingGuard<T, S>
where
    T: TenantRepository,
    S: SubscriptionRepository,
{
    pub fn new(tenant_repo: T, sub_repo: S) -> Self {
        Self {
            tenant_repo,
            sub_repo,
        }
    }

    /// Evaluate the gate for one navigation.
    ///
    /// Absence is a state, not an error: a missing tenant record
    /// routes to plan selection. A transient read failure is retried
    /// once; after that the guard fails closed.
    pub async fn check(&self, tenant_id: Uuid) -> GateOutcome {
        match self.read_state(tenant_id).await {
            Ok(Some((tenant, current))) => {
                match evaluate_gate(&tenant, current.as_ref(), Utc::now()) {
                    GateDecision::Allow => GateOutcome::Allow,
                    GateDecision::Redirect(target) => GateOutcome::Redirect(target),
                }
            }
            Ok(None) => GateOutcome::Redirect(RedirectTarget::PlanSelection),
            Err(first) if first.is_transient() => match self.read_state(tenant_id).await {
                Ok(Some((tenant, current))) => {
                    match evaluate_gate(&tenant, current.as_ref(), Utc::now()) {
                        GateDecision::Allow => GateOutcome::Allow,
                        GateDecision::Redirect(target) => GateOutcome::Redirect(target),
                    }
                }
                Ok(None) => GateOutcome::Redirect(RedirectTarget::PlanSelection),
                Err(second) => {
                    warn!(
                        tenant_id = %tenant_id,
                        error = %second,
                        "Gate state unreadable after retry, failing closed"
                    );
                    GateOutcome::Stay
                }
            },
            Err(e) => {
                warn!(tenant_id = %tenant_id, error = %e, "Gate state unreadable, failing closed");
                GateOutcome::Stay
            }
        }
    }

    /// Fresh read of tenant + current subscription. `Ok(None)` means
    /// the tenant record does not exist.
    async fn read_state(
        &self,
        tenant_id: Uuid,
    ) -> FleetResult<Option<(Tenant, Option<Subscription>)>> {
        let tenant = match self.tenant_repo.get_by_id(tenant_id).await {
            Ok(t) => t,
            Err(fleetgate_core::FleetError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let current = self.sub_repo.current_for_tenant(tenant_id).await?;
        Ok(Some((tenant, current)))
    }
}
