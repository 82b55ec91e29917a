//! Quota evaluation service.
//!
//! Consulted when a resource-creation form loads, and again,
//! authoritatively, at the point of insertion. Usage is always read
//! live; two concurrent creations can still jointly overshoot the
//! limit, which is an accepted soft-limit condition (the hard limit,
//! if any, belongs to the store's own policy layer).

use fleetgate_core::error::{FleetError, FleetResult};
use fleetgate_core::quota::{self, ResourceKind, UsageSnapshot};
use fleetgate_core::repository::{PlanRepository, TenantRepository, UsageRepository};
use uuid::Uuid;

/// Quota evaluation service.
pub struct QuotaService<T, P, U>
where
    T: TenantRepository,
    P: PlanRepository,
    U: UsageRepository,
{
    tenant_repo: T,
    plan_repo: P,
    usage_repo: U,
}

impl<T, P, U> QuotaService<T, P, U>
where
    T: TenantRepository,
    P: PlanRepository,
    U: UsageRepository,
{
    pub fn new(tenant_repo: T, plan_repo: P, usage_repo: U) -> Self {
        Self {
            tenant_repo,
            plan_repo,
            usage_repo,
        }
    }

    /// Live usage of one resource kind against the tenant's plan.
    ///
    /// A tenant without a plan has no quota to evaluate; the gate
    /// would have redirected it before any creation form rendered.
    pub async fn evaluate(&self, tenant_id: Uuid, kind: ResourceKind) -> FleetResult<UsageSnapshot> {
        let tenant = self.tenant_repo.get_by_id(tenant_id).await?;
        let plan_id = tenant.plan_id.ok_or_else(|| FleetError::NotFound {
            entity: "plan".into(),
            id: format!("tenant={tenant_id}"),
        })?;
        let plan = self.plan_repo.get_by_id(plan_id).await?;
        let current = self.usage_repo.count(tenant_id, kind).await?;
        Ok(quota::snapshot(kind, plan.limit_for(kind), current))
    }

    /// Authoritative recheck at the insertion point.
    ///
    /// Returns the snapshot when the creation may proceed, a
    /// `Validation` error naming the limit when it may not.
    pub async fn ensure_can_add(
        &self,
        tenant_id: Uuid,
        kind: ResourceKind,
    ) -> FleetResult<UsageSnapshot> {
        let snapshot = self.evaluate(tenant_id, kind).await?;
        if !snapshot.can_add {
            return Err(FleetError::Validation(format!(
                "{} limit reached ({}/{})",
                kind.as_str(),
                snapshot.current,
                snapshot.limit.unwrap_or(0),
            )));
        }
        Ok(snapshot)
    }
}
