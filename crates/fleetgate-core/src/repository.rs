//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped methods take a
//! `tenant_id` parameter so implementations can enforce data
//! isolation. Lifecycle methods that touch both the tenant row and a
//! subscription row must apply both writes in one atomic store
//! operation; a mid-sequence failure must never leave the two status
//! fields mutually inconsistent.

use uuid::Uuid;

use crate::error::FleetResult;
use crate::models::plan::{CreatePlan, Plan, UpdatePlan};
use crate::models::subscription::{CreateSubscription, Subscription};
use crate::models::tenant::{CreateTenant, Tenant};
use crate::quota::ResourceKind;

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Plan catalog (global scope, operator-managed).
pub trait PlanRepository: Send + Sync {
    fn create(&self, input: CreatePlan) -> impl Future<Output = FleetResult<Plan>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FleetResult<Plan>> + Send;
    fn update(&self, id: Uuid, input: UpdatePlan)
    -> impl Future<Output = FleetResult<Plan>> + Send;
    /// Soft-delete: sets `is_active = false`. Plans referenced by live
    /// subscriptions are never removed.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = FleetResult<()>> + Send;
    /// Plans currently offered for selection.
    fn list_active(&self) -> impl Future<Output = FleetResult<Vec<Plan>>> + Send;
}

/// Tenant records (global scope).
pub trait TenantRepository: Send + Sync {
    /// New tenants start in `PendingSelection`, onboarding step 1.
    fn create(&self, input: CreateTenant) -> impl Future<Output = FleetResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FleetResult<Tenant>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = FleetResult<Tenant>> + Send;
    /// Operator kill-switch (`is_active`), independent of `status`.
    fn set_active(&self, id: Uuid, active: bool) -> impl Future<Output = FleetResult<()>> + Send;
    /// Persist the current wizard step. Back navigation is allowed,
    /// so the step is range-checked but not forced monotonic.
    fn set_onboarding_step(
        &self,
        id: Uuid,
        step: u8,
    ) -> impl Future<Output = FleetResult<Tenant>> + Send;
    /// Terminal: stores the final-step payload in the tenant metadata,
    /// pins the step to the last one, and sets `onboarding_completed`.
    fn complete_onboarding(
        &self,
        id: Uuid,
        final_data: serde_json::Value,
    ) -> impl Future<Output = FleetResult<Tenant>> + Send;
}

/// Subscription records (tenant scope; the most recent row is the
/// tenant's current subscription).
pub trait SubscriptionRepository: Send + Sync {
    /// Open a new subscription in `AwaitingPayment` and flip the
    /// tenant to `PendingPayment` in the same store transaction.
    ///
    /// Fails with `NotFound` when the tenant record is absent, and
    /// with `Conflict` if the tenant already has a subscription in
    /// `AwaitingPayment` or `AwaitingVerification` — both enforced at
    /// write time, not read-then-write.
    fn create_pending(
        &self,
        input: CreateSubscription,
    ) -> impl Future<Output = FleetResult<Subscription>> + Send;

    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = FleetResult<Subscription>> + Send;

    /// The tenant's most recently created subscription, if any.
    fn current_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = FleetResult<Option<Subscription>>> + Send;

    /// Attach a payment proof: one conditional update that succeeds
    /// only while the subscription is in `AwaitingPayment`, moving it
    /// (and the tenant) to `AwaitingVerification`.
    ///
    /// Fails with `InvalidState` on a second submission and `NotFound`
    /// when the record is absent or belongs to another tenant.
    fn submit_proof(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        proof_url: String,
        reference: String,
    ) -> impl Future<Output = FleetResult<Subscription>> + Send;

    /// Operator verification: `AwaitingVerification → Active`,
    /// mirroring tenant status atomically.
    fn mark_active(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = FleetResult<Subscription>> + Send;

    /// Operator rejection: `AwaitingVerification → Rejected`,
    /// mirroring tenant status atomically.
    fn mark_rejected(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = FleetResult<Subscription>> + Send;

    /// Full subscription history, newest first (audit view).
    fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = FleetResult<PaginatedResult<Subscription>>> + Send;
}

/// Live resource counts for quota evaluation (tenant scope).
pub trait UsageRepository: Send + Sync {
    /// Count of live rows of one resource kind. Always computed at
    /// call time; implementations must not cache across calls.
    fn count(
        &self,
        tenant_id: Uuid,
        kind: ResourceKind,
    ) -> impl Future<Output = FleetResult<u64>> + Send;
}
