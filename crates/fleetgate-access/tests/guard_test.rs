//! Integration tests for the navigation gating guard across the full
//! subscription lifecycle, plus fail-closed behavior on store errors.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, Utc};
use fleetgate_access::guard::{GateOutcome, GatingGuard};
use fleetgate_core::error::{FleetError, FleetResult};
use fleetgate_core::gate::RedirectTarget;
use fleetgate_core::models::plan::{CreatePlan, Plan};
use fleetgate_core::models::subscription::{
    BillingPeriod, CreateSubscription, Subscription,
};
use fleetgate_core::models::tenant::{CreateTenant, Tenant};
use fleetgate_core::repository::{
    PaginatedResult, Pagination, PlanRepository, SubscriptionRepository, TenantRepository,
};
use fleetgate_db::repository::{
    SurrealPlanRepository, SurrealSubscriptionRepository, SurrealTenantRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;

struct Harness {
    db: Surreal<Db>,
    tenant_repo: SurrealTenantRepository<Db>,
    sub_repo: SurrealSubscriptionRepository<Db>,
    tenant_id: Uuid,
    plan: Plan,
}

impl Harness {
    fn guard(&self) -> GatingGuard<SurrealTenantRepository<Db>, SurrealSubscriptionRepository<Db>> {
        GatingGuard::new(self.tenant_repo.clone(), self.sub_repo.clone())
    }
}

async fn setup() -> Harness {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();

    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant = tenant_repo
        .create(CreateTenant {
            name: "Garage Nord".into(),
            slug: "garage-nord".into(),
        })
        .await
        .unwrap();

    let plan_repo = SurrealPlanRepository::new(db.clone());
    let plan = plan_repo
        .create(CreatePlan {
            name: "Starter".into(),
            currency: "EUR".into(),
            price_6_months: 500,
            price_12_months: 900,
            discount_6_months: 0,
            discount_12_months: 0,
            max_vehicles: 2,
            max_users: 1,
            max_clients: 0,
            max_contracts: 0,
            module_assistance: false,
        })
        .await
        .unwrap();

    let sub_repo = SurrealSubscriptionRepository::new(db.clone());

    Harness {
        db,
        tenant_repo,
        sub_repo,
        tenant_id: tenant.id,
        plan,
    }
}

async fn open_subscription(h: &Harness) -> Subscription {
    h.sub_repo
        .create_pending(CreateSubscription {
            tenant_id: h.tenant_id,
            plan_id: h.plan.id,
            duration: BillingPeriod::SixMonths,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn unknown_tenant_goes_to_plan_selection() {
    let h = setup().await;
    let outcome = h.guard().check(Uuid::new_v4()).await;
    assert_eq!(outcome, GateOutcome::Redirect(RedirectTarget::PlanSelection));
}

#[tokio::test]
async fn fresh_tenant_goes_to_plan_selection() {
    let h = setup().await;
    let outcome = h.guard().check(h.tenant_id).await;
    assert_eq!(outcome, GateOutcome::Redirect(RedirectTarget::PlanSelection));
}

#[tokio::test]
async fn pending_payment_redirect_carries_the_subscription_id() {
    let h = setup().await;
    let sub = open_subscription(&h).await;

    let outcome = h.guard().check(h.tenant_id).await;
    assert_eq!(
        outcome,
        GateOutcome::Redirect(RedirectTarget::Payment {
            subscription_id: Some(sub.id)
        })
    );
}

#[tokio::test]
async fn awaiting_verification_parks_on_the_validation_screen() {
    let h = setup().await;
    let sub = open_subscription(&h).await;
    h.sub_repo
        .submit_proof(h.tenant_id, sub.id, "https://x/y.pdf".into(), "W-1".into())
        .await
        .unwrap();

    let outcome = h.guard().check(h.tenant_id).await;
    assert_eq!(
        outcome,
        GateOutcome::Redirect(RedirectTarget::AwaitingValidation)
    );
}

#[tokio::test]
async fn active_subscription_is_allowed_through() {
    let h = setup().await;
    let sub = open_subscription(&h).await;
    h.sub_repo
        .submit_proof(h.tenant_id, sub.id, "https://x/y.pdf".into(), "W-2".into())
        .await
        .unwrap();
    h.sub_repo.mark_active(h.tenant_id, sub.id).await.unwrap();

    assert_eq!(h.guard().check(h.tenant_id).await, GateOutcome::Allow);
}

#[tokio::test]
async fn rejected_tenant_is_routed_to_contact() {
    let h = setup().await;
    let sub = open_subscription(&h).await;
    h.sub_repo
        .submit_proof(h.tenant_id, sub.id, "https://x/y.pdf".into(), "W-3".into())
        .await
        .unwrap();
    h.sub_repo.mark_rejected(h.tenant_id, sub.id).await.unwrap();

    let outcome = h.guard().check(h.tenant_id).await;
    assert_eq!(outcome, GateOutcome::Redirect(RedirectTarget::Contact));
}

#[tokio::test]
async fn kill_switch_overrides_an_active_subscription() {
    let h = setup().await;
    let sub = open_subscription(&h).await;
    h.sub_repo
        .submit_proof(h.tenant_id, sub.id, "https://x/y.pdf".into(), "W-4".into())
        .await
        .unwrap();
    h.sub_repo.mark_active(h.tenant_id, sub.id).await.unwrap();

    h.tenant_repo.set_active(h.tenant_id, false).await.unwrap();

    let outcome = h.guard().check(h.tenant_id).await;
    assert_eq!(outcome, GateOutcome::Redirect(RedirectTarget::Suspended));
}

#[tokio::test]
async fn lapsed_subscription_suspends_without_any_write() {
    let h = setup().await;
    let sub = open_subscription(&h).await;
    h.sub_repo
        .submit_proof(h.tenant_id, sub.id, "https://x/y.pdf".into(), "W-5".into())
        .await
        .unwrap();
    h.sub_repo.mark_active(h.tenant_id, sub.id).await.unwrap();

    // Age the subscription past its end date.
    h.db.query("UPDATE subscription SET end_date = $end WHERE tenant_id = $tenant_id")
        .bind(("end", Utc::now() - Duration::days(1)))
        .bind(("tenant_id", h.tenant_id.to_string()))
        .await
        .unwrap()
        .check()
        .unwrap();

    let outcome = h.guard().check(h.tenant_id).await;
    assert_eq!(outcome, GateOutcome::Redirect(RedirectTarget::Suspended));

    // Lapse is derived at read time; the stored rows keep saying active.
    let tenant = h.tenant_repo.get_by_id(h.tenant_id).await.unwrap();
    assert_eq!(
        tenant.status,
        Some(fleetgate_core::models::tenant::TenantStatus::Active)
    );
    let stored = h.sub_repo.get_by_id(h.tenant_id, sub.id).await.unwrap();
    assert_eq!(
        stored.status,
        fleetgate_core::models::subscription::SubscriptionStatus::Active
    );
}

/// Tenant repository that always fails with a transient error,
/// counting the reads it refused.
struct DownTenantRepo {
    calls: Arc<AtomicUsize>,
}

impl DownTenantRepo {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    fn fail<T>(&self) -> FleetResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FleetError::Transient("connection reset".into()))
    }
}

impl TenantRepository for DownTenantRepo {
    async fn create(&self, _input: CreateTenant) -> FleetResult<Tenant> {
        self.fail()
    }
    async fn get_by_id(&self, _id: Uuid) -> FleetResult<Tenant> {
        self.fail()
    }
    async fn get_by_slug(&self, _slug: &str) -> FleetResult<Tenant> {
        self.fail()
    }
    async fn set_active(&self, _id: Uuid, _active: bool) -> FleetResult<()> {
        self.fail()
    }
    async fn set_onboarding_step(&self, _id: Uuid, _step: u8) -> FleetResult<Tenant> {
        self.fail()
    }
    async fn complete_onboarding(
        &self,
        _id: Uuid,
        _final_data: serde_json::Value,
    ) -> FleetResult<Tenant> {
        self.fail()
    }
}

/// Subscription repository that always fails with a transient error.
struct DownSubRepo;

impl DownSubRepo {
    fn fail<T>(&self) -> FleetResult<T> {
        Err(FleetError::Transient("connection reset".into()))
    }
}

impl SubscriptionRepository for DownSubRepo {
    async fn create_pending(&self, _input: CreateSubscription) -> FleetResult<Subscription> {
        self.fail()
    }
    async fn get_by_id(&self, _tenant_id: Uuid, _id: Uuid) -> FleetResult<Subscription> {
        self.fail()
    }
    async fn current_for_tenant(&self, _tenant_id: Uuid) -> FleetResult<Option<Subscription>> {
        self.fail()
    }
    async fn submit_proof(
        &self,
        _tenant_id: Uuid,
        _id: Uuid,
        _proof_url: String,
        _reference: String,
    ) -> FleetResult<Subscription> {
        self.fail()
    }
    async fn mark_active(&self, _tenant_id: Uuid, _id: Uuid) -> FleetResult<Subscription> {
        self.fail()
    }
    async fn mark_rejected(&self, _tenant_id: Uuid, _id: Uuid) -> FleetResult<Subscription> {
        self.fail()
    }
    async fn list_for_tenant(
        &self,
        _tenant_id: Uuid,
        _pagination: Pagination,
    ) -> FleetResult<PaginatedResult<Subscription>> {
        self.fail()
    }
}

#[tokio::test]
async fn unreadable_state_fails_closed() {
    let (tenant_repo, _calls) = DownTenantRepo::new();
    let guard = GatingGuard::new(tenant_repo, DownSubRepo);

    let outcome = guard.check(Uuid::new_v4()).await;
    assert_eq!(outcome, GateOutcome::Stay);
}

#[tokio::test]
async fn transient_failure_is_retried_exactly_once() {
    let (tenant_repo, calls) = DownTenantRepo::new();
    let guard = GatingGuard::new(tenant_repo, DownSubRepo);

    assert_eq!(guard.check(Uuid::new_v4()).await, GateOutcome::Stay);
    // One initial read plus one retry, never more.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
