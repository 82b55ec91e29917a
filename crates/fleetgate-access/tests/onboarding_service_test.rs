//! Integration tests for the onboarding wizard service.

use std::sync::{Arc, Mutex};

use fleetgate_access::notify::{Notice, NotificationSink};
use fleetgate_access::onboarding::OnboardingService;
use fleetgate_core::FleetError;
use fleetgate_core::models::plan::CreatePlan;
use fleetgate_core::models::subscription::{BillingPeriod, CreateSubscription};
use fleetgate_core::models::tenant::CreateTenant;
use fleetgate_core::onboarding::{FINAL_STEP, ResumePoint, StepSource};
use fleetgate_core::repository::{PlanRepository, SubscriptionRepository, TenantRepository};
use fleetgate_db::repository::{
    SurrealPlanRepository, SurrealSubscriptionRepository, SurrealTenantRepository,
};
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;

#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<Notice>>>);

impl NotificationSink for RecordingSink {
    fn notify(&self, notice: Notice) {
        self.0.lock().unwrap().push(notice);
    }
}

struct Harness {
    svc: OnboardingService<SurrealTenantRepository<Db>, RecordingSink>,
    tenant_repo: SurrealTenantRepository<Db>,
    tenant_id: Uuid,
}

/// Tenant brought all the way to an approved, active subscription so
/// the wizard is reachable.
async fn setup_active() -> Harness {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();

    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant = tenant_repo
        .create(CreateTenant {
            name: "Loc Auto Sud".into(),
            slug: "loc-auto-sud".into(),
        })
        .await
        .unwrap();

    let plan = SurrealPlanRepository::new(db.clone())
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
    let sub = sub_repo
        .create_pending(CreateSubscription {
            tenant_id: tenant.id,
            plan_id: plan.id,
            duration: BillingPeriod::SixMonths,
        })
        .await
        .unwrap();
    sub_repo
        .submit_proof(tenant.id, sub.id, "https://x/p.pdf".into(), "W-1".into())
        .await
        .unwrap();
    sub_repo.mark_active(tenant.id, sub.id).await.unwrap();

    let svc = OnboardingService::new(tenant_repo.clone(), RecordingSink::default());

    Harness {
        svc,
        tenant_repo,
        tenant_id: tenant.id,
    }
}

#[tokio::test]
async fn advance_persists_the_step() {
    let h = setup_active().await;

    let tenant = h.svc.advance(h.tenant_id, 2).await.unwrap();
    assert_eq!(tenant.onboarding_step, 2);
    assert!(!tenant.onboarding_completed);
}

#[tokio::test]
async fn back_navigation_is_allowed() {
    let h = setup_active().await;

    h.svc.advance(h.tenant_id, 3).await.unwrap();
    let tenant = h.svc.advance(h.tenant_id, 2).await.unwrap();
    assert_eq!(tenant.onboarding_step, 2);
}

#[tokio::test]
async fn out_of_range_steps_are_rejected() {
    let h = setup_active().await;

    for step in [0u8, 5, 200] {
        let err = h.svc.advance(h.tenant_id, step).await.unwrap_err();
        assert!(matches!(err, FleetError::Validation(_)), "step {step}");
    }
}

#[tokio::test]
async fn wizard_requires_an_active_tenant() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();

    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant = tenant_repo
        .create(CreateTenant {
            name: "Pending Co".into(),
            slug: "pending-co".into(),
        })
        .await
        .unwrap();

    let svc = OnboardingService::new(tenant_repo, RecordingSink::default());
    let err = svc.advance(tenant.id, 2).await.unwrap_err();
    assert!(matches!(err, FleetError::InvalidState(_)));
}

#[tokio::test]
async fn complete_is_terminal() {
    let h = setup_active().await;

    h.svc.advance(h.tenant_id, 3).await.unwrap();
    let tenant = h
        .svc
        .complete(h.tenant_id, json!({"fleet_size": 4, "agency": "Lyon"}))
        .await
        .unwrap();
    assert!(tenant.onboarding_completed);
    assert_eq!(tenant.onboarding_step, FINAL_STEP);
    assert_eq!(tenant.metadata["fleet_size"], 4);

    // Neither a re-complete nor a step write can reopen the wizard.
    let err = h.svc.complete(h.tenant_id, json!({})).await.unwrap_err();
    assert!(matches!(err, FleetError::InvalidState(_)));
    let err = h.svc.advance(h.tenant_id, 1).await.unwrap_err();
    assert!(matches!(err, FleetError::InvalidState(_)));
}

#[tokio::test]
async fn resume_prefers_the_persisted_step() {
    let h = setup_active().await;
    h.svc.advance(h.tenant_id, 3).await.unwrap();

    // A stale local cache claiming step 1 loses to the store.
    let point = h.svc.resume(h.tenant_id, Some(1)).await.unwrap();
    assert_eq!(
        point,
        ResumePoint::Resume {
            source: StepSource::Persisted,
            step: 3
        }
    );
}

/// Tenant repository that always fails with a transient error.
struct DownTenantRepo;

impl DownTenantRepo {
    fn fail<T>(&self) -> fleetgate_core::FleetResult<T> {
        Err(FleetError::Transient("connection reset".into()))
    }
}

impl TenantRepository for DownTenantRepo {
    async fn create(
        &self,
        _input: CreateTenant,
    ) -> fleetgate_core::FleetResult<fleetgate_core::models::tenant::Tenant> {
        self.fail()
    }
    async fn get_by_id(
        &self,
        _id: Uuid,
    ) -> fleetgate_core::FleetResult<fleetgate_core::models::tenant::Tenant> {
        self.fail()
    }
    async fn get_by_slug(
        &self,
        _slug: &str,
    ) -> fleetgate_core::FleetResult<fleetgate_core::models::tenant::Tenant> {
        self.fail()
    }
    async fn set_active(&self, _id: Uuid, _active: bool) -> fleetgate_core::FleetResult<()> {
        self.fail()
    }
    async fn set_onboarding_step(
        &self,
        _id: Uuid,
        _step: u8,
    ) -> fleetgate_core::FleetResult<fleetgate_core::models::tenant::Tenant> {
        self.fail()
    }
    async fn complete_onboarding(
        &self,
        _id: Uuid,
        _final_data: serde_json::Value,
    ) -> fleetgate_core::FleetResult<fleetgate_core::models::tenant::Tenant> {
        self.fail()
    }
}

#[tokio::test]
async fn resume_falls_back_to_the_cache_when_the_store_is_down() {
    let svc = OnboardingService::new(DownTenantRepo, RecordingSink::default());

    let point = svc.resume(Uuid::new_v4(), Some(3)).await.unwrap();
    assert_eq!(
        point,
        ResumePoint::Resume {
            source: StepSource::LocalCache,
            step: 3
        }
    );

    // Without a cache there is nothing to fall back to.
    let err = svc.resume(Uuid::new_v4(), None).await.unwrap_err();
    assert!(matches!(err, FleetError::Transient(_)));
}

#[tokio::test]
async fn resume_after_completion_ignores_any_cache() {
    let h = setup_active().await;
    h.svc.complete(h.tenant_id, json!({})).await.unwrap();

    let point = h.svc.resume(h.tenant_id, Some(2)).await.unwrap();
    assert_eq!(point, ResumePoint::Completed);

    // The stored flag survives a direct read too.
    let tenant = h.tenant_repo.get_by_id(h.tenant_id).await.unwrap();
    assert!(tenant.onboarding_completed);
}
