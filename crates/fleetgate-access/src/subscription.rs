//! Subscription lifecycle service — plan selection, payment-proof
//! submission, and operator review orchestration.

use fleetgate_core::error::{FleetError, FleetResult};
use fleetgate_core::models::plan::Plan;
use fleetgate_core::models::subscription::{BillingPeriod, CreateSubscription, Subscription};
use fleetgate_core::pricing;
use fleetgate_core::repository::{PlanRepository, SubscriptionRepository};
use tracing::info;
use uuid::Uuid;

use crate::config::AccessConfig;
use crate::notify::{Notice, NotificationSink};
use crate::proof::{self, ProofStore, ProofUpload};

/// Input for the plan-selection flow.
#[derive(Debug)]
pub struct SelectPlanInput {
    pub tenant_id: Uuid,
    pub plan_id: Uuid,
    pub duration: BillingPeriod,
}

/// A priced plan/duration combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// Discounted price excluding VAT, in the currency's minor unit.
    pub price_ht: i64,
    /// Gross price with VAT applied.
    pub price_ttc: i64,
}

/// Subscription lifecycle service.
///
/// Generic over repository implementations so that this layer has no
/// dependency on the database crate. Preconditions that must hold at
/// write time (no duplicate pending subscription, single proof
/// submission) are enforced by the repository's transactional
/// operations; this service checks the read-side preconditions and
/// reports every outcome through the notification sink.
pub struct SubscriptionService<P, S, F, N>
where
    P: PlanRepository,
    S: SubscriptionRepository,
    F: ProofStore,
    N: NotificationSink,
{
    plan_repo: P,
    sub_repo: S,
    proof_store: F,
    sink: N,
    config: AccessConfig,
}

impl<P, S, F, N> SubscriptionService<P, S, F, N>
where
    P: PlanRepository,
    S: SubscriptionRepository,
    F: ProofStore,
    N: NotificationSink,
{
    pub fn new(plan_repo: P, sub_repo: S, proof_store: F, sink: N, config: AccessConfig) -> Self {
        Self {
            plan_repo,
            sub_repo,
            proof_store,
            sink,
            config,
        }
    }

    /// Discounted and VAT-inclusive price for a plan/duration.
    pub fn quote(&self, plan: &Plan, duration: BillingPeriod) -> PriceQuote {
        let price_ht = pricing::price_for(plan, duration);
        PriceQuote {
            price_ht,
            price_ttc: pricing::with_vat(price_ht, self.config.vat_rate),
        }
    }

    /// Open a new subscription for the selected plan and duration.
    ///
    /// The plan must exist and be active; an inactive plan reads as
    /// absent from the catalog. The duplicate-pending check happens
    /// inside the repository write.
    pub async fn select_plan(&self, input: SelectPlanInput) -> FleetResult<Subscription> {
        let result = self.select_plan_inner(&input).await;
        match &result {
            Ok(sub) => {
                info!(
                    tenant_id = %input.tenant_id,
                    subscription_id = %sub.id,
                    "Subscription opened, awaiting payment"
                );
                self.sink.notify(Notice::success(
                    "Plan selected. Proceed to payment to activate your subscription",
                ));
            }
            Err(e) => self.sink.notify(Notice::error(e.to_string())),
        }
        result
    }

    async fn select_plan_inner(&self, input: &SelectPlanInput) -> FleetResult<Subscription> {
        // 1. Resolve the plan; inactive plans are not selectable.
        let plan = self.plan_repo.get_by_id(input.plan_id).await?;
        if !plan.is_active {
            return Err(FleetError::NotFound {
                entity: "plan".into(),
                id: input.plan_id.to_string(),
            });
        }

        // 2. One atomic write: subscription row + tenant status flip.
        self.sub_repo
            .create_pending(CreateSubscription {
                tenant_id: input.tenant_id,
                plan_id: input.plan_id,
                duration: input.duration,
            })
            .await
    }

    /// Validate, store, and attach a payment proof.
    ///
    /// Succeeds exactly once per subscription; the repository refuses
    /// the conditional update for anything past `AwaitingPayment`.
    pub async fn submit_payment_proof(
        &self,
        tenant_id: Uuid,
        subscription_id: Uuid,
        upload: ProofUpload,
        reference: String,
    ) -> FleetResult<Subscription> {
        let result = self
            .submit_proof_inner(tenant_id, subscription_id, upload, reference)
            .await;
        match &result {
            Ok(_) => {
                info!(
                    tenant_id = %tenant_id,
                    subscription_id = %subscription_id,
                    "Payment proof submitted"
                );
                self.sink.notify(Notice::success(
                    "Payment proof received. Your subscription is awaiting validation",
                ));
            }
            Err(e) => self.sink.notify(Notice::error(e.to_string())),
        }
        result
    }

    async fn submit_proof_inner(
        &self,
        tenant_id: Uuid,
        subscription_id: Uuid,
        upload: ProofUpload,
        reference: String,
    ) -> FleetResult<Subscription> {
        // 1. Fast-fail validation before touching the object store.
        proof::validate(&upload, self.config.max_proof_bytes)?;

        // 2. Store the file under a tenant-scoped path.
        let proof_url = self.proof_store.store(tenant_id, upload).await?;

        // 3. One conditional write: subscription + tenant flip.
        self.sub_repo
            .submit_proof(tenant_id, subscription_id, proof_url, reference)
            .await
    }

    /// Operator verification of a submitted proof.
    pub async fn approve(&self, tenant_id: Uuid, subscription_id: Uuid) -> FleetResult<Subscription> {
        let result = self.sub_repo.mark_active(tenant_id, subscription_id).await;
        match &result {
            Ok(_) => {
                info!(tenant_id = %tenant_id, subscription_id = %subscription_id, "Subscription activated");
                self.sink
                    .notify(Notice::success("Subscription activated"));
            }
            Err(e) => self.sink.notify(Notice::error(e.to_string())),
        }
        result
    }

    /// Operator rejection of a submitted proof.
    pub async fn decline(&self, tenant_id: Uuid, subscription_id: Uuid) -> FleetResult<Subscription> {
        let result = self
            .sub_repo
            .mark_rejected(tenant_id, subscription_id)
            .await;
        match &result {
            Ok(_) => {
                info!(tenant_id = %tenant_id, subscription_id = %subscription_id, "Subscription rejected");
                self.sink
                    .notify(Notice::success("Payment proof rejected"));
            }
            Err(e) => self.sink.notify(Notice::error(e.to_string())),
        }
        result
    }
}
