//! Onboarding progression service.
//!
//! Drives the 4-step wizard for tenants whose subscription has been
//! activated. The persisted step is the source of truth; the local
//! resume cache passed by the UI only matters when the store cannot
//! be read.

use fleetgate_core::error::FleetResult;
use fleetgate_core::models::tenant::{Tenant, TenantStatus};
use fleetgate_core::onboarding::{self, ResumePoint};
use fleetgate_core::repository::TenantRepository;
use tracing::info;
use uuid::Uuid;

use crate::error::OnboardingError;
use crate::notify::{Notice, NotificationSink};

/// Onboarding progression service.
pub struct OnboardingService<T, N>
where
    T: TenantRepository,
    N: NotificationSink,
{
    tenant_repo: T,
    sink: N,
}

impl<T, N> OnboardingService<T, N>
where
    T: TenantRepository,
    N: NotificationSink,
{
    pub fn new(tenant_repo: T, sink: N) -> Self {
        Self { tenant_repo, sink }
    }

    /// Persist the wizard step the tenant navigated to.
    ///
    /// Back navigation is allowed; only the 1–4 range and the
    /// terminal flag are enforced.
    pub async fn advance(&self, tenant_id: Uuid, step: u8) -> FleetResult<Tenant> {
        let result = self.advance_inner(tenant_id, step).await;
        if let Err(e) = &result {
            self.sink.notify(Notice::error(e.to_string()));
        }
        result
    }

    async fn advance_inner(&self, tenant_id: Uuid, step: u8) -> FleetResult<Tenant> {
        if !onboarding::step_in_range(step) {
            return Err(OnboardingError::StepOutOfRange(step).into());
        }

        let tenant = self.tenant_repo.get_by_id(tenant_id).await?;
        self.ensure_onboardable(&tenant)?;

        self.tenant_repo.set_onboarding_step(tenant_id, step).await
    }

    /// Finalize onboarding: persist the last-step payload and set the
    /// terminal flag. Never re-entered afterwards.
    pub async fn complete(
        &self,
        tenant_id: Uuid,
        final_data: serde_json::Value,
    ) -> FleetResult<Tenant> {
        let result = self.complete_inner(tenant_id, final_data).await;
        match &result {
            Ok(_) => {
                info!(tenant_id = %tenant_id, "Onboarding completed");
                self.sink
                    .notify(Notice::success("Setup complete, welcome aboard"));
            }
            Err(e) => self.sink.notify(Notice::error(e.to_string())),
        }
        result
    }

    async fn complete_inner(
        &self,
        tenant_id: Uuid,
        final_data: serde_json::Value,
    ) -> FleetResult<Tenant> {
        let tenant = self.tenant_repo.get_by_id(tenant_id).await?;
        self.ensure_onboardable(&tenant)?;

        self.tenant_repo
            .complete_onboarding(tenant_id, final_data)
            .await
    }

    /// Resolve where the wizard should resume for a page load.
    ///
    /// The persisted tenant record wins over `cached_step`; the cache
    /// is consulted only when the store read fails transiently. Once
    /// onboarding is completed the answer is `Completed` no matter
    /// what a stale cache claims.
    pub async fn resume(&self, tenant_id: Uuid, cached_step: Option<u8>) -> FleetResult<ResumePoint> {
        match self.tenant_repo.get_by_id(tenant_id).await {
            Ok(tenant) => Ok(onboarding::reconcile(
                Some(tenant.onboarding_step),
                tenant.onboarding_completed,
                cached_step,
            )),
            Err(e) if e.is_transient() && cached_step.is_some() => {
                // Offline resilience: fall back to the local cache,
                // flagged as such so the UI can re-sync later.
                Ok(onboarding::reconcile(None, false, cached_step))
            }
            Err(e) => Err(e),
        }
    }

    /// Onboarding is sequenced after subscription activation and is
    /// single-shot.
    fn ensure_onboardable(&self, tenant: &Tenant) -> Result<(), OnboardingError> {
        if tenant.onboarding_completed {
            return Err(OnboardingError::AlreadyCompleted);
        }
        if tenant.status != Some(TenantStatus::Active) {
            return Err(OnboardingError::TenantNotActive);
        }
        Ok(())
    }
}
