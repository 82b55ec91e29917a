//! SurrealDB implementation of [`SubscriptionRepository`].
//!
//! Every lifecycle transition that touches both the subscription row
//! and the tenant row runs as one `BEGIN/COMMIT` transaction with a
//! conditional `UPDATE ... WHERE status = ...` guard. A precondition
//! failure aborts via `THROW`, so the two status fields can never
//! diverge mid-write and two concurrent submissions can never both
//! succeed.

use chrono::{DateTime, Months, Utc};
use fleetgate_core::error::FleetResult;
use fleetgate_core::models::subscription::{
    BillingPeriod, CreateSubscription, Subscription, SubscriptionStatus,
};
use fleetgate_core::repository::{PaginatedResult, Pagination, SubscriptionRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

// Sentinels thrown inside transactions and mapped back to error kinds.
const THROW_TENANT_NOT_FOUND: &str = "tenant_not_found";
const THROW_DUPLICATE_PENDING: &str = "pending_subscription_exists";
const THROW_NOT_APPLICABLE: &str = "transition_not_applicable";

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct SubscriptionRowWithId {
    record_id: String,
    tenant_id: String,
    plan_id: String,
    duration_months: i64,
    status: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    proof_url: Option<String>,
    reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SubscriptionRowWithId {
    fn try_into_subscription(self) -> Result<Subscription, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        let plan_id = Uuid::parse_str(&self.plan_id)
            .map_err(|e| DbError::Migration(format!("invalid plan UUID: {e}")))?;
        let duration = u32::try_from(self.duration_months)
            .ok()
            .and_then(BillingPeriod::from_months)
            .ok_or_else(|| {
                DbError::Migration(format!("invalid duration: {}", self.duration_months))
            })?;
        let status = SubscriptionStatus::parse(&self.status)
            .ok_or_else(|| DbError::Migration(format!("invalid status: {}", self.status)))?;
        Ok(Subscription {
            id,
            tenant_id,
            plan_id,
            duration,
            status,
            start_date: self.start_date,
            end_date: self.end_date,
            proof_url: self.proof_url,
            reference: self.reference,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Like [`surrealdb::IndexedResults::check`], but when a transaction
/// aborts the per-statement errors include generic "query was not
/// executed" entries alongside the one carrying the `THROW` sentinel;
/// prefer the latter so callers can match on the sentinel text.
fn check_transaction(mut resp: surrealdb::IndexedResults) -> Result<(), surrealdb::Error> {
    let mut errors = resp.take_errors();
    if errors.is_empty() {
        return Ok(());
    }
    let key = errors
        .iter()
        .find(|(_, e)| e.to_string().contains("An error occurred"))
        .map(|(k, _)| *k)
        .unwrap_or_else(|| *errors.keys().next().unwrap());
    Err(errors.remove(&key).unwrap())
}

/// SurrealDB implementation of the Subscription repository.
#[derive(Clone)]
pub struct SurrealSubscriptionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSubscriptionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Run a guarded review transition (`AwaitingVerification` →
    /// `new_status`), mirroring the tenant status in the same
    /// transaction.
    async fn review(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        new_status: SubscriptionStatus,
    ) -> FleetResult<Subscription> {
        let query = format!(
            "BEGIN TRANSACTION; \
             LET $updated = (UPDATE type::record('subscription', $id) SET \
                 status = '{status}', updated_at = time::now() \
                 WHERE tenant_id = $tenant_id \
                 AND status = 'awaiting_verification'); \
             IF array::len($updated) == 0 {{ THROW '{throw}' }}; \
             UPDATE type::record('tenant', $tenant_id) SET \
                 status = '{status}', updated_at = time::now(); \
             COMMIT TRANSACTION;",
            status = new_status.as_str(),
            throw = THROW_NOT_APPLICABLE,
        );

        let outcome = self
            .db
            .query(query)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let outcome = check_transaction(outcome);

        if let Err(e) = outcome {
            return Err(self.classify_guard_failure(tenant_id, id, e).await);
        }

        self.get_by_id(tenant_id, id).await
    }

    /// A guard `THROW` aborts the whole transaction; distinguish "no
    /// such record for this tenant" from "record is in the wrong
    /// state" with one follow-up read.
    async fn classify_guard_failure(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        err: surrealdb::Error,
    ) -> fleetgate_core::FleetError {
        let msg = err.to_string();
        if !msg.contains(THROW_NOT_APPLICABLE) {
            return DbError::from(err).into();
        }
        match self.get_by_id(tenant_id, id).await {
            Ok(existing) => fleetgate_core::FleetError::InvalidState(format!(
                "subscription {id} is {}, not awaiting the requested transition",
                existing.status.as_str()
            )),
            Err(e) => e,
        }
    }
}

impl<C: Connection> SubscriptionRepository for SurrealSubscriptionRepository<C> {
    async fn create_pending(&self, input: CreateSubscription) -> FleetResult<Subscription> {
        let id = Uuid::new_v4();
        let start_date = Utc::now();
        let end_date = start_date + Months::new(input.duration.months());

        let query = format!(
            "BEGIN TRANSACTION; \
             LET $t = (SELECT * FROM type::record('tenant', $tenant_id)); \
             IF array::len($t) == 0 {{ THROW '{missing}' }}; \
             LET $pending = (SELECT count() AS total FROM subscription \
                 WHERE tenant_id = $tenant_id \
                 AND status IN ['awaiting_payment', 'awaiting_verification'] \
                 GROUP ALL); \
             IF array::len($pending) > 0 AND $pending[0].total > 0 \
                 {{ THROW '{throw}' }}; \
             CREATE type::record('subscription', $id) SET \
                 tenant_id = $tenant_id, \
                 plan_id = $plan_id, \
                 duration_months = $months, \
                 status = 'awaiting_payment', \
                 start_date = $start_date, \
                 end_date = $end_date, \
                 proof_url = NONE, \
                 reference = NONE; \
             UPDATE type::record('tenant', $tenant_id) SET \
                 status = 'pending_payment', \
                 plan_id = $plan_id, \
                 updated_at = time::now(); \
             COMMIT TRANSACTION;",
            missing = THROW_TENANT_NOT_FOUND,
            throw = THROW_DUPLICATE_PENDING,
        );

        let outcome = self
            .db
            .query(query)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("plan_id", input.plan_id.to_string()))
            .bind(("months", i64::from(input.duration.months())))
            .bind(("start_date", start_date))
            .bind(("end_date", end_date))
            .await
            .map_err(DbError::from)?;
        let outcome = check_transaction(outcome);

        if let Err(e) = outcome {
            let msg = e.to_string();
            if msg.contains(THROW_TENANT_NOT_FOUND) {
                return Err(DbError::NotFound {
                    entity: "tenant".into(),
                    id: input.tenant_id.to_string(),
                }
                .into());
            }
            if msg.contains(THROW_DUPLICATE_PENDING) {
                return Err(DbError::Conflict(format!(
                    "tenant {} already has a pending subscription",
                    input.tenant_id
                ))
                .into());
            }
            return Err(DbError::from(e).into());
        }

        self.get_by_id(input.tenant_id, id).await
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> FleetResult<Subscription> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('subscription', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SubscriptionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "subscription".into(),
            id: id_str,
        })?;

        Ok(row.try_into_subscription()?)
    }

    async fn current_for_tenant(&self, tenant_id: Uuid) -> FleetResult<Option<Subscription>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM subscription \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at DESC \
                 LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SubscriptionRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_subscription()?)),
            None => Ok(None),
        }
    }

    async fn submit_proof(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        proof_url: String,
        reference: String,
    ) -> FleetResult<Subscription> {
        let query = format!(
            "BEGIN TRANSACTION; \
             LET $updated = (UPDATE type::record('subscription', $id) SET \
                 status = 'awaiting_verification', \
                 proof_url = $proof_url, \
                 reference = $reference, \
                 updated_at = time::now() \
                 WHERE tenant_id = $tenant_id \
                 AND status = 'awaiting_payment'); \
             IF array::len($updated) == 0 {{ THROW '{throw}' }}; \
             UPDATE type::record('tenant', $tenant_id) SET \
                 status = 'awaiting_verification', \
                 updated_at = time::now(); \
             COMMIT TRANSACTION;",
            throw = THROW_NOT_APPLICABLE,
        );

        let outcome = self
            .db
            .query(query)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("proof_url", proof_url))
            .bind(("reference", reference))
            .await
            .map_err(DbError::from)?;
        let outcome = check_transaction(outcome);

        if let Err(e) = outcome {
            return Err(self.classify_guard_failure(tenant_id, id, e).await);
        }

        self.get_by_id(tenant_id, id).await
    }

    async fn mark_active(&self, tenant_id: Uuid, id: Uuid) -> FleetResult<Subscription> {
        self.review(tenant_id, id, SubscriptionStatus::Active).await
    }

    async fn mark_rejected(&self, tenant_id: Uuid, id: Uuid) -> FleetResult<Subscription> {
        self.review(tenant_id, id, SubscriptionStatus::Rejected)
            .await
    }

    async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> FleetResult<PaginatedResult<Subscription>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM subscription \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM subscription \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SubscriptionRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_subscription())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
