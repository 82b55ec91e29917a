//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetResult;
use fleetgate_core::models::tenant::{CreateTenant, Tenant, TenantStatus};
use fleetgate_core::onboarding;
use fleetgate_core::repository::TenantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    name: String,
    slug: String,
    status: Option<String>,
    is_active: bool,
    onboarding_step: i64,
    onboarding_completed: bool,
    plan_id: Option<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Result<Tenant, DbError> {
        // Unknown status strings deliberately fold to None: legacy
        // rows are routed by the gate policy table, not rejected.
        let status = self.status.as_deref().and_then(TenantStatus::parse);
        let plan_id = match self.plan_id {
            Some(raw) => Some(
                Uuid::parse_str(&raw)
                    .map_err(|e| DbError::Migration(format!("invalid plan UUID: {e}")))?,
            ),
            None => None,
        };
        let onboarding_step = u8::try_from(self.onboarding_step)
            .map_err(|_| DbError::Migration(format!("invalid step: {}", self.onboarding_step)))?;
        Ok(Tenant {
            id,
            name: self.name,
            slug: self.slug,
            status,
            is_active: self.is_active,
            onboarding_step,
            onboarding_completed: self.onboarding_completed,
            plan_id,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    name: String,
    slug: String,
    status: Option<String>,
    is_active: bool,
    onboarding_step: i64,
    onboarding_completed: bool,
    plan_id: Option<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        TenantRow {
            name: self.name,
            slug: self.slug,
            status: self.status,
            is_active: self.is_active,
            onboarding_step: self.onboarding_step,
            onboarding_completed: self.onboarding_completed,
            plan_id: self.plan_id,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_tenant(id)
    }
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> FleetResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 name = $name, \
                 slug = $slug, \
                 status = 'pending_selection', \
                 is_active = true, \
                 onboarding_step = 1, \
                 onboarding_completed = false, \
                 plan_id = NONE, \
                 metadata = {}",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> FleetResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_slug(&self, slug: &str) -> FleetResult<Tenant> {
        let slug_owned = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM tenant \
                 WHERE slug = $slug",
            )
            .bind(("slug", slug_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.try_into_tenant()?)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> FleetResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 is_active = $active, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("active", active))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "tenant".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn set_onboarding_step(&self, id: Uuid, step: u8) -> FleetResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 onboarding_step = $step, updated_at = time::now() \
                 WHERE onboarding_completed = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("step", i64::from(step)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(row.into_tenant(id)?),
            // Zero rows: either the tenant is gone or the wizard is
            // already terminal — look once more to tell them apart.
            None => {
                self.get_by_id(id).await?;
                Err(DbError::InvalidState("onboarding already completed".into()).into())
            }
        }
    }

    async fn complete_onboarding(
        &self,
        id: Uuid,
        final_data: serde_json::Value,
    ) -> FleetResult<Tenant> {
        let id_str = id.to_string();

        // Terminal: the flag and the final payload land in one update.
        let mut result = self
            .db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 onboarding_step = $final_step, \
                 onboarding_completed = true, \
                 metadata = $data, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("final_step", i64::from(onboarding::FINAL_STEP)))
            .bind(("data", final_data))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }
}
