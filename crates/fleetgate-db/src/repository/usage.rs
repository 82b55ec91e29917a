//! SurrealDB implementation of [`UsageRepository`].
//!
//! Counts are computed from live rows on every call. Nothing is
//! cached: a gating decision must never see usage staler than its own
//! read.

use fleetgate_core::error::FleetResult;
use fleetgate_core::quota::ResourceKind;
use fleetgate_core::repository::UsageRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Table holding live rows for a resource kind.
fn table_for(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Vehicles => "vehicle",
        ResourceKind::Users => "app_user",
        ResourceKind::Clients => "client",
        ResourceKind::Contracts => "contract",
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Usage repository.
#[derive(Clone)]
pub struct SurrealUsageRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUsageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UsageRepository for SurrealUsageRepository<C> {
    async fn count(&self, tenant_id: Uuid, kind: ResourceKind) -> FleetResult<u64> {
        // Table names come from a closed enum, never from input.
        let query = format!(
            "SELECT count() AS total FROM {} \
             WHERE tenant_id = $tenant_id GROUP ALL",
            table_for(kind),
        );

        let mut result = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
