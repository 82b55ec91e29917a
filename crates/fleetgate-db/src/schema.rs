//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as snake_case
//! strings with ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Plans (global scope, operator-managed catalog)
-- =======================================================================
DEFINE TABLE plan SCHEMAFULL;
DEFINE FIELD name ON TABLE plan TYPE string;
DEFINE FIELD currency ON TABLE plan TYPE string DEFAULT 'EUR';
DEFINE FIELD price_6_months ON TABLE plan TYPE int;
DEFINE FIELD price_12_months ON TABLE plan TYPE int;
DEFINE FIELD discount_6_months ON TABLE plan TYPE int DEFAULT 0;
DEFINE FIELD discount_12_months ON TABLE plan TYPE int DEFAULT 0;
-- Non-positive limit means unlimited.
DEFINE FIELD max_vehicles ON TABLE plan TYPE int DEFAULT 0;
DEFINE FIELD max_users ON TABLE plan TYPE int DEFAULT 0;
DEFINE FIELD max_clients ON TABLE plan TYPE int DEFAULT 0;
DEFINE FIELD max_contracts ON TABLE plan TYPE int DEFAULT 0;
DEFINE FIELD module_assistance ON TABLE plan TYPE bool DEFAULT false;
DEFINE FIELD is_active ON TABLE plan TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE plan TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE plan TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD slug ON TABLE tenant TYPE string;
DEFINE FIELD status ON TABLE tenant TYPE option<string>;
DEFINE FIELD is_active ON TABLE tenant TYPE bool DEFAULT true;
DEFINE FIELD onboarding_step ON TABLE tenant TYPE int DEFAULT 1;
DEFINE FIELD onboarding_completed ON TABLE tenant TYPE bool \
    DEFAULT false;
DEFINE FIELD plan_id ON TABLE tenant TYPE option<string>;
DEFINE FIELD metadata ON TABLE tenant TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_slug ON TABLE tenant COLUMNS slug UNIQUE;

-- =======================================================================
-- Subscriptions (tenant scope; newest row is the current one)
-- =======================================================================
DEFINE TABLE subscription SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE subscription TYPE string;
DEFINE FIELD plan_id ON TABLE subscription TYPE string;
DEFINE FIELD duration_months ON TABLE subscription TYPE int \
    ASSERT $value IN [6, 12];
DEFINE FIELD status ON TABLE subscription TYPE string \
    ASSERT $value IN ['awaiting_payment', 'awaiting_verification', \
    'active', 'rejected', 'expired'];
DEFINE FIELD start_date ON TABLE subscription TYPE datetime;
DEFINE FIELD end_date ON TABLE subscription TYPE datetime;
DEFINE FIELD proof_url ON TABLE subscription TYPE option<string>;
DEFINE FIELD reference ON TABLE subscription TYPE option<string>;
DEFINE FIELD created_at ON TABLE subscription TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE subscription TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_subscription_tenant ON TABLE subscription \
    COLUMNS tenant_id;

-- =======================================================================
-- Countable business resources (tenant scope). Only the fields the
-- quota evaluator needs are defined here; the CRUD feature set owns
-- the rest of each table's shape.
-- =======================================================================
DEFINE TABLE vehicle SCHEMALESS;
DEFINE FIELD tenant_id ON TABLE vehicle TYPE string;
DEFINE INDEX idx_vehicle_tenant ON TABLE vehicle COLUMNS tenant_id;

DEFINE TABLE app_user SCHEMALESS;
DEFINE FIELD tenant_id ON TABLE app_user TYPE string;
DEFINE INDEX idx_app_user_tenant ON TABLE app_user COLUMNS tenant_id;

DEFINE TABLE client SCHEMALESS;
DEFINE FIELD tenant_id ON TABLE client TYPE string;
DEFINE INDEX idx_client_tenant ON TABLE client COLUMNS tenant_id;

DEFINE TABLE contract SCHEMALESS;
DEFINE FIELD tenant_id ON TABLE contract TYPE string;
DEFINE INDEX idx_contract_tenant ON TABLE contract COLUMNS tenant_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
