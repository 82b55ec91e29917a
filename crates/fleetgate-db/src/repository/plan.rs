//! SurrealDB implementation of [`PlanRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetResult;
use fleetgate_core::models::plan::{CreatePlan, Plan, UpdatePlan};
use fleetgate_core::repository::PlanRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct PlanRow {
    name: String,
    currency: String,
    price_6_months: i64,
    price_12_months: i64,
    discount_6_months: i64,
    discount_12_months: i64,
    max_vehicles: i64,
    max_users: i64,
    max_clients: i64,
    max_contracts: i64,
    module_assistance: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlanRow {
    fn into_plan(self, id: Uuid) -> Result<Plan, DbError> {
        Ok(Plan {
            id,
            name: self.name,
            currency: self.currency,
            price_6_months: self.price_6_months,
            price_12_months: self.price_12_months,
            discount_6_months: to_percent(self.discount_6_months)?,
            discount_12_months: to_percent(self.discount_12_months)?,
            max_vehicles: self.max_vehicles,
            max_users: self.max_users,
            max_clients: self.max_clients,
            max_contracts: self.max_contracts,
            module_assistance: self.module_assistance,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct PlanRowWithId {
    record_id: String,
    name: String,
    currency: String,
    price_6_months: i64,
    price_12_months: i64,
    discount_6_months: i64,
    discount_12_months: i64,
    max_vehicles: i64,
    max_users: i64,
    max_clients: i64,
    max_contracts: i64,
    module_assistance: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlanRowWithId {
    fn try_into_plan(self) -> Result<Plan, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Plan {
            id,
            name: self.name,
            currency: self.currency,
            price_6_months: self.price_6_months,
            price_12_months: self.price_12_months,
            discount_6_months: to_percent(self.discount_6_months)?,
            discount_12_months: to_percent(self.discount_12_months)?,
            max_vehicles: self.max_vehicles,
            max_users: self.max_users,
            max_clients: self.max_clients,
            max_contracts: self.max_contracts,
            module_assistance: self.module_assistance,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn to_percent(value: i64) -> Result<u8, DbError> {
    u8::try_from(value).map_err(|_| DbError::Migration(format!("invalid discount: {value}")))
}

/// SurrealDB implementation of the Plan repository.
#[derive(Clone)]
pub struct SurrealPlanRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPlanRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PlanRepository for SurrealPlanRepository<C> {
    async fn create(&self, input: CreatePlan) -> FleetResult<Plan> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('plan', $id) SET \
                 name = $name, \
                 currency = $currency, \
                 price_6_months = $price_6, \
                 price_12_months = $price_12, \
                 discount_6_months = $discount_6, \
                 discount_12_months = $discount_12, \
                 max_vehicles = $max_vehicles, \
                 max_users = $max_users, \
                 max_clients = $max_clients, \
                 max_contracts = $max_contracts, \
                 module_assistance = $module_assistance, \
                 is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("currency", input.currency))
            .bind(("price_6", input.price_6_months))
            .bind(("price_12", input.price_12_months))
            .bind(("discount_6", i64::from(input.discount_6_months)))
            .bind(("discount_12", i64::from(input.discount_12_months)))
            .bind(("max_vehicles", input.max_vehicles))
            .bind(("max_users", input.max_users))
            .bind(("max_clients", input.max_clients))
            .bind(("max_contracts", input.max_contracts))
            .bind(("module_assistance", input.module_assistance))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PlanRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "plan".into(),
            id: id_str,
        })?;

        Ok(row.into_plan(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> FleetResult<Plan> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('plan', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PlanRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "plan".into(),
            id: id_str,
        })?;

        Ok(row.into_plan(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdatePlan) -> FleetResult<Plan> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.price_6_months.is_some() {
            sets.push("price_6_months = $price_6");
        }
        if input.price_12_months.is_some() {
            sets.push("price_12_months = $price_12");
        }
        if input.discount_6_months.is_some() {
            sets.push("discount_6_months = $discount_6");
        }
        if input.discount_12_months.is_some() {
            sets.push("discount_12_months = $discount_12");
        }
        if input.max_vehicles.is_some() {
            sets.push("max_vehicles = $max_vehicles");
        }
        if input.max_users.is_some() {
            sets.push("max_users = $max_users");
        }
        if input.max_clients.is_some() {
            sets.push("max_clients = $max_clients");
        }
        if input.max_contracts.is_some() {
            sets.push("max_contracts = $max_contracts");
        }
        if input.module_assistance.is_some() {
            sets.push("module_assistance = $module_assistance");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('plan', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(price) = input.price_6_months {
            builder = builder.bind(("price_6", price));
        }
        if let Some(price) = input.price_12_months {
            builder = builder.bind(("price_12", price));
        }
        if let Some(discount) = input.discount_6_months {
            builder = builder.bind(("discount_6", i64::from(discount)));
        }
        if let Some(discount) = input.discount_12_months {
            builder = builder.bind(("discount_12", i64::from(discount)));
        }
        if let Some(max) = input.max_vehicles {
            builder = builder.bind(("max_vehicles", max));
        }
        if let Some(max) = input.max_users {
            builder = builder.bind(("max_users", max));
        }
        if let Some(max) = input.max_clients {
            builder = builder.bind(("max_clients", max));
        }
        if let Some(max) = input.max_contracts {
            builder = builder.bind(("max_contracts", max));
        }
        if let Some(module) = input.module_assistance {
            builder = builder.bind(("module_assistance", module));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PlanRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "plan".into(),
            id: id_str,
        })?;

        Ok(row.into_plan(id)?)
    }

    async fn deactivate(&self, id: Uuid) -> FleetResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('plan', $id) SET \
                 is_active = false, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PlanRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "plan".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list_active(&self) -> FleetResult<Vec<Plan>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM plan \
                 WHERE is_active = true \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PlanRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_plan())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
