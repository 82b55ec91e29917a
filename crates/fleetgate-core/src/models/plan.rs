//! Subscription plan model.
//!
//! Plans are read-only from a tenant's perspective; only platform
//! operators create, edit, or deactivate them. A plan is never deleted
//! while live subscriptions reference it — deactivation hides it from
//! selection instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quota::ResourceKind;

/// A metered subscription plan.
///
/// Prices are stored in the currency's minor unit (e.g. cents).
/// Discounts are whole percentages applied to the matching duration
/// price. Quota limits use the convention that any non-positive value
/// means "unlimited" — `0` is *not* a hard zero cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    /// ISO 4217 currency code (e.g. `EUR`).
    pub currency: String,
    pub price_6_months: i64,
    pub price_12_months: i64,
    /// Percent discount on the 6-month price (0–100).
    pub discount_6_months: u8,
    /// Percent discount on the 12-month price (0–100).
    pub discount_12_months: u8,
    pub max_vehicles: i64,
    pub max_users: i64,
    pub max_clients: i64,
    pub max_contracts: i64,
    /// Whether the roadside-assistance module is included.
    pub module_assistance: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// Raw quota limit for a resource kind (non-positive = unlimited).
    pub fn limit_for(&self, kind: ResourceKind) -> i64 {
        match kind {
            ResourceKind::Vehicles => self.max_vehicles,
            ResourceKind::Users => self.max_users,
            ResourceKind::Clients => self.max_clients,
            ResourceKind::Contracts => self.max_contracts,
        }
    }
}

/// Fields required to create a new plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlan {
    pub name: String,
    pub currency: String,
    pub price_6_months: i64,
    pub price_12_months: i64,
    pub discount_6_months: u8,
    pub discount_12_months: u8,
    pub max_vehicles: i64,
    pub max_users: i64,
    pub max_clients: i64,
    pub max_contracts: i64,
    pub module_assistance: bool,
}

/// Fields that can be updated on an existing plan.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePlan {
    pub name: Option<String>,
    pub price_6_months: Option<i64>,
    pub price_12_months: Option<i64>,
    pub discount_6_months: Option<u8>,
    pub discount_12_months: Option<u8>,
    pub max_vehicles: Option<i64>,
    pub max_users: Option<i64>,
    pub max_clients: Option<i64>,
    pub max_contracts: Option<i64>,
    pub module_assistance: Option<bool>,
}
