//! Quota evaluation math.
//!
//! Pure computation over a plan limit and a live usage count. The
//! surrounding service re-reads the count at evaluation time; nothing
//! here is cached.

use serde::{Deserialize, Serialize};

/// Metered resource kinds gated by plan limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vehicles,
    Users,
    Clients,
    Contracts,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Vehicles => "vehicles",
            ResourceKind::Users => "users",
            ResourceKind::Clients => "clients",
            ResourceKind::Contracts => "contracts",
        }
    }

    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Vehicles,
        ResourceKind::Users,
        ResourceKind::Clients,
        ResourceKind::Contracts,
    ];
}

/// Current usage of one resource kind against its plan limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub resource: ResourceKind,
    pub current: u64,
    /// `None` means unlimited.
    pub limit: Option<u64>,
    /// `current / limit`; `None` when unlimited.
    pub percentage: Option<f64>,
    pub can_add: bool,
}

/// Compute a usage snapshot from a raw plan limit and a live count.
///
/// Any non-positive limit means unlimited. The source data uses both
/// `0` and `-1` as the unlimited sentinel; both normalize here. In
/// particular `0` is *not* a zero cap — reading it as one would lock
/// out every tenant on such a plan.
pub fn snapshot(resource: ResourceKind, raw_limit: i64, current: u64) -> UsageSnapshot {
    match u64::try_from(raw_limit).ok().filter(|&max| max > 0) {
        Some(max) => UsageSnapshot {
            resource,
            current,
            limit: Some(max),
            percentage: Some(current as f64 / max as f64),
            can_add: current < max,
        },
        None => UsageSnapshot {
            resource,
            current,
            limit: None,
            percentage: None,
            can_add: true,
        },
    }
}
