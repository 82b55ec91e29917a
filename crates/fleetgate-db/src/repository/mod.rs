//! SurrealDB repository implementations.

mod plan;
mod subscription;
mod tenant;
mod usage;

pub use plan::SurrealPlanRepository;
pub use subscription::SurrealSubscriptionRepository;
pub use tenant::SurrealTenantRepository;
pub use usage::SurrealUsageRepository;
