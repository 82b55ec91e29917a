//! Domain models for plans, tenants, and subscriptions.

pub mod plan;
pub mod subscription;
pub mod tenant;
