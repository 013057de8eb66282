//! Services layer for the authorization core.
//!
//! Catalog, hierarchy, context building, the permission checker, and the
//! role-change invalidator, plus the storage and blacklist seams they sit on.

mod database;
pub mod audit;
pub mod catalog;
pub mod checker;
pub mod context;
pub mod error;
pub mod hierarchy;
pub mod invalidator;
pub mod metrics;
pub mod redis;
pub mod store;

pub use catalog::PermissionCatalog;
pub use checker::{authorize, AccessDecision, Authorizer, DecisionReason, ResourceFacts};
pub use context::UserContextService;
pub use database::Database;
pub use error::ServiceError;
pub use hierarchy::OrgHierarchy;
pub use invalidator::{InvalidationReport, RoleChangeInvalidator, RoleChangeReason};
pub use redis::{MockBlacklist, RedisService, TokenBlacklist};
pub use store::{AuthzStore, MockAuthzStore};
