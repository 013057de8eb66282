//! RBAC authorization core for the practice-management platform.
//!
//! Resolves a user's effective permissions across three scopes
//! (own / organization / all), honoring the organization hierarchy,
//! aggregating grants cumulatively across roles, and invalidating live
//! sessions when a role's permissions change. Service-layer CRUD operations
//! consume it through [`Authorizer::require_permission`] and supply raw
//! role/organization/user rows via [`AuthzStore`].

pub mod config;
pub mod models;
pub mod services;

pub use models::{
    GrantedPermission, Organization, Permission, PermissionRecord, PermissionScope,
    RefreshSession, RevocationReason, Role, RolePermission, UserContext, UserRoleAssignment,
};
pub use services::{
    authorize, AccessDecision, Authorizer, AuthzStore, Database, DecisionReason,
    InvalidationReport, MockAuthzStore, MockBlacklist, OrgHierarchy, PermissionCatalog,
    ResourceFacts, RoleChangeInvalidator, RoleChangeReason, ServiceError, TokenBlacklist,
    UserContextService,
};
