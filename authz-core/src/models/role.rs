//! Role model - permission-bearing roles, optionally bound to one organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role entity.
///
/// A role bound to an organization grants its permissions within that
/// organization's scope resolution; a system role carries no binding and is
/// visible regardless of the caller's current organization. An inactive role
/// grants nothing, even under an active assignment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub role_id: Uuid,
    pub role_name: String,
    pub is_system_role: bool,
    pub is_active: bool,
    pub organization_id: Option<Uuid>,
    pub created_utc: DateTime<Utc>,
}

impl Role {
    /// Create a new organization-bound role.
    pub fn new(role_name: impl Into<String>, organization_id: Option<Uuid>) -> Self {
        Self {
            role_id: Uuid::new_v4(),
            role_name: role_name.into(),
            is_system_role: false,
            is_active: true,
            organization_id,
            created_utc: Utc::now(),
        }
    }

    /// Create a new system role (no organization binding).
    pub fn new_system(role_name: impl Into<String>) -> Self {
        Self {
            role_id: Uuid::new_v4(),
            role_name: role_name.into(),
            is_system_role: true,
            is_active: true,
            organization_id: None,
            created_utc: Utc::now(),
        }
    }
}

/// Role ↔ permission link row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RolePermission {
    pub role_id: Uuid,
    pub permission_id: Uuid,
}
