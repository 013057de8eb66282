//! User role assignment model - user→role grants, optionally organization-scoped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User role assignment entity.
///
/// The assignment and the role it points to carry independent `is_active`
/// flags; the grant is effective only when both are true.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRoleAssignment {
    pub assignment_id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub is_active: bool,
    pub granted_by: Option<Uuid>,
    pub created_utc: DateTime<Utc>,
}

impl UserRoleAssignment {
    /// Create a new active assignment.
    pub fn new(
        user_id: Uuid,
        role_id: Uuid,
        organization_id: Option<Uuid>,
        granted_by: Option<Uuid>,
    ) -> Self {
        Self {
            assignment_id: Uuid::new_v4(),
            user_id,
            role_id,
            organization_id,
            is_active: true,
            granted_by,
            created_utc: Utc::now(),
        }
    }
}
