//! Organization model - hierarchical tenant structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Organization entity. Parent pointers form a tree; acyclicity is not
/// guaranteed upstream and is validated defensively at snapshot load.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub organization_id: Uuid,
    pub org_name: String,
    pub parent_organization_id: Option<Uuid>,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
}

impl Organization {
    /// Create a new organization.
    pub fn new(org_name: impl Into<String>, parent_organization_id: Option<Uuid>) -> Self {
        Self {
            organization_id: Uuid::new_v4(),
            org_name: org_name.into(),
            parent_organization_id,
            is_active: true,
            created_utc: Utc::now(),
        }
    }

    /// Check if this is a root organization.
    pub fn is_root(&self) -> bool {
        self.parent_organization_id.is_none()
    }
}
