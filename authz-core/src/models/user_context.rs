//! User context - the per-operation authorization snapshot.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Permission, PermissionScope, Role};

/// A catalog permission tagged with the organization of the role that
/// granted it (`None` for system roles).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GrantedPermission {
    pub permission: Permission,
    pub organization_id: Option<Uuid>,
}

/// Immutable snapshot of a user's effective authority, built fresh for each
/// operation and discarded after the decision.
///
/// Never cache across requests: role and assignment state can change between
/// two calls, and a cached context could grant on revoked permissions.
#[derive(Debug, Clone)]
pub struct UserContext {
    user_id: Uuid,
    effective_roles: Vec<Role>,
    permissions: HashSet<GrantedPermission>,
    accessible_organizations: HashSet<Uuid>,
    current_organization_id: Option<Uuid>,
}

impl UserContext {
    pub(crate) fn new(
        user_id: Uuid,
        effective_roles: Vec<Role>,
        permissions: HashSet<GrantedPermission>,
        accessible_organizations: HashSet<Uuid>,
        current_organization_id: Option<Uuid>,
    ) -> Self {
        Self {
            user_id,
            effective_roles,
            permissions,
            accessible_organizations,
            current_organization_id,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn effective_roles(&self) -> &[Role] {
        &self.effective_roles
    }

    pub fn permissions(&self) -> &HashSet<GrantedPermission> {
        &self.permissions
    }

    pub fn accessible_organizations(&self) -> &HashSet<Uuid> {
        &self.accessible_organizations
    }

    pub fn current_organization_id(&self) -> Option<Uuid> {
        self.current_organization_id
    }

    /// Whether the user may act within the given organization.
    pub fn can_access_organization(&self, organization_id: Uuid) -> bool {
        self.accessible_organizations.contains(&organization_id)
    }

    /// Scopes held for a `resource:action` name, strongest first, deduplicated.
    pub fn held_scopes(&self, resource: &str, action: &str) -> Vec<PermissionScope> {
        let mut scopes: Vec<PermissionScope> = self
            .permissions
            .iter()
            .filter(|granted| granted.permission.matches_name(resource, action))
            .map(|granted| granted.permission.scope)
            .collect();
        scopes.sort_unstable_by(|a, b| b.cmp(a));
        scopes.dedup();
        scopes
    }
}
