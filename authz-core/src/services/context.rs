//! User context builder - assembles the per-operation authorization snapshot.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::models::{GrantedPermission, Role, UserContext};
use crate::services::{AuthzStore, OrgHierarchy, PermissionCatalog, ServiceError};

/// Builds `UserContext` values from the current role/assignment/organization
/// state. Stateless apart from its handles; safe to share across requests.
#[derive(Clone)]
pub struct UserContextService {
    store: Arc<dyn AuthzStore>,
    catalog: Arc<PermissionCatalog>,
}

impl UserContextService {
    pub fn new(store: Arc<dyn AuthzStore>, catalog: Arc<PermissionCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Build a fresh context for one operation.
    ///
    /// A user with no active role assignments gets an empty permission set,
    /// not an error; authorization then denies everything.
    pub async fn build(
        &self,
        user_id: Uuid,
        requested_organization_id: Option<Uuid>,
    ) -> Result<UserContext, ServiceError> {
        let assignments = self.store.find_active_assignments_for_user(user_id).await?;

        let mut role_ids: Vec<Uuid> = assignments.iter().map(|a| a.role_id).collect();
        role_ids.sort_unstable();
        role_ids.dedup();

        // Inactive roles are dropped before the permission union; they
        // contribute nothing even under an active assignment.
        let roles = self.store.find_roles_by_ids(&role_ids).await?;
        let active_roles: HashMap<Uuid, Role> = roles
            .into_iter()
            .filter(|role| role.is_active)
            .map(|role| (role.role_id, role))
            .collect();

        let mut permissions: HashSet<GrantedPermission> = HashSet::new();
        for role in active_roles.values() {
            let keys = self.store.permission_keys_for_role(role.role_id).await?;
            for key in keys {
                let permission = self.catalog.resolve(&key)?.clone();
                permissions.insert(GrantedPermission {
                    permission,
                    organization_id: role.organization_id,
                });
            }
        }

        // Directly-bound organizations: assignment and role bindings, over
        // assignments whose role survived the active filter.
        let mut direct: HashSet<Uuid> = HashSet::new();
        for assignment in &assignments {
            if let Some(role) = active_roles.get(&assignment.role_id) {
                if let Some(org) = assignment.organization_id {
                    direct.insert(org);
                }
                if let Some(org) = role.organization_id {
                    direct.insert(org);
                }
            }
        }

        let hierarchy = OrgHierarchy::from_rows(self.store.find_active_organizations().await?)?;
        let accessible_organizations = hierarchy.accessible_from(&direct);

        Ok(UserContext::new(
            user_id,
            active_roles.into_values().collect(),
            permissions,
            accessible_organizations,
            requested_organization_id,
        ))
    }
}
