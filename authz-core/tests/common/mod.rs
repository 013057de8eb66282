//! Test helper module for authorization core integration tests.
//!
//! Wires a `MockAuthzStore`-backed context service the way a consuming
//! service would wire the PostgreSQL one.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use authz_core::{
    AuthzStore, MockAuthzStore, Organization, Permission, PermissionCatalog, RefreshSession, Role,
    UserContextService, UserRoleAssignment,
};

/// Catalog seeded for most tests.
pub const CATALOG_KEYS: &[&str] = &[
    "analytics:read:own",
    "analytics:read:organization",
    "analytics:read:all",
    "dashboards:update:own",
    "dashboards:update:organization",
    "users:manage:all",
    "workitems:read:organization",
];

pub struct TestAuthz {
    pub store: Arc<MockAuthzStore>,
    pub contexts: UserContextService,
    permission_ids: HashMap<String, Uuid>,
}

impl TestAuthz {
    /// Seed the default catalog and build the context service over it.
    pub async fn spawn() -> Self {
        Self::with_catalog(CATALOG_KEYS).await
    }

    pub async fn with_catalog(keys: &[&str]) -> Self {
        let store = Arc::new(MockAuthzStore::new());
        let mut permission_ids = HashMap::new();
        for key in keys {
            let record = store.insert_permission(key);
            permission_ids.insert(record.permission_key.clone(), record.permission_id);
        }
        let records = store
            .all_permissions()
            .await
            .expect("mock store never fails reads");
        let catalog = Arc::new(PermissionCatalog::load(records).expect("test catalog must load"));
        let contexts = UserContextService::new(store.clone(), catalog);
        Self {
            store,
            contexts,
            permission_ids,
        }
    }

    /// Create a role carrying the given permission keys.
    pub fn role_with(&self, name: &str, organization_id: Option<Uuid>, keys: &[&str]) -> Role {
        let role = Role::new(name, organization_id);
        self.store.insert_role(role.clone());
        for key in keys {
            self.store
                .link_role_permission(role.role_id, self.permission_ids[*key]);
        }
        role
    }

    /// Link one more permission key to an already-inserted role.
    pub fn link_permission(&self, role: &Role, key: &str) {
        self.store
            .link_role_permission(role.role_id, self.permission_ids[key]);
    }

    /// Assign a role to a user.
    pub fn assign(&self, user_id: Uuid, role: &Role, organization_id: Option<Uuid>) {
        self.store.insert_assignment(UserRoleAssignment::new(
            user_id,
            role.role_id,
            organization_id,
            None,
        ));
    }

    /// Create an organization under an optional parent.
    pub fn organization(&self, name: &str, parent: Option<Uuid>) -> Organization {
        let org = Organization::new(name, parent);
        self.store.insert_organization(org.clone());
        org
    }

    /// Give a user a live refresh session, returning its id.
    pub fn live_session(&self, user_id: Uuid) -> Uuid {
        let session = RefreshSession::new(user_id, &format!("token-{}", user_id), 7);
        let session_id = session.session_id;
        self.store.insert_session(session);
        session_id
    }
}

/// Shorthand for parsing a catalog key in assertions.
pub fn permission(key: &str) -> Permission {
    key.parse().expect("valid permission key")
}
