//! Storage abstraction over the authorization tables.
//!
//! The core consumes `permissions`, `roles`, `role_permissions`,
//! `user_roles`, `organizations`, and `refresh_sessions` rows through this
//! trait. `Database` implements it against PostgreSQL; `MockAuthzStore`
//! backs tests and local development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::models::{
    Organization, PermissionRecord, RefreshSession, RevocationReason, Role, RolePermission,
    UserRoleAssignment,
};
use crate::services::ServiceError;

#[async_trait]
pub trait AuthzStore: Send + Sync {
    /// The full seeded permission table, for catalog load.
    async fn all_permissions(&self) -> Result<Vec<PermissionRecord>, ServiceError>;

    /// Assignments for a user where the assignment itself is active.
    async fn find_active_assignments_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<UserRoleAssignment>, ServiceError>;

    async fn find_roles_by_ids(&self, role_ids: &[Uuid]) -> Result<Vec<Role>, ServiceError>;

    /// Permission keys linked to a role via `role_permissions`.
    async fn permission_keys_for_role(&self, role_id: Uuid) -> Result<Vec<String>, ServiceError>;

    /// Snapshot of active organizations for hierarchy resolution.
    async fn find_active_organizations(&self) -> Result<Vec<Organization>, ServiceError>;

    /// Distinct users holding an active assignment of the role.
    async fn find_user_ids_with_active_role(
        &self,
        role_id: Uuid,
    ) -> Result<Vec<Uuid>, ServiceError>;

    /// Live (unrevoked, unexpired) sessions for a user.
    async fn find_active_sessions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RefreshSession>, ServiceError>;

    /// Mark a session revoked with the given reason.
    async fn revoke_session(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
    ) -> Result<(), ServiceError>;
}

#[derive(Default)]
struct MockState {
    permissions: Vec<PermissionRecord>,
    roles: HashMap<Uuid, Role>,
    role_permissions: Vec<RolePermission>,
    assignments: Vec<UserRoleAssignment>,
    organizations: Vec<Organization>,
    sessions: HashMap<Uuid, RefreshSession>,
    fail_revocations_for: HashSet<Uuid>,
}

/// In-memory store for tests and local development.
#[derive(Default)]
pub struct MockAuthzStore {
    state: Mutex<MockState>,
}

impl MockAuthzStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockState>, ServiceError> {
        self.state
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Mock store mutex poisoned: {}", e)))
    }

    pub fn insert_permission(&self, permission_key: &str) -> PermissionRecord {
        let record = PermissionRecord::new(permission_key);
        self.lock().unwrap().permissions.push(record.clone());
        record
    }

    pub fn insert_role(&self, role: Role) {
        self.lock().unwrap().roles.insert(role.role_id, role);
    }

    pub fn link_role_permission(&self, role_id: Uuid, permission_id: Uuid) {
        self.lock().unwrap().role_permissions.push(RolePermission {
            role_id,
            permission_id,
        });
    }

    pub fn insert_assignment(&self, assignment: UserRoleAssignment) {
        self.lock().unwrap().assignments.push(assignment);
    }

    pub fn insert_organization(&self, organization: Organization) {
        self.lock().unwrap().organizations.push(organization);
    }

    pub fn insert_session(&self, session: RefreshSession) {
        self.lock()
            .unwrap()
            .sessions
            .insert(session.session_id, session);
    }

    /// Make every revocation for this user's sessions fail, simulating a
    /// transient store fault.
    pub fn fail_revocations_for_user(&self, user_id: Uuid) {
        self.lock().unwrap().fail_revocations_for.insert(user_id);
    }

    /// Inspect a session row after the fact.
    pub fn session(&self, session_id: Uuid) -> Option<RefreshSession> {
        self.lock().unwrap().sessions.get(&session_id).cloned()
    }
}

#[async_trait]
impl AuthzStore for MockAuthzStore {
    async fn all_permissions(&self) -> Result<Vec<PermissionRecord>, ServiceError> {
        Ok(self.lock()?.permissions.clone())
    }

    async fn find_active_assignments_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<UserRoleAssignment>, ServiceError> {
        Ok(self
            .lock()?
            .assignments
            .iter()
            .filter(|a| a.user_id == user_id && a.is_active)
            .cloned()
            .collect())
    }

    async fn find_roles_by_ids(&self, role_ids: &[Uuid]) -> Result<Vec<Role>, ServiceError> {
        let state = self.lock()?;
        Ok(role_ids
            .iter()
            .filter_map(|id| state.roles.get(id).cloned())
            .collect())
    }

    async fn permission_keys_for_role(&self, role_id: Uuid) -> Result<Vec<String>, ServiceError> {
        let state = self.lock()?;
        Ok(state
            .role_permissions
            .iter()
            .filter(|rp| rp.role_id == role_id)
            .filter_map(|rp| {
                state
                    .permissions
                    .iter()
                    .find(|p| p.permission_id == rp.permission_id)
                    .map(|p| p.permission_key.clone())
            })
            .collect())
    }

    async fn find_active_organizations(&self) -> Result<Vec<Organization>, ServiceError> {
        Ok(self
            .lock()?
            .organizations
            .iter()
            .filter(|o| o.is_active)
            .cloned()
            .collect())
    }

    async fn find_user_ids_with_active_role(
        &self,
        role_id: Uuid,
    ) -> Result<Vec<Uuid>, ServiceError> {
        let state = self.lock()?;
        let mut seen = HashSet::new();
        Ok(state
            .assignments
            .iter()
            .filter(|a| a.role_id == role_id && a.is_active)
            .map(|a| a.user_id)
            .filter(|user_id| seen.insert(*user_id))
            .collect())
    }

    async fn find_active_sessions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RefreshSession>, ServiceError> {
        Ok(self
            .lock()?
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_valid())
            .cloned()
            .collect())
    }

    async fn revoke_session(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
    ) -> Result<(), ServiceError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;
        let session = state
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| ServiceError::NotFound(format!("session {}", session_id)))?;
        if state.fail_revocations_for.contains(&session.user_id) {
            return Err(ServiceError::Internal(anyhow::anyhow!(
                "injected revocation failure for user {}",
                session.user_id
            )));
        }
        session.revoked_utc = Some(Utc::now());
        session.revoke_reason_code = Some(reason.as_str().to_string());
        Ok(())
    }
}
