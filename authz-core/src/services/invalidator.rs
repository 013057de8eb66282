//! Role-change invalidation - revokes live sessions for every user holding
//! a mutated role.
//!
//! This is the one side-effecting fan-out in the core. Callers should know:
//! stale permission tokens remain valid until this step completes, whether
//! it runs inline with the role mutation or on a deferred worker.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use crate::config::RevocationConfig;
use crate::models::RevocationReason;
use crate::services::{audit, metrics, AuthzStore, ServiceError, TokenBlacklist};

/// What changed about the role, mapped onto a blacklist reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleChangeReason {
    PermissionsUpdated,
    RoleDeleted,
    RoleDeactivated,
}

impl RoleChangeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleChangeReason::PermissionsUpdated => "permissions_updated",
            RoleChangeReason::RoleDeleted => "role_deleted",
            RoleChangeReason::RoleDeactivated => "role_deactivated",
        }
    }

    /// Reason recorded on the revoked sessions and blacklist entries.
    pub fn revocation_reason(&self) -> RevocationReason {
        match self {
            RoleChangeReason::PermissionsUpdated => RevocationReason::Security,
            RoleChangeReason::RoleDeleted | RoleChangeReason::RoleDeactivated => {
                RevocationReason::AdminAction
            }
        }
    }
}

impl fmt::Display for RoleChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run outcome tally. `users_processed` counts users whose sessions were
/// all revoked, including users that held no sessions at all.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvalidationReport {
    pub users_processed: usize,
    pub users_failed: usize,
    pub users_skipped: usize,
    pub sessions_revoked: usize,
}

/// Fans revocation out across all users holding a changed role.
#[derive(Clone)]
pub struct RoleChangeInvalidator {
    store: Arc<dyn AuthzStore>,
    blacklist: Arc<dyn TokenBlacklist>,
    config: RevocationConfig,
}

impl RoleChangeInvalidator {
    pub fn new(
        store: Arc<dyn AuthzStore>,
        blacklist: Arc<dyn TokenBlacklist>,
        config: RevocationConfig,
    ) -> Self {
        Self {
            store,
            blacklist,
            config,
        }
    }

    /// Revoke live sessions for every user with an active assignment of the
    /// role.
    ///
    /// Per-user isolation: one user's failure is logged and counted, never
    /// fatal to the batch, and never rolled back across siblings. When the
    /// configured deadline elapses, remaining users are skipped and reported
    /// as such.
    pub async fn invalidate_users_with_role(
        &self,
        role_id: Uuid,
        reason: RoleChangeReason,
    ) -> Result<InvalidationReport, ServiceError> {
        let user_ids = self.store.find_user_ids_with_active_role(role_id).await?;
        let mut report = InvalidationReport::default();
        if user_ids.is_empty() {
            return Ok(report);
        }

        let revocation = reason.revocation_reason();
        let total = user_ids.len();
        let deadline = Instant::now() + Duration::from_millis(self.config.deadline_ms);

        let mut outcomes = stream::iter(
            user_ids
                .into_iter()
                .map(|user_id| self.revoke_user_sessions(user_id, revocation)),
        )
        .buffer_unordered(self.config.concurrency.max(1));

        let mut completed = 0usize;
        while let Some(outcome) = outcomes.next().await {
            completed += 1;
            match outcome {
                Ok(revoked) => {
                    report.users_processed += 1;
                    report.sessions_revoked += revoked;
                }
                Err((user_id, e)) => {
                    report.users_failed += 1;
                    metrics::record_invalidation_failure();
                    tracing::error!(
                        user_id = %user_id,
                        role_id = %role_id,
                        error = %e,
                        "Session revocation failed; continuing with remaining users"
                    );
                }
            }
            if completed < total && Instant::now() >= deadline {
                break;
            }
        }
        drop(outcomes);

        report.users_skipped = total - completed;
        if report.users_skipped > 0 {
            tracing::warn!(
                role_id = %role_id,
                skipped = report.users_skipped,
                "Invalidation deadline reached; reporting partial completion"
            );
        }

        metrics::record_revocations(revocation, report.sessions_revoked);
        audit::revocation_cascade(role_id, reason, &report);
        Ok(report)
    }

    async fn revoke_user_sessions(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
    ) -> Result<usize, (Uuid, ServiceError)> {
        let sessions = self
            .store
            .find_active_sessions_for_user(user_id)
            .await
            .map_err(|e| (user_id, e))?;

        let mut revoked = 0;
        for session in sessions {
            self.store
                .revoke_session(session.session_id, reason)
                .await
                .map_err(|e| (user_id, e))?;
            self.blacklist
                .blacklist_session(session.session_id, reason, session.remaining_ttl_seconds())
                .await
                .map_err(|e| (user_id, e))?;
            revoked += 1;
        }
        Ok(revoked)
    }
}
