//! Security audit events.
//!
//! Structured emission of security-relevant outcomes: denied access,
//! revocation cascades, catalog/hierarchy integrity faults. Purely
//! observational; never alters a decision.

use serde::Serialize;
use uuid::Uuid;

use crate::services::checker::AccessDecision;
use crate::services::invalidator::{InvalidationReport, RoleChangeReason};

/// Security audit event types.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventType {
    /// Authorization denied for a requested operation
    AccessDenied,
    /// Sessions revoked after a role mutation
    RevocationCascade,
    /// Malformed catalog or hierarchy data encountered at load
    IntegrityFault,
}

/// Log a denied access attempt. Denials are expected outcomes, not system
/// faults, but they are security-relevant.
pub fn denied_access(user_id: Uuid, decision: &AccessDecision) {
    tracing::warn!(
        event_type = ?SecurityEventType::AccessDenied,
        user_id = %user_id,
        permission = %decision.permission,
        reason = %decision.reason,
        "Access denied"
    );
}

/// Log the outcome of a role-change revocation cascade.
pub fn revocation_cascade(role_id: Uuid, reason: RoleChangeReason, report: &InvalidationReport) {
    tracing::warn!(
        event_type = ?SecurityEventType::RevocationCascade,
        role_id = %role_id,
        reason = %reason,
        users_processed = report.users_processed,
        users_failed = report.users_failed,
        users_skipped = report.users_skipped,
        sessions_revoked = report.sessions_revoked,
        "Role change revocation cascade completed"
    );
}

/// Log a configuration/integrity fault found while loading catalog or
/// hierarchy data.
pub fn integrity_fault(details: &str) {
    tracing::error!(
        event_type = ?SecurityEventType::IntegrityFault,
        details = %details,
        "Authorization data integrity fault"
    );
}
