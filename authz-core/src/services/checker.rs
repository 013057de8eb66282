//! Permission checker - pure grant/deny decision over a `UserContext`.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::models::{Permission, PermissionScope, UserContext};
use crate::services::{audit, metrics, ServiceError, UserContextService};

/// Caller-supplied facts about the resource being operated on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceFacts {
    pub owner_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    GrantedAll,
    GrantedOrganization,
    GrantedOwn,
    PermissionNotHeld,
    MissingOrganizationContext,
    OrganizationNotAccessible,
    OrganizationContextMismatch,
    NotResourceOwner,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::GrantedAll => "granted_all",
            DecisionReason::GrantedOrganization => "granted_organization",
            DecisionReason::GrantedOwn => "granted_own",
            DecisionReason::PermissionNotHeld => "permission_not_held",
            DecisionReason::MissingOrganizationContext => "missing_organization_context",
            DecisionReason::OrganizationNotAccessible => "organization_not_accessible",
            DecisionReason::OrganizationContextMismatch => "organization_context_mismatch",
            DecisionReason::NotResourceOwner => "not_resource_owner",
        }
    }

    /// The scope whose rule produced this reason, if any.
    pub fn scope(&self) -> Option<PermissionScope> {
        match self {
            DecisionReason::GrantedAll => Some(PermissionScope::All),
            DecisionReason::GrantedOrganization
            | DecisionReason::MissingOrganizationContext
            | DecisionReason::OrganizationNotAccessible
            | DecisionReason::OrganizationContextMismatch => Some(PermissionScope::Organization),
            DecisionReason::GrantedOwn | DecisionReason::NotResourceOwner => {
                Some(PermissionScope::Own)
            }
            DecisionReason::PermissionNotHeld => None,
        }
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single authorization check. Carries the requested permission
/// and the scope evaluated, enough for audit logging.
#[derive(Debug, Clone)]
pub struct AccessDecision {
    pub allowed: bool,
    pub permission: Permission,
    pub reason: DecisionReason,
}

impl AccessDecision {
    fn granted(permission: Permission, reason: DecisionReason) -> Self {
        Self {
            allowed: true,
            permission,
            reason,
        }
    }

    fn denied(permission: Permission, reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            permission,
            reason,
        }
    }

    /// The scope whose rule decided this check, if any grant matched the name.
    pub fn scope_evaluated(&self) -> Option<PermissionScope> {
        self.reason.scope()
    }
}

/// Decide whether the context grants the required permission.
///
/// Grants matching the required `resource:action` name aggregate across all
/// of the user's roles (cumulative OR); held scopes are evaluated strongest
/// first and the first satisfied rule wins. Absence of a satisfied grant is
/// the only deny path. Pure and synchronous.
pub fn authorize(
    context: &UserContext,
    required: &Permission,
    facts: Option<&ResourceFacts>,
) -> AccessDecision {
    let held = context.held_scopes(&required.resource, &required.action);
    if held.is_empty() {
        return AccessDecision::denied(required.clone(), DecisionReason::PermissionNotHeld);
    }

    let facts = facts.copied().unwrap_or_default();
    // Remember the strongest scope's failure for the denial report.
    let mut failure: Option<DecisionReason> = None;
    let fail = |slot: &mut Option<DecisionReason>, reason: DecisionReason| {
        slot.get_or_insert(reason);
    };

    for scope in held {
        match scope {
            PermissionScope::All => {
                return AccessDecision::granted(required.clone(), DecisionReason::GrantedAll);
            }
            PermissionScope::Organization => {
                let operated = facts.organization_id;
                let current = context.current_organization_id();
                match (operated, current) {
                    (Some(operated), Some(current)) => {
                        if !context.can_access_organization(operated) {
                            fail(&mut failure, DecisionReason::OrganizationNotAccessible);
                        } else if current != operated {
                            fail(&mut failure, DecisionReason::OrganizationContextMismatch);
                        } else {
                            return AccessDecision::granted(
                                required.clone(),
                                DecisionReason::GrantedOrganization,
                            );
                        }
                    }
                    // Ambient-authority guard: no organization context, no grant.
                    _ => fail(&mut failure, DecisionReason::MissingOrganizationContext),
                }
            }
            PermissionScope::Own => {
                if facts.owner_id.is_some() && facts.owner_id == Some(context.user_id()) {
                    return AccessDecision::granted(required.clone(), DecisionReason::GrantedOwn);
                }
                fail(&mut failure, DecisionReason::NotResourceOwner);
            }
        }
    }

    AccessDecision::denied(
        required.clone(),
        failure.unwrap_or(DecisionReason::PermissionNotHeld),
    )
}

/// The single contract service-layer CRUD operations consume: build a fresh
/// context, authorize, and hand the context back for the caller's
/// persistence work.
#[derive(Clone)]
pub struct Authorizer {
    contexts: UserContextService,
}

impl Authorizer {
    pub fn new(contexts: UserContextService) -> Self {
        Self { contexts }
    }

    /// Authorize one operation, returning the freshly built context on grant.
    ///
    /// Denial surfaces as `ServiceError::PermissionDenied`, logged as a
    /// security event; it is never retried and never widened into an allow.
    pub async fn require_permission(
        &self,
        user_id: Uuid,
        current_organization_id: Option<Uuid>,
        required: &Permission,
        facts: Option<&ResourceFacts>,
    ) -> Result<UserContext, ServiceError> {
        let context = self.contexts.build(user_id, current_organization_id).await?;
        let decision = authorize(&context, required, facts);
        metrics::record_decision(&decision);

        if decision.allowed {
            Ok(context)
        } else {
            audit::denied_access(user_id, &decision);
            Err(ServiceError::PermissionDenied {
                permission: required.to_string(),
                reason: decision.reason,
            })
        }
    }
}
