//! Integration tests for authorization decisions built from stored
//! role/assignment/organization state.

mod common;

use authz_core::{authorize, Authorizer, DecisionReason, ResourceFacts, Role, ServiceError};
use common::{permission, TestAuthz};
use service_core::error::AppError;
use uuid::Uuid;

#[tokio::test]
async fn user_without_assignments_is_denied_everything() {
    let authz = TestAuthz::spawn().await;
    let user_id = Uuid::new_v4();

    let context = authz.contexts.build(user_id, None).await.unwrap();
    assert!(context.permissions().is_empty());
    assert!(context.effective_roles().is_empty());

    for key in common::CATALOG_KEYS {
        let decision = authorize(&context, &permission(key), None);
        assert!(!decision.allowed, "expected deny for {}", key);
        assert_eq!(decision.reason, DecisionReason::PermissionNotHeld);
    }
}

#[tokio::test]
async fn all_scope_grants_regardless_of_facts() {
    let authz = TestAuthz::spawn().await;
    let user_id = Uuid::new_v4();

    let role = authz.role_with("analyst", None, &["analytics:read:all"]);
    authz.assign(user_id, &role, None);

    let context = authz.contexts.build(user_id, None).await.unwrap();
    let facts = ResourceFacts {
        owner_id: Some(Uuid::new_v4()),
        organization_id: Some(Uuid::new_v4()),
    };
    let decision = authorize(&context, &permission("analytics:read:all"), Some(&facts));
    assert!(decision.allowed);
    assert_eq!(decision.reason, DecisionReason::GrantedAll);
}

#[tokio::test]
async fn organization_scope_needs_matching_accessible_context() {
    let authz = TestAuthz::spawn().await;
    let user_id = Uuid::new_v4();

    let org_a = authz.organization("practice-a", None);
    let org_b = authz.organization("practice-b", None);

    let role = authz.role_with(
        "org-reader",
        Some(org_a.organization_id),
        &["analytics:read:organization"],
    );
    authz.assign(user_id, &role, Some(org_a.organization_id));

    let want = permission("analytics:read:organization");

    // No organization context: deny, even though the permission is held.
    let context = authz.contexts.build(user_id, None).await.unwrap();
    let facts = ResourceFacts {
        owner_id: None,
        organization_id: Some(org_a.organization_id),
    };
    let decision = authorize(&context, &want, Some(&facts));
    assert!(!decision.allowed);
    assert_eq!(decision.reason, DecisionReason::MissingOrganizationContext);

    // Org A context: grant.
    let context = authz
        .contexts
        .build(user_id, Some(org_a.organization_id))
        .await
        .unwrap();
    assert!(authorize(&context, &want, Some(&facts)).allowed);

    // Org B context: deny, B is outside the accessible set.
    let context = authz
        .contexts
        .build(user_id, Some(org_b.organization_id))
        .await
        .unwrap();
    let facts_b = ResourceFacts {
        owner_id: None,
        organization_id: Some(org_b.organization_id),
    };
    let decision = authorize(&context, &want, Some(&facts_b));
    assert!(!decision.allowed);
    assert_eq!(decision.reason, DecisionReason::OrganizationNotAccessible);
}

#[tokio::test]
async fn inactive_role_contributes_nothing_under_active_assignment() {
    let authz = TestAuthz::spawn().await;
    let user_id = Uuid::new_v4();

    let mut role = Role::new_system("dormant-admin");
    role.is_active = false;
    authz.store.insert_role(role.clone());
    authz.link_permission(&role, "analytics:read:all");
    authz.assign(user_id, &role, None);

    let context = authz.contexts.build(user_id, None).await.unwrap();
    assert!(context.permissions().is_empty());
    let decision = authorize(&context, &permission("analytics:read:all"), None);
    assert!(!decision.allowed);
}

#[tokio::test]
async fn roles_union_cumulatively_and_strongest_wins() {
    let authz = TestAuthz::spawn().await;
    let user_id = Uuid::new_v4();

    let org_a = authz.organization("practice-a", None);
    let org_b = authz.organization("practice-b", None);

    let role_x = authz.role_with(
        "org-reader",
        Some(org_a.organization_id),
        &["analytics:read:organization"],
    );
    let role_y = authz.role_with("global-reader", None, &["analytics:read:all"]);
    authz.assign(user_id, &role_x, Some(org_a.organization_id));
    authz.assign(user_id, &role_y, None);

    // Reads anywhere, including org A and unrelated org B, with no
    // organization context supplied.
    let context = authz.contexts.build(user_id, None).await.unwrap();
    for org in [org_a.organization_id, org_b.organization_id] {
        let facts = ResourceFacts {
            owner_id: None,
            organization_id: Some(org),
        };
        let decision = authorize(
            &context,
            &permission("analytics:read:organization"),
            Some(&facts),
        );
        assert!(decision.allowed, "expected grant for org {}", org);
        assert_eq!(decision.reason, DecisionReason::GrantedAll);
    }
}

#[tokio::test]
async fn hierarchy_extends_organization_grants_to_descendants() {
    let authz = TestAuthz::spawn().await;
    let user_id = Uuid::new_v4();

    let root = authz.organization("practice-group", None);
    let child = authz.organization("clinic", Some(root.organization_id));
    let grandchild = authz.organization("ward", Some(child.organization_id));

    let role = authz.role_with(
        "group-reader",
        Some(root.organization_id),
        &["workitems:read:organization"],
    );
    authz.assign(user_id, &role, Some(root.organization_id));

    let context = authz
        .contexts
        .build(user_id, Some(grandchild.organization_id))
        .await
        .unwrap();

    for org in [
        root.organization_id,
        child.organization_id,
        grandchild.organization_id,
    ] {
        assert!(context.can_access_organization(org));
    }

    let facts = ResourceFacts {
        owner_id: None,
        organization_id: Some(grandchild.organization_id),
    };
    let decision = authorize(
        &context,
        &permission("workitems:read:organization"),
        Some(&facts),
    );
    assert!(decision.allowed);
}

#[tokio::test]
async fn own_scope_follows_resource_ownership() {
    let authz = TestAuthz::spawn().await;
    let user_id = Uuid::new_v4();

    let role = authz.role_with("editor", None, &["dashboards:update:own"]);
    authz.assign(user_id, &role, None);

    let context = authz.contexts.build(user_id, None).await.unwrap();
    let want = permission("dashboards:update:own");

    let owned = ResourceFacts {
        owner_id: Some(user_id),
        organization_id: None,
    };
    assert!(authorize(&context, &want, Some(&owned)).allowed);

    let foreign = ResourceFacts {
        owner_id: Some(Uuid::new_v4()),
        organization_id: None,
    };
    let decision = authorize(&context, &want, Some(&foreign));
    assert!(!decision.allowed);
    assert_eq!(decision.reason, DecisionReason::NotResourceOwner);
}

#[tokio::test]
async fn require_permission_surfaces_denial_as_forbidden() {
    let authz = TestAuthz::spawn().await;
    let user_id = Uuid::new_v4();
    let authorizer = Authorizer::new(authz.contexts.clone());

    let result = authorizer
        .require_permission(user_id, None, &permission("users:manage:all"), None)
        .await;

    let err = result.err().expect("denial expected");
    assert!(matches!(err, ServiceError::PermissionDenied { .. }));

    let app_err: AppError = err.into();
    assert!(matches!(app_err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn require_permission_returns_context_on_grant() {
    let authz = TestAuthz::spawn().await;
    let user_id = Uuid::new_v4();
    let authorizer = Authorizer::new(authz.contexts.clone());

    let role = authz.role_with("admin", None, &["users:manage:all"]);
    authz.assign(user_id, &role, None);

    let context = authorizer
        .require_permission(user_id, None, &permission("users:manage:all"), None)
        .await
        .unwrap();
    assert_eq!(context.user_id(), user_id);
    assert_eq!(context.effective_roles().len(), 1);
}
