//! Integration tests for the role-change revocation cascade.

mod common;

use std::sync::Arc;

use authz_core::config::RevocationConfig;
use authz_core::{MockBlacklist, RevocationReason, RoleChangeInvalidator, RoleChangeReason};
use common::TestAuthz;
use uuid::Uuid;

fn config() -> RevocationConfig {
    RevocationConfig {
        concurrency: 4,
        deadline_ms: 30_000,
    }
}

fn invalidator(
    authz: &TestAuthz,
    blacklist: &Arc<MockBlacklist>,
    config: RevocationConfig,
) -> RoleChangeInvalidator {
    RoleChangeInvalidator::new(authz.store.clone(), blacklist.clone(), config)
}

#[tokio::test]
async fn revokes_every_holders_sessions_and_blacklists_them() {
    let authz = TestAuthz::spawn().await;
    let role = authz.role_with("analyst", None, &["analytics:read:all"]);

    let mut sessions = Vec::new();
    for _ in 0..3 {
        let user_id = Uuid::new_v4();
        authz.assign(user_id, &role, None);
        sessions.push(authz.live_session(user_id));
    }

    let blacklist = Arc::new(MockBlacklist::new());
    let report = invalidator(&authz, &blacklist, config())
        .invalidate_users_with_role(role.role_id, RoleChangeReason::PermissionsUpdated)
        .await
        .unwrap();

    assert_eq!(report.users_processed, 3);
    assert_eq!(report.users_failed, 0);
    assert_eq!(report.users_skipped, 0);
    assert_eq!(report.sessions_revoked, 3);

    for session_id in sessions {
        let session = authz.store.session(session_id).unwrap();
        assert!(session.is_revoked());
        assert!(!session.is_valid());
        assert_eq!(session.revocation_reason(), Some(RevocationReason::Security));
        assert_eq!(blacklist.reason_for(session_id).as_deref(), Some("security"));
    }
}

#[tokio::test]
async fn role_with_no_holders_reports_zero_without_error() {
    let authz = TestAuthz::spawn().await;
    let role = authz.role_with("unheld", None, &["analytics:read:all"]);

    let blacklist = Arc::new(MockBlacklist::new());
    let report = invalidator(&authz, &blacklist, config())
        .invalidate_users_with_role(role.role_id, RoleChangeReason::RoleDeleted)
        .await
        .unwrap();

    assert_eq!(report.users_processed, 0);
    assert_eq!(report.sessions_revoked, 0);
    assert!(blacklist.is_empty());
}

#[tokio::test]
async fn one_users_failure_does_not_abort_the_batch() {
    let authz = TestAuthz::spawn().await;
    let role = authz.role_with("analyst", None, &["analytics:read:all"]);

    let healthy_a = Uuid::new_v4();
    let broken = Uuid::new_v4();
    let healthy_b = Uuid::new_v4();
    for user_id in [healthy_a, broken, healthy_b] {
        authz.assign(user_id, &role, None);
        authz.live_session(user_id);
    }
    authz.store.fail_revocations_for_user(broken);

    let blacklist = Arc::new(MockBlacklist::new());
    let report = invalidator(&authz, &blacklist, config())
        .invalidate_users_with_role(role.role_id, RoleChangeReason::PermissionsUpdated)
        .await
        .unwrap();

    assert_eq!(report.users_processed, 2);
    assert_eq!(report.users_failed, 1);
    assert_eq!(report.sessions_revoked, 2);
    assert_eq!(blacklist.len(), 2);
}

#[tokio::test]
async fn users_without_sessions_still_count_as_processed() {
    let authz = TestAuthz::spawn().await;
    let role = authz.role_with("analyst", None, &["analytics:read:all"]);

    let with_session = Uuid::new_v4();
    let without_session = Uuid::new_v4();
    authz.assign(with_session, &role, None);
    authz.assign(without_session, &role, None);
    authz.live_session(with_session);

    let blacklist = Arc::new(MockBlacklist::new());
    let report = invalidator(&authz, &blacklist, config())
        .invalidate_users_with_role(role.role_id, RoleChangeReason::PermissionsUpdated)
        .await
        .unwrap();

    assert_eq!(report.users_processed, 2);
    assert_eq!(report.sessions_revoked, 1);
}

#[tokio::test]
async fn role_deletion_maps_to_admin_action() {
    let authz = TestAuthz::spawn().await;
    let role = authz.role_with("retiring", None, &["analytics:read:all"]);

    let user_id = Uuid::new_v4();
    authz.assign(user_id, &role, None);
    let session_id = authz.live_session(user_id);

    let blacklist = Arc::new(MockBlacklist::new());
    invalidator(&authz, &blacklist, config())
        .invalidate_users_with_role(role.role_id, RoleChangeReason::RoleDeleted)
        .await
        .unwrap();

    let session = authz.store.session(session_id).unwrap();
    assert_eq!(
        session.revocation_reason(),
        Some(RevocationReason::AdminAction)
    );
    assert_eq!(
        blacklist.reason_for(session_id).as_deref(),
        Some("admin_action")
    );
}

#[tokio::test]
async fn expired_deadline_skips_remaining_users() {
    let authz = TestAuthz::spawn().await;
    let role = authz.role_with("analyst", None, &["analytics:read:all"]);

    for _ in 0..5 {
        let user_id = Uuid::new_v4();
        authz.assign(user_id, &role, None);
        authz.live_session(user_id);
    }

    // A deadline already in the past with serial fan-out: the first user
    // completes, everyone else is skipped.
    let blacklist = Arc::new(MockBlacklist::new());
    let report = invalidator(
        &authz,
        &blacklist,
        RevocationConfig {
            concurrency: 1,
            deadline_ms: 0,
        },
    )
    .invalidate_users_with_role(role.role_id, RoleChangeReason::PermissionsUpdated)
    .await
    .unwrap();

    assert_eq!(report.users_processed, 1);
    assert_eq!(report.users_skipped, 4);
    assert_eq!(report.users_failed, 0);
}
