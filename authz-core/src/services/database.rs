//! PostgreSQL store for the authorization core.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::{
    Organization, PermissionRecord, RefreshSession, RevocationReason, Role, UserRoleAssignment,
};
use crate::services::store::AuthzStore;
use crate::services::ServiceError;

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map_err(|e| {
            tracing::error!("Database health check failed: {}", e);
            e
        })?;
        Ok(())
    }
}

#[async_trait]
impl AuthzStore for Database {
    async fn all_permissions(&self) -> Result<Vec<PermissionRecord>, ServiceError> {
        let rows = sqlx::query_as::<_, PermissionRecord>(
            "SELECT * FROM permissions ORDER BY permission_key",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_active_assignments_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<UserRoleAssignment>, ServiceError> {
        let rows = sqlx::query_as::<_, UserRoleAssignment>(
            "SELECT * FROM user_roles WHERE user_id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_roles_by_ids(&self, role_ids: &[Uuid]) -> Result<Vec<Role>, ServiceError> {
        let rows = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE role_id = ANY($1)")
            .bind(role_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn permission_keys_for_role(&self, role_id: Uuid) -> Result<Vec<String>, ServiceError> {
        let keys = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.permission_key FROM role_permissions rp
            JOIN permissions p ON p.permission_id = rp.permission_id
            WHERE rp.role_id = $1
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(keys)
    }

    async fn find_active_organizations(&self) -> Result<Vec<Organization>, ServiceError> {
        let rows = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE is_active = TRUE",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_user_ids_with_active_role(
        &self,
        role_id: Uuid,
    ) -> Result<Vec<Uuid>, ServiceError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT user_id FROM user_roles WHERE role_id = $1 AND is_active = TRUE",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn find_active_sessions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RefreshSession>, ServiceError> {
        let rows = sqlx::query_as::<_, RefreshSession>(
            r#"
            SELECT * FROM refresh_sessions
            WHERE user_id = $1 AND revoked_utc IS NULL AND expiry_utc > NOW()
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn revoke_session(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            UPDATE refresh_sessions
            SET revoked_utc = NOW(), revoke_reason_code = $1
            WHERE session_id = $2 AND revoked_utc IS NULL
            "#,
        )
        .bind(reason.as_str())
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
