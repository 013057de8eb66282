use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};
use uuid::Uuid;

use crate::models::RevocationReason;
use crate::services::ServiceError;

#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    async fn blacklist_session(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
        expiry_seconds: i64,
    ) -> Result<(), ServiceError>;
    async fn is_blacklisted(&self, session_id: Uuid) -> Result<bool, ServiceError>;
    async fn health_check(&self) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct RedisService {
    _client: Client,
    manager: ConnectionManager,
}

impl RedisService {
    pub async fn new(config: &crate::config::RedisConfig) -> Result<Self, ServiceError> {
        tracing::info!(url = %config.url, "Connecting to Redis");
        let client = Client::open(config.url.clone())?;

        // Use ConnectionManager for automatic reconnection
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            e
        })?;

        tracing::info!("Successfully connected to Redis");

        Ok(Self {
            _client: client,
            manager,
        })
    }
}

#[async_trait]
impl TokenBlacklist for RedisService {
    async fn health_check(&self) -> Result<(), ServiceError> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    /// Add a session to the blacklist, tagged with its revocation reason.
    async fn blacklist_session(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
        expiry_seconds: i64,
    ) -> Result<(), ServiceError> {
        let mut conn = self.manager.clone();
        let key = format!("blacklist:{}", session_id);

        redis::cmd("SET")
            .arg(&key)
            .arg(reason.as_str())
            .arg("EX")
            .arg(expiry_seconds.max(1))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    /// Check if a session is in the blacklist.
    async fn is_blacklisted(&self, session_id: Uuid) -> Result<bool, ServiceError> {
        let mut conn = self.manager.clone();
        let key = format!("blacklist:{}", session_id);

        let exists: bool = redis::cmd("EXISTS")
            .arg(&key)
            .query_async(&mut conn)
            .await?;

        Ok(exists)
    }
}

pub struct MockBlacklist {
    entries: std::sync::Mutex<std::collections::HashMap<Uuid, String>>,
}

impl Default for MockBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBlacklist {
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }

    /// Reason code recorded for a blacklisted session, if any.
    pub fn reason_for(&self, session_id: Uuid) -> Option<String> {
        self.entries
            .lock()
            .ok()?
            .get(&session_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TokenBlacklist for MockBlacklist {
    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn blacklist_session(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
        _expiry_seconds: i64,
    ) -> Result<(), ServiceError> {
        self.entries
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Mock blacklist mutex poisoned: {}", e)))?
            .insert(session_id, reason.as_str().to_string());
        Ok(())
    }

    async fn is_blacklisted(&self, session_id: Uuid) -> Result<bool, ServiceError> {
        let contains = self
            .entries
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Mock blacklist mutex poisoned: {}", e)))?
            .contains_key(&session_id);
        Ok(contains)
    }
}
