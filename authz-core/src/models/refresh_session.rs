//! Refresh session model - revocable token sessions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Why a session was revoked. Closed set of wire codes shared with the
/// token blacklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    Security,
    AdminAction,
    Logout,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::Security => "security",
            RevocationReason::AdminAction => "admin_action",
            RevocationReason::Logout => "logout",
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevocationReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "security" => Ok(RevocationReason::Security),
            "admin_action" => Ok(RevocationReason::AdminAction),
            "logout" => Ok(RevocationReason::Logout),
            _ => Err(format!("Invalid revocation reason: {}", s)),
        }
    }
}

/// Refresh session entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshSession {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub token_hash_text: String,
    pub expiry_utc: DateTime<Utc>,
    pub revoked_utc: Option<DateTime<Utc>>,
    pub revoke_reason_code: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl RefreshSession {
    /// Create a new session for an opaque refresh token.
    pub fn new(user_id: Uuid, token: &str, expiry_days: i64) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            token_hash_text: Self::hash_token(token),
            expiry_utc: Utc::now() + Duration::days(expiry_days),
            revoked_utc: None,
            revoke_reason_code: None,
            created_utc: Utc::now(),
        }
    }

    /// Hash a token using SHA-256.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Check if session is valid (not expired, not revoked).
    pub fn is_valid(&self) -> bool {
        self.revoked_utc.is_none() && self.expiry_utc > Utc::now()
    }

    /// Check if session is expired.
    pub fn is_expired(&self) -> bool {
        self.expiry_utc <= Utc::now()
    }

    /// Check if session is revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_utc.is_some()
    }

    /// Seconds until expiry, clamped at zero. Blacklist entries only need
    /// to outlive the session itself.
    pub fn remaining_ttl_seconds(&self) -> i64 {
        (self.expiry_utc - Utc::now()).num_seconds().max(0)
    }

    /// Parsed revocation reason, if the session is revoked.
    pub fn revocation_reason(&self) -> Option<RevocationReason> {
        self.revoke_reason_code.as_deref()?.parse().ok()
    }
}
