use service_core::error::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::services::checker::DecisionReason;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Permission denied: {permission}")]
    PermissionDenied {
        permission: String,
        reason: DecisionReason,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed permission key: {0}")]
    MalformedPermission(String),

    #[error("Permission key not in catalog: {0}")]
    UnknownPermission(String),

    #[error("Duplicate permission key: {0}")]
    DuplicatePermission(String),

    #[error("Organization hierarchy cycle at {0}")]
    HierarchyCycle(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            // The Forbidden response body is made opaque at the boundary.
            ServiceError::PermissionDenied { permission, reason } => AppError::Forbidden(
                anyhow::anyhow!("missing permission {} ({})", permission, reason),
            ),
            ServiceError::NotFound(what) => AppError::NotFound(anyhow::anyhow!(what)),
            ServiceError::MalformedPermission(key) => {
                AppError::ConfigError(anyhow::anyhow!("malformed permission key: {}", key))
            }
            ServiceError::UnknownPermission(key) => {
                AppError::ConfigError(anyhow::anyhow!("permission key not in catalog: {}", key))
            }
            ServiceError::DuplicatePermission(key) => {
                AppError::ConfigError(anyhow::anyhow!("duplicate permission key: {}", key))
            }
            ServiceError::HierarchyCycle(org) => {
                AppError::ConfigError(anyhow::anyhow!("organization hierarchy cycle at {}", org))
            }
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::anyhow!(e)),
            ServiceError::Redis(e) => AppError::RedisError(e),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
