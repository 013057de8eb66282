//! Permission model - static catalog entries of the form `resource:action:scope`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Breadth at which a permission applies.
///
/// Ordered by strength: `All` beats `Organization` beats `Own`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PermissionScope {
    /// Caller must own the resource.
    Own,
    /// Resource must belong to an organization the caller can act within.
    Organization,
    /// Unconditional.
    All,
}

impl PermissionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionScope::Own => "own",
            PermissionScope::Organization => "organization",
            PermissionScope::All => "all",
        }
    }
}

impl fmt::Display for PermissionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "own" => Ok(PermissionScope::Own),
            "organization" => Ok(PermissionScope::Organization),
            "all" => Ok(PermissionScope::All),
            _ => Err(format!("Invalid permission scope: {}", s)),
        }
    }
}

/// Parsed permission triple. Rendered as `resource:action:scope`.
///
/// Instances come from the catalog; nothing at decision time builds these
/// from raw strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub resource: String,
    pub action: String,
    pub scope: PermissionScope,
}

impl Permission {
    pub fn new(
        resource: impl Into<String>,
        action: impl Into<String>,
        scope: PermissionScope,
    ) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            scope,
        }
    }

    /// Whether this permission names the same `resource:action` pair.
    ///
    /// Scope is deliberately ignored: grants for the same name aggregate
    /// across scopes.
    pub fn matches_name(&self, resource: &str, action: &str) -> bool {
        self.resource == resource && self.action == action
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.resource, self.action, self.scope)
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(format!(
                "Invalid permission key '{}': expected resource:action:scope",
                s
            ));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(format!("Invalid permission key '{}': empty segment", s));
        }
        let scope: PermissionScope = parts[2].parse()?;
        Ok(Permission::new(parts[0], parts[1], scope))
    }
}

/// Permission row as seeded at deployment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PermissionRecord {
    pub permission_id: Uuid,
    pub permission_key: String,
    pub created_utc: DateTime<Utc>,
}

impl PermissionRecord {
    pub fn new(permission_key: impl Into<String>) -> Self {
        Self {
            permission_id: Uuid::new_v4(),
            permission_key: permission_key.into(),
            created_utc: Utc::now(),
        }
    }
}
