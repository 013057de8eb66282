//! Permission catalog - parses and validates the static permission table.
//!
//! The catalog is loaded once at startup from the `permissions` table. Any
//! key that does not parse as `resource:action:scope` fails the whole load:
//! a malformed catalog is a configuration fault, never a runtime
//! authorization outcome.

use std::collections::HashMap;

use crate::models::{Permission, PermissionRecord};
use crate::services::{audit, ServiceError};

/// Parsed, validated permission catalog.
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    by_key: HashMap<String, Permission>,
}

impl PermissionCatalog {
    /// Parse every seeded row, failing fast on malformed or duplicate keys.
    pub fn load(rows: Vec<PermissionRecord>) -> Result<Self, ServiceError> {
        let mut by_key = HashMap::with_capacity(rows.len());
        for row in rows {
            let permission: Permission = row.permission_key.parse().map_err(|e: String| {
                audit::integrity_fault(&e);
                ServiceError::MalformedPermission(row.permission_key.clone())
            })?;
            if by_key
                .insert(row.permission_key.clone(), permission)
                .is_some()
            {
                audit::integrity_fault(&format!(
                    "duplicate permission key: {}",
                    row.permission_key
                ));
                return Err(ServiceError::DuplicatePermission(row.permission_key));
            }
        }
        Ok(Self { by_key })
    }

    /// Look up a permission by its rendered key.
    pub fn get(&self, key: &str) -> Option<&Permission> {
        self.by_key.get(key)
    }

    /// Look up a permission, treating an unknown key as an integrity fault.
    pub fn resolve(&self, key: &str) -> Result<&Permission, ServiceError> {
        self.by_key
            .get(key)
            .ok_or_else(|| ServiceError::UnknownPermission(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
