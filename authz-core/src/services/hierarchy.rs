//! Organization hierarchy - adjacency snapshot and accessibility expansion.
//!
//! Snapshots are per-request: build one from the current organization rows,
//! use it for a single decision, and drop it. Nothing here is cached across
//! requests.

use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

use crate::models::Organization;
use crate::services::{audit, ServiceError};

/// Parent→children adjacency over one snapshot of the organization table.
#[derive(Debug, Clone)]
pub struct OrgHierarchy {
    children: HashMap<Uuid, Vec<Uuid>>,
}

impl OrgHierarchy {
    /// Build the adjacency map, rejecting cyclic parent chains.
    ///
    /// The table is assumed acyclic but not validated upstream on write, so
    /// the snapshot defends itself: a cycle is a fail-fast integrity fault.
    pub fn from_rows(rows: Vec<Organization>) -> Result<Self, ServiceError> {
        let mut parents: HashMap<Uuid, Option<Uuid>> = HashMap::with_capacity(rows.len());
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();

        for org in &rows {
            parents.insert(org.organization_id, org.parent_organization_id);
            if let Some(parent) = org.parent_organization_id {
                children.entry(parent).or_default().push(org.organization_id);
            }
        }

        // Walk each parent chain; nodes cleared once are never re-walked.
        let mut cleared: HashSet<Uuid> = HashSet::with_capacity(parents.len());
        for &start in parents.keys() {
            let mut walk: HashSet<Uuid> = HashSet::new();
            let mut current = Some(start);
            while let Some(org) = current {
                if cleared.contains(&org) {
                    break;
                }
                if !walk.insert(org) {
                    audit::integrity_fault(&format!("organization hierarchy cycle at {}", org));
                    return Err(ServiceError::HierarchyCycle(org));
                }
                current = parents.get(&org).copied().flatten();
            }
            cleared.extend(walk);
        }

        Ok(Self { children })
    }

    /// Expand the directly-assigned set to every reachable descendant.
    ///
    /// Breadth-first with a visited set, so traversal terminates even on a
    /// snapshot that was built without validation. The starting set is
    /// always part of the result.
    pub fn accessible_from(&self, direct: &HashSet<Uuid>) -> HashSet<Uuid> {
        let mut visited: HashSet<Uuid> = direct.iter().copied().collect();
        let mut queue: VecDeque<Uuid> = direct.iter().copied().collect();

        while let Some(org) = queue.pop_front() {
            if let Some(children) = self.children.get(&org) {
                for &child in children {
                    if visited.insert(child) {
                        queue.push_back(child);
                    }
                }
            }
        }

        visited
    }
}
