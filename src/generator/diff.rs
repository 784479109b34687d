// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource list diffing
//!
//! Resources are matched by `id`; a matched resource counts as changed when
//! its `sum` or its `order` differs.

use std::collections::HashMap;

use crate::domain::Resource;
use crate::events::{ResourceAdded, ResourceRemoved, ResourceUpdated, TenantEvent};

/// One step converging the recorded resource list to a generated one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    Added(Resource),
    Updated(Resource),
    /// Carries the removed resource id
    Removed(String),
}

impl ResourceChange {
    pub fn resource_id(&self) -> &str {
        match self {
            ResourceChange::Added(r) | ResourceChange::Updated(r) => &r.id,
            ResourceChange::Removed(id) => id,
        }
    }

    pub fn into_event(self) -> TenantEvent {
        match self {
            ResourceChange::Added(resource) => ResourceAdded { resource }.into(),
            ResourceChange::Updated(resource) => ResourceUpdated { resource }.into(),
            ResourceChange::Removed(resource_id) => ResourceRemoved { resource_id }.into(),
        }
    }
}

/// Changes turning `previous` into `generated`
///
/// Additions and updates follow the generated order; removals follow the
/// previous order and come last.
pub fn diff_resources(previous: &[Resource], generated: &[Resource]) -> Vec<ResourceChange> {
    let known: HashMap<&str, &Resource> = previous.iter().map(|r| (r.id.as_str(), r)).collect();
    let wanted: HashMap<&str, &Resource> = generated.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut changes = Vec::new();
    for resource in generated {
        match known.get(resource.id.as_str()) {
            None => changes.push(ResourceChange::Added(resource.clone())),
            Some(old) if old.sum != resource.sum || old.order != resource.order => {
                changes.push(ResourceChange::Updated(resource.clone()))
            }
            Some(_) => {}
        }
    }
    changes.extend(
        previous
            .iter()
            .filter(|r| !wanted.contains_key(r.id.as_str()))
            .map(|r| ResourceChange::Removed(r.id.clone())),
    );
    changes
}
