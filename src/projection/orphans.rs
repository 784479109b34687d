// Copyright (c) 2025 - Cowboy AI, Inc.
//! Orphaned resources
//!
//! Tracks which generated resources are still wanted and which were
//! removed, plus a gate that only opens after a successful generation. A
//! failed generation may have produced an incomplete resource list, so
//! nothing is deleted from the cluster until the next success.

use std::collections::BTreeMap;

use crate::aggregate::EventConsumer;
use crate::domain::Resource;
use crate::events::{Event, TenantEvent};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanProjection {
    active: BTreeMap<String, Resource>,
    deleted: BTreeMap<String, Resource>,
    delete_allowed: bool,
}

impl OrphanProjection {
    pub fn delete_allowed(&self) -> bool {
        self.delete_allowed
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    pub fn active(&self) -> impl Iterator<Item = &Resource> {
        self.active.values()
    }

    /// Every removed resource, regardless of the gate
    pub fn deleted(&self) -> impl Iterator<Item = &Resource> {
        self.deleted.values()
    }

    /// Removed resources that may be deleted now; empty while the gate is shut
    pub fn orphans(&self) -> Vec<&Resource> {
        if self.delete_allowed {
            self.deleted.values().collect()
        } else {
            Vec::new()
        }
    }
}

impl EventConsumer for OrphanProjection {
    fn on(&mut self, event: &Event) {
        match &event.payload {
            TenantEvent::ResourceAdded(e) => {
                self.deleted.remove(&e.resource.id);
                self.active.insert(e.resource.id.clone(), e.resource.clone());
            }
            TenantEvent::ResourceUpdated(e) => {
                self.deleted.remove(&e.resource.id);
                self.active.insert(e.resource.id.clone(), e.resource.clone());
            }
            TenantEvent::ResourceRemoved(e) => {
                if let Some(resource) = self.active.remove(&e.resource_id) {
                    self.deleted.insert(e.resource_id.clone(), resource);
                }
            }
            TenantEvent::ResourceGenerationFailed(_) => self.delete_allowed = false,
            TenantEvent::ResourceGenerationSuccessful(_) => self.delete_allowed = true,
            TenantEvent::TenantCreated(_)
            | TenantEvent::TenantDeleted(_)
            | TenantEvent::TenantNameSet(_)
            | TenantEvent::BlueprintSet(_)
            | TenantEvent::LabelsChanged(_)
            | TenantEvent::AnnotationsChanged(_)
            | TenantEvent::ResourceSetNameChanged(_)
            | TenantEvent::ResourceSetCreated(_)
            | TenantEvent::ResourceSetActivated(_)
            | TenantEvent::ResourceSetDeactivated(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{
        ResourceAdded, ResourceGenerationFailed, ResourceGenerationSuccessful, ResourceRemoved,
    };
    use crate::projection::replay;
    use serde_json::json;

    fn resource(id: &str) -> Resource {
        Resource {
            id: id.into(),
            order: 1,
            sum: "s".into(),
            embedded: json!({}),
        }
    }

    fn projection(payloads: Vec<TenantEvent>) -> OrphanProjection {
        let events: Vec<Event> = payloads
            .into_iter()
            .enumerate()
            .map(|(i, payload)| Event {
                stream_id: "acme".into(),
                sequence: i as i64 + 1,
                payload,
            })
            .collect();
        replay(OrphanProjection::default(), &events)
    }

    fn removed_then(outcome: TenantEvent) -> OrphanProjection {
        projection(vec![
            ResourceAdded { resource: resource("a") }.into(),
            ResourceAdded { resource: resource("b") }.into(),
            ResourceRemoved { resource_id: "b".into() }.into(),
            outcome,
        ])
    }

    #[test]
    fn test_removed_resource_is_orphan_after_success() {
        let projection = removed_then(ResourceGenerationSuccessful { sum: "x".into() }.into());

        assert!(projection.is_active("a"));
        let orphans: Vec<&str> = projection.orphans().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(orphans, vec!["b"]);
    }

    #[test]
    fn test_failed_generation_shuts_gate() {
        let projection = removed_then(
            ResourceGenerationFailed {
                reason: "boom".into(),
            }
            .into(),
        );

        assert!(!projection.delete_allowed());
        assert!(projection.orphans().is_empty());
        assert_eq!(projection.deleted().count(), 1);
    }

    #[test]
    fn test_readded_resource_is_no_longer_orphan() {
        let projection = projection(vec![
            ResourceAdded { resource: resource("a") }.into(),
            ResourceRemoved { resource_id: "a".into() }.into(),
            ResourceAdded { resource: resource("a") }.into(),
            ResourceGenerationSuccessful { sum: "x".into() }.into(),
        ]);

        assert!(projection.orphans().is_empty());
        assert!(projection.is_active("a"));
    }
}
