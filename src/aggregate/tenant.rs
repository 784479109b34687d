// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tenant Aggregate State
//!
//! [`TenantState`] is the consumer owned by the tenant's [`AggregateRoot`].
//! It keeps only what command handlers need to decide whether a command
//! changes anything: identity fields, the resource-set bookkeeping, the last
//! known resource list and the outcome of the last generation.

use std::collections::{BTreeMap, BTreeSet};

use super::handlers::{handle, CommandError};
use super::root::{AggregateRoot, EventConsumer};
use super::TenantCommand;
use crate::domain::Resource;
use crate::events::{Event, TenantEvent};

/// Aggregate root of one tenant stream
pub type TenantAggregate = AggregateRoot<TenantState>;

/// Result of the most recent generation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Failed { reason: String },
    Successful { sum: String },
}

/// Tenant state rebuilt from events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantState {
    pub created: bool,
    pub deleted: bool,
    pub name: Option<String>,
    pub blueprint: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,

    /// Resource-set receiving resource events
    pub resource_set: Option<String>,

    /// Every resource-set ever created
    pub resource_sets: BTreeSet<String>,

    pub active_resource_sets: BTreeSet<String>,

    /// Set by a blueprint change, cleared once a new set is activated
    pub rotation_pending: bool,

    /// Last known resource list, ordered by `order`
    pub resources: Vec<Resource>,

    pub last_generation: Option<GenerationOutcome>,
}

impl TenantState {
    pub fn needs_rotation(&self) -> bool {
        self.resource_set.is_none() || self.rotation_pending
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    fn upsert_resource(&mut self, resource: &Resource) {
        match self.resources.iter_mut().find(|r| r.id == resource.id) {
            Some(existing) => *existing = resource.clone(),
            None => self.resources.push(resource.clone()),
        }
    }
}

impl EventConsumer for TenantState {
    fn on(&mut self, event: &Event) {
        match &event.payload {
            TenantEvent::TenantCreated(_) => {
                self.created = true;
                self.deleted = false;
            }
            TenantEvent::TenantDeleted(_) => self.deleted = true,
            TenantEvent::TenantNameSet(e) => self.name = Some(e.name.clone()),
            TenantEvent::BlueprintSet(e) => {
                self.blueprint = Some(e.name.clone());
                self.rotation_pending = true;
            }
            TenantEvent::LabelsChanged(e) => self.labels = e.labels.clone(),
            TenantEvent::AnnotationsChanged(e) => self.annotations = e.annotations.clone(),
            TenantEvent::ResourceSetNameChanged(e) => self.resource_set = Some(e.name.clone()),
            TenantEvent::ResourceSetCreated(e) => {
                self.resource_sets.insert(e.name.clone());
            }
            TenantEvent::ResourceSetActivated(e) => {
                self.active_resource_sets.insert(e.name.clone());
                self.rotation_pending = false;
            }
            TenantEvent::ResourceSetDeactivated(e) => {
                self.active_resource_sets.remove(&e.name);
            }
            TenantEvent::ResourceAdded(e) => self.upsert_resource(&e.resource),
            TenantEvent::ResourceUpdated(e) => self.upsert_resource(&e.resource),
            TenantEvent::ResourceRemoved(e) => self.resources.retain(|r| r.id != e.resource_id),
            TenantEvent::ResourceGenerationFailed(e) => {
                self.last_generation = Some(GenerationOutcome::Failed {
                    reason: e.reason.clone(),
                })
            }
            TenantEvent::ResourceGenerationSuccessful(e) => {
                self.last_generation = Some(GenerationOutcome::Successful { sum: e.sum.clone() })
            }
        }
        self.resources.sort_by_key(|r| r.order);
    }
}

impl AggregateRoot<TenantState> {
    /// Start an empty tenant aggregate
    pub fn for_tenant(id: impl Into<String>) -> Self {
        AggregateRoot::new(id, TenantState::default())
    }

    /// Decide a command and apply its events; returns how many were applied
    pub fn execute(&mut self, command: TenantCommand) -> Result<usize, CommandError> {
        let events = handle(self.state(), self.id(), command)?;
        let count = events.len();
        for event in events {
            self.apply(event);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ResourceAdded, ResourceRemoved, ResourceUpdated};
    use serde_json::json;

    fn resource(id: &str, order: i64, sum: &str) -> Resource {
        Resource {
            id: id.into(),
            order,
            sum: sum.into(),
            embedded: json!({}),
        }
    }

    #[test]
    fn test_resources_follow_order_after_updates() {
        let mut aggregate = TenantAggregate::for_tenant("acme");
        aggregate.apply(ResourceAdded {
            resource: resource("b", 2, "s1"),
        });
        aggregate.apply(ResourceAdded {
            resource: resource("a", 1, "s1"),
        });
        aggregate.apply(ResourceUpdated {
            resource: resource("b", 0, "s2"),
        });

        let ids: Vec<&str> = aggregate.state().resources.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        aggregate.apply(ResourceRemoved {
            resource_id: "b".into(),
        });
        assert!(aggregate.state().resource("b").is_none());
    }
}
