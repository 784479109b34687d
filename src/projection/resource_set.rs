// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource-set drafts
//!
//! Replays resource-set lifecycle and resource events into one draft per
//! named resource-set. Resource events land in the set most recently named
//! by `ResourceSetNameChanged`. A newly created set starts as a copy of the
//! active one, so a rotation only has to record the difference.
//!
//! The projection records activation as it happened. Whether more than one
//! set ended up active is checked by [`ResourceSetProjection::ensure_single_active`]
//! after replay, never repaired here.

use std::collections::BTreeMap;

use crate::aggregate::EventConsumer;
use crate::domain::{ObjectMeta, Resource, ResourceSet, ResourceSetSpec, LABEL_TENANT};
use crate::errors::{TenancyError, TenancyResult};
use crate::events::{Event, TenantEvent};

/// One resource-set as rebuilt from events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSetDraft {
    pub name: String,
    pub active: bool,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    /// Resources sorted by `order`
    pub resources: Vec<Resource>,
}

impl ResourceSetDraft {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn upsert(&mut self, resource: &Resource) {
        match self.resources.iter_mut().find(|r| r.id == resource.id) {
            Some(existing) => *existing = resource.clone(),
            None => self.resources.push(resource.clone()),
        }
    }

    /// The cluster object for this draft
    pub fn to_resource_set(&self, tenant: &str) -> ResourceSet {
        let mut metadata = ObjectMeta::named(&self.name);
        metadata.labels = self.labels.clone();
        metadata.labels.insert(LABEL_TENANT.to_string(), tenant.to_string());
        metadata.annotations = self.annotations.clone();

        ResourceSet {
            metadata,
            spec: ResourceSetSpec {
                tenant: tenant.to_string(),
                active: self.active,
                resources: self.resources.clone(),
            },
            status: Default::default(),
        }
    }
}

/// Named resource-set drafts of one tenant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSetProjection {
    current: Option<String>,
    labels: BTreeMap<String, String>,
    annotations: BTreeMap<String, String>,
    drafts: BTreeMap<String, ResourceSetDraft>,
}

impl ResourceSetProjection {
    /// Set currently receiving resource events
    pub fn current(&self) -> Option<&ResourceSetDraft> {
        self.current.as_ref().and_then(|name| self.drafts.get(name))
    }

    pub fn draft(&self, name: &str) -> Option<&ResourceSetDraft> {
        self.drafts.get(name)
    }

    /// Every draft, ordered by name
    pub fn drafts(&self) -> impl Iterator<Item = &ResourceSetDraft> {
        self.drafts.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.drafts.keys().map(String::as_str)
    }

    pub fn active(&self) -> Vec<&ResourceSetDraft> {
        self.drafts.values().filter(|d| d.active).collect()
    }

    /// The single active draft, if any
    ///
    /// More than one active draft means the stream is inconsistent; the
    /// caller must stop rather than write anything derived from it.
    pub fn ensure_single_active(&self) -> TenancyResult<Option<&ResourceSetDraft>> {
        match self.active().as_slice() {
            [] => Ok(None),
            [draft] => Ok(Some(*draft)),
            many => Err(TenancyError::InvariantViolation(format!(
                "{} active resource-sets: {}",
                many.len(),
                many.iter()
                    .map(|d| d.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// Cluster objects for every draft not listed in `skip`
    pub fn to_resource_sets(&self, tenant: &str, skip: &[String]) -> Vec<ResourceSet> {
        self.drafts
            .values()
            .filter(|d| !skip.contains(&d.name))
            .map(|d| d.to_resource_set(tenant))
            .collect()
    }

    fn seed(&self) -> Option<&ResourceSetDraft> {
        match self.active().as_slice() {
            [draft] => Some(*draft),
            _ => self.current(),
        }
    }

    fn current_mut(&mut self) -> Option<&mut ResourceSetDraft> {
        let name = self.current.as_ref()?;
        self.drafts.get_mut(name)
    }
}

impl EventConsumer for ResourceSetProjection {
    fn on(&mut self, event: &Event) {
        match &event.payload {
            TenantEvent::ResourceSetCreated(e) => {
                let mut draft = self
                    .seed()
                    .map(|seed| ResourceSetDraft {
                        name: e.name.clone(),
                        active: false,
                        ..seed.clone()
                    })
                    .unwrap_or_else(|| ResourceSetDraft::new(&e.name));
                draft.labels = self.labels.clone();
                draft.annotations = self.annotations.clone();
                self.drafts.insert(e.name.clone(), draft);
            }
            TenantEvent::ResourceSetNameChanged(e) => {
                self.drafts
                    .entry(e.name.clone())
                    .or_insert_with(|| ResourceSetDraft::new(&e.name));
                self.current = Some(e.name.clone());
            }
            TenantEvent::ResourceSetActivated(e) => {
                self.drafts
                    .entry(e.name.clone())
                    .or_insert_with(|| ResourceSetDraft::new(&e.name))
                    .active = true;
            }
            TenantEvent::ResourceSetDeactivated(e) => {
                if let Some(draft) = self.drafts.get_mut(&e.name) {
                    draft.active = false;
                }
            }
            TenantEvent::ResourceAdded(e) => {
                if let Some(draft) = self.current_mut() {
                    draft.upsert(&e.resource);
                }
            }
            TenantEvent::ResourceUpdated(e) => {
                if let Some(draft) = self.current_mut() {
                    draft.upsert(&e.resource);
                }
            }
            TenantEvent::ResourceRemoved(e) => {
                if let Some(draft) = self.current_mut() {
                    draft.resources.retain(|r| r.id != e.resource_id);
                }
            }
            TenantEvent::LabelsChanged(e) => {
                self.labels = e.labels.clone();
                if let Some(draft) = self.current_mut() {
                    draft.labels = e.labels.clone();
                }
            }
            TenantEvent::AnnotationsChanged(e) => {
                self.annotations = e.annotations.clone();
                if let Some(draft) = self.current_mut() {
                    draft.annotations = e.annotations.clone();
                }
            }
            TenantEvent::TenantCreated(_)
            | TenantEvent::TenantDeleted(_)
            | TenantEvent::TenantNameSet(_)
            | TenantEvent::BlueprintSet(_)
            | TenantEvent::ResourceGenerationFailed(_)
            | TenantEvent::ResourceGenerationSuccessful(_) => {}
        }

        for draft in self.drafts.values_mut() {
            draft.resources.sort_by_key(|r| r.order);
        }
    }
}
