// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tenant Domain Events
//!
//! The closed vocabulary of facts recorded in a tenant stream. Every payload
//! is a small struct implementing [`DomainEvent`], which fixes the stable tag
//! the serializer stores next to the payload. [`TenantEvent`] is the sum of
//! all payloads and is what projections match on.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::Resource;

/// A payload type with a stable wire tag
pub trait DomainEvent: Serialize + DeserializeOwned + Into<TenantEvent> {
    /// Tag stored with the serialized payload
    const TYPE: &'static str;
}

macro_rules! domain_event {
    ($name:ident) => {
        impl DomainEvent for $name {
            const TYPE: &'static str = stringify!($name);
        }

        impl From<$name> for TenantEvent {
            fn from(event: $name) -> Self {
                TenantEvent::$name(event)
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantCreated {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDeleted {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantNameSet {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintSet {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelsChanged {
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationsChanged {
    pub annotations: BTreeMap<String, String>,
}

/// The named resource-set becomes the one receiving resource events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSetNameChanged {
    pub name: String,
}

/// A new resource-set draft, seeded from the active one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSetCreated {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSetActivated {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSetDeactivated {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAdded {
    pub resource: Resource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUpdated {
    pub resource: Resource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRemoved {
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGenerationFailed {
    pub reason: String,
}

/// `sum` is the aggregate content hash of the generated resource list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGenerationSuccessful {
    pub sum: String,
}

/// Every fact a tenant stream can hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantEvent {
    TenantCreated(TenantCreated),
    TenantDeleted(TenantDeleted),
    TenantNameSet(TenantNameSet),
    BlueprintSet(BlueprintSet),
    LabelsChanged(LabelsChanged),
    AnnotationsChanged(AnnotationsChanged),
    ResourceSetNameChanged(ResourceSetNameChanged),
    ResourceSetCreated(ResourceSetCreated),
    ResourceSetActivated(ResourceSetActivated),
    ResourceSetDeactivated(ResourceSetDeactivated),
    ResourceAdded(ResourceAdded),
    ResourceUpdated(ResourceUpdated),
    ResourceRemoved(ResourceRemoved),
    ResourceGenerationFailed(ResourceGenerationFailed),
    ResourceGenerationSuccessful(ResourceGenerationSuccessful),
}

domain_event!(TenantCreated);
domain_event!(TenantDeleted);
domain_event!(TenantNameSet);
domain_event!(BlueprintSet);
domain_event!(LabelsChanged);
domain_event!(AnnotationsChanged);
domain_event!(ResourceSetNameChanged);
domain_event!(ResourceSetCreated);
domain_event!(ResourceSetActivated);
domain_event!(ResourceSetDeactivated);
domain_event!(ResourceAdded);
domain_event!(ResourceUpdated);
domain_event!(ResourceRemoved);
domain_event!(ResourceGenerationFailed);
domain_event!(ResourceGenerationSuccessful);

impl TenantEvent {
    /// Wire tag of the contained payload
    pub fn event_type_name(&self) -> &'static str {
        match self {
            TenantEvent::TenantCreated(_) => TenantCreated::TYPE,
            TenantEvent::TenantDeleted(_) => TenantDeleted::TYPE,
            TenantEvent::TenantNameSet(_) => TenantNameSet::TYPE,
            TenantEvent::BlueprintSet(_) => BlueprintSet::TYPE,
            TenantEvent::LabelsChanged(_) => LabelsChanged::TYPE,
            TenantEvent::AnnotationsChanged(_) => AnnotationsChanged::TYPE,
            TenantEvent::ResourceSetNameChanged(_) => ResourceSetNameChanged::TYPE,
            TenantEvent::ResourceSetCreated(_) => ResourceSetCreated::TYPE,
            TenantEvent::ResourceSetActivated(_) => ResourceSetActivated::TYPE,
            TenantEvent::ResourceSetDeactivated(_) => ResourceSetDeactivated::TYPE,
            TenantEvent::ResourceAdded(_) => ResourceAdded::TYPE,
            TenantEvent::ResourceUpdated(_) => ResourceUpdated::TYPE,
            TenantEvent::ResourceRemoved(_) => ResourceRemoved::TYPE,
            TenantEvent::ResourceGenerationFailed(_) => ResourceGenerationFailed::TYPE,
            TenantEvent::ResourceGenerationSuccessful(_) => ResourceGenerationSuccessful::TYPE,
        }
    }

    /// Render the payload without its tag
    pub fn to_data(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            TenantEvent::TenantCreated(e) => serde_json::to_value(e),
            TenantEvent::TenantDeleted(e) => serde_json::to_value(e),
            TenantEvent::TenantNameSet(e) => serde_json::to_value(e),
            TenantEvent::BlueprintSet(e) => serde_json::to_value(e),
            TenantEvent::LabelsChanged(e) => serde_json::to_value(e),
            TenantEvent::AnnotationsChanged(e) => serde_json::to_value(e),
            TenantEvent::ResourceSetNameChanged(e) => serde_json::to_value(e),
            TenantEvent::ResourceSetCreated(e) => serde_json::to_value(e),
            TenantEvent::ResourceSetActivated(e) => serde_json::to_value(e),
            TenantEvent::ResourceSetDeactivated(e) => serde_json::to_value(e),
            TenantEvent::ResourceAdded(e) => serde_json::to_value(e),
            TenantEvent::ResourceUpdated(e) => serde_json::to_value(e),
            TenantEvent::ResourceRemoved(e) => serde_json::to_value(e),
            TenantEvent::ResourceGenerationFailed(e) => serde_json::to_value(e),
            TenantEvent::ResourceGenerationSuccessful(e) => serde_json::to_value(e),
        }
    }
}
