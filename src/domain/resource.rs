// Copyright (c) 2025 - Cowboy AI, Inc.
//! Generated resources and the ResourceSet cluster object

use serde::{Deserialize, Serialize};

use super::condition::{find_condition, Condition, CONDITION_READY};
use super::ObjectMeta;

/// One generated manifest
///
/// `id` identifies the object (group-qualified kind, namespace, name) and
/// survives content edits; `sum` changes with every byte of the rendered
/// manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    /// Generation-time sequence; resources are applied in this order
    pub order: i64,
    pub sum: String,
    /// Rendered manifest
    pub embedded: serde_json::Value,
}

/// Output of one blueprint resource group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    pub name: String,
    pub source_template: String,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSetSpec {
    /// Owning tenant
    pub tenant: String,
    /// Whether this set is the one being applied
    #[serde(default)]
    pub active: bool,
    /// Resources in application order
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSetStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// One materialized generation of a tenant's resources (cluster-scoped)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    pub metadata: ObjectMeta,
    pub spec: ResourceSetSpec,
    #[serde(default)]
    pub status: ResourceSetStatus,
}

impl ResourceSet {
    /// Whether the set reports a true `Ready` condition
    pub fn is_ready(&self) -> bool {
        find_condition(&self.status.conditions, CONDITION_READY).is_some_and(Condition::is_true)
    }
}
