// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tenant cluster object

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Condition, ObjectMeta};

/// Lifecycle phase reported on the tenant status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantPhase {
    Reconciling,
    Terminating,
}

/// Desired tenant configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSpec {
    /// Human-readable name; falls back to the object name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Name of the blueprint generating this tenant's resources
    pub blueprint: String,

    /// Labels merged onto every generated manifest
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Annotations merged onto every generated manifest
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

/// Observed tenant state, written from the status projection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<TenantPhase>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint: Option<String>,

    /// Resource-set currently receiving generated resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_set: Option<String>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Tenant object (cluster-scoped)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub metadata: ObjectMeta,
    pub spec: TenantSpec,
    #[serde(default)]
    pub status: TenantStatus,
}

impl Tenant {
    /// Create a tenant bound to a blueprint
    pub fn new(name: impl Into<String>, blueprint: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            spec: TenantSpec {
                blueprint: blueprint.into(),
                ..Default::default()
            },
            status: TenantStatus::default(),
        }
    }

    /// Display name, defaulting to the object name
    pub fn display_name(&self) -> &str {
        self.spec
            .display_name
            .as_deref()
            .unwrap_or(&self.metadata.name)
    }

    /// Namespace owned by this tenant; tenants are named after their namespace
    pub fn namespace(&self) -> &str {
        &self.metadata.name
    }
}
