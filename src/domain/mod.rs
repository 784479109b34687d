// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tenancy Domain Model
//!
//! Cluster object types the control plane reads and writes:
//!
//! - [`Tenant`] - the owner of a generated collection of resources
//! - [`Blueprint`] - ordered resource groups, each bound to a template
//! - [`ResourceTemplate`] - parameterized manifests plus naming rules
//! - [`ResourceSet`] - one materialized generation of a tenant's resources
//!
//! Shared pieces ([`ObjectMeta`], [`Condition`]) mirror the cluster API's
//! metadata and status conventions. Field names serialize in camelCase.

pub mod blueprint;
pub mod condition;
pub mod name;
pub mod resource;
pub mod template;
pub mod tenant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use blueprint::{
    Blueprint, BlueprintResourceGroup, BlueprintSpec, BlueprintValueRef, ParameterBinding,
    ResourceValueRef, ValueRef,
};
pub use condition::{find_condition, set_condition, Condition, ConditionStatus, CONDITION_READY};
pub use name::{NameError, ObjectName};
pub use resource::{Resource, ResourceGroup, ResourceSet, ResourceSetSpec, ResourceSetStatus};
pub use template::{
    NameRule, NamespaceRule, NamingRules, ParameterSpec, ResourceTemplate, ResourceTemplateSpec,
    TemplateResources,
};
pub use tenant::{Tenant, TenantPhase, TenantSpec, TenantStatus};

/// Label carried by every object generated for a tenant
pub const LABEL_TENANT: &str = "tenancy.thecowboy.ai/tenant";

/// Object metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Object name
    pub name: String,

    /// Namespace, absent for cluster-scoped objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Set once deletion of the object was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    /// Metadata for a cluster-scoped object
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Metadata for a namespaced object
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    /// Whether deletion of the object was requested
    pub fn is_deleting(&self) -> bool {
        self.deletion_timestamp.is_some()
    }
}
