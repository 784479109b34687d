// Copyright (c) 2025 - Cowboy AI, Inc.
//! Blueprint cluster object

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ObjectMeta;

/// Reference to a value in a resource group generated earlier in the same pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintValueRef {
    /// Resource group name
    pub name: String,
    /// Path query rooted at `$`
    pub path: String,
}

/// Reference to a value in a live cluster object
///
/// `namespace` and `name` accept the sentinels `$TENANT_NAME`,
/// `$TENANT_NAMESPACE` and `$OPERATOR_NAMESPACE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceValueRef {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
    /// Path query rooted at `$`
    pub path: String,
}

/// Indirect parameter value; exactly one field must be set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint: Option<BlueprintValueRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceValueRef>,
}

impl ValueRef {
    pub fn to_group(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            blueprint: Some(BlueprintValueRef {
                name: name.into(),
                path: path.into(),
            }),
            resource: None,
        }
    }

    pub fn to_resource(reference: ResourceValueRef) -> Self {
        Self {
            blueprint: None,
            resource: Some(reference),
        }
    }
}

/// Parameter override supplied by a blueprint resource group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterBinding {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_ref: Option<ValueRef>,
}

impl ParameterBinding {
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            value_ref: None,
        }
    }

    pub fn reference(name: impl Into<String>, value_ref: ValueRef) -> Self {
        Self {
            name: name.into(),
            value: None,
            value_ref: Some(value_ref),
        }
    }
}

/// One named group of a blueprint, bound to a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintResourceGroup {
    pub name: String,
    /// ResourceTemplate name
    pub template: String,
    #[serde(default)]
    pub parameters: Vec<ParameterBinding>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintSpec {
    /// Groups in generation order
    #[serde(default)]
    pub resources: Vec<BlueprintResourceGroup>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

/// Blueprint object (lives in the operator namespace)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    pub metadata: ObjectMeta,
    pub spec: BlueprintSpec,
}

impl Blueprint {
    pub fn new(name: impl Into<String>, resources: Vec<BlueprintResourceGroup>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            spec: BlueprintSpec {
                resources,
                ..Default::default()
            },
        }
    }
}
