// Copyright (c) 2025 - Cowboy AI, Inc.
//! ResourceTemplate cluster object

use serde::{Deserialize, Serialize};

use super::ObjectMeta;

/// How generated manifests are named
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameRule {
    /// Keep the rendered name
    #[default]
    Keep,
    /// Prefix the rendered name with the tenant name
    Tenant,
}

/// Which namespace generated manifests land in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceRule {
    /// Keep the rendered namespace (or none for cluster-scoped kinds)
    #[default]
    Keep,
    /// The tenant's namespace
    Tenant,
    /// The operator's namespace
    Operator,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingRules {
    #[serde(default)]
    pub name: NameRule,
    #[serde(default)]
    pub namespace: NamespaceRule,
}

/// Declared template parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            default: None,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            default: Some(default.into()),
            required: false,
        }
    }
}

/// Manifest sources: raw YAML text and embedded structured documents.
/// Both are rendered as templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateResources {
    #[serde(default)]
    pub raw: Vec<String>,
    #[serde(default)]
    pub embedded: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTemplateSpec {
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub resources: TemplateResources,
    #[serde(default)]
    pub naming: NamingRules,
}

/// ResourceTemplate object (lives in the operator namespace)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTemplate {
    pub metadata: ObjectMeta,
    pub spec: ResourceTemplateSpec,
}

impl ResourceTemplate {
    pub fn new(name: impl Into<String>, spec: ResourceTemplateSpec) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            spec,
        }
    }
}
