// Copyright (c) 2025 - Cowboy AI, Inc.
//! Value Resolver
//!
//! Resolves a [`ValueRef`] to the string passed as a template parameter.
//! Exactly one reference kind must be set:
//!
//! ```text
//! ValueRef.blueprint ──> group generated earlier in this pass ──┐
//!                                                               ├─ path query ─> exactly one node
//! ValueRef.resource  ──> live cluster object (sentinels first) ─┘
//! ```
//!
//! Resolution fails closed: a missing group or object, an empty result and
//! an ambiguous result are all errors, never defaults.

pub mod path;

use serde_json::Value;
use thiserror::Error;

use crate::cluster::{ClusterClient, ObjectRef};
use crate::domain::{ResourceGroup, ValueRef};

pub use path::{PathError, PathQuery};

/// Sentinel replaced by the tenant name
pub const TENANT_NAME: &str = "$TENANT_NAME";
/// Sentinel replaced by the tenant namespace
pub const TENANT_NAMESPACE: &str = "$TENANT_NAMESPACE";
/// Sentinel replaced by the operator namespace
pub const OPERATOR_NAMESPACE: &str = "$OPERATOR_NAMESPACE";

/// Failure resolving a reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("value reference must set exactly one of blueprint or resource")]
    InvalidReference,

    #[error("resource group {0} not found")]
    GroupNotFound(String),

    #[error("object {0} not found")]
    ObjectNotFound(String),

    /// Cluster call failed; retrying may succeed
    #[error("lookup of {reference} failed: {reason}")]
    Lookup { reference: String, reason: String },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("path {0} matched nothing")]
    EmptyResult(String),

    #[error("path {path} matched {matches} values")]
    Ambiguous { path: String, matches: usize },
}

impl ResolveError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ResolveError::Lookup { .. })
    }
}

/// Evaluate `path` against `root`, requiring exactly one non-empty match
pub fn query_one(path: &str, root: &Value) -> Result<String, ResolveError> {
    let query = PathQuery::parse(path)?;
    let matches = query.select(root);
    match matches.as_slice() {
        [] => Err(ResolveError::EmptyResult(path.to_string())),
        [value] => {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            if text.is_empty() {
                Err(ResolveError::EmptyResult(path.to_string()))
            } else {
                Ok(text)
            }
        }
        many => Err(ResolveError::Ambiguous {
            path: path.to_string(),
            matches: many.len(),
        }),
    }
}

/// Resolves references for one tenant
pub struct ValueResolver<'a, C: ClusterClient + ?Sized> {
    cluster: &'a C,
    tenant: &'a str,
    tenant_namespace: &'a str,
    operator_namespace: &'a str,
}

impl<'a, C: ClusterClient + ?Sized> ValueResolver<'a, C> {
    pub fn new(
        cluster: &'a C,
        tenant: &'a str,
        tenant_namespace: &'a str,
        operator_namespace: &'a str,
    ) -> Self {
        Self {
            cluster,
            tenant,
            tenant_namespace,
            operator_namespace,
        }
    }

    /// Replace the name and namespace sentinels
    pub fn substitute(&self, text: &str) -> String {
        // $TENANT_NAME is a prefix of $TENANT_NAMESPACE
        text.replace(TENANT_NAMESPACE, self.tenant_namespace)
            .replace(TENANT_NAME, self.tenant)
            .replace(OPERATOR_NAMESPACE, self.operator_namespace)
    }

    /// Resolve a reference against the groups generated so far
    pub async fn resolve(
        &self,
        value_ref: &ValueRef,
        generated: &[ResourceGroup],
    ) -> Result<String, ResolveError> {
        match (&value_ref.blueprint, &value_ref.resource) {
            (Some(blueprint), None) => {
                let group = generated
                    .iter()
                    .find(|g| g.name == blueprint.name)
                    .ok_or_else(|| ResolveError::GroupNotFound(blueprint.name.clone()))?;
                let document = serde_json::to_value(group).map_err(|e| ResolveError::Lookup {
                    reference: blueprint.name.clone(),
                    reason: e.to_string(),
                })?;
                query_one(&blueprint.path, &document)
            }
            (None, Some(resource)) => {
                let namespace = resource.namespace.as_deref().map(|ns| self.substitute(ns));
                let reference = ObjectRef::new(
                    resource.api_version.as_str(),
                    resource.kind.as_str(),
                    namespace.as_deref(),
                    self.substitute(&resource.name),
                );
                let document = self
                    .cluster
                    .get(&reference)
                    .await
                    .map_err(|e| ResolveError::Lookup {
                        reference: reference.to_string(),
                        reason: e.to_string(),
                    })?
                    .ok_or_else(|| ResolveError::ObjectNotFound(reference.to_string()))?;
                query_one(&resource.path, &document)
            }
            _ => Err(ResolveError::InvalidReference),
        }
    }
}
