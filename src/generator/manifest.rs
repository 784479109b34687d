// Copyright (c) 2025 - Cowboy AI, Inc.
//! Rendered manifest documents

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::error::GenerationError;
use crate::cluster::ObjectRef;

/// A rendered manifest with `apiVersion`, `kind` and `metadata.name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest(Value);

impl Manifest {
    /// Validate the identifying fields of a rendered document
    pub fn parse(document: Value) -> Result<Self, GenerationError> {
        if !document.is_object() {
            return Err(GenerationError::InvalidManifest(format!(
                "expected a mapping, got {document}"
            )));
        }
        for (pointer, field) in [
            ("/apiVersion", "apiVersion"),
            ("/kind", "kind"),
            ("/metadata/name", "metadata.name"),
        ] {
            let present = document
                .pointer(pointer)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty());
            if !present {
                return Err(GenerationError::InvalidManifest(format!("missing {field}")));
            }
        }
        Ok(Self(document))
    }

    fn str_at(&self, pointer: &str) -> &str {
        self.0.pointer(pointer).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn api_version(&self) -> &str {
        self.str_at("/apiVersion")
    }

    pub fn kind(&self) -> &str {
        self.str_at("/kind")
    }

    pub fn name(&self) -> &str {
        self.str_at("/metadata/name")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.0.pointer("/metadata/namespace").and_then(Value::as_str)
    }

    /// API group; empty for the core group
    pub fn group(&self) -> &str {
        match self.api_version().rsplit_once('/') {
            Some((group, _)) => group,
            None => "",
        }
    }

    /// `Kind.group`, or just `Kind` for the core group
    pub fn qualified_kind(&self) -> String {
        match self.group() {
            "" => self.kind().to_string(),
            group => format!("{}.{group}", self.kind()),
        }
    }

    /// Whether this is a core Namespace, whose own name is the namespace
    pub fn is_namespace(&self) -> bool {
        self.kind() == "Namespace" && self.group().is_empty()
    }

    fn metadata_mut(&mut self) -> Option<&mut Map<String, Value>> {
        object_entry(self.0.as_object_mut()?, "metadata")
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        if let Some(metadata) = self.metadata_mut() {
            metadata.insert("name".into(), Value::String(name.into()));
        }
    }

    pub fn set_namespace(&mut self, namespace: Option<&str>) {
        let Some(metadata) = self.metadata_mut() else {
            return;
        };
        match namespace {
            Some(namespace) => {
                metadata.insert("namespace".into(), Value::String(namespace.to_string()));
            }
            None => {
                metadata.remove("namespace");
            }
        }
    }

    /// Write entries into `metadata.<field>`, overwriting existing keys
    fn merge_map(&mut self, field: &str, entries: &BTreeMap<String, String>) {
        if entries.is_empty() {
            return;
        }
        let Some(target) = self.metadata_mut().and_then(|m| object_entry(m, field)) else {
            return;
        };
        for (key, value) in entries {
            target.insert(key.clone(), Value::String(value.clone()));
        }
    }

    pub fn merge_labels(&mut self, labels: &BTreeMap<String, String>) {
        self.merge_map("labels", labels);
    }

    pub fn merge_annotations(&mut self, annotations: &BTreeMap<String, String>) {
        self.merge_map("annotations", annotations);
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.api_version(), self.kind(), self.namespace(), self.name())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// The mapping stored under `key`, replacing anything that is not a mapping
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    let entry = map
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    entry.as_object_mut()
}
