// Copyright (c) 2025 - Cowboy AI, Inc.
//! Content addressing for generated resources
//!
//! Identity and content are hashed separately: `resource_id` covers only
//! what names the object, `content_sum` covers every rendered byte.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::Resource;

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Stable identity of `(group-qualified kind, namespace, name)`
pub fn resource_id(qualified_kind: &str, namespace: Option<&str>, name: &str) -> String {
    sha256_hex(format!("{qualified_kind}/{}/{name}", namespace.unwrap_or_default()).as_bytes())
}

/// Hash of the rendered manifest
///
/// Object keys serialize in sorted order, so equal manifests hash equally.
pub fn content_sum(manifest: &Value) -> String {
    sha256_hex(manifest.to_string().as_bytes())
}

/// Hash over the ordered `(id, order, sum)` triples of a resource list
pub fn aggregate_sum<'a>(resources: impl IntoIterator<Item = &'a Resource>) -> String {
    let mut hasher = Sha256::new();
    for resource in resources {
        hasher.update(format!("{}:{}:{}\n", resource.id, resource.order, resource.sum).as_bytes());
    }
    hex::encode(hasher.finalize())
}
