// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cluster Object Collaborator
//!
//! The control plane reads and writes cluster objects through
//! [`ClusterClient`], a dynamic interface over manifests addressed by
//! [`ObjectRef`]. Strongly-typed access to the tenancy kinds is layered on
//! top by [`ClusterClientExt`].
//!
//! ```text
//! get_object::<Tenant>() ──to/from JSON──> ClusterClient::get(ObjectRef)
//!                                                 │
//!                                   InMemoryCluster | real API client
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{Blueprint, ObjectMeta, ResourceSet, ResourceTemplate, Tenant};
use crate::errors::{TenancyError, TenancyResult};

/// API version shared by the tenancy kinds
pub const TENANCY_API_VERSION: &str = "tenancy.thecowboy.ai/v1alpha1";

/// A strongly-typed cluster kind
pub trait ClusterObject: Serialize + DeserializeOwned + Send + Sync {
    const API_VERSION: &'static str;
    const KIND: &'static str;

    fn metadata(&self) -> &ObjectMeta;
}

macro_rules! tenancy_kind {
    ($ty:ident) => {
        impl ClusterObject for $ty {
            const API_VERSION: &'static str = TENANCY_API_VERSION;
            const KIND: &'static str = stringify!($ty);

            fn metadata(&self) -> &ObjectMeta {
                &self.metadata
            }
        }
    };
}

tenancy_kind!(Tenant);
tenancy_kind!(Blueprint);
tenancy_kind!(ResourceTemplate);
tenancy_kind!(ResourceSet);

/// Address of one cluster object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    pub api_version: String,
    pub kind: String,
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectRef {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        namespace: Option<&str>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            namespace: namespace.map(str::to_string),
            name: name.into(),
        }
    }

    /// Address of a typed object
    pub fn of<T: ClusterObject>(namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self::new(T::API_VERSION, T::KIND, namespace, name)
    }

    /// Read the address out of a manifest's `apiVersion`, `kind` and metadata
    pub fn from_manifest(manifest: &Value) -> TenancyResult<Self> {
        let field = |pointer: &str| manifest.pointer(pointer).and_then(Value::as_str);
        let (Some(api_version), Some(kind), Some(name)) = (
            field("/apiVersion"),
            field("/kind"),
            field("/metadata/name"),
        ) else {
            return Err(TenancyError::Serialization(
                "manifest needs apiVersion, kind and metadata.name".to_string(),
            ));
        };
        Ok(Self::new(api_version, kind, field("/metadata/namespace"), name))
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}/{}", self.kind, namespace, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

/// Dynamic access to cluster objects
///
/// Transient failures are reported as [`TenancyError::Cluster`].
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Fetch one object; `None` when it does not exist
    async fn get(&self, reference: &ObjectRef) -> TenancyResult<Option<Value>>;

    /// List objects of a kind, optionally within one namespace
    async fn list(
        &self,
        api_version: &str,
        kind: &str,
        namespace: Option<&str>,
    ) -> TenancyResult<Vec<Value>>;

    /// Create an object; fails when it already exists
    async fn create(&self, manifest: &Value) -> TenancyResult<()>;

    /// Replace an existing object; fails when it does not exist
    async fn update(&self, manifest: &Value) -> TenancyResult<()>;

    /// Create or replace an object
    async fn apply(&self, manifest: &Value) -> TenancyResult<()>;

    /// Delete an object; returns `false` when it was already gone
    async fn delete(&self, reference: &ObjectRef) -> TenancyResult<bool>;
}

fn to_manifest<T: ClusterObject>(object: &T) -> TenancyResult<Value> {
    let mut manifest = serde_json::to_value(object)?;
    if let Some(fields) = manifest.as_object_mut() {
        fields.insert("apiVersion".into(), Value::from(T::API_VERSION));
        fields.insert("kind".into(), Value::from(T::KIND));
    }
    Ok(manifest)
}

fn from_manifest<T: ClusterObject>(manifest: Value) -> TenancyResult<T> {
    serde_json::from_value(manifest)
        .map_err(|e| TenancyError::Serialization(format!("malformed {}: {e}", T::KIND)))
}

/// Typed access on top of [`ClusterClient`]
#[async_trait]
pub trait ClusterClientExt: ClusterClient {
    async fn get_object<T: ClusterObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> TenancyResult<Option<T>> {
        match self.get(&ObjectRef::of::<T>(namespace, name)).await? {
            Some(manifest) => from_manifest(manifest).map(Some),
            None => Ok(None),
        }
    }

    async fn list_objects<T: ClusterObject>(
        &self,
        namespace: Option<&str>,
    ) -> TenancyResult<Vec<T>> {
        self.list(T::API_VERSION, T::KIND, namespace)
            .await?
            .into_iter()
            .map(from_manifest)
            .collect()
    }

    async fn create_object<T: ClusterObject>(&self, object: &T) -> TenancyResult<()> {
        self.create(&to_manifest(object)?).await
    }

    async fn update_object<T: ClusterObject>(&self, object: &T) -> TenancyResult<()> {
        self.update(&to_manifest(object)?).await
    }

    async fn apply_object<T: ClusterObject>(&self, object: &T) -> TenancyResult<()> {
        self.apply(&to_manifest(object)?).await
    }

    async fn delete_object<T: ClusterObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> TenancyResult<bool> {
        self.delete(&ObjectRef::of::<T>(namespace, name)).await
    }
}

impl<C: ClusterClient + ?Sized> ClusterClientExt for C {}

#[async_trait]
impl<C: ClusterClient + ?Sized> ClusterClient for Arc<C> {
    async fn get(&self, reference: &ObjectRef) -> TenancyResult<Option<Value>> {
        (**self).get(reference).await
    }

    async fn list(
        &self,
        api_version: &str,
        kind: &str,
        namespace: Option<&str>,
    ) -> TenancyResult<Vec<Value>> {
        (**self).list(api_version, kind, namespace).await
    }

    async fn create(&self, manifest: &Value) -> TenancyResult<()> {
        (**self).create(manifest).await
    }

    async fn update(&self, manifest: &Value) -> TenancyResult<()> {
        (**self).update(manifest).await
    }

    async fn apply(&self, manifest: &Value) -> TenancyResult<()> {
        (**self).apply(manifest).await
    }

    async fn delete(&self, reference: &ObjectRef) -> TenancyResult<bool> {
        (**self).delete(reference).await
    }
}

type ObjectKey = (String, String, String);

fn key_of(reference: &ObjectRef) -> ObjectKey {
    (
        reference.kind.clone(),
        reference.namespace.clone().unwrap_or_default(),
        reference.name.clone(),
    )
}

/// In-memory cluster for tests and embedding
///
/// Objects are keyed by kind, namespace and name. Kinds can be switched
/// into a failing mode to simulate an unavailable API.
#[derive(Debug, Default)]
pub struct InMemoryCluster {
    objects: RwLock<BTreeMap<ObjectKey, Value>>,
    failing_kinds: RwLock<BTreeSet<String>>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call touching `kind` fail with a cluster error
    pub async fn fail_kind(&self, kind: &str) {
        self.failing_kinds.write().await.insert(kind.to_string());
    }

    pub async fn recover_kind(&self, kind: &str) {
        self.failing_kinds.write().await.remove(kind);
    }

    /// Number of stored objects of a kind
    pub async fn count(&self, kind: &str) -> usize {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(k, _, _)| k == kind)
            .count()
    }

    pub async fn contains(&self, reference: &ObjectRef) -> bool {
        self.objects.read().await.contains_key(&key_of(reference))
    }

    async fn check_available(&self, kind: &str) -> TenancyResult<()> {
        if self.failing_kinds.read().await.contains(kind) {
            return Err(TenancyError::Cluster(format!("{kind} API unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterClient for InMemoryCluster {
    async fn get(&self, reference: &ObjectRef) -> TenancyResult<Option<Value>> {
        self.check_available(&reference.kind).await?;
        Ok(self.objects.read().await.get(&key_of(reference)).cloned())
    }

    async fn list(
        &self,
        _api_version: &str,
        kind: &str,
        namespace: Option<&str>,
    ) -> TenancyResult<Vec<Value>> {
        self.check_available(kind).await?;
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .filter(|((k, ns, _), _)| k == kind && namespace.map_or(true, |n| n == ns))
            .map(|(_, manifest)| manifest.clone())
            .collect())
    }

    async fn create(&self, manifest: &Value) -> TenancyResult<()> {
        let reference = ObjectRef::from_manifest(manifest)?;
        self.check_available(&reference.kind).await?;
        let mut objects = self.objects.write().await;
        let key = key_of(&reference);
        if objects.contains_key(&key) {
            return Err(TenancyError::Cluster(format!("{reference} already exists")));
        }
        objects.insert(key, manifest.clone());
        Ok(())
    }

    async fn update(&self, manifest: &Value) -> TenancyResult<()> {
        let reference = ObjectRef::from_manifest(manifest)?;
        self.check_available(&reference.kind).await?;
        let mut objects = self.objects.write().await;
        match objects.get_mut(&key_of(&reference)) {
            Some(existing) => {
                *existing = manifest.clone();
                Ok(())
            }
            None => Err(TenancyError::Cluster(format!("{reference} not found"))),
        }
    }

    async fn apply(&self, manifest: &Value) -> TenancyResult<()> {
        let reference = ObjectRef::from_manifest(manifest)?;
        self.check_available(&reference.kind).await?;
        self.objects
            .write()
            .await
            .insert(key_of(&reference), manifest.clone());
        Ok(())
    }

    async fn delete(&self, reference: &ObjectRef) -> TenancyResult<bool> {
        self.check_available(&reference.kind).await?;
        Ok(self
            .objects
            .write()
            .await
            .remove(&key_of(reference))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_typed_round_trip_adds_kind() {
        let cluster = InMemoryCluster::new();
        cluster
            .create_object(&Tenant::new("acme", "standard"))
            .await
            .unwrap();

        let raw = cluster
            .get(&ObjectRef::of::<Tenant>(None, "acme"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw["kind"], "Tenant");
        assert_eq!(raw["apiVersion"], TENANCY_API_VERSION);

        let tenant: Tenant = cluster.get_object(None, "acme").await.unwrap().unwrap();
        assert_eq!(tenant.spec.blueprint, "standard");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_an_error() {
        let cluster = InMemoryCluster::new();
        let reference = ObjectRef::new("v1", "ConfigMap", Some("acme"), "settings");
        assert!(!cluster.delete(&reference).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let cluster = InMemoryCluster::new();
        let manifest = json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": "settings", "namespace": "acme" }
        });
        cluster.create(&manifest).await.unwrap();
        assert!(cluster.create(&manifest).await.is_err());
        assert!(cluster.apply(&manifest).await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_kind_reports_cluster_error() {
        let cluster = InMemoryCluster::new();
        cluster.fail_kind("ResourceSet").await;

        let err = cluster
            .get_object::<ResourceSet>(None, "acme-001")
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_manifest_without_name_is_rejected() {
        let manifest = json!({ "apiVersion": "v1", "kind": "ConfigMap", "metadata": {} });
        assert!(ObjectRef::from_manifest(&manifest).is_err());
    }
}
