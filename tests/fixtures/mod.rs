// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-tenancy
//!
//! Deterministic builders for tenants, templates, blueprints and event
//! streams. Every template and blueprint lives in [`OPERATOR_NAMESPACE`].
//!
//! The standard blueprint has three groups, in order:
//!
//! | group | template | produces |
//! |---|---|---|
//! | `namespace` | `namespace` | the tenant Namespace |
//! | `database` | `postgres` | Service `{tenant}-db`, ConfigMap `{tenant}-db-settings` |
//! | `app` | `app` | ConfigMap `{tenant}-app-settings`, host read from `database` |
//!
//! The minimal blueprint drops the `app` group.

#![allow(dead_code)]

use serde_json::json;
use std::sync::Arc;

use cim_tenancy::cluster::{ClusterClientExt, InMemoryCluster};
use cim_tenancy::config::OperatorConfig;
use cim_tenancy::domain::{
    Blueprint, BlueprintResourceGroup, NameRule, NamespaceRule, NamingRules, ParameterBinding,
    ParameterSpec, Resource, ResourceTemplate, ResourceTemplateSpec, Tenant, TemplateResources,
    ValueRef,
};
use cim_tenancy::event_store::{InMemoryChunkStore, Repository};
use cim_tenancy::events::{Event, TenantEvent};
use cim_tenancy::observability::init_tracing;
use cim_tenancy::service::TenantReconciler;

pub const OPERATOR_NAMESPACE: &str = "tenancy-system";
pub const TENANT: &str = "acme";
pub const STANDARD: &str = "standard";
pub const MINIMAL: &str = "minimal";

pub type TestReconciler = TenantReconciler<InMemoryCluster, InMemoryChunkStore>;

pub fn config() -> OperatorConfig {
    OperatorConfig::default().with_operator_namespace(OPERATOR_NAMESPACE)
}

pub fn tenant(name: &str, blueprint: &str) -> Tenant {
    Tenant::new(name, blueprint)
}

fn tenant_scoped() -> NamingRules {
    NamingRules {
        name: NameRule::Tenant,
        namespace: NamespaceRule::Tenant,
    }
}

fn in_operator_namespace(mut template: ResourceTemplate) -> ResourceTemplate {
    template.metadata.namespace = Some(OPERATOR_NAMESPACE.to_string());
    template
}

pub fn namespace_template() -> ResourceTemplate {
    in_operator_namespace(ResourceTemplate::new(
        "namespace",
        ResourceTemplateSpec {
            parameters: vec![],
            resources: TemplateResources {
                raw: vec![],
                embedded: vec![json!({
                    "apiVersion": "v1",
                    "kind": "Namespace",
                    "metadata": { "name": "placeholder" }
                })],
            },
            naming: NamingRules {
                name: NameRule::Keep,
                namespace: NamespaceRule::Tenant,
            },
        },
    ))
}

pub fn postgres_template() -> ResourceTemplate {
    in_operator_namespace(ResourceTemplate::new(
        "postgres",
        ResourceTemplateSpec {
            parameters: vec![
                ParameterSpec::required("size"),
                ParameterSpec::optional("port", "5432"),
            ],
            resources: TemplateResources {
                raw: vec![r#"apiVersion: v1
kind: Service
metadata:
  name: db
spec:
  ports:
    - port: {{Parameters.port}}
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: db-settings
data:
  size: {{quote Parameters.size}}
  owner: {{quote Tenant.DisplayName}}
"#
                .to_string()],
                embedded: vec![],
            },
            naming: tenant_scoped(),
        },
    ))
}

pub fn app_template() -> ResourceTemplate {
    in_operator_namespace(ResourceTemplate::new(
        "app",
        ResourceTemplateSpec {
            parameters: vec![ParameterSpec::required("db_host")],
            resources: TemplateResources {
                raw: vec![r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: app-settings
data:
  DATABASE_HOST: {{quote Parameters.db_host}}
"#
                .to_string()],
                embedded: vec![],
            },
            naming: tenant_scoped(),
        },
    ))
}

pub fn group(name: &str, template: &str, parameters: Vec<ParameterBinding>) -> BlueprintResourceGroup {
    BlueprintResourceGroup {
        name: name.to_string(),
        template: template.to_string(),
        parameters,
    }
}

pub fn database_host_ref() -> ValueRef {
    ValueRef::to_group("database", "$.resources[0].embedded.metadata.name")
}

pub fn blueprint(name: &str, groups: Vec<BlueprintResourceGroup>) -> Blueprint {
    let mut blueprint = Blueprint::new(name, groups);
    blueprint.metadata.namespace = Some(OPERATOR_NAMESPACE.to_string());
    blueprint
}

pub fn standard_blueprint() -> Blueprint {
    blueprint(
        STANDARD,
        vec![
            group("namespace", "namespace", vec![]),
            group("database", "postgres", vec![ParameterBinding::literal("size", "small")]),
            group(
                "app",
                "app",
                vec![ParameterBinding::reference("db_host", database_host_ref())],
            ),
        ],
    )
}

pub fn minimal_blueprint() -> Blueprint {
    blueprint(
        MINIMAL,
        vec![
            group("namespace", "namespace", vec![]),
            group("database", "postgres", vec![ParameterBinding::literal("size", "small")]),
        ],
    )
}

/// Cluster holding every template and both blueprints, but no tenant
pub async fn seeded_cluster() -> Arc<InMemoryCluster> {
    let cluster = Arc::new(InMemoryCluster::new());
    for template in [namespace_template(), postgres_template(), app_template()] {
        cluster
            .create_object(&template)
            .await
            .expect("seed template");
    }
    for blueprint in [standard_blueprint(), minimal_blueprint()] {
        cluster
            .create_object(&blueprint)
            .await
            .expect("seed blueprint");
    }
    cluster
}

/// Seeded cluster with the `acme` tenant on the standard blueprint
pub async fn cluster_with_tenant() -> Arc<InMemoryCluster> {
    let cluster = seeded_cluster().await;
    cluster
        .create_object(&tenant(TENANT, STANDARD))
        .await
        .expect("seed tenant");
    cluster
}

pub fn reconciler_with(
    cluster: Arc<InMemoryCluster>,
    config: OperatorConfig,
) -> (TestReconciler, Arc<InMemoryChunkStore>) {
    init_tracing(tracing::Level::DEBUG);
    let store = Arc::new(InMemoryChunkStore::new());
    let repository = Repository::with_tenant_events(Arc::clone(&store));
    (TenantReconciler::new(cluster, repository, config), store)
}

pub fn reconciler(cluster: Arc<InMemoryCluster>) -> (TestReconciler, Arc<InMemoryChunkStore>) {
    reconciler_with(cluster, config())
}

/// Events numbered from 1 in the given order
pub fn events(stream_id: &str, payloads: Vec<TenantEvent>) -> Vec<Event> {
    payloads
        .into_iter()
        .enumerate()
        .map(|(i, payload)| Event {
            stream_id: stream_id.to_string(),
            sequence: i as i64 + 1,
            payload,
        })
        .collect()
}

pub fn resource(id: &str, order: i64, sum: &str) -> Resource {
    Resource {
        id: id.to_string(),
        order,
        sum: sum.to_string(),
        embedded: json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": id, "namespace": TENANT }
        }),
    }
}
