// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reconcile pass tests
//!
//! Drive `TenantReconciler` against the in-memory cluster and chunk store
//! and check the objects, stream and requeue decisions each pass leaves
//! behind.

mod fixtures;

use pretty_assertions::assert_eq;
use std::time::Duration;

use cim_tenancy::aggregate::TenantAggregate;
use cim_tenancy::cluster::{ClusterClient, ClusterClientExt, ObjectRef};
use cim_tenancy::domain::{
    find_condition, ConditionStatus, ResourceSet, Tenant, TenantPhase, CONDITION_READY,
};
use cim_tenancy::event_store::ChunkStore;
use cim_tenancy::events::{
    BlueprintSet, ResourceSetActivated, ResourceSetCreated, ResourceSetNameChanged, TenantCreated,
};
use cim_tenancy::projection::tenant_status::CONDITION_GENERATED;
use cim_tenancy::TenancyError;

use fixtures::*;

fn config_map(namespace: &str, name: &str) -> ObjectRef {
    ObjectRef::new("v1", "ConfigMap", Some(namespace), name)
}

fn resource_set(name: &str) -> ObjectRef {
    ObjectRef::of::<ResourceSet>(None, name)
}

async fn tenant_object(cluster: &impl ClusterClient) -> Tenant {
    cluster
        .get_object::<Tenant>(None, TENANT)
        .await
        .unwrap()
        .unwrap()
}

async fn switch_blueprint(cluster: &impl ClusterClient, blueprint: &str) {
    let mut tenant = tenant_object(cluster).await;
    tenant.spec.blueprint = blueprint.to_string();
    cluster.update_object(&tenant).await.unwrap();
}

#[tokio::test]
async fn test_first_pass_generates_and_applies_resources() {
    let cluster = cluster_with_tenant().await;
    let (reconciler, store) = reconciler(cluster.clone());

    let outcome = reconciler.reconcile(TENANT).await.unwrap();
    assert_eq!(outcome.requeue_after, Some(config().reconcile_interval));
    assert_eq!(store.write_count(), 1);

    assert!(cluster.contains(&ObjectRef::new("v1", "Namespace", None, TENANT)).await);
    assert!(cluster.contains(&ObjectRef::new("v1", "Service", Some(TENANT), "acme-db")).await);

    let app = cluster
        .get(&config_map(TENANT, "acme-app-settings"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(app["data"]["DATABASE_HOST"], "acme-db");

    let set = cluster
        .get_object::<ResourceSet>(None, "acme-001")
        .await
        .unwrap()
        .unwrap();
    assert!(set.spec.active);
    assert!(set.is_ready());
    assert_eq!(set.spec.resources.len(), 4);

    let tenant = tenant_object(cluster.as_ref()).await;
    assert_eq!(tenant.status.phase, Some(TenantPhase::Reconciling));
    assert_eq!(tenant.status.resource_set.as_deref(), Some("acme-001"));
    let ready = find_condition(&tenant.status.conditions, CONDITION_READY).unwrap();
    assert_eq!(ready.status, ConditionStatus::True);
}

#[tokio::test]
async fn test_second_pass_writes_no_commit() {
    let cluster = cluster_with_tenant().await;
    let (reconciler, store) = reconciler(cluster);

    reconciler.reconcile(TENANT).await.unwrap();
    reconciler.reconcile(TENANT).await.unwrap();

    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_missing_blueprint_records_failure_and_backs_off() {
    let cluster = seeded_cluster().await;
    cluster
        .create_object(&tenant(TENANT, "does-not-exist"))
        .await
        .unwrap();
    let (reconciler, _store) = reconciler(cluster.clone());

    let outcome = reconciler.reconcile(TENANT).await.unwrap();
    assert_eq!(outcome.requeue_after, Some(Duration::from_secs(15)));

    let tenant = tenant_object(cluster.as_ref()).await;
    let generated = find_condition(&tenant.status.conditions, CONDITION_GENERATED).unwrap();
    assert_eq!(generated.status, ConditionStatus::False);
    assert!(generated.message.contains("does-not-exist"));
    assert_eq!(cluster.count("ResourceSet").await, 0);
}

#[tokio::test]
async fn test_missing_template_fails_then_recovers() {
    let cluster = cluster_with_tenant().await;
    cluster
        .delete_object::<cim_tenancy::domain::ResourceTemplate>(Some(OPERATOR_NAMESPACE), "app")
        .await
        .unwrap();
    let (reconciler, _store) = reconciler(cluster.clone());

    let outcome = reconciler.reconcile(TENANT).await.unwrap();
    assert_eq!(outcome.requeue_after, Some(Duration::from_secs(15)));
    assert!(!cluster.contains(&config_map(TENANT, "acme-db-settings")).await);

    cluster.create_object(&app_template()).await.unwrap();
    let outcome = reconciler.reconcile(TENANT).await.unwrap();
    assert_eq!(outcome.requeue_after, Some(config().reconcile_interval));
    assert!(cluster.contains(&config_map(TENANT, "acme-app-settings")).await);
}

#[tokio::test]
async fn test_unavailable_templates_are_retried_without_writing() {
    let cluster = cluster_with_tenant().await;
    cluster.fail_kind("ResourceTemplate").await;
    let (reconciler, store) = reconciler(cluster.clone());

    let err = reconciler.reconcile(TENANT).await.unwrap_err();
    assert!(matches!(err, TenancyError::Generation(_)));
    assert!(err.is_retryable());
    assert_eq!(store.write_count(), 0);

    cluster.recover_kind("ResourceTemplate").await;
    reconciler.reconcile(TENANT).await.unwrap();
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_blueprint_change_rotates_and_deletes_orphans() {
    let cluster = cluster_with_tenant().await;
    let (reconciler, _store) = reconciler(cluster.clone());
    reconciler.reconcile(TENANT).await.unwrap();

    switch_blueprint(cluster.as_ref(), MINIMAL).await;
    reconciler.reconcile(TENANT).await.unwrap();

    assert!(!cluster.contains(&config_map(TENANT, "acme-app-settings")).await);
    assert!(cluster.contains(&config_map(TENANT, "acme-db-settings")).await);

    let old = cluster
        .get_object::<ResourceSet>(None, "acme-001")
        .await
        .unwrap()
        .unwrap();
    let new = cluster
        .get_object::<ResourceSet>(None, "acme-002")
        .await
        .unwrap()
        .unwrap();
    assert!(!old.spec.active);
    assert_eq!(old.spec.resources.len(), 4);
    assert!(new.spec.active);
    assert_eq!(new.spec.resources.len(), 3);

    let tenant = tenant_object(cluster.as_ref()).await;
    assert_eq!(tenant.status.blueprint.as_deref(), Some(MINIMAL));
    assert_eq!(tenant.status.resource_set.as_deref(), Some("acme-002"));
}

#[tokio::test]
async fn test_surplus_resource_sets_are_retired() {
    let cluster = cluster_with_tenant().await;
    let (reconciler, _store) =
        reconciler_with(cluster.clone(), config().with_resource_set_retention(2));

    reconciler.reconcile(TENANT).await.unwrap();
    for blueprint in [MINIMAL, STANDARD] {
        switch_blueprint(cluster.as_ref(), blueprint).await;
        reconciler.reconcile(TENANT).await.unwrap();
    }

    assert!(!cluster.contains(&resource_set("acme-001")).await);
    assert!(cluster.contains(&resource_set("acme-002")).await);
    assert!(cluster.contains(&resource_set("acme-003")).await);
}

#[tokio::test]
async fn test_two_active_resource_sets_abort_the_pass() {
    let cluster = cluster_with_tenant().await;
    let (reconciler, store) = reconciler(cluster.clone());

    let mut aggregate = TenantAggregate::for_tenant(TENANT);
    aggregate.apply(TenantCreated {});
    aggregate.apply(BlueprintSet {
        name: STANDARD.into(),
    });
    aggregate.apply(ResourceSetCreated {
        name: "acme-001".into(),
    });
    aggregate.apply(ResourceSetNameChanged {
        name: "acme-001".into(),
    });
    aggregate.apply(ResourceSetActivated {
        name: "acme-001".into(),
    });
    aggregate.apply(ResourceSetCreated {
        name: "acme-002".into(),
    });
    aggregate.apply(ResourceSetActivated {
        name: "acme-002".into(),
    });
    reconciler.repository().save(&mut aggregate).await.unwrap();

    let err = reconciler.reconcile(TENANT).await.unwrap_err();
    assert!(matches!(err, TenancyError::InvariantViolation(_)));
    assert!(!err.is_retryable());
    assert_eq!(store.write_count(), 1);
    assert_eq!(cluster.count("ResourceSet").await, 0);
}

#[tokio::test]
async fn test_deleted_tenant_is_torn_down() {
    let cluster = cluster_with_tenant().await;
    let (reconciler, store) = reconciler(cluster.clone());
    reconciler.reconcile(TENANT).await.unwrap();

    cluster
        .delete_object::<Tenant>(None, TENANT)
        .await
        .unwrap();
    let outcome = reconciler.reconcile(TENANT).await.unwrap();

    assert_eq!(outcome.requeue_after, None);
    assert_eq!(cluster.count("ConfigMap").await, 0);
    assert_eq!(cluster.count("Service").await, 0);
    assert_eq!(cluster.count("Namespace").await, 0);
    assert_eq!(cluster.count("ResourceSet").await, 0);
    assert!(store.list_chunks(TENANT).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_terminating_tenant_reports_phase_before_teardown() {
    let cluster = cluster_with_tenant().await;
    let (reconciler, store) = reconciler(cluster.clone());
    reconciler.reconcile(TENANT).await.unwrap();

    let mut tenant = tenant_object(cluster.as_ref()).await;
    tenant.metadata.deletion_timestamp = Some(chrono::Utc::now());
    cluster.update_object(&tenant).await.unwrap();
    let outcome = reconciler.reconcile(TENANT).await.unwrap();

    assert_eq!(outcome.requeue_after, None);
    let tenant = tenant_object(cluster.as_ref()).await;
    assert_eq!(tenant.status.phase, Some(TenantPhase::Terminating));
    let ready = find_condition(&tenant.status.conditions, CONDITION_READY).unwrap();
    assert_eq!(ready.status, ConditionStatus::False);
    assert_eq!(cluster.count("ResourceSet").await, 0);
    assert!(store.list_chunks(TENANT).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_longest_tenant_name_reconciles() {
    let name = "a".repeat(61);
    let cluster = seeded_cluster().await;
    cluster
        .create_object(&tenant(&name, STANDARD))
        .await
        .unwrap();
    let (reconciler, _store) = reconciler(cluster.clone());

    let outcome = reconciler.reconcile(&name).await.unwrap();
    assert_eq!(outcome.requeue_after, Some(config().reconcile_interval));

    let set_name = format!("{name}-001");
    let set = cluster
        .get_object::<ResourceSet>(None, &set_name)
        .await
        .unwrap()
        .unwrap();
    assert!(set.spec.active);

    let tenant = cluster
        .get_object::<Tenant>(None, &name)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tenant.status.resource_set, Some(set_name));
}

#[tokio::test]
async fn test_unknown_tenant_is_a_noop() {
    let cluster = seeded_cluster().await;
    let (reconciler, store) = reconciler(cluster);

    let outcome = reconciler.reconcile("nobody").await.unwrap();
    assert_eq!(outcome.requeue_after, None);
    assert_eq!(store.write_count(), 0);
}
