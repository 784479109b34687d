// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tenant reconcile pass
//!
//! One pass brings a tenant's event stream and cluster objects in line with
//! the Tenant object:
//!
//! 1. Load the stream and rebuild the aggregate
//! 2. Decide commands from the Tenant spec (name, blueprint, labels)
//! 3. Rotate the resource-set when the blueprint changed
//! 4. Generate resources and record the difference (or the failure)
//! 5. Replay projections and check the single-active invariant
//! 6. Append the new commit
//! 7. Write projection results to the cluster: resources, orphans,
//!    resource-sets, retired sets, tenant status
//!
//! Nothing reaches the cluster unless the commit succeeded. A transient
//! failure aborts the pass before anything is written, and the retried pass
//! re-derives the same commands, which then turn out to be no-ops where they
//! already hold.
//!
//! A Tenant object that is gone or marked for deletion takes the teardown
//! path instead: the Terminating status is written while the object still
//! exists, then everything the tenant owns is removed, the stream last.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::aggregate::{GenerationOutcome, TenantAggregate, TenantCommand};
use crate::cluster::{ClusterClient, ClusterClientExt, ObjectRef};
use crate::config::OperatorConfig;
use crate::domain::{
    set_condition, Blueprint, Condition, ConditionStatus, ObjectName, Resource, ResourceSet,
    Tenant, CONDITION_READY,
};
use crate::errors::TenancyResult;
use crate::event_store::{ChunkStore, Repository};
use crate::events::Event;
use crate::generator::{aggregate_sum, diff_resources, ResourceGenerator};
use crate::projection::{select_retired, Projections};

/// What the controller should do after a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// `None` once the tenant is gone and its stream deleted
    pub requeue_after: Option<Duration>,
}

impl ReconcileOutcome {
    pub fn requeue(after: Duration) -> Self {
        Self {
            requeue_after: Some(after),
        }
    }

    pub fn done() -> Self {
        Self {
            requeue_after: None,
        }
    }
}

/// Reconciles one tenant at a time against the cluster and its stream
pub struct TenantReconciler<C: ClusterClient + ?Sized, S: ChunkStore + ?Sized> {
    cluster: Arc<C>,
    repository: Repository<S>,
    config: OperatorConfig,
}

impl<C: ClusterClient + ?Sized, S: ChunkStore + ?Sized> TenantReconciler<C, S> {
    pub fn new(cluster: Arc<C>, repository: Repository<S>, config: OperatorConfig) -> Self {
        Self {
            cluster,
            repository,
            config,
        }
    }

    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repository
    }

    /// Run one pass for the tenant named `name`
    pub async fn reconcile(&self, name: &str) -> TenancyResult<ReconcileOutcome> {
        let correlation_id = Uuid::now_v7();
        let span = info_span!("reconcile", tenant = name, %correlation_id);

        async {
            let result = self.reconcile_inner(name).await;
            match &result {
                Ok(outcome) => debug!(requeue_after = ?outcome.requeue_after, "Reconcile finished"),
                Err(error) if error.is_retryable() => warn!(%error, "Reconcile will be retried"),
                Err(error) => error!(%error, "Reconcile failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn reconcile_inner(&self, name: &str) -> TenancyResult<ReconcileOutcome> {
        let tenant = self.cluster.get_object::<Tenant>(None, name).await?;
        let stream = self.repository.get(name).await?;
        let mut aggregate = TenantAggregate::for_tenant(name);
        aggregate.load_from_historical_events(&stream);
        let history = stream.events();

        match tenant {
            Some(tenant) if !tenant.metadata.is_deleting() => {
                self.reconcile_live(tenant, aggregate, history).await
            }
            tenant => self.reconcile_deleted(name, tenant, aggregate, history).await,
        }
    }

    async fn reconcile_live(
        &self,
        mut tenant: Tenant,
        mut aggregate: TenantAggregate,
        history: Vec<Event>,
    ) -> TenancyResult<ReconcileOutcome> {
        let name = tenant.metadata.name.clone();
        ObjectName::new(name.as_str()).map_err(crate::aggregate::CommandError::from)?;

        aggregate.execute(TenantCommand::Create)?;
        aggregate.execute(TenantCommand::SetName(tenant.display_name().to_string()))?;
        aggregate.execute(TenantCommand::SetBlueprint(tenant.spec.blueprint.clone()))?;
        aggregate.execute(TenantCommand::SetLabels(tenant.spec.labels.clone()))?;
        aggregate.execute(TenantCommand::SetAnnotations(tenant.spec.annotations.clone()))?;

        let blueprint = self
            .cluster
            .get_object::<Blueprint>(
                Some(self.config.operator_namespace.as_str()),
                &tenant.spec.blueprint,
            )
            .await?;

        match blueprint {
            Some(blueprint) => self.generate(&tenant, &blueprint, &mut aggregate).await?,
            None => {
                warn!(blueprint = %tenant.spec.blueprint, "Blueprint not found");
                aggregate.execute(TenantCommand::RecordGenerationFailure {
                    reason: format!("blueprint {} not found", tenant.spec.blueprint),
                })?;
            }
        }

        let mut events = history;
        events.extend_from_slice(aggregate.uncommitted_events());
        let mut projections = Projections::build(&events, &self.config);
        let active = projections
            .resource_sets
            .ensure_single_active()?
            .map(|draft| draft.name.clone());

        self.repository.save(&mut aggregate).await?;

        if let Some(active) = &active {
            if let Some(draft) = projections.resource_sets.draft(active) {
                self.apply_resources(&draft.resources).await?;
            }
        }

        if projections.orphans.delete_allowed() {
            for orphan in projections.orphans.orphans() {
                if self.delete_resource(orphan).await? {
                    info!(resource = %orphan.id, "Deleted orphaned resource");
                }
            }
        }

        let retired = select_retired(
            projections.resource_sets.names(),
            active.as_deref(),
            self.config.resource_set_retention,
        );
        for mut set in projections.resource_sets.to_resource_sets(&name, &retired) {
            let (status, reason) = if set.spec.active {
                (ConditionStatus::True, "ResourcesApplied")
            } else {
                (ConditionStatus::False, "Inactive")
            };
            set_condition(
                &mut set.status.conditions,
                Condition::new(CONDITION_READY, status, reason, "", Some(Utc::now())),
            );
            self.cluster.apply_object(&set).await?;
        }
        for retired in &retired {
            if self
                .cluster
                .delete_object::<ResourceSet>(None, retired)
                .await?
            {
                info!(resource_set = %retired, "Retired resource-set");
            }
        }

        projections.status.check_readiness(self.cluster.as_ref()).await;
        tenant.status = projections.status.to_status(&tenant.status, Utc::now());
        self.cluster.update_object(&tenant).await?;

        let requeue_after = projections
            .requeue
            .requeue_after()
            .or_else(|| {
                projections
                    .status
                    .retry_requested()
                    .then_some(self.config.generation_backoff)
            })
            .unwrap_or(self.config.reconcile_interval);
        Ok(ReconcileOutcome::requeue(requeue_after))
    }

    /// Rotate if needed, generate, and record the outcome on the aggregate
    ///
    /// Generation failures caused only by unavailable collaborators are
    /// returned as errors so the pass is retried without recording anything.
    async fn generate(
        &self,
        tenant: &Tenant,
        blueprint: &Blueprint,
        aggregate: &mut TenantAggregate,
    ) -> TenancyResult<()> {
        aggregate.execute(TenantCommand::RotateResourceSet)?;

        let generator = ResourceGenerator::new(self.cluster.as_ref(), &self.config);
        let generated = match generator.generate(tenant, blueprint).await {
            Ok(generated) => generated,
            Err(errors) if errors.is_transient() => return Err(errors.into()),
            Err(errors) => {
                warn!(failures = errors.len(), %errors, "Resource generation failed");
                aggregate.execute(TenantCommand::RecordGenerationFailure {
                    reason: errors.to_string(),
                })?;
                return Ok(());
            }
        };

        let state = aggregate.state();
        let unchanged = aggregate_sum(state.resources.iter()) == generated.sum;
        let recorded = state.last_generation
            == Some(GenerationOutcome::Successful {
                sum: generated.sum.clone(),
            });
        if unchanged && recorded {
            debug!(sum = %generated.sum, "Resources unchanged");
            return Ok(());
        }

        let changes = diff_resources(&state.resources, &generated.to_resource_list());
        if !changes.is_empty() {
            info!(changes = changes.len(), "Recording resource changes");
            aggregate.execute(TenantCommand::ApplyChanges(changes))?;
        }
        aggregate.execute(TenantCommand::RecordGenerationSuccess { sum: generated.sum })?;
        Ok(())
    }

    /// Tear down a deleted tenant and drop its stream
    ///
    /// A tenant object still present (deletion requested) is marked
    /// Terminating before anything is removed.
    async fn reconcile_deleted(
        &self,
        name: &str,
        tenant: Option<Tenant>,
        mut aggregate: TenantAggregate,
        history: Vec<Event>,
    ) -> TenancyResult<ReconcileOutcome> {
        if history.is_empty() {
            debug!("No stream for tenant, nothing to tear down");
            return Ok(ReconcileOutcome::done());
        }

        aggregate.execute(TenantCommand::Delete)?;
        let mut events = history;
        events.extend_from_slice(aggregate.uncommitted_events());
        self.repository.save(&mut aggregate).await?;

        let projections = Projections::build(&events, &self.config);

        if let Some(mut tenant) = tenant {
            tenant.status = projections.status.to_status(&tenant.status, Utc::now());
            self.cluster.update_object(&tenant).await?;
            debug!(phase = ?tenant.status.phase, "Tenant marked for teardown");
        }

        let mut resources: Vec<&Resource> = projections
            .orphans
            .active()
            .chain(projections.orphans.deleted())
            .collect();
        resources.sort_by_key(|r| std::cmp::Reverse(r.order));
        for resource in resources {
            self.delete_resource(resource).await?;
        }

        for set in projections.resource_sets.names() {
            self.cluster.delete_object::<ResourceSet>(None, set).await?;
        }

        self.repository.delete(name).await?;
        info!("Tenant torn down");
        Ok(ReconcileOutcome::done())
    }

    async fn apply_resources(&self, resources: &[Resource]) -> TenancyResult<()> {
        for resource in resources {
            self.cluster.apply(&resource.embedded).await?;
        }
        debug!(count = resources.len(), "Applied resources");
        Ok(())
    }

    async fn delete_resource(&self, resource: &Resource) -> TenancyResult<bool> {
        let reference = ObjectRef::from_manifest(&resource.embedded)?;
        self.cluster.delete(&reference).await
    }
}
