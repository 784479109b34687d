// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tenant status
//!
//! Lifecycle events decide the phase; the live readiness of the current
//! resource-set decides whether the tenant is Ready. The readiness check is
//! the only step that touches the cluster and runs after replay.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::aggregate::{EventConsumer, GenerationOutcome};
use crate::cluster::{ClusterClient, ClusterClientExt};
use crate::domain::{
    set_condition, Condition, ConditionStatus, ResourceSet, TenantPhase, TenantStatus,
    CONDITION_READY,
};
use crate::events::{Event, TenantEvent};

/// Condition reporting the outcome of the last generation attempt
pub const CONDITION_GENERATED: &str = "ResourcesGenerated";

/// Observed readiness of the current resource-set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Readiness {
    /// Not checked yet
    #[default]
    Unknown,
    Ready,
    NotReady,
    /// The named resource-set does not exist in the cluster
    Missing,
    /// The lookup failed; the pass should be retried
    LookupFailed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantStatusProjection {
    pub created: bool,
    pub deleted: bool,
    pub blueprint: Option<String>,
    pub resource_set: Option<String>,
    pub generation: Option<GenerationOutcome>,
    pub readiness: Readiness,
}

impl TenantStatusProjection {
    pub fn phase(&self) -> Option<TenantPhase> {
        if self.deleted {
            Some(TenantPhase::Terminating)
        } else if self.created {
            Some(TenantPhase::Reconciling)
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.deleted && self.readiness == Readiness::Ready
    }

    /// Whether the readiness lookup failed and the pass should be retried
    pub fn retry_requested(&self) -> bool {
        matches!(self.readiness, Readiness::LookupFailed(_))
    }

    /// Read the live Ready condition of the current resource-set
    pub async fn check_readiness<C: ClusterClient + ?Sized>(&mut self, cluster: &C) {
        let Some(name) = self.resource_set.as_deref() else {
            self.readiness = Readiness::Unknown;
            return;
        };

        self.readiness = match cluster.get_object::<ResourceSet>(None, name).await {
            Ok(Some(set)) if set.is_ready() => Readiness::Ready,
            Ok(Some(_)) => Readiness::NotReady,
            Ok(None) => Readiness::Missing,
            Err(error) => {
                warn!(resource_set = name, %error, "Readiness lookup failed");
                Readiness::LookupFailed(error.to_string())
            }
        };
    }

    /// Status to write back, keeping transition times of unchanged conditions
    pub fn to_status(&self, previous: &TenantStatus, at: DateTime<Utc>) -> TenantStatus {
        let mut conditions = previous.conditions.clone();
        set_condition(&mut conditions, self.ready_condition(at));
        if let Some(condition) = self.generated_condition(at) {
            set_condition(&mut conditions, condition);
        }

        TenantStatus {
            phase: self.phase(),
            blueprint: self.blueprint.clone(),
            resource_set: self.resource_set.clone(),
            conditions,
        }
    }

    fn ready_condition(&self, at: DateTime<Utc>) -> Condition {
        let (status, reason, message) = if self.deleted {
            (ConditionStatus::False, "Terminating", String::new())
        } else if self.resource_set.is_none() {
            (ConditionStatus::False, "NoResourceSet", String::new())
        } else {
            match &self.readiness {
                Readiness::Ready => (ConditionStatus::True, "ResourceSetReady", String::new()),
                Readiness::NotReady => {
                    (ConditionStatus::False, "ResourceSetNotReady", String::new())
                }
                Readiness::Missing => (ConditionStatus::False, "ResourceSetMissing", String::new()),
                Readiness::LookupFailed(reason) => {
                    (ConditionStatus::Unknown, "LookupFailed", reason.clone())
                }
                Readiness::Unknown => (ConditionStatus::Unknown, "Pending", String::new()),
            }
        };
        Condition::new(CONDITION_READY, status, reason, message, Some(at))
    }

    fn generated_condition(&self, at: DateTime<Utc>) -> Option<Condition> {
        let condition = match self.generation.as_ref()? {
            GenerationOutcome::Successful { sum } => Condition::new(
                CONDITION_GENERATED,
                ConditionStatus::True,
                "GenerationSucceeded",
                sum.clone(),
                Some(at),
            ),
            GenerationOutcome::Failed { reason } => Condition::new(
                CONDITION_GENERATED,
                ConditionStatus::False,
                "GenerationFailed",
                reason.clone(),
                Some(at),
            ),
        };
        Some(condition)
    }
}

impl EventConsumer for TenantStatusProjection {
    fn on(&mut self, event: &Event) {
        match &event.payload {
            TenantEvent::TenantCreated(_) => self.created = true,
            TenantEvent::TenantDeleted(_) => self.deleted = true,
            TenantEvent::BlueprintSet(e) => self.blueprint = Some(e.name.clone()),
            TenantEvent::ResourceSetNameChanged(e) => self.resource_set = Some(e.name.clone()),
            TenantEvent::ResourceGenerationFailed(e) => {
                self.generation = Some(GenerationOutcome::Failed {
                    reason: e.reason.clone(),
                })
            }
            TenantEvent::ResourceGenerationSuccessful(e) => {
                self.generation = Some(GenerationOutcome::Successful { sum: e.sum.clone() })
            }
            TenantEvent::TenantNameSet(_)
            | TenantEvent::LabelsChanged(_)
            | TenantEvent::AnnotationsChanged(_)
            | TenantEvent::ResourceSetCreated(_)
            | TenantEvent::ResourceSetActivated(_)
            | TenantEvent::ResourceSetDeactivated(_)
            | TenantEvent::ResourceAdded(_)
            | TenantEvent::ResourceUpdated(_)
            | TenantEvent::ResourceRemoved(_) => {}
        }
    }
}
