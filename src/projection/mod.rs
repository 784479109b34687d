// Copyright (c) 2025 - Cowboy AI, Inc.
//! Projections
//!
//! Every projection is an [`EventConsumer`] folded over a stream's events:
//!
//! ```text
//! (Projection, Event) → Projection
//!
//! replay(p, [e1, e2, e3]) = p.on(e1).on(e2).on(e3)
//! ```
//!
//! Projections never perform I/O while replaying. Anything that needs the
//! cluster (the tenant readiness check) happens after replay, on the built
//! value. Replaying the same events into a fresh projection always yields
//! an equal value, so projections are rebuilt on every pass instead of
//! cached.
//!
//! # Module Organization
//!
//! - [`resource_set`] - named resource-set drafts
//! - [`tenant_status`] - tenant phase and conditions
//! - [`orphans`] - active versus deleted resources and the deletion gate
//! - [`requeue`] - retry directive after generation failures
//! - [`retirement`] - which resource-sets to drop

pub mod orphans;
pub mod requeue;
pub mod resource_set;
pub mod retirement;
pub mod tenant_status;

use crate::aggregate::EventConsumer;
use crate::config::OperatorConfig;
use crate::errors::TenancyResult;
use crate::events::{Event, EventRecord, EventRegistry};

pub use orphans::OrphanProjection;
pub use requeue::RequeueProjection;
pub use resource_set::{ResourceSetDraft, ResourceSetProjection};
pub use retirement::select_retired;
pub use tenant_status::{Readiness, TenantStatusProjection};

/// Fold `events` into `consumer`
pub fn replay<C: EventConsumer>(mut consumer: C, events: &[Event]) -> C {
    for event in events {
        consumer.on(event);
    }
    consumer
}

/// Decode every record, then fold the decoded events into `consumer`
///
/// Nothing is applied unless every record decodes.
pub fn replay_records<C: EventConsumer>(
    consumer: C,
    registry: &EventRegistry,
    records: &[EventRecord],
) -> TenancyResult<C> {
    let events = records
        .iter()
        .map(|record| registry.unmarshal_event(record))
        .collect::<TenancyResult<Vec<_>>>()?;
    Ok(replay(consumer, &events))
}

/// The four views a reconcile pass needs, built from one event list
#[derive(Debug, Clone, PartialEq)]
pub struct Projections {
    pub resource_sets: ResourceSetProjection,
    pub status: TenantStatusProjection,
    pub orphans: OrphanProjection,
    pub requeue: RequeueProjection,
}

impl Projections {
    pub fn build(events: &[Event], config: &OperatorConfig) -> Self {
        Self {
            resource_sets: replay(ResourceSetProjection::default(), events),
            status: replay(TenantStatusProjection::default(), events),
            orphans: replay(OrphanProjection::default(), events),
            requeue: replay(RequeueProjection::new(config.generation_backoff), events),
        }
    }
}
