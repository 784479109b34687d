// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tenant Events
//!
//! Events are immutable facts about one tenant stream. They are created only
//! by [`AggregateRoot::apply`](crate::aggregate::AggregateRoot::apply), which
//! assigns the sequence, and are never deleted individually.
//!
//! # Event Flow
//!
//! ```text
//! Reconcile → Aggregate.apply → Event → Commit → Chunk Store
//!                                  │
//!                                  └──replay──> Projections
//! ```
//!
//! # Module Organization
//!
//! - [`tenant`] - the closed event vocabulary
//! - [`serializer`] - tagged records and the decoder registry

pub mod serializer;
pub mod tenant;

pub use serializer::{EventRecord, EventRegistry};
pub use tenant::{
    AnnotationsChanged, BlueprintSet, DomainEvent, LabelsChanged, ResourceAdded,
    ResourceGenerationFailed, ResourceGenerationSuccessful, ResourceRemoved, ResourceSetActivated,
    ResourceSetCreated, ResourceSetDeactivated, ResourceSetNameChanged, ResourceUpdated,
    TenantCreated, TenantDeleted, TenantEvent, TenantNameSet,
};

/// One fact in a tenant stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Aggregate identity (the tenant name)
    pub stream_id: String,

    /// 1-based, strictly increasing within the stream
    pub sequence: i64,

    pub payload: TenantEvent,
}

impl Event {
    pub fn event_type_name(&self) -> &'static str {
        self.payload.event_type_name()
    }
}
