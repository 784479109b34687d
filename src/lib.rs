//! Event-sourced multi-tenancy control plane
//!
//! Tenants own resources generated from a Blueprint of resource groups, each
//! bound to a parameterized ResourceTemplate. Desired state is never stored
//! as a document; it is rebuilt on every reconcile pass by replaying the
//! tenant's event stream through a set of projections.
//!
//! - [`aggregate`] - event kernel and the tenant aggregate
//! - [`events`] - event vocabulary and serializer registry
//! - [`event_store`] - chunk stores and the repository
//! - [`projection`] - resource-set, status, orphan and requeue views
//! - [`generator`] - blueprint rendering, hashing and diffing
//! - [`resolver`] - parameter value references and path queries
//! - [`service`] - the reconcile pass

pub mod aggregate;
pub mod cluster;
pub mod config;
pub mod domain;
pub mod errors;
pub mod event_store;
pub mod events;
pub mod generator;
pub mod nats;
pub mod observability;
pub mod projection;
pub mod resolver;
pub mod service;

// Re-export commonly used types
pub use aggregate::{AggregateRoot, Commit, EventConsumer, Stream, TenantAggregate, TenantCommand};
pub use cluster::{ClusterClient, ClusterClientExt, InMemoryCluster, ObjectRef};
pub use config::{ChunkStoreConfig, OperatorConfig};
pub use errors::{TenancyError, TenancyResult};
pub use event_store::{ChunkStore, InMemoryChunkStore, NatsChunkStore, Repository};
pub use events::{Event, EventRecord, EventRegistry, TenantEvent};
pub use generator::{GeneratedResources, ResourceGenerator};
pub use nats::NatsConfig;
pub use service::{ReconcileOutcome, TenantReconciler};
