// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer
//!
//! The reconcile pass that ties the event kernel, the generator and the
//! projections to the cluster.
//!
//! # Architecture
//!
//! ```text
//! Tenant object
//!     ↓
//! TenantReconciler::reconcile
//!     ↓
//! Command → TenantAggregate → Events
//!     ↓
//! Repository (chunk store)
//!     ↓
//! Projections → cluster writes + status + requeue
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cim_tenancy::cluster::InMemoryCluster;
//! use cim_tenancy::config::OperatorConfig;
//! use cim_tenancy::event_store::{InMemoryChunkStore, Repository};
//! use cim_tenancy::service::TenantReconciler;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cluster = Arc::new(InMemoryCluster::new());
//!     let repository = Repository::with_tenant_events(Arc::new(InMemoryChunkStore::new()));
//!     let reconciler = TenantReconciler::new(cluster, repository, OperatorConfig::default());
//!
//!     let outcome = reconciler.reconcile("acme").await?;
//!     println!("requeue after {:?}", outcome.requeue_after);
//!     Ok(())
//! }
//! ```

pub mod tenant;

pub use tenant::{ReconcileOutcome, TenantReconciler};
