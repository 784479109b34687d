// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Kernel and Tenant Aggregate
//!
//! The kernel is small: an [`AggregateRoot`] owning one [`EventConsumer`],
//! [`Commit`]s of buffered events and the [`Stream`] of all commits. It has
//! no dependency on storage or the cluster.
//!
//! # Event Sourcing Pattern
//!
//! ```text
//! Stream ──load_from_historical_events──> AggregateRoot<TenantState>
//!                                              │
//!                          execute(Command) ───┤ handle(State, Command)
//!                                              ▼
//!                                      apply(Event)* ──> Commit
//! ```
//!
//! # Design Principles
//!
//! ## 1. Rebuild, don't cache
//! Aggregates are ephemeral. Every reconcile pass replays the persisted
//! stream, so replay must be deterministic.
//!
//! ## 2. Command-Event Separation
//! - Commands express intent (what should hold)
//! - Events express facts (what changed)
//! - Commands can fail, events cannot
//!
//! ## 3. Single Writer
//! One writer per tenant stream; `version` is a marker, not a concurrency
//! token.

pub mod commands;
pub mod handlers;
pub mod root;
pub mod stream;
pub mod tenant;

pub use commands::TenantCommand;
pub use handlers::{handle, CommandError};
pub use root::{AggregateRoot, EventConsumer};
pub use stream::{commit_id, commit_prefix, Commit, Stream};
pub use tenant::{GenerationOutcome, TenantAggregate, TenantState};
