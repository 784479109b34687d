// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tenant Aggregate Commands
//!
//! Commands express what the reconcile pass wants to be true. Handlers turn
//! them into zero or more events; a command whose intent already holds
//! produces nothing, so a retried pass never appends duplicate facts.

use std::collections::BTreeMap;

use crate::generator::ResourceChange;

/// Intent sent to the tenant aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantCommand {
    /// Start the stream
    Create,

    /// Set the display name
    SetName(String),

    /// Bind the tenant to a blueprint
    SetBlueprint(String),

    SetLabels(BTreeMap<String, String>),

    SetAnnotations(BTreeMap<String, String>),

    /// Start a new resource-set if the blueprint changed or none exists
    RotateResourceSet,

    /// Record a resource diff against the current resource-set
    ApplyChanges(Vec<ResourceChange>),

    /// Record a successful generation with its aggregate sum
    RecordGenerationSuccess { sum: String },

    /// Record a failed generation
    RecordGenerationFailure { reason: String },

    /// Mark the tenant deleted
    Delete,
}
