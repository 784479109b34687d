// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Command Handlers for the Tenant Aggregate
//!
//! ```text
//! handle(State, Command) → Result<Vec<TenantEvent>, CommandError>
//! ```
//!
//! Handlers never touch I/O or the clock. An empty result means the
//! intent already holds.

use crate::aggregate::commands::TenantCommand;
use crate::aggregate::tenant::{GenerationOutcome, TenantState};
use crate::domain::{NameError, ObjectName};
use crate::events::*;
use crate::generator::ResourceChange;

/// Command validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Tenant stream has not been started
    #[error("Tenant not created")]
    NotCreated,

    /// Tenant is being deleted
    #[error("Tenant deleted")]
    Deleted,

    /// No blueprint bound yet
    #[error("Tenant has no blueprint")]
    BlueprintNotSet,

    /// Resource changes arrived before any resource-set exists
    #[error("Tenant has no resource-set")]
    NoResourceSet,

    /// The tenant name or a name derived from it is invalid
    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),
}

/// Dispatch a command to its handler
pub fn handle(
    state: &TenantState,
    tenant: &str,
    command: TenantCommand,
) -> Result<Vec<TenantEvent>, CommandError> {
    match command {
        TenantCommand::Create => handle_create(state),
        TenantCommand::SetName(name) => handle_set_name(state, name),
        TenantCommand::SetBlueprint(name) => handle_set_blueprint(state, name),
        TenantCommand::SetLabels(labels) => {
            ensure_live(state)?;
            Ok(changed(state.labels != labels, LabelsChanged { labels }))
        }
        TenantCommand::SetAnnotations(annotations) => {
            ensure_live(state)?;
            Ok(changed(
                state.annotations != annotations,
                AnnotationsChanged { annotations },
            ))
        }
        TenantCommand::RotateResourceSet => handle_rotate_resource_set(state, tenant),
        TenantCommand::ApplyChanges(changes) => handle_apply_changes(state, changes),
        TenantCommand::RecordGenerationSuccess { sum } => {
            ensure_live(state)?;
            let outcome = GenerationOutcome::Successful { sum: sum.clone() };
            Ok(changed(
                state.last_generation.as_ref() != Some(&outcome),
                ResourceGenerationSuccessful { sum },
            ))
        }
        TenantCommand::RecordGenerationFailure { reason } => {
            ensure_live(state)?;
            let outcome = GenerationOutcome::Failed {
                reason: reason.clone(),
            };
            Ok(changed(
                state.last_generation.as_ref() != Some(&outcome),
                ResourceGenerationFailed { reason },
            ))
        }
        TenantCommand::Delete => Ok(changed(
            state.created && !state.deleted,
            TenantDeleted {},
        )),
    }
}

fn changed(condition: bool, event: impl Into<TenantEvent>) -> Vec<TenantEvent> {
    if condition {
        vec![event.into()]
    } else {
        Vec::new()
    }
}

fn ensure_live(state: &TenantState) -> Result<(), CommandError> {
    if state.deleted {
        return Err(CommandError::Deleted);
    }
    if !state.created {
        return Err(CommandError::NotCreated);
    }
    Ok(())
}

/// Start the stream
///
/// # Business Rules
/// - A deleted tenant cannot be recreated on the same stream
pub fn handle_create(state: &TenantState) -> Result<Vec<TenantEvent>, CommandError> {
    if state.deleted {
        return Err(CommandError::Deleted);
    }
    Ok(changed(!state.created, TenantCreated {}))
}

pub fn handle_set_name(state: &TenantState, name: String) -> Result<Vec<TenantEvent>, CommandError> {
    ensure_live(state)?;
    Ok(changed(
        state.name.as_deref() != Some(name.as_str()),
        TenantNameSet { name },
    ))
}

pub fn handle_set_blueprint(
    state: &TenantState,
    name: String,
) -> Result<Vec<TenantEvent>, CommandError> {
    ensure_live(state)?;
    Ok(changed(
        state.blueprint.as_deref() != Some(name.as_str()),
        BlueprintSet { name },
    ))
}

/// Start a new resource-set named `{tenant}-{nnn}`
///
/// # Business Rules
/// - Only when no set exists yet or the blueprint changed since the last one
/// - The new set is created, made current, and then swapped in for the
///   previously active sets, in that order
pub fn handle_rotate_resource_set(
    state: &TenantState,
    tenant: &str,
) -> Result<Vec<TenantEvent>, CommandError> {
    ensure_live(state)?;
    if state.blueprint.is_none() {
        return Err(CommandError::BlueprintNotSet);
    }
    if !state.needs_rotation() {
        return Ok(Vec::new());
    }

    let name = ObjectName::new(tenant)?
        .with_suffix(format!("{:03}", state.resource_sets.len() + 1))?;
    let name = String::from(name);

    let mut events: Vec<TenantEvent> = vec![
        ResourceSetCreated { name: name.clone() }.into(),
        ResourceSetNameChanged { name: name.clone() }.into(),
    ];
    events.extend(
        state
            .active_resource_sets
            .iter()
            .map(|old| ResourceSetDeactivated { name: old.clone() }.into()),
    );
    events.push(ResourceSetActivated { name }.into());
    Ok(events)
}

/// Turn a resource diff into events against the current resource-set
pub fn handle_apply_changes(
    state: &TenantState,
    changes: Vec<ResourceChange>,
) -> Result<Vec<TenantEvent>, CommandError> {
    ensure_live(state)?;
    if state.resource_set.is_none() {
        return Err(CommandError::NoResourceSet);
    }
    Ok(changes.into_iter().map(ResourceChange::into_event).collect())
}
