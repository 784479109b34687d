// Copyright (c) 2025 - Cowboy AI, Inc.
//! Generation errors
//!
//! Failures are collected per resource group instead of stopping at the
//! first one, so a single bad template still lets the rest of the blueprint
//! report its problems.

use std::fmt;
use thiserror::Error;

use crate::resolver::ResolveError;

/// One failure while generating a resource group
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("resource template {0} not found")]
    TemplateNotFound(String),

    /// Cluster call failed; retrying may succeed
    #[error("cluster lookup failed: {0}")]
    Lookup(String),

    #[error("unknown parameter {0}")]
    UnknownParameter(String),

    #[error("parameter {0} is required")]
    MissingParameter(String),

    #[error("parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("parameter reference failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("template render failed: {0}")]
    Render(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("duplicate resource {0}")]
    DuplicateResource(String),
}

impl GenerationError {
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Lookup(_) => true,
            GenerationError::Resolve(err) => err.is_transient(),
            _ => false,
        }
    }
}

/// A failure attributed to the group that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFailure {
    pub group: String,
    pub error: GenerationError,
}

impl GroupFailure {
    pub fn new(group: impl Into<String>, error: impl Into<GenerationError>) -> Self {
        Self {
            group: group.into(),
            error: error.into(),
        }
    }
}

impl fmt::Display for GroupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.group, self.error)
    }
}

/// Every failure of one generation pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("resource generation failed: {}", join_failures(.0))]
pub struct GenerationErrors(pub Vec<GroupFailure>);

fn join_failures(failures: &[GroupFailure]) -> String {
    failures
        .iter()
        .map(GroupFailure::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl GenerationErrors {
    pub fn failures(&self) -> &[GroupFailure] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every failure came from an unavailable collaborator
    pub fn is_transient(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|f| f.error.is_transient())
    }
}
