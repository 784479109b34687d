// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for tenancy operations
//!
//! Errors fall into four families, and the reconcile pass treats each one
//! differently:
//!
//! | Family | Variants | Reconcile behavior |
//! |---|---|---|
//! | decode | `UnboundEventType`, `Decode` | abort the pass, write nothing |
//! | generation | `Generation` | record `ResourceGenerationFailed`, back off |
//! | collaborator | `Store`, `Cluster`, `NatsConnection` | retry with a timed requeue |
//! | invariant | `InvariantViolation` | abort, needs operator attention |

use thiserror::Error;

use crate::aggregate::CommandError;
use crate::generator::GenerationErrors;

/// Errors that can occur while reconciling tenants
#[derive(Debug, Error)]
pub enum TenancyError {
    /// A stored record names an event type that was never registered
    #[error("unbound event type: {0}")]
    UnboundEventType(String),

    /// A stored record could not be decoded into its registered event type
    #[error("event decode error: {0}")]
    Decode(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// One or more resource groups failed to generate
    #[error(transparent)]
    Generation(#[from] GenerationErrors),

    /// A command was rejected by the tenant aggregate
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Chunk store read or write failed
    #[error("chunk store error: {0}")]
    Store(String),

    /// Cluster API call failed
    #[error("cluster error: {0}")]
    Cluster(String),

    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// Replayed state breaks an invariant that must not be auto-corrected
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TenancyError {
    /// Whether the failure is transient and the pass should simply be retried
    pub fn is_retryable(&self) -> bool {
        match self {
            TenancyError::Store(_) | TenancyError::Cluster(_) | TenancyError::NatsConnection(_) => {
                true
            }
            TenancyError::Generation(errors) => errors.is_transient(),
            _ => false,
        }
    }
}

/// Result type for tenancy operations
pub type TenancyResult<T> = Result<T, TenancyError>;

impl From<async_nats::Error> for TenancyError {
    fn from(err: async_nats::Error) -> Self {
        TenancyError::NatsConnection(err.to_string())
    }
}

impl From<serde_json::Error> for TenancyError {
    fn from(err: serde_json::Error) -> Self {
        TenancyError::Serialization(err.to_string())
    }
}
