// Copyright (c) 2025 - Cowboy AI, Inc.
//! Operator configuration
//!
//! Everything the repository, generator and reconciler need from the
//! environment is carried in [`OperatorConfig`] and passed explicitly, so
//! replay and generation never read process-wide state.

use std::time::Duration;

use crate::errors::{TenancyError, TenancyResult};
use crate::nats::NatsConfig;

/// Requeue delay after a failed generation attempt
pub const DEFAULT_GENERATION_BACKOFF: Duration = Duration::from_secs(15);

/// Steady-state requeue interval applied by the controller
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(300);

/// Number of resource-sets kept per tenant before the oldest are retired
pub const DEFAULT_RESOURCE_SET_RETENTION: usize = 3;

/// Configuration for the JetStream key-value bucket holding stream chunks
#[derive(Debug, Clone)]
pub struct ChunkStoreConfig {
    /// Bucket name
    pub bucket: String,

    /// Number of replicas (for clustered NATS)
    pub replicas: usize,

    /// NATS connection settings
    pub nats: NatsConfig,
}

impl Default for ChunkStoreConfig {
    fn default() -> Self {
        Self {
            bucket: "TENANCY_STREAM_CHUNKS".to_string(),
            replicas: 1,
            nats: NatsConfig::default(),
        }
    }
}

/// Operator-wide settings
#[derive(Debug, Clone)]
pub struct OperatorConfig {
    /// Namespace the operator runs in; templates and blueprints live here
    pub operator_namespace: String,

    /// Interval the controller waits between steady-state passes
    pub reconcile_interval: Duration,

    /// Delay before retrying after a generation failure
    pub generation_backoff: Duration,

    /// Maximum number of resource-sets retained per tenant
    pub resource_set_retention: usize,

    /// Chunk store settings
    pub store: ChunkStoreConfig,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            operator_namespace: "tenancy-system".to_string(),
            reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
            generation_backoff: DEFAULT_GENERATION_BACKOFF,
            resource_set_retention: DEFAULT_RESOURCE_SET_RETENTION,
            store: ChunkStoreConfig::default(),
        }
    }
}

impl OperatorConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> TenancyResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> TenancyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(namespace) = lookup("TENANCY_OPERATOR_NAMESPACE") {
            if namespace.trim().is_empty() {
                return Err(TenancyError::Configuration(
                    "TENANCY_OPERATOR_NAMESPACE must not be empty".to_string(),
                ));
            }
            config.operator_namespace = namespace;
        }
        if let Some(secs) = lookup("TENANCY_RECONCILE_INTERVAL_SECS") {
            config.reconcile_interval = parse_secs("TENANCY_RECONCILE_INTERVAL_SECS", &secs)?;
        }
        if let Some(secs) = lookup("TENANCY_GENERATION_BACKOFF_SECS") {
            config.generation_backoff = parse_secs("TENANCY_GENERATION_BACKOFF_SECS", &secs)?;
        }
        if let Some(retention) = lookup("TENANCY_RESOURCE_SET_RETENTION") {
            let retention: usize = retention.parse().map_err(|_| {
                TenancyError::Configuration(format!(
                    "TENANCY_RESOURCE_SET_RETENTION is not a number: {retention}"
                ))
            })?;
            if retention == 0 {
                return Err(TenancyError::Configuration(
                    "TENANCY_RESOURCE_SET_RETENTION must keep at least one resource-set"
                        .to_string(),
                ));
            }
            config.resource_set_retention = retention;
        }
        if let Some(url) = lookup("NATS_URL") {
            config.store.nats.servers = url.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Some(bucket) = lookup("TENANCY_CHUNK_BUCKET") {
            config.store.bucket = bucket;
        }

        Ok(config)
    }

    /// Set the operator namespace
    pub fn with_operator_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.operator_namespace = namespace.into();
        self
    }

    /// Set the generation failure backoff
    pub fn with_generation_backoff(mut self, backoff: Duration) -> Self {
        self.generation_backoff = backoff;
        self
    }

    /// Set how many resource-sets are kept per tenant
    pub fn with_resource_set_retention(mut self, retention: usize) -> Self {
        self.resource_set_retention = retention;
        self
    }
}

fn parse_secs(key: &str, value: &str) -> TenancyResult<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| TenancyError::Configuration(format!("{key} is not a number of seconds: {value}")))
}
