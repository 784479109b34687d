// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS JetStream Key-Value Chunk Store
//!
//! Each chunk is one KV entry keyed by its commit id
//! (`{stream}-stream-chunk-{version:06}`) holding the chunk as JSON. Writes
//! are revision-guarded updates: against revision 0 for a fresh key, or
//! against the purge marker a deleted stream left behind. A key holding a
//! live chunk is never written again, so the log stays append-only and a
//! replayed commit cannot overwrite an earlier one.

use async_nats::jetstream::{self, kv};
use async_nats::Client;
use async_trait::async_trait;
use futures::TryStreamExt;
use tracing::{debug, info};

use super::{Chunk, ChunkStore};
use crate::aggregate::commit_prefix;
use crate::config::ChunkStoreConfig;
use crate::errors::{TenancyError, TenancyResult};

/// JetStream KV-backed chunk store
///
/// # Example
///
/// ```rust,no_run
/// use cim_tenancy::config::ChunkStoreConfig;
/// use cim_tenancy::event_store::{ChunkStore, NatsChunkStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = NatsChunkStore::connect(&ChunkStoreConfig::default()).await?;
///     let chunks = store.list_chunks("acme").await?;
///     println!("{} chunks", chunks.len());
///     Ok(())
/// }
/// ```
pub struct NatsChunkStore {
    store: kv::Store,
    bucket: String,
}

impl NatsChunkStore {
    /// Connect to NATS and open (or create) the chunk bucket
    pub async fn connect(config: &ChunkStoreConfig) -> TenancyResult<Self> {
        let client = crate::nats::connect(&config.nats).await?;
        Self::with_client(client, config).await
    }

    /// Open (or create) the chunk bucket on an existing connection
    pub async fn with_client(client: Client, config: &ChunkStoreConfig) -> TenancyResult<Self> {
        let jetstream = jetstream::new(client);

        let store = match jetstream.get_key_value(&config.bucket).await {
            Ok(store) => store,
            Err(_) => jetstream
                .create_key_value(kv::Config {
                    bucket: config.bucket.clone(),
                    description: "Tenant event stream chunks".to_string(),
                    history: 1,
                    num_replicas: config.replicas,
                    storage: jetstream::stream::StorageType::File,
                    ..Default::default()
                })
                .await
                .map_err(|e| TenancyError::Store(e.to_string()))?,
        };

        info!("Chunk store ready on bucket {}", config.bucket);

        Ok(Self {
            store,
            bucket: config.bucket.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn chunk_keys(&self, stream_id: &str) -> TenancyResult<Vec<String>> {
        let prefix = commit_prefix(stream_id);
        let keys: Vec<String> = self
            .store
            .keys()
            .await
            .map_err(|e| TenancyError::Store(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| TenancyError::Store(e.to_string()))?;

        Ok(keys.into_iter().filter(|key| key.starts_with(&prefix)).collect())
    }
}

#[async_trait]
impl ChunkStore for NatsChunkStore {
    async fn list_chunks(&self, stream_id: &str) -> TenancyResult<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for key in self.chunk_keys(stream_id).await? {
            let Some(bytes) = self
                .store
                .get(&key)
                .await
                .map_err(|e| TenancyError::Store(e.to_string()))?
            else {
                // purged between listing and reading
                continue;
            };

            let chunk: Chunk = serde_json::from_slice(&bytes)
                .map_err(|e| TenancyError::Decode(format!("chunk {key}: {e}")))?;
            if chunk.stream_id == stream_id {
                chunks.push(chunk);
            }
        }

        debug!(stream_id, count = chunks.len(), "Listed chunks");
        Ok(chunks)
    }

    async fn create_chunk(&self, chunk: Chunk) -> TenancyResult<()> {
        let payload = serde_json::to_vec(&chunk)?;
        let latest = self
            .store
            .entry(&chunk.chunk_id)
            .await
            .map_err(|e| TenancyError::Store(format!("chunk {}: {e}", chunk.chunk_id)))?
            .map(|entry| (entry.operation, entry.revision));
        let revision = create_revision(latest).ok_or_else(|| {
            TenancyError::Store(format!("chunk {} already exists", chunk.chunk_id))
        })?;

        // A concurrent writer moves the revision on and this update fails
        self.store
            .update(&chunk.chunk_id, payload.into(), revision)
            .await
            .map_err(|e| TenancyError::Store(format!("chunk {}: {e}", chunk.chunk_id)))?;

        debug!(chunk_id = %chunk.chunk_id, events = chunk.events.len(), "Created chunk");
        Ok(())
    }

    async fn delete_chunks(&self, stream_id: &str) -> TenancyResult<usize> {
        let keys = self.chunk_keys(stream_id).await?;
        for key in &keys {
            self.store
                .purge(key)
                .await
                .map_err(|e| TenancyError::Store(e.to_string()))?;
        }

        info!(stream_id, count = keys.len(), "Deleted chunks");
        Ok(keys.len())
    }
}

/// Revision a new chunk must be written against, given the latest entry
/// under its key. `None` when the key holds a live chunk.
fn create_revision(latest: Option<(kv::Operation, u64)>) -> Option<u64> {
    match latest {
        None => Some(0),
        Some((kv::Operation::Put, _)) => None,
        Some((kv::Operation::Delete | kv::Operation::Purge, revision)) => Some(revision),
    }
}
