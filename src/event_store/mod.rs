// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stream Storage
//!
//! Commits are persisted as individually retrievable chunks in a
//! [`ChunkStore`]. The store is append-only: chunks are created and, once
//! the owning tenant is gone, deleted en masse; they are never updated.
//!
//! # Architecture
//!
//! ```text
//! AggregateRoot ──pending commit──> Repository.save ──> ChunkStore.create_chunk
//!                                                             │
//! Stream <──sort by sequence── Repository.get <── ChunkStore.list_chunks
//! ```
//!
//! The store does not promise any order when listing; [`Stream::events`]
//! restores it.
//!
//! [`Stream::events`]: crate::aggregate::Stream::events

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::{TenancyError, TenancyResult};
use crate::events::EventRecord;

pub mod nats;
pub mod repository;

pub use nats::NatsChunkStore;
pub use repository::Repository;

/// One persisted commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub stream_id: String,
    pub chunk_id: String,
    pub events: Vec<EventRecord>,
}

/// Append-only chunk storage
///
/// Write conflicts and unavailability are reported as
/// [`TenancyError::Store`] and treated as transient.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Every chunk tagged with `stream_id`, in no particular order
    async fn list_chunks(&self, stream_id: &str) -> TenancyResult<Vec<Chunk>>;

    /// Persist a new chunk; fails when the chunk id already exists
    async fn create_chunk(&self, chunk: Chunk) -> TenancyResult<()>;

    /// Remove every chunk tagged with `stream_id`; returns how many were removed
    async fn delete_chunks(&self, stream_id: &str) -> TenancyResult<usize>;
}

#[async_trait]
impl<S: ChunkStore + ?Sized> ChunkStore for Arc<S> {
    async fn list_chunks(&self, stream_id: &str) -> TenancyResult<Vec<Chunk>> {
        (**self).list_chunks(stream_id).await
    }

    async fn create_chunk(&self, chunk: Chunk) -> TenancyResult<()> {
        (**self).create_chunk(chunk).await
    }

    async fn delete_chunks(&self, stream_id: &str) -> TenancyResult<usize> {
        (**self).delete_chunks(stream_id).await
    }
}

/// In-memory chunk store for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryChunkStore {
    chunks: RwLock<HashMap<String, Chunk>>,
    writes: AtomicUsize,
}

impl InMemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `create_chunk` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn chunk_count(&self) -> usize {
        self.chunks.read().await.len()
    }
}

#[async_trait]
impl ChunkStore for InMemoryChunkStore {
    async fn list_chunks(&self, stream_id: &str) -> TenancyResult<Vec<Chunk>> {
        Ok(self
            .chunks
            .read()
            .await
            .values()
            .filter(|chunk| chunk.stream_id == stream_id)
            .cloned()
            .collect())
    }

    async fn create_chunk(&self, chunk: Chunk) -> TenancyResult<()> {
        let mut chunks = self.chunks.write().await;
        if chunks.contains_key(&chunk.chunk_id) {
            return Err(TenancyError::Store(format!(
                "chunk {} already exists",
                chunk.chunk_id
            )));
        }
        chunks.insert(chunk.chunk_id.clone(), chunk);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_chunks(&self, stream_id: &str) -> TenancyResult<usize> {
        let mut chunks = self.chunks.write().await;
        let before = chunks.len();
        chunks.retain(|_, chunk| chunk.stream_id != stream_id);
        Ok(before - chunks.len())
    }
}
