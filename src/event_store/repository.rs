// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tenant Stream Repository
//!
//! Loads and saves tenant aggregates through a [`ChunkStore`], translating
//! between in-memory [`Commit`]s and persisted [`Chunk`]s with an
//! [`EventRegistry`].

use std::sync::Arc;
use tracing::{debug, info};

use super::{Chunk, ChunkStore};
use crate::aggregate::{commit_prefix, Commit, Stream, TenantAggregate};
use crate::errors::{TenancyError, TenancyResult};
use crate::events::EventRegistry;

/// Reads and writes tenant streams
pub struct Repository<S: ChunkStore + ?Sized> {
    store: Arc<S>,
    registry: EventRegistry,
}

impl<S: ChunkStore + ?Sized> Clone for Repository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            registry: self.registry.clone(),
        }
    }
}

impl<S: ChunkStore + ?Sized> Repository<S> {
    pub fn new(store: Arc<S>, registry: EventRegistry) -> Self {
        Self { store, registry }
    }

    /// Repository that understands the full tenant vocabulary
    pub fn with_tenant_events(store: Arc<S>) -> Self {
        Self::new(store, EventRegistry::with_tenant_events())
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Load every commit of `stream_id`
    ///
    /// A single undecodable record fails the whole load; a partially read
    /// stream would replay into the wrong state.
    pub async fn get(&self, stream_id: &str) -> TenancyResult<Stream> {
        let chunks = self.store.list_chunks(stream_id).await?;
        let mut stream = Stream::new(stream_id, Vec::with_capacity(chunks.len()));

        for chunk in chunks {
            let version = chunk_version(stream_id, &chunk.chunk_id)?;
            let events = chunk
                .events
                .iter()
                .map(|record| self.registry.unmarshal_event(record))
                .collect::<TenancyResult<Vec<_>>>()?;
            stream.push(Commit::new(
                chunk.chunk_id,
                chunk.stream_id,
                version,
                events,
            ));
        }

        debug!(stream_id, commits = stream.commits().len(), events = stream.length(), "Loaded stream");
        Ok(stream)
    }

    /// Load `id` into a fresh tenant aggregate
    pub async fn load(&self, id: &str) -> TenancyResult<TenantAggregate> {
        let stream = self.get(id).await?;
        let mut aggregate = TenantAggregate::for_tenant(id);
        aggregate.load_from_historical_events(&stream);
        Ok(aggregate)
    }

    /// Persist the aggregate's buffered events as one chunk
    ///
    /// Returns `None` without touching the store when nothing is buffered.
    /// On failure the buffer is kept so the caller can retry.
    pub async fn save(&self, aggregate: &mut TenantAggregate) -> TenancyResult<Option<Commit>> {
        let Some(commit) = aggregate.pending_commit() else {
            return Ok(None);
        };

        let events = commit
            .events()
            .iter()
            .map(|event| self.registry.marshal_event(event))
            .collect::<TenancyResult<Vec<_>>>()?;

        self.store
            .create_chunk(Chunk {
                stream_id: commit.stream_id().to_string(),
                chunk_id: commit.id().to_string(),
                events,
            })
            .await?;
        aggregate.mark_committed();

        info!(
            stream_id = commit.stream_id(),
            commit = commit.id(),
            events = commit.events().len(),
            "Committed events"
        );
        Ok(Some(commit))
    }

    /// Remove the whole stream
    pub async fn delete(&self, stream_id: &str) -> TenancyResult<usize> {
        let removed = self.store.delete_chunks(stream_id).await?;
        info!(stream_id, chunks = removed, "Deleted stream");
        Ok(removed)
    }
}

fn chunk_version(stream_id: &str, chunk_id: &str) -> TenancyResult<u64> {
    chunk_id
        .strip_prefix(&commit_prefix(stream_id))
        .and_then(|suffix| suffix.parse().ok())
        .ok_or_else(|| {
            TenancyError::Decode(format!("chunk id {chunk_id} does not belong to stream {stream_id}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::TenantCommand;
    use crate::event_store::InMemoryChunkStore;
    use crate::events::EventRecord;
    use serde_json::json;

    fn repository() -> Repository<InMemoryChunkStore> {
        Repository::with_tenant_events(Arc::new(InMemoryChunkStore::new()))
    }

    #[tokio::test]
    async fn test_save_without_events_writes_nothing() {
        let repository = repository();
        let mut aggregate = TenantAggregate::for_tenant("acme");

        assert!(repository.save(&mut aggregate).await.unwrap().is_none());
        assert_eq!(repository.store().write_count(), 0);
    }

    #[tokio::test]
    async fn test_save_then_load_replays_state() {
        let repository = repository();
        let mut aggregate = TenantAggregate::for_tenant("acme");
        aggregate.execute(TenantCommand::Create).unwrap();
        aggregate
            .execute(TenantCommand::SetBlueprint("standard".into()))
            .unwrap();

        let commit = repository.save(&mut aggregate).await.unwrap().unwrap();
        assert_eq!(commit.id(), "acme-stream-chunk-000001");

        let loaded = repository.load("acme").await.unwrap();
        assert_eq!(loaded.version(), 1);
        assert_eq!(loaded.last_event_sequence(), 2);
        assert_eq!(loaded.state().blueprint.as_deref(), Some("standard"));
    }

    #[tokio::test]
    async fn test_unknown_record_fails_whole_load() {
        let repository = repository();
        repository
            .store()
            .create_chunk(Chunk {
                stream_id: "acme".into(),
                chunk_id: "acme-stream-chunk-000001".into(),
                events: vec![EventRecord {
                    event_type: "TenantExploded".into(),
                    stream_id: "acme".into(),
                    sequence: 1,
                    data: json!({}),
                }],
            })
            .await
            .unwrap();

        let err = repository.get("acme").await.unwrap_err();
        assert!(matches!(err, TenancyError::UnboundEventType(_)));
    }

    #[test]
    fn test_chunk_version_parses_suffix() {
        assert_eq!(chunk_version("acme", "acme-stream-chunk-000012").unwrap(), 12);
        assert!(chunk_version("acme", "globex-stream-chunk-000001").is_err());
    }
}
