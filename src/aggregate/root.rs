// Copyright (c) 2025 - Cowboy AI, Inc.
//! Aggregate Root Kernel
//!
//! An [`AggregateRoot`] is rebuilt from its [`Stream`] on every reconcile
//! pass and owns a single [`EventConsumer`] that folds events into state.
//!
//! ```text
//!           apply(payload)
//!                │  sequence = last + 1
//!                ▼
//! consumer.on(&event) ──> uncommitted ──commit_events(sink)──> Commit
//! ```
//!
//! Applying out of sequence is never possible: the root assigns the
//! sequence itself.

use super::stream::{commit_id, Commit, Stream};
use crate::events::{Event, TenantEvent};

/// State builder driven by events
///
/// Implementations must be deterministic: the same events in the same
/// order always produce the same state.
pub trait EventConsumer {
    fn on(&mut self, event: &Event);
}

/// Mutable in-process instance of one aggregate
#[derive(Debug, Clone)]
pub struct AggregateRoot<C> {
    id: String,
    version: u64,
    last_event_sequence: i64,
    uncommitted: Vec<Event>,
    consumer: C,
}

impl<C: EventConsumer> AggregateRoot<C> {
    pub fn new(id: impl Into<String>, consumer: C) -> Self {
        Self {
            id: id.into(),
            version: 0,
            last_event_sequence: 0,
            uncommitted: Vec::new(),
            consumer,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of commits this aggregate has persisted
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn last_event_sequence(&self) -> i64 {
        self.last_event_sequence
    }

    pub fn state(&self) -> &C {
        &self.consumer
    }

    pub fn uncommitted_events(&self) -> &[Event] {
        &self.uncommitted
    }

    pub fn has_uncommitted_events(&self) -> bool {
        !self.uncommitted.is_empty()
    }

    /// Record a new fact, assigning the next sequence
    pub fn apply(&mut self, payload: impl Into<TenantEvent>) -> &Event {
        let event = Event {
            stream_id: self.id.clone(),
            sequence: self.last_event_sequence + 1,
            payload: payload.into(),
        };
        self.consumer.on(&event);
        self.last_event_sequence = event.sequence;
        let index = self.uncommitted.len();
        self.uncommitted.push(event);
        &self.uncommitted[index]
    }

    /// Replay persisted history; version becomes the number of commits
    pub fn load_from_historical_events(&mut self, stream: &Stream) {
        for event in stream.events() {
            self.consumer.on(&event);
            self.last_event_sequence = event.sequence;
        }
        self.version = stream.commits().len() as u64;
    }

    /// The commit that flushing would produce, if anything is buffered
    pub fn pending_commit(&self) -> Option<Commit> {
        if self.uncommitted.is_empty() {
            return None;
        }
        let version = self.version + 1;
        Some(Commit::new(
            commit_id(&self.id, version),
            self.id.clone(),
            version,
            self.uncommitted.clone(),
        ))
    }

    /// Drop the buffer after the pending commit was persisted
    pub fn mark_committed(&mut self) {
        if !self.uncommitted.is_empty() {
            self.uncommitted.clear();
            self.version += 1;
        }
    }

    /// Flush the buffer through `sink`; no-op when nothing is buffered.
    ///
    /// The buffer is kept when the sink fails.
    pub fn commit_events<F, E>(&mut self, sink: F) -> Result<Option<Commit>, E>
    where
        F: FnOnce(&Commit) -> Result<(), E>,
    {
        let Some(commit) = self.pending_commit() else {
            return Ok(None);
        };
        sink(&commit)?;
        self.mark_committed();
        Ok(Some(commit))
    }
}
