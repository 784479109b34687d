// Copyright (c) 2025 - Cowboy AI, Inc.
//! Commits and Streams

use crate::events::Event;

/// Commit identity for the commit advancing `id` to `version`
///
/// Re-deriving a commit from the same inputs yields the same identity.
pub fn commit_id(id: &str, version: u64) -> String {
    format!("{id}-stream-chunk-{version:06}")
}

/// Key prefix shared by every commit of a stream
pub fn commit_prefix(id: &str) -> String {
    format!("{id}-stream-chunk-")
}

/// One persisted batch of events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    id: String,
    stream_id: String,
    version: u64,
    events: Vec<Event>,
}

impl Commit {
    pub fn new(id: String, stream_id: String, version: u64, events: Vec<Event>) -> Self {
        Self {
            id,
            stream_id,
            version,
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Aggregate version this commit advances to
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// Complete history of one aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stream {
    id: String,
    commits: Vec<Commit>,
}

impl Stream {
    pub fn new(id: impl Into<String>, commits: Vec<Commit>) -> Self {
        Self {
            id: id.into(),
            commits,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Commits in the order the store returned them
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn push(&mut self, commit: Commit) {
        self.commits.push(commit);
    }

    /// Every event across every commit, sorted by sequence
    pub fn events(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .commits
            .iter()
            .flat_map(|commit| commit.events.iter().cloned())
            .collect();
        events.sort_by_key(|event| event.sequence);
        events
    }

    /// Total event count
    pub fn length(&self) -> usize {
        self.commits.iter().map(|commit| commit.events.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{TenantCreated, TenantNameSet};

    fn event(sequence: i64) -> Event {
        Event {
            stream_id: "acme".into(),
            sequence,
            payload: if sequence == 1 {
                TenantCreated {}.into()
            } else {
                TenantNameSet {
                    name: format!("Acme {sequence}"),
                }
                .into()
            },
        }
    }

    #[test]
    fn test_events_sorted_across_out_of_order_commits() {
        let stream = Stream::new(
            "acme",
            vec![
                Commit::new(commit_id("acme", 2), "acme".into(), 2, vec![event(3), event(4)]),
                Commit::new(commit_id("acme", 1), "acme".into(), 1, vec![event(1), event(2)]),
            ],
        );

        let sequences: Vec<i64> = stream.events().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4]);
        assert_eq!(stream.length(), 4);
    }

    #[test]
    fn test_commit_id_is_zero_padded() {
        assert_eq!(commit_id("acme", 7), "acme-stream-chunk-000007");
        assert!(commit_id("acme", 7).starts_with(&commit_prefix("acme")));
    }
}
