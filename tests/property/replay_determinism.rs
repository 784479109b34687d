// Copyright (c) 2025 - Cowboy AI, Inc.
//! Replay determinism
//!
//! Whatever commands a pass executes, the stream it leaves behind must
//! rebuild the same aggregate state and the same projections, in any commit
//! order and through the chunk store.

use proptest::prelude::*;
use std::sync::Arc;

use cim_tenancy::aggregate::{Commit, Stream, TenantAggregate, TenantCommand};
use cim_tenancy::event_store::{InMemoryChunkStore, Repository};
use cim_tenancy::generator::ResourceChange;
use cim_tenancy::projection::{select_retired, Projections};

use crate::fixtures::{config, resource, MINIMAL, STANDARD, TENANT};

fn command_strategy() -> impl Strategy<Value = TenantCommand> {
    prop_oneof![
        2 => Just(TenantCommand::Create),
        1 => "[A-Z][a-z]{1,8}".prop_map(TenantCommand::SetName),
        2 => prop::sample::select(vec![STANDARD, MINIMAL])
            .prop_map(|b| TenantCommand::SetBlueprint(b.to_string())),
        2 => Just(TenantCommand::RotateResourceSet),
        3 => prop::collection::vec((0u8..6, 1u8..4), 1..4).prop_map(|entries| {
            TenantCommand::ApplyChanges(
                entries
                    .into_iter()
                    .map(|(id, sum)| {
                        ResourceChange::Added(resource(
                            &format!("cm-{id}"),
                            i64::from(id) + 1,
                            &format!("s{sum}"),
                        ))
                    })
                    .collect(),
            )
        }),
        1 => (0u8..6).prop_map(|id| {
            TenantCommand::ApplyChanges(vec![ResourceChange::Removed(format!("cm-{id}"))])
        }),
        2 => "[a-f0-9]{8}".prop_map(|sum| TenantCommand::RecordGenerationSuccess { sum }),
        1 => "[a-z ]{4,16}".prop_map(|reason| TenantCommand::RecordGenerationFailure { reason }),
    ]
}

/// Run each batch of commands and commit after every batch
fn run(batches: &[Vec<TenantCommand>]) -> (TenantAggregate, Vec<Commit>) {
    let mut aggregate = TenantAggregate::for_tenant(TENANT);
    let mut commits = Vec::new();
    for batch in batches {
        for command in batch {
            // Rejected commands leave no events behind
            let _ = aggregate.execute(command.clone());
        }
        if let Some(commit) = aggregate.commit_events(|_| Ok::<_, ()>(())).unwrap() {
            commits.push(commit);
        }
    }
    (aggregate, commits)
}

fn batches() -> impl Strategy<Value = Vec<Vec<TenantCommand>>> {
    prop::collection::vec(prop::collection::vec(command_strategy(), 1..6), 1..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Sequences are dense from 1 and commit versions count up from 1
    #[test]
    fn prop_sequences_are_monotonic(batches in batches()) {
        let (_, commits) = run(&batches);

        let stream = Stream::new(TENANT, commits.clone());
        let sequences: Vec<i64> = stream.events().iter().map(|e| e.sequence).collect();
        prop_assert_eq!(sequences, (1..=stream.length() as i64).collect::<Vec<_>>());

        let versions: Vec<u64> = commits.iter().map(Commit::version).collect();
        prop_assert_eq!(versions, (1..=commits.len() as u64).collect::<Vec<_>>());
    }

    /// Commit order in the store does not matter to the rebuilt state
    #[test]
    fn prop_rebuild_ignores_commit_order(batches in batches()) {
        let (aggregate, commits) = run(&batches);

        let mut reversed = commits.clone();
        reversed.reverse();
        let mut rebuilt = TenantAggregate::for_tenant(TENANT);
        rebuilt.load_from_historical_events(&Stream::new(TENANT, reversed));

        prop_assert_eq!(rebuilt.state(), aggregate.state());
        prop_assert_eq!(rebuilt.version(), aggregate.version());
        prop_assert_eq!(rebuilt.last_event_sequence(), aggregate.last_event_sequence());
    }

    /// Projections are a pure function of the event list
    #[test]
    fn prop_projections_are_deterministic(batches in batches()) {
        let (_, commits) = run(&batches);
        let events = Stream::new(TENANT, commits).events();
        let config = config();

        let first = Projections::build(&events, &config);
        let second = Projections::build(&events, &config);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.resource_sets.active().len() <= 1);
    }

    /// A stream saved through the repository loads back unchanged
    #[test]
    fn prop_repository_round_trip_preserves_state(batches in batches()) {
        let repository = Repository::with_tenant_events(Arc::new(InMemoryChunkStore::new()));
        let mut aggregate = TenantAggregate::for_tenant(TENANT);

        let loaded = tokio_test::block_on(async {
            for batch in &batches {
                for command in batch {
                    let _ = aggregate.execute(command.clone());
                }
                repository.save(&mut aggregate).await.unwrap();
            }
            repository.load(TENANT).await.unwrap()
        });

        prop_assert_eq!(loaded.state(), aggregate.state());
        prop_assert_eq!(loaded.version(), aggregate.version());
    }

    /// Retirement never touches the active set and keeps at most `retain` sets
    #[test]
    fn prop_retirement_keeps_active_and_newest(
        count in 0usize..12,
        active in prop::option::of(0usize..12),
        retain in 0usize..5,
    ) {
        let names: Vec<String> = (1..=count).map(|n| format!("{TENANT}-{n:03}")).collect();
        let active = active.filter(|a| *a < count).map(|a| names[a].clone());

        let retired = select_retired(names.iter().map(String::as_str), active.as_deref(), retain);

        let inactive = count - usize::from(active.is_some());
        prop_assert_eq!(retired.len(), count.saturating_sub(retain).min(inactive));
        if let Some(active) = &active {
            prop_assert!(!retired.contains(active));
        }
        let mut sorted = retired.clone();
        sorted.sort();
        prop_assert_eq!(&sorted, &retired);
        // Only the oldest are retired
        if let Some(newest_retired) = retired.last() {
            let kept_older = names
                .iter()
                .filter(|n| Some(*n) != active.as_ref() && !retired.contains(n))
                .any(|n| n < newest_retired);
            prop_assert!(!kept_older);
        }
    }
}
