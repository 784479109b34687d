// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource-set retirement
//!
//! Resource-set names are zero-padded (`{tenant}-{nnn}`), so lexicographic
//! order is creation order. When more than `retain` sets exist, the
//! smallest surplus names are retired; the active set is never one of them.

/// Names to retire so that at most `retain` sets remain
pub fn select_retired<'a, I>(names: I, active: Option<&str>, retain: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names: Vec<&str> = names.into_iter().collect();
    names.sort_unstable();
    names.dedup();

    let surplus = names.len().saturating_sub(retain);
    names
        .into_iter()
        .filter(|name| Some(*name) != active)
        .take(surplus)
        .map(str::to_string)
        .collect()
}
