// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tracing bootstrap

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence; `default_level` is added as a fallback
/// directive. Returns `false` when a subscriber was already installed.
pub fn init_tracing(default_level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_target(true)
        .try_init()
        .is_ok()
}
