// Copyright (c) 2025 - Cowboy AI, Inc.
//! Requeue decision
//!
//! The last generation outcome decides whether this pass asks for an early
//! retry. Success asks for nothing; the controller's own interval applies.

use std::time::Duration;

use crate::aggregate::EventConsumer;
use crate::config::DEFAULT_GENERATION_BACKOFF;
use crate::events::{Event, TenantEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequeueProjection {
    backoff: Duration,
    requeue_after: Option<Duration>,
}

impl Default for RequeueProjection {
    fn default() -> Self {
        Self::new(DEFAULT_GENERATION_BACKOFF)
    }
}

impl RequeueProjection {
    pub fn new(backoff: Duration) -> Self {
        Self {
            backoff,
            requeue_after: None,
        }
    }

    pub fn requeue_after(&self) -> Option<Duration> {
        self.requeue_after
    }
}

impl EventConsumer for RequeueProjection {
    fn on(&mut self, event: &Event) {
        match &event.payload {
            TenantEvent::ResourceGenerationFailed(_) => self.requeue_after = Some(self.backoff),
            TenantEvent::ResourceGenerationSuccessful(_) => self.requeue_after = None,
            _ => {}
        }
    }
}
