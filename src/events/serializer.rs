// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Serializer
//!
//! A commit stores heterogeneous payloads in one ordered list, so every
//! payload is wrapped in an [`EventRecord`] carrying its type tag. Decoding
//! looks the tag up in an [`EventRegistry`]:
//!
//! ```text
//! Event ──marshal──> EventRecord { type, streamId, sequence, data }
//!                           │
//!               registry["ResourceAdded"]
//!                           │
//!                           ▼
//! Event <──unmarshal── ResourceAdded::deserialize(data)
//! ```
//!
//! An unknown tag is a hard error; the caller must treat the whole stream
//! as unreadable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tenant::*;
use super::Event;
use crate::errors::{TenancyError, TenancyResult};

/// Serialized form of one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub event_type: String,
    pub stream_id: String,
    pub sequence: i64,
    pub data: serde_json::Value,
}

type Decoder = fn(serde_json::Value) -> Result<TenantEvent, serde_json::Error>;

fn decode<T: DomainEvent>(data: serde_json::Value) -> Result<TenantEvent, serde_json::Error> {
    serde_json::from_value::<T>(data).map(Into::into)
}

/// Tag → decoder table, populated at startup
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    decoders: HashMap<&'static str, Decoder>,
}

impl EventRegistry {
    /// Empty registry; nothing can be read until events are registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the full tenant vocabulary
    pub fn with_tenant_events() -> Self {
        let mut registry = Self::new();
        registry
            .register::<TenantCreated>()
            .register::<TenantDeleted>()
            .register::<TenantNameSet>()
            .register::<BlueprintSet>()
            .register::<LabelsChanged>()
            .register::<AnnotationsChanged>()
            .register::<ResourceSetNameChanged>()
            .register::<ResourceSetCreated>()
            .register::<ResourceSetActivated>()
            .register::<ResourceSetDeactivated>()
            .register::<ResourceAdded>()
            .register::<ResourceUpdated>()
            .register::<ResourceRemoved>()
            .register::<ResourceGenerationFailed>()
            .register::<ResourceGenerationSuccessful>();
        registry
    }

    /// Bind a payload type to its tag
    pub fn register<T: DomainEvent>(&mut self) -> &mut Self {
        self.decoders.insert(T::TYPE, decode::<T>);
        self
    }

    pub fn is_registered(&self, event_type: &str) -> bool {
        self.decoders.contains_key(event_type)
    }

    /// Wrap an event's payload with its tag
    pub fn marshal_event(&self, event: &Event) -> TenancyResult<EventRecord> {
        let event_type = event.payload.event_type_name();
        if !self.is_registered(event_type) {
            return Err(TenancyError::UnboundEventType(event_type.to_string()));
        }

        Ok(EventRecord {
            event_type: event_type.to_string(),
            stream_id: event.stream_id.clone(),
            sequence: event.sequence,
            data: event.payload.to_data()?,
        })
    }

    /// Decode a record into the event type bound to its tag
    pub fn unmarshal_event(&self, record: &EventRecord) -> TenancyResult<Event> {
        let decoder = self
            .decoders
            .get(record.event_type.as_str())
            .ok_or_else(|| TenancyError::UnboundEventType(record.event_type.clone()))?;

        let payload = decoder(record.data.clone()).map_err(|e| {
            TenancyError::Decode(format!(
                "{} #{} in stream {}: {e}",
                record.event_type, record.sequence, record.stream_id
            ))
        })?;

        Ok(Event {
            stream_id: record.stream_id.clone(),
            sequence: record.sequence,
            payload,
        })
    }
}
