use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use coffees_core::EventId;

use crate::event::Event;

/// Failure while turning a typed event into a storable record.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),
}

/// An event ready to be appended to the log (not yet persisted).
///
/// The identifier is assigned up front so the same record can be retried against
/// a store without creating a second logical event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDomainEvent {
    pub id: EventId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub name: String,
    pub payload: JsonValue,
    pub occurred_at: DateTime<Utc>,
}

impl NewDomainEvent {
    /// Build a record from a typed event; the event itself becomes the payload.
    pub fn from_typed<E>(event: &E) -> Result<Self, EventError>
    where
        E: Event + Serialize,
    {
        Ok(Self {
            id: EventId::new(),
            event_type: event.event_type().to_string(),
            name: event.name().to_string(),
            payload: serde_json::to_value(event)?,
            occurred_at: event.occurred_at(),
        })
    }

    pub fn key(&self) -> EventKey {
        EventKey::new(self.name.clone(), self.event_type.clone())
    }

    /// Finalize into the stored shape once a store has accepted the record.
    pub fn into_stored(self) -> DomainEvent {
        DomainEvent {
            id: self.id,
            event_type: self.event_type,
            name: self.name,
            payload: self.payload,
            occurred_at: self.occurred_at,
        }
    }
}

/// A persisted, append-only domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: EventId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub name: String,
    pub payload: JsonValue,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent {
    pub fn key(&self) -> EventKey {
        EventKey::new(self.name.clone(), self.event_type.clone())
    }
}

/// Composite lookup key `(name, type)` of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventKey {
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: String,
}

impl EventKey {
    pub fn new(name: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            event_type: event_type.into(),
        }
    }

    pub fn matches(&self, event: &DomainEvent) -> bool {
        event.name == self.name && event.event_type == self.event_type
    }
}
