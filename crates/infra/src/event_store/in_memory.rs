use async_trait::async_trait;

use coffees_core::EventId;
use coffees_events::{DomainEvent, EventKey, NewDomainEvent};

use super::r#trait::EventStore;
use crate::error::StoreError;
use crate::pagination::Pagination;
use crate::session::{InMemoryDatabase, InMemorySession};

/// In-memory event log over the shared [`InMemoryDatabase`].
///
/// Lookups by key are a linear scan; this store is meant for tests and dev runs.
#[derive(Debug, Clone)]
pub struct InMemoryEventStore {
    db: InMemoryDatabase,
}

impl InMemoryEventStore {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    type Session = InMemorySession;

    async fn append_in(
        &self,
        session: &mut Self::Session,
        event: NewDomainEvent,
    ) -> Result<DomainEvent, StoreError> {
        let duplicate = session.events.iter().any(|e| e.id == event.id)
            || self.db.read()?.events.iter().any(|e| e.id == event.id);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "event {} already exists",
                event.id
            )));
        }

        let stored = event.into_stored();
        session.events.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_key(
        &self,
        key: &EventKey,
        page: Pagination,
    ) -> Result<Vec<DomainEvent>, StoreError> {
        let tables = self.db.read()?;
        Ok(tables
            .events
            .iter()
            .filter(|e| key.matches(e))
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: EventId) -> Result<Option<DomainEvent>, StoreError> {
        Ok(self.db.read()?.events.iter().find(|e| e.id == id).cloned())
    }
}
