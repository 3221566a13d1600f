use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use coffees_catalog::{Coffee, Flavor};
use coffees_events::DomainEvent;

use super::Sessions;
use crate::error::StoreError;

/// Every in-memory table, behind one lock so a commit touches them atomically.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    /// Insertion order is listing order.
    pub(crate) coffees: Vec<Coffee>,
    pub(crate) flavors: Vec<Flavor>,
    pub(crate) events: Vec<DomainEvent>,
}

/// Shared in-memory backing for the catalog store, event store and sessions.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }
}

/// Writes staged by one workflow invocation; nothing is visible until commit.
///
/// A staged coffee only carries its recommendation counter into the table. Its
/// other fields may be stale by commit time and are never written back.
#[derive(Debug, Default)]
pub struct InMemorySession {
    pub(crate) coffees: Vec<Coffee>,
    pub(crate) events: Vec<DomainEvent>,
}

impl InMemorySession {
    pub fn staged_writes(&self) -> usize {
        self.coffees.len() + self.events.len()
    }
}

/// In-memory session factory.
#[derive(Debug, Clone)]
pub struct InMemorySessions {
    db: InMemoryDatabase,
}

impl InMemorySessions {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Sessions for InMemorySessions {
    type Session = InMemorySession;

    async fn begin(&self) -> Result<Self::Session, StoreError> {
        Ok(InMemorySession::default())
    }

    async fn commit(&self, session: Self::Session) -> Result<(), StoreError> {
        let mut tables = self.db.write()?;

        // Validate everything first; apply only if the whole session fits.
        for staged in &session.coffees {
            if !tables.coffees.iter().any(|c| c.id_typed() == staged.id_typed()) {
                return Err(StoreError::NotFound(format!(
                    "coffee {} was removed before commit",
                    staged.id_typed()
                )));
            }
        }
        for staged in &session.events {
            if tables.events.iter().any(|e| e.id == staged.id) {
                return Err(StoreError::Conflict(format!(
                    "event {} already exists",
                    staged.id
                )));
            }
        }

        let writes = session.staged_writes();
        for staged in session.coffees {
            if let Some(slot) = tables
                .coffees
                .iter_mut()
                .find(|c| c.id_typed() == staged.id_typed())
            {
                *slot = with_counter_of(slot, &staged);
            }
        }
        tables.events.extend(session.events);

        debug!(writes, "in-memory session committed");
        Ok(())
    }

    async fn abort(&self, session: Self::Session) -> Result<(), StoreError> {
        debug!(discarded = session.staged_writes(), "in-memory session aborted");
        Ok(())
    }
}

/// `current` with the recommendation counter taken from `staged`.
pub(crate) fn with_counter_of(current: &Coffee, staged: &Coffee) -> Coffee {
    Coffee::rehydrate(
        current.id_typed(),
        current.name().to_string(),
        current.brand().to_string(),
        current.description().map(str::to_string),
        staged.recommendations(),
        current.flavors().to_vec(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coffees_core::{CoffeeId, EventId};
    use serde_json::json;

    fn coffee(recommendations: u32) -> Coffee {
        Coffee::rehydrate(
            CoffeeId::new(),
            "Latte".into(),
            "X".into(),
            None,
            recommendations,
            vec![],
        )
    }

    fn event() -> DomainEvent {
        DomainEvent {
            id: EventId::new(),
            event_type: "coffee".into(),
            name: "recommend_coffee".into(),
            payload: json!({}),
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn commit_applies_all_staged_writes() {
        let db = InMemoryDatabase::new();
        let original = coffee(0);
        db.write().unwrap().coffees.push(original.clone());

        let sessions = InMemorySessions::new(db.clone());
        let mut session = sessions.begin().await.unwrap();
        let updated = Coffee::rehydrate(original.id_typed(), "Latte".into(), "X".into(), None, 1, vec![]);
        session.coffees.push(updated.clone());
        session.events.push(event());
        sessions.commit(session).await.unwrap();

        let tables = db.read().unwrap();
        assert_eq!(tables.coffees, vec![updated]);
        assert_eq!(tables.events.len(), 1);
    }

    #[tokio::test]
    async fn commit_writes_back_only_the_counter() {
        let db = InMemoryDatabase::new();
        let original = coffee(0);
        db.write().unwrap().coffees.push(original.clone());

        let sessions = InMemorySessions::new(db.clone());
        let mut session = sessions.begin().await.unwrap();
        let stale = Coffee::rehydrate(
            original.id_typed(),
            "Stale".into(),
            "Y".into(),
            Some("old".into()),
            4,
            vec![],
        );
        session.coffees.push(stale);
        sessions.commit(session).await.unwrap();

        let tables = db.read().unwrap();
        assert_eq!(tables.coffees[0].name(), "Latte");
        assert_eq!(tables.coffees[0].brand(), "X");
        assert_eq!(tables.coffees[0].description(), None);
        assert_eq!(tables.coffees[0].recommendations(), 4);
    }

    #[tokio::test]
    async fn commit_is_all_or_nothing_when_a_coffee_vanished() {
        let db = InMemoryDatabase::new();
        let sessions = InMemorySessions::new(db.clone());

        let mut session = sessions.begin().await.unwrap();
        session.coffees.push(coffee(1));
        session.events.push(event());

        let err = sessions.commit(session).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(db.read().unwrap().events.is_empty());
    }

    #[tokio::test]
    async fn abort_and_drop_leave_tables_untouched() {
        let db = InMemoryDatabase::new();
        let sessions = InMemorySessions::new(db.clone());

        let mut session = sessions.begin().await.unwrap();
        session.events.push(event());
        sessions.abort(session).await.unwrap();

        let mut dropped = sessions.begin().await.unwrap();
        dropped.events.push(event());
        drop(dropped);

        assert!(db.read().unwrap().events.is_empty());
    }
}
