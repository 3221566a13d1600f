use std::sync::Arc;

use async_trait::async_trait;

use coffees_core::EventId;
use coffees_events::{DomainEvent, EventKey, NewDomainEvent};

use crate::error::StoreError;
use crate::pagination::Pagination;

/// Append-only domain event log, queryable by `(name, type)`.
///
/// ## Append Semantics
///
/// `append_in()` stages the record inside the caller's session. It becomes durable
/// when the session commits and disappears when the session aborts (or is dropped).
/// Appending an id that already exists is a `Conflict`.
///
/// ## Read Semantics
///
/// Reads see committed events only, oldest first.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Session type shared with the catalog store.
    type Session: Send;

    async fn append_in(
        &self,
        session: &mut Self::Session,
        event: NewDomainEvent,
    ) -> Result<DomainEvent, StoreError>;

    /// Events whose `name` and `type` both match `key`.
    async fn find_by_key(
        &self,
        key: &EventKey,
        page: Pagination,
    ) -> Result<Vec<DomainEvent>, StoreError>;

    async fn get(&self, id: EventId) -> Result<Option<DomainEvent>, StoreError>;
}

#[async_trait]
impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    type Session = S::Session;

    async fn append_in(
        &self,
        session: &mut Self::Session,
        event: NewDomainEvent,
    ) -> Result<DomainEvent, StoreError> {
        (**self).append_in(session, event).await
    }

    async fn find_by_key(
        &self,
        key: &EventKey,
        page: Pagination,
    ) -> Result<Vec<DomainEvent>, StoreError> {
        (**self).find_by_key(key, page).await
    }

    async fn get(&self, id: EventId) -> Result<Option<DomainEvent>, StoreError> {
        (**self).get(id).await
    }
}
