//! Postgres-backed event log.
//!
//! Rows live in the `event` table; the `(name, type)` index serves
//! [`EventStore::find_by_key`]. `seq` keeps insertion order stable for paging.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgPool, Row};
use tracing::{Span, instrument};

use coffees_core::EventId;
use coffees_events::{DomainEvent, EventKey, NewDomainEvent};

use super::r#trait::EventStore;
use crate::db::map_sqlx_error;
use crate::error::StoreError;
use crate::pagination::Pagination;
use crate::session::PgSession;

#[derive(Debug, Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    type Session = PgSession;

    #[instrument(
        skip(self, session, event),
        fields(event_id = %event.id, name = %event.name, event_type = %event.event_type),
        err
    )]
    async fn append_in(
        &self,
        session: &mut Self::Session,
        event: NewDomainEvent,
    ) -> Result<DomainEvent, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO event (id, type, name, payload, occurred_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.event_type)
        .bind(&event.name)
        .bind(&event.payload)
        .bind(event.occurred_at)
        .execute(&mut **session)
        .await
        .map_err(|e| map_sqlx_error("append_event", e))?;

        Ok(event.into_stored())
    }

    #[instrument(
        skip(self),
        fields(name = %key.name, event_type = %key.event_type, event_count),
        err
    )]
    async fn find_by_key(
        &self,
        key: &EventKey,
        page: Pagination,
    ) -> Result<Vec<DomainEvent>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, type, name, payload, occurred_at
            FROM event
            WHERE name = $1 AND type = $2
            ORDER BY seq ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&key.name)
        .bind(&key.event_type)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_events_by_key", e))?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let stored = EventRow::from_row(&row).map_err(|e| {
                StoreError::backend(format!("failed to deserialize event row: {e}"))
            })?;
            events.push(stored.into());
        }

        Span::current().record("event_count", events.len());
        Ok(events)
    }

    #[instrument(skip(self), fields(event_id = %id), err)]
    async fn get(&self, id: EventId) -> Result<Option<DomainEvent>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, type, name, payload, occurred_at
            FROM event
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_event", e))?;

        row.map(|row| {
            EventRow::from_row(&row)
                .map(DomainEvent::from)
                .map_err(|e| StoreError::backend(format!("failed to deserialize event row: {e}")))
        })
        .transpose()
    }
}

struct EventRow {
    id: uuid::Uuid,
    event_type: String,
    name: String,
    payload: JsonValue,
    occurred_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for EventRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(EventRow {
            id: row.try_get("id")?,
            event_type: row.try_get("type")?,
            name: row.try_get("name")?,
            payload: row.try_get("payload")?,
            occurred_at: row.try_get("occurred_at")?,
        })
    }
}

impl From<EventRow> for DomainEvent {
    fn from(row: EventRow) -> Self {
        DomainEvent {
            id: EventId::from_uuid(row.id),
            event_type: row.event_type,
            name: row.name,
            payload: row.payload,
            occurred_at: row.occurred_at,
        }
    }
}
