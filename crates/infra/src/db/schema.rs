use sqlx::PgPool;
use tracing::{debug, instrument};

use super::map_sqlx_error;
use crate::error::StoreError;

/// Idempotent table definitions, applied in order at startup.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS coffee (
        id UUID PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        name TEXT NOT NULL,
        brand TEXT NOT NULL,
        description TEXT NULL,
        recommendations BIGINT NOT NULL DEFAULT 0 CHECK (recommendations >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS flavor (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS coffee_flavors (
        coffee_id UUID NOT NULL REFERENCES coffee (id) ON DELETE CASCADE,
        flavor_id UUID NOT NULL REFERENCES flavor (id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        PRIMARY KEY (coffee_id, flavor_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS event (
        id UUID PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        type TEXT NOT NULL,
        name TEXT NOT NULL,
        payload JSONB NOT NULL,
        occurred_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS event_name_type_idx ON event (name, type)",
];

/// Create the `coffee`, `flavor`, `coffee_flavors` and `event` tables if missing.
///
/// Existing tables are left as they are; there is no migration step.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for &statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    debug!(statements = SCHEMA.len(), "schema ensured");
    Ok(())
}
