//! Postgres-backed catalog.
//!
//! A coffee spans three tables: the `coffee` row, its `coffee_flavors` links (with a
//! `position` column so flavors come back in the order they were given) and the
//! shared, name-unique `flavor` rows. Every multi-statement write runs in one
//! transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool, Row};
use tracing::{Span, instrument};
use uuid::Uuid;

use coffees_catalog::{Coffee, CoffeePatch, Flavor, FlavorName, NewCoffee};
use coffees_core::{CoffeeId, FlavorId};

use super::r#trait::CatalogStore;
use crate::db::map_sqlx_error;
use crate::error::StoreError;
use crate::pagination::Pagination;
use crate::session::PgSession;

#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    type Session = PgSession;

    #[instrument(skip(self), fields(coffee_id = %id), err)]
    async fn find_by_id(&self, id: CoffeeId) -> Result<Option<Coffee>, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("find_coffee", e))?;
        load_coffee(&mut conn, id, false).await
    }

    #[instrument(skip(self), fields(coffee_count), err)]
    async fn list_page(&self, page: Pagination) -> Result<Vec<Coffee>, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("list_coffees", e))?;

        let rows = sqlx::query(
            r#"
            SELECT id, name, brand, description, recommendations
            FROM coffee
            ORDER BY seq ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("list_coffees", e))?;

        let coffee_rows = rows
            .iter()
            .map(CoffeeRow::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| decode_error("coffee", e))?;

        let ids: Vec<Uuid> = coffee_rows.iter().map(|r| r.id).collect();
        let mut flavors = load_flavors(&mut conn, &ids).await?;

        let coffees = coffee_rows
            .into_iter()
            .map(|row| {
                let linked = flavors.remove(&row.id).unwrap_or_default();
                row.into_coffee(linked)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Span::current().record("coffee_count", coffees.len());
        Ok(coffees)
    }

    #[instrument(skip(self, new), fields(name = %new.name, coffee_id), err)]
    async fn create(&self, new: NewCoffee) -> Result<Coffee, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("create_coffee", e))?;

        let id = CoffeeId::new();
        Span::current().record("coffee_id", tracing::field::display(id));

        sqlx::query(
            r#"
            INSERT INTO coffee (id, name, brand, description, recommendations)
            VALUES ($1, $2, $3, $4, 0)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&new.name)
        .bind(&new.brand)
        .bind(&new.description)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_coffee", e))?;

        let flavors = upsert_flavors(&mut tx, &new.flavors).await?;
        link_flavors(&mut tx, id, &flavors).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("create_coffee", e))?;

        Ok(Coffee::create(id, new, flavors))
    }

    #[instrument(skip(self, patch), fields(coffee_id = %id), err)]
    async fn update(
        &self,
        id: CoffeeId,
        patch: CoffeePatch,
    ) -> Result<Option<Coffee>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_coffee", e))?;

        let Some(mut coffee) = load_coffee(&mut tx, id, true).await? else {
            return Ok(None);
        };

        coffee.apply_patch(&patch);
        if let Some(names) = &patch.flavors {
            let flavors = upsert_flavors(&mut tx, names).await?;
            coffee.replace_flavors(flavors);
        }
        write_coffee(&mut tx, &coffee).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_coffee", e))?;
        Ok(Some(coffee))
    }

    #[instrument(skip(self, coffee), fields(coffee_id = %coffee.id_typed()), err)]
    async fn save(&self, coffee: &Coffee) -> Result<Coffee, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("save_coffee", e))?;
        let saved = write_coffee(&mut tx, coffee).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("save_coffee", e))?;
        Ok(saved)
    }

    #[instrument(skip(self), fields(coffee_id = %id), err)]
    async fn remove(&self, id: CoffeeId) -> Result<Option<Coffee>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("remove_coffee", e))?;

        let Some(coffee) = load_coffee(&mut tx, id, true).await? else {
            return Ok(None);
        };

        // Links go with the coffee (ON DELETE CASCADE); flavor rows stay shared.
        sqlx::query("DELETE FROM coffee WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("remove_coffee", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("remove_coffee", e))?;
        Ok(Some(coffee))
    }

    #[instrument(skip(self, session, coffee), fields(coffee_id = %coffee.id_typed()), err)]
    async fn save_in(
        &self,
        session: &mut Self::Session,
        coffee: &Coffee,
    ) -> Result<Coffee, StoreError> {
        // Only the counter: name, brand, description and flavor links stay as stored.
        let result = sqlx::query("UPDATE coffee SET recommendations = $2 WHERE id = $1")
            .bind(coffee.id_typed().as_uuid())
            .bind(i64::from(coffee.recommendations()))
            .execute(&mut **session)
            .await
            .map_err(|e| map_sqlx_error("save_recommendations", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "coffee {}",
                coffee.id_typed()
            )));
        }

        load_coffee(session, coffee.id_typed(), false)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("coffee {}", coffee.id_typed())))
    }
}

/// Update every column of an existing coffee and re-link its flavors.
async fn write_coffee(conn: &mut PgConnection, coffee: &Coffee) -> Result<Coffee, StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE coffee
        SET name = $2, brand = $3, description = $4, recommendations = $5
        WHERE id = $1
        "#,
    )
    .bind(coffee.id_typed().as_uuid())
    .bind(coffee.name())
    .bind(coffee.brand())
    .bind(coffee.description())
    .bind(i64::from(coffee.recommendations()))
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("save_coffee", e))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(format!(
            "coffee {}",
            coffee.id_typed()
        )));
    }

    let names: Vec<FlavorName> = coffee.flavor_names().cloned().collect();
    let flavors = upsert_flavors(conn, &names).await?;

    sqlx::query("DELETE FROM coffee_flavors WHERE coffee_id = $1")
        .bind(coffee.id_typed().as_uuid())
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("save_coffee", e))?;
    link_flavors(conn, coffee.id_typed(), &flavors).await?;

    let mut saved = coffee.clone();
    saved.replace_flavors(flavors);
    Ok(saved)
}

/// Find-or-create flavor rows by name, in the given order.
async fn upsert_flavors(
    conn: &mut PgConnection,
    names: &[FlavorName],
) -> Result<Vec<Flavor>, StoreError> {
    let mut flavors = Vec::with_capacity(names.len());
    for name in names {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query(
            r#"
            INSERT INTO flavor (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#,
        )
        .bind(*FlavorId::new().as_uuid())
        .bind(name.as_str())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("upsert_flavor", e))?;

        let flavor = FlavorRow::from_row(&row).map_err(|e| decode_error("flavor", e))?;
        flavors.push(flavor.into_flavor()?);
    }
    Ok(flavors)
}

async fn link_flavors(
    conn: &mut PgConnection,
    coffee_id: CoffeeId,
    flavors: &[Flavor],
) -> Result<(), StoreError> {
    for (position, flavor) in flavors.iter().enumerate() {
        let position = i32::try_from(position)
            .map_err(|_| StoreError::backend("too many flavors on one coffee"))?;
        sqlx::query(
            r#"
            INSERT INTO coffee_flavors (coffee_id, flavor_id, position)
            VALUES ($1, $2, $3)
            ON CONFLICT (coffee_id, flavor_id) DO NOTHING
            "#,
        )
        .bind(coffee_id.as_uuid())
        .bind(flavor.id.as_uuid())
        .bind(position)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("link_flavor", e))?;
    }
    Ok(())
}

async fn load_coffee(
    conn: &mut PgConnection,
    id: CoffeeId,
    for_update: bool,
) -> Result<Option<Coffee>, StoreError> {
    let sql = if for_update {
        "SELECT id, name, brand, description, recommendations FROM coffee WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT id, name, brand, description, recommendations FROM coffee WHERE id = $1"
    };

    let row = sqlx::query(sql)
        .bind(id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("load_coffee", e))?;
    let Some(row) = row else {
        return Ok(None);
    };

    let coffee_row = CoffeeRow::from_row(&row).map_err(|e| decode_error("coffee", e))?;
    let mut flavors = load_flavors(conn, &[coffee_row.id]).await?;
    let linked = flavors.remove(&coffee_row.id).unwrap_or_default();
    coffee_row.into_coffee(linked).map(Some)
}

/// Flavors of several coffees at once, grouped by coffee id and in link order.
async fn load_flavors(
    conn: &mut PgConnection,
    coffee_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Flavor>>, StoreError> {
    let mut grouped: HashMap<Uuid, Vec<Flavor>> = HashMap::new();
    if coffee_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = sqlx::query(
        r#"
        SELECT cf.coffee_id, f.id, f.name
        FROM coffee_flavors cf
        JOIN flavor f ON f.id = cf.flavor_id
        WHERE cf.coffee_id = ANY($1)
        ORDER BY cf.coffee_id, cf.position ASC
        "#,
    )
    .bind(coffee_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("load_flavors", e))?;

    for row in rows {
        let coffee_id: Uuid = row
            .try_get("coffee_id")
            .map_err(|e| decode_error("coffee_flavors", e))?;
        let flavor = FlavorRow::from_row(&row).map_err(|e| decode_error("flavor", e))?;
        grouped
            .entry(coffee_id)
            .or_default()
            .push(flavor.into_flavor()?);
    }
    Ok(grouped)
}

fn decode_error(table: &str, err: sqlx::Error) -> StoreError {
    StoreError::backend(format!("failed to deserialize {table} row: {err}"))
}

struct CoffeeRow {
    id: Uuid,
    name: String,
    brand: String,
    description: Option<String>,
    recommendations: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for CoffeeRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(CoffeeRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            brand: row.try_get("brand")?,
            description: row.try_get("description")?,
            recommendations: row.try_get("recommendations")?,
        })
    }
}

impl CoffeeRow {
    fn into_coffee(self, flavors: Vec<Flavor>) -> Result<Coffee, StoreError> {
        let recommendations = u32::try_from(self.recommendations).map_err(|_| {
            StoreError::backend(format!(
                "coffee {} has out-of-range recommendations {}",
                self.id, self.recommendations
            ))
        })?;
        Ok(Coffee::rehydrate(
            CoffeeId::from_uuid(self.id),
            self.name,
            self.brand,
            self.description,
            recommendations,
            flavors,
        ))
    }
}

struct FlavorRow {
    id: Uuid,
    name: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for FlavorRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(FlavorRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

impl FlavorRow {
    fn into_flavor(self) -> Result<Flavor, StoreError> {
        let name = FlavorName::parse(&self.name)
            .map_err(|e| StoreError::backend(format!("stored flavor {}: {e}", self.id)))?;
        Ok(Flavor {
            id: FlavorId::from_uuid(self.id),
            name,
        })
    }
}
