//! Store wiring: one [`CatalogService`] per backend, chosen at startup.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use coffees_catalog::{Coffee, CreateCoffee, UpdateCoffee};
use coffees_core::{CoffeeId, EventId};
use coffees_events::{DomainEvent, EventKey};
use coffees_infra::catalog_store::{InMemoryCatalogStore, PostgresCatalogStore};
use coffees_infra::config::AppConfig;
use coffees_infra::event_store::{InMemoryEventStore, PostgresEventStore};
use coffees_infra::session::{InMemoryDatabase, InMemorySessions, PostgresSessions};
use coffees_infra::{CatalogError, CatalogService, Pagination, Recommendation, StoreError, db};

pub type InMemoryCatalog =
    CatalogService<InMemorySessions, InMemoryCatalogStore, InMemoryEventStore>;

pub type PostgresCatalog =
    CatalogService<PostgresSessions, PostgresCatalogStore, PostgresEventStore>;

#[derive(Clone)]
pub enum AppServices {
    InMemory(Arc<InMemoryCatalog>),
    Postgres(Arc<PostgresCatalog>),
}

/// Postgres when `DATABASE_URL` is configured, in-memory otherwise.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    match &config.database {
        Some(database) => {
            let pool = db::connect(database).await?;
            Ok(AppServices::postgres(pool))
        }
        None => Ok(AppServices::in_memory()),
    }
}

impl AppServices {
    pub fn in_memory() -> Self {
        let db = InMemoryDatabase::new();
        info!("using in-memory stores");
        Self::InMemory(Arc::new(CatalogService::new(
            InMemorySessions::new(db.clone()),
            InMemoryCatalogStore::new(db.clone()),
            InMemoryEventStore::new(db),
        )))
    }

    pub fn postgres(pool: PgPool) -> Self {
        info!("using postgres stores");
        Self::Postgres(Arc::new(CatalogService::new(
            PostgresSessions::new(pool.clone()),
            PostgresCatalogStore::new(pool.clone()),
            PostgresEventStore::new(pool),
        )))
    }

    pub fn backend(&self) -> &'static str {
        match self {
            AppServices::InMemory(_) => "in_memory",
            AppServices::Postgres(_) => "postgres",
        }
    }

    pub async fn list(&self, page: Pagination) -> Result<Vec<Coffee>, CatalogError> {
        match self {
            AppServices::InMemory(svc) => svc.list(page).await,
            AppServices::Postgres(svc) => svc.list(page).await,
        }
    }

    pub async fn get(&self, id: CoffeeId) -> Result<Coffee, CatalogError> {
        match self {
            AppServices::InMemory(svc) => svc.get(id).await,
            AppServices::Postgres(svc) => svc.get(id).await,
        }
    }

    pub async fn create(&self, cmd: CreateCoffee) -> Result<Coffee, CatalogError> {
        match self {
            AppServices::InMemory(svc) => svc.create(cmd).await,
            AppServices::Postgres(svc) => svc.create(cmd).await,
        }
    }

    pub async fn update(&self, id: CoffeeId, cmd: UpdateCoffee) -> Result<Coffee, CatalogError> {
        match self {
            AppServices::InMemory(svc) => svc.update(id, cmd).await,
            AppServices::Postgres(svc) => svc.update(id, cmd).await,
        }
    }

    pub async fn remove(&self, id: CoffeeId) -> Result<Coffee, CatalogError> {
        match self {
            AppServices::InMemory(svc) => svc.remove(id).await,
            AppServices::Postgres(svc) => svc.remove(id).await,
        }
    }

    pub async fn recommend(&self, id: CoffeeId) -> Result<Recommendation, CatalogError> {
        match self {
            AppServices::InMemory(svc) => svc.recommend(id).await,
            AppServices::Postgres(svc) => svc.recommend(id).await,
        }
    }

    pub async fn events_by_key(
        &self,
        key: &EventKey,
        page: Pagination,
    ) -> Result<Vec<DomainEvent>, CatalogError> {
        match self {
            AppServices::InMemory(svc) => svc.events_by_key(key, page).await,
            AppServices::Postgres(svc) => svc.events_by_key(key, page).await,
        }
    }

    pub async fn event(&self, id: EventId) -> Result<DomainEvent, CatalogError> {
        match self {
            AppServices::InMemory(svc) => svc.event(id).await,
            AppServices::Postgres(svc) => svc.event(id).await,
        }
    }
}
