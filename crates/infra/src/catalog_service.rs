//! Catalog use cases as called by the HTTP layer.
//!
//! Validates raw commands, turns store-level absence into typed not-found errors,
//! and delegates recommendations to [`RecommendationWorkflow`].

use thiserror::Error;
use tracing::info;

use coffees_catalog::{Coffee, CreateCoffee, UpdateCoffee};
use coffees_core::{CoffeeId, DomainError, EventId};
use coffees_events::{DomainEvent, EventKey};

use crate::catalog_store::CatalogStore;
use crate::error::StoreError;
use crate::event_store::EventStore;
use crate::pagination::Pagination;
use crate::recommendation::{RecommendError, Recommendation, RecommendationWorkflow};
use crate::session::Sessions;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("coffee {0} not found")]
    NotFound(CoffeeId),

    #[error("event {0} not found")]
    EventNotFound(EventId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Recommend(#[from] RecommendError),
}

#[derive(Debug, Clone)]
pub struct CatalogService<S, C, E> {
    workflow: RecommendationWorkflow<S, C, E>,
}

impl<S, C, E> CatalogService<S, C, E>
where
    S: Sessions,
    C: CatalogStore<Session = S::Session>,
    E: EventStore<Session = S::Session>,
{
    pub fn new(sessions: S, catalog: C, events: E) -> Self {
        Self {
            workflow: RecommendationWorkflow::new(sessions, catalog, events),
        }
    }

    pub async fn list(&self, page: Pagination) -> Result<Vec<Coffee>, CatalogError> {
        Ok(self.workflow.catalog().list_page(page).await?)
    }

    pub async fn get(&self, id: CoffeeId) -> Result<Coffee, CatalogError> {
        self.workflow
            .catalog()
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    pub async fn create(&self, cmd: CreateCoffee) -> Result<Coffee, CatalogError> {
        let new = cmd.validate()?;
        let coffee = self.workflow.catalog().create(new).await?;
        info!(coffee_id = %coffee.id_typed(), name = coffee.name(), "coffee created");
        Ok(coffee)
    }

    /// Merge the supplied fields; a supplied flavor list replaces the current one.
    pub async fn update(&self, id: CoffeeId, cmd: UpdateCoffee) -> Result<Coffee, CatalogError> {
        let patch = cmd.validate()?;
        self.workflow
            .catalog()
            .update(id, patch)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    pub async fn remove(&self, id: CoffeeId) -> Result<Coffee, CatalogError> {
        let removed = self
            .workflow
            .catalog()
            .remove(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        info!(coffee_id = %id, "coffee removed");
        Ok(removed)
    }

    pub async fn recommend(&self, id: CoffeeId) -> Result<Recommendation, CatalogError> {
        Ok(self.workflow.recommend(id).await?)
    }

    pub async fn events_by_key(
        &self,
        key: &EventKey,
        page: Pagination,
    ) -> Result<Vec<DomainEvent>, CatalogError> {
        if key.name.trim().is_empty() || key.event_type.trim().is_empty() {
            return Err(DomainError::validation("event name and type are both required").into());
        }
        Ok(self.workflow.events().find_by_key(key, page).await?)
    }

    pub async fn event(&self, id: EventId) -> Result<DomainEvent, CatalogError> {
        self.workflow
            .events()
            .get(id)
            .await?
            .ok_or(CatalogError::EventNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::InMemoryCatalogStore;
    use crate::event_store::InMemoryEventStore;
    use crate::session::{InMemoryDatabase, InMemorySessions};

    type Service = CatalogService<InMemorySessions, InMemoryCatalogStore, InMemoryEventStore>;

    fn service() -> Service {
        let db = InMemoryDatabase::new();
        CatalogService::new(
            InMemorySessions::new(db.clone()),
            InMemoryCatalogStore::new(db.clone()),
            InMemoryEventStore::new(db),
        )
    }

    fn create_cmd(name: &str, flavors: &[&str]) -> CreateCoffee {
        CreateCoffee {
            name: name.to_string(),
            brand: "Buddy Brew".to_string(),
            description: None,
            flavors: flavors.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let err = service().create(create_cmd("  ", &[])).await.unwrap_err();
        assert!(matches!(err, CatalogError::Domain(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn crud_lifecycle() {
        let svc = service();
        let created = svc
            .create(create_cmd("Shipwreck Roast", &["chocolate", "vanilla"]))
            .await
            .unwrap();
        assert_eq!(created.recommendations(), 0);
        assert_eq!(svc.get(created.id_typed()).await.unwrap(), created);

        let updated = svc
            .update(
                created.id_typed(),
                UpdateCoffee {
                    description: Some("smoky".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description(), Some("smoky"));
        assert_eq!(updated.flavors(), created.flavors());

        assert_eq!(svc.list(Pagination::default()).await.unwrap().len(), 1);
        svc.remove(created.id_typed()).await.unwrap();
        assert!(matches!(
            svc.get(created.id_typed()).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn missing_coffee_maps_to_not_found_everywhere() {
        let svc = service();
        let id = CoffeeId::new();

        assert!(matches!(svc.get(id).await, Err(CatalogError::NotFound(_))));
        assert!(matches!(
            svc.update(id, UpdateCoffee::default()).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(svc.remove(id).await, Err(CatalogError::NotFound(_))));
        assert!(matches!(
            svc.recommend(id).await,
            Err(CatalogError::Recommend(RecommendError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn recommended_event_is_retrievable_by_key_and_id() {
        let svc = service();
        let coffee = svc.create(create_cmd("Latte", &["vanilla"])).await.unwrap();
        let outcome = svc.recommend(coffee.id_typed()).await.unwrap();

        let key = EventKey::new("recommend_coffee", "coffee");
        let events = svc.events_by_key(&key, Pagination::default()).await.unwrap();
        assert_eq!(events, vec![outcome.event.clone()]);
        assert_eq!(svc.event(outcome.event.id).await.unwrap(), outcome.event);
        assert!(matches!(
            svc.event(EventId::new()).await,
            Err(CatalogError::EventNotFound(_))
        ));
    }

    #[tokio::test]
    async fn event_lookup_needs_both_fields() {
        let err = service()
            .events_by_key(&EventKey::new("recommend_coffee", " "), Pagination::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Domain(DomainError::Validation(_))));
    }
}
