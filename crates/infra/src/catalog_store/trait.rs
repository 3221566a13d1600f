use std::sync::Arc;

use async_trait::async_trait;

use coffees_catalog::{Coffee, CoffeePatch, NewCoffee};
use coffees_core::CoffeeId;

use crate::error::StoreError;
use crate::pagination::Pagination;

/// Persistence for [`Coffee`] records and the flavors they reference.
///
/// ## Flavors
///
/// `create` and `update` resolve flavor names against the flavor table: a name that
/// already exists is reused, a new one is inserted. Two coffees that share a flavor
/// name therefore reference the same flavor row.
///
/// ## Ordering
///
/// `list_page` returns coffees in creation order.
///
/// ## Absence
///
/// Lookups return `Ok(None)` for a missing coffee; deciding that this is an error is
/// up to the caller. `save` and `save_in` only update existing coffees and report
/// `StoreError::NotFound` otherwise.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Session type shared with the event store.
    type Session: Send;

    async fn find_by_id(&self, id: CoffeeId) -> Result<Option<Coffee>, StoreError>;

    async fn list_page(&self, page: Pagination) -> Result<Vec<Coffee>, StoreError>;

    async fn create(&self, new: NewCoffee) -> Result<Coffee, StoreError>;

    async fn update(&self, id: CoffeeId, patch: CoffeePatch)
    -> Result<Option<Coffee>, StoreError>;

    /// Persist every field of an existing coffee, outside any session.
    async fn save(&self, coffee: &Coffee) -> Result<Coffee, StoreError>;

    async fn remove(&self, id: CoffeeId) -> Result<Option<Coffee>, StoreError>;

    /// Persist an existing coffee's recommendation counter as part of `session`.
    ///
    /// Every other field keeps its stored value, so an update that lands between
    /// reading `coffee` and committing the session is not undone. Returns the coffee
    /// as stored with the new counter.
    async fn save_in(
        &self,
        session: &mut Self::Session,
        coffee: &Coffee,
    ) -> Result<Coffee, StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    type Session = S::Session;

    async fn find_by_id(&self, id: CoffeeId) -> Result<Option<Coffee>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn list_page(&self, page: Pagination) -> Result<Vec<Coffee>, StoreError> {
        (**self).list_page(page).await
    }

    async fn create(&self, new: NewCoffee) -> Result<Coffee, StoreError> {
        (**self).create(new).await
    }

    async fn update(
        &self,
        id: CoffeeId,
        patch: CoffeePatch,
    ) -> Result<Option<Coffee>, StoreError> {
        (**self).update(id, patch).await
    }

    async fn save(&self, coffee: &Coffee) -> Result<Coffee, StoreError> {
        (**self).save(coffee).await
    }

    async fn remove(&self, id: CoffeeId) -> Result<Option<Coffee>, StoreError> {
        (**self).remove(id).await
    }

    async fn save_in(
        &self,
        session: &mut Self::Session,
        coffee: &Coffee,
    ) -> Result<Coffee, StoreError> {
        (**self).save_in(session, coffee).await
    }
}
