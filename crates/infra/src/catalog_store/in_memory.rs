use async_trait::async_trait;
use tracing::debug;

use coffees_catalog::{Coffee, CoffeePatch, Flavor, FlavorName, NewCoffee};
use coffees_core::CoffeeId;

use super::r#trait::CatalogStore;
use crate::error::StoreError;
use crate::pagination::Pagination;
use crate::session::in_memory::{Tables, with_counter_of};
use crate::session::{InMemoryDatabase, InMemorySession};

/// In-memory catalog over the shared [`InMemoryDatabase`].
#[derive(Debug, Clone)]
pub struct InMemoryCatalogStore {
    db: InMemoryDatabase,
}

impl InMemoryCatalogStore {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

/// Find-or-create each flavor by name, preserving the requested order.
fn resolve_flavors(tables: &mut Tables, names: &[FlavorName]) -> Vec<Flavor> {
    names
        .iter()
        .map(|name| {
            if let Some(existing) = tables.flavors.iter().find(|f| &f.name == name) {
                return existing.clone();
            }
            let created = Flavor::new(name.clone());
            tables.flavors.push(created.clone());
            created
        })
        .collect()
}

/// Make sure every flavor a coffee carries has a row, keyed by name.
fn register_flavors(tables: &mut Tables, flavors: &[Flavor]) {
    for flavor in flavors {
        if !tables.flavors.iter().any(|f| f.name == flavor.name) {
            tables.flavors.push(flavor.clone());
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    type Session = InMemorySession;

    async fn find_by_id(&self, id: CoffeeId) -> Result<Option<Coffee>, StoreError> {
        let tables = self.db.read()?;
        Ok(tables.coffees.iter().find(|c| c.id_typed() == id).cloned())
    }

    async fn list_page(&self, page: Pagination) -> Result<Vec<Coffee>, StoreError> {
        Ok(page.slice(&self.db.read()?.coffees))
    }

    async fn create(&self, new: NewCoffee) -> Result<Coffee, StoreError> {
        let mut tables = self.db.write()?;
        let flavors = resolve_flavors(&mut tables, &new.flavors);
        let coffee = Coffee::create(CoffeeId::new(), new, flavors);
        tables.coffees.push(coffee.clone());
        debug!(coffee_id = %coffee.id_typed(), "coffee created");
        Ok(coffee)
    }

    async fn update(
        &self,
        id: CoffeeId,
        patch: CoffeePatch,
    ) -> Result<Option<Coffee>, StoreError> {
        let mut tables = self.db.write()?;
        let Some(index) = tables.coffees.iter().position(|c| c.id_typed() == id) else {
            return Ok(None);
        };

        let mut coffee = tables.coffees[index].clone();
        coffee.apply_patch(&patch);
        if let Some(names) = &patch.flavors {
            let flavors = resolve_flavors(&mut tables, names);
            coffee.replace_flavors(flavors);
        }
        tables.coffees[index] = coffee.clone();
        Ok(Some(coffee))
    }

    async fn save(&self, coffee: &Coffee) -> Result<Coffee, StoreError> {
        let mut tables = self.db.write()?;
        let Some(index) = tables
            .coffees
            .iter()
            .position(|c| c.id_typed() == coffee.id_typed())
        else {
            return Err(StoreError::NotFound(format!(
                "coffee {}",
                coffee.id_typed()
            )));
        };

        register_flavors(&mut tables, coffee.flavors());
        tables.coffees[index] = coffee.clone();
        Ok(coffee.clone())
    }

    async fn remove(&self, id: CoffeeId) -> Result<Option<Coffee>, StoreError> {
        let mut tables = self.db.write()?;
        let index = tables.coffees.iter().position(|c| c.id_typed() == id);
        Ok(index.map(|i| tables.coffees.remove(i)))
    }

    async fn save_in(
        &self,
        session: &mut Self::Session,
        coffee: &Coffee,
    ) -> Result<Coffee, StoreError> {
        let current = self
            .db
            .read()?
            .coffees
            .iter()
            .find(|c| c.id_typed() == coffee.id_typed())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("coffee {}", coffee.id_typed())))?;

        match session
            .coffees
            .iter_mut()
            .find(|c| c.id_typed() == coffee.id_typed())
        {
            Some(staged) => *staged = coffee.clone(),
            None => session.coffees.push(coffee.clone()),
        }
        Ok(with_counter_of(&current, coffee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{InMemorySessions, Sessions};
    use chrono::Utc;
    use coffees_catalog::{CreateCoffee, UpdateCoffee};

    fn new_coffee(name: &str, flavors: &[&str]) -> NewCoffee {
        CreateCoffee {
            name: name.to_string(),
            brand: "Buddy Brew".to_string(),
            description: None,
            flavors: flavors.iter().map(|f| f.to_string()).collect(),
        }
        .validate()
        .unwrap()
    }

    fn names(coffee: &Coffee) -> Vec<&str> {
        coffee.flavor_names().map(|n| n.as_str()).collect()
    }

    #[tokio::test]
    async fn create_starts_at_zero_and_reuses_flavors() {
        let db = InMemoryDatabase::new();
        let store = InMemoryCatalogStore::new(db.clone());

        let a = store
            .create(new_coffee("Shipwreck Roast", &["chocolate", "vanilla"]))
            .await
            .unwrap();
        let b = store
            .create(new_coffee("Latte", &["vanilla", "caramel", "vanilla"]))
            .await
            .unwrap();

        assert_eq!(a.recommendations(), 0);
        assert_eq!(names(&a), vec!["chocolate", "vanilla"]);
        assert_eq!(names(&b), vec!["vanilla", "caramel"]);
        assert_eq!(a.flavors()[1].id, b.flavors()[0].id);
        assert_eq!(db.read().unwrap().flavors.len(), 3);
    }

    #[tokio::test]
    async fn list_page_follows_creation_order() {
        let store = InMemoryCatalogStore::new(InMemoryDatabase::new());
        for i in 0..5 {
            store.create(new_coffee(&format!("c{i}"), &[])).await.unwrap();
        }

        let page = store.list_page(Pagination::new(Some(2), Some(1))).await.unwrap();
        let listed: Vec<&str> = page.iter().map(|c| c.name()).collect();
        assert_eq!(listed, vec!["c1", "c2"]);
    }

    #[tokio::test]
    async fn update_merges_fields_and_replaces_flavors() {
        let store = InMemoryCatalogStore::new(InMemoryDatabase::new());
        let created = store
            .create(new_coffee("Latte", &["vanilla"]))
            .await
            .unwrap();

        let patch = UpdateCoffee {
            brand: Some("Nescafe".to_string()),
            flavors: Some(vec!["caramel".to_string()]),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let updated = store
            .update(created.id_typed(), patch)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name(), "Latte");
        assert_eq!(updated.brand(), "Nescafe");
        assert_eq!(names(&updated), vec!["caramel"]);
        assert_eq!(
            store.find_by_id(created.id_typed()).await.unwrap(),
            Some(updated)
        );
    }

    #[tokio::test]
    async fn missing_coffee_is_none_or_not_found() {
        let store = InMemoryCatalogStore::new(InMemoryDatabase::new());
        let ghost = Coffee::rehydrate(
            CoffeeId::new(),
            "Ghost".to_string(),
            "None".to_string(),
            None,
            0,
            vec![],
        );

        assert!(store.find_by_id(ghost.id_typed()).await.unwrap().is_none());
        assert!(
            store
                .update(ghost.id_typed(), CoffeePatch::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(store.remove(ghost.id_typed()).await.unwrap().is_none());
        assert!(matches!(
            store.save(&ghost).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn save_persists_and_remove_returns_the_coffee() {
        let store = InMemoryCatalogStore::new(InMemoryDatabase::new());
        let mut coffee = store.create(new_coffee("Latte", &[])).await.unwrap();
        coffee.recommend(Utc::now()).unwrap();

        store.save(&coffee).await.unwrap();
        let removed = store.remove(coffee.id_typed()).await.unwrap().unwrap();
        assert_eq!(removed.recommendations(), 1);
        assert!(store.find_by_id(coffee.id_typed()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_in_is_visible_only_after_commit() {
        let db = InMemoryDatabase::new();
        let store = InMemoryCatalogStore::new(db.clone());
        let sessions = InMemorySessions::new(db);
        let mut coffee = store.create(new_coffee("Latte", &[])).await.unwrap();
        coffee.recommend(Utc::now()).unwrap();

        let mut session = sessions.begin().await.unwrap();
        store.save_in(&mut session, &coffee).await.unwrap();
        let before = store.find_by_id(coffee.id_typed()).await.unwrap().unwrap();
        assert_eq!(before.recommendations(), 0);

        sessions.commit(session).await.unwrap();
        let after = store.find_by_id(coffee.id_typed()).await.unwrap().unwrap();
        assert_eq!(after.recommendations(), 1);
    }

    #[tokio::test]
    async fn save_in_keeps_a_patch_that_lands_before_commit() {
        let db = InMemoryDatabase::new();
        let store = InMemoryCatalogStore::new(db.clone());
        let sessions = InMemorySessions::new(db);
        let mut coffee = store.create(new_coffee("Latte", &["vanilla"])).await.unwrap();
        coffee.recommend(Utc::now()).unwrap();

        let mut session = sessions.begin().await.unwrap();
        store.save_in(&mut session, &coffee).await.unwrap();

        let patch = UpdateCoffee {
            name: Some("Renamed".to_string()),
            flavors: Some(vec!["caramel".to_string()]),
            ..Default::default()
        }
        .validate()
        .unwrap();
        store.update(coffee.id_typed(), patch).await.unwrap().unwrap();
        sessions.commit(session).await.unwrap();

        let stored = store.find_by_id(coffee.id_typed()).await.unwrap().unwrap();
        assert_eq!(stored.name(), "Renamed");
        let flavors: Vec<&str> = stored.flavor_names().map(|n| n.as_str()).collect();
        assert_eq!(flavors, vec!["caramel"]);
        assert_eq!(stored.recommendations(), 1);
    }
}
