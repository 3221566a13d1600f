//! Coffee persistence boundary.
//!
//! Plain CRUD plus [`CatalogStore::save_in`], the only write that joins a
//! transactional session.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use r#trait::CatalogStore;
