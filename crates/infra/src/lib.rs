//! Infrastructure layer: stores, transactional sessions, Postgres wiring, config,
//! and the workflows that coordinate them.

pub mod catalog_service;
pub mod catalog_store;
pub mod config;
pub mod db;
pub mod error;
pub mod event_store;
pub mod pagination;
pub mod recommendation;
pub mod session;

pub use catalog_service::{CatalogError, CatalogService};
pub use catalog_store::CatalogStore;
pub use error::StoreError;
pub use event_store::EventStore;
pub use pagination::Pagination;
pub use recommendation::{RecommendError, Recommendation, RecommendationWorkflow};
pub use session::Sessions;
