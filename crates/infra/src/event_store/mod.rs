//! Append-only event store boundary.
//!
//! Events are only ever appended inside a transactional session (see
//! [`crate::session`]), so an event never becomes visible without the catalog write
//! it describes.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use r#trait::EventStore;
