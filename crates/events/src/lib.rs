//! Domain events and their persisted record shape.
//!
//! Events are facts: they are appended once and never edited or removed.

pub mod event;
pub mod record;

pub use event::Event;
pub use record::{DomainEvent, EventError, EventKey, NewDomainEvent};
