//! Transactional sessions shared by the catalog and event stores.
//!
//! A session is acquired with [`Sessions::begin`] and must end in exactly one of
//! [`Sessions::commit`] or [`Sessions::abort`]. Both consume the session, so a
//! finished session cannot be reused. Dropping an unfinished session discards its
//! writes (Postgres rolls the transaction back; the in-memory store drops the
//! staged writes).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryDatabase, InMemorySession, InMemorySessions};
pub use postgres::{PgSession, PostgresSessions};

/// Factory and terminator for transactional sessions.
#[async_trait]
pub trait Sessions: Send + Sync {
    /// Handle passed by `&mut` into every store call that should join the transaction.
    type Session: Send;

    async fn begin(&self) -> Result<Self::Session, StoreError>;

    /// Make every write issued against `session` durable, all together.
    async fn commit(&self, session: Self::Session) -> Result<(), StoreError>;

    /// Discard every write issued against `session`.
    async fn abort(&self, session: Self::Session) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> Sessions for Arc<S>
where
    S: Sessions + ?Sized,
{
    type Session = S::Session;

    async fn begin(&self) -> Result<Self::Session, StoreError> {
        (**self).begin().await
    }

    async fn commit(&self, session: Self::Session) -> Result<(), StoreError> {
        (**self).commit(session).await
    }

    async fn abort(&self, session: Self::Session) -> Result<(), StoreError> {
        (**self).abort(session).await
    }
}
