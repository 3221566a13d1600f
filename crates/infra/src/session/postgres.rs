use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use super::Sessions;
use crate::db::map_sqlx_error;
use crate::error::StoreError;

/// A Postgres transaction. Dropping it without commit rolls it back.
pub type PgSession = Transaction<'static, Postgres>;

/// Postgres session factory (one pooled connection per session).
#[derive(Debug, Clone)]
pub struct PostgresSessions {
    pool: PgPool,
}

impl PostgresSessions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Sessions for PostgresSessions {
    type Session = PgSession;

    #[instrument(skip(self), err)]
    async fn begin(&self) -> Result<Self::Session, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }

    #[instrument(skip(self, session), err)]
    async fn commit(&self, session: Self::Session) -> Result<(), StoreError> {
        session
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(skip(self, session), err)]
    async fn abort(&self, session: Self::Session) -> Result<(), StoreError> {
        session
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}
