//! Recommend-coffee workflow (application-level orchestration).
//!
//! Increments a coffee's recommendation counter and records a `recommend_coffee`
//! event, committing both writes as one unit.
//!
//! ## Execution Flow
//!
//! ```text
//! recommend(id)
//!   ↓
//! 1. Load the coffee (absent → NotFound, no session opened)
//!   ↓
//! 2. Increment the counter and build the event record (pure, in memory)
//!   ↓
//! 3. Begin a session
//!   ↓
//! 4. save_in(coffee) + append_in(event) against that session
//!   ↓
//! 5. Commit if both succeeded, abort otherwise
//! ```
//!
//! ## Failure Semantics
//!
//! - The session is consumed by exactly one of commit or abort on every path.
//! - An abort failure is logged and never replaces the error that caused the abort.
//! - Nothing is retried.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use coffees_catalog::Coffee;
use coffees_core::{CoffeeId, DomainError};
use coffees_events::{DomainEvent, EventError, NewDomainEvent};

use crate::catalog_store::CatalogStore;
use crate::error::StoreError;
use crate::event_store::EventStore;
use crate::session::Sessions;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("coffee {0} not found")]
    NotFound(CoffeeId),

    /// The coffee refused the increment (counter overflow).
    #[error(transparent)]
    Invariant(#[from] DomainError),

    /// Loading the coffee failed; no session was opened.
    #[error("coffee lookup failed: {0}")]
    Lookup(StoreError),

    #[error(transparent)]
    Payload(#[from] EventError),

    /// A write, the commit, or opening the session failed. Nothing was persisted.
    #[error("recommendation transaction failed: {0}")]
    TransactionFailure(StoreError),
}

/// Outcome of a committed recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub coffee: Coffee,
    pub event: DomainEvent,
}

/// Composes a session factory with the catalog and event stores that share its
/// session type.
#[derive(Debug, Clone)]
pub struct RecommendationWorkflow<S, C, E> {
    sessions: S,
    catalog: C,
    events: E,
}

impl<S, C, E> RecommendationWorkflow<S, C, E>
where
    S: Sessions,
    C: CatalogStore<Session = S::Session>,
    E: EventStore<Session = S::Session>,
{
    pub fn new(sessions: S, catalog: C, events: E) -> Self {
        Self {
            sessions,
            catalog,
            events,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    #[instrument(skip(self), fields(coffee_id = %id), err)]
    pub async fn recommend(&self, id: CoffeeId) -> Result<Recommendation, RecommendError> {
        let mut coffee = self
            .catalog
            .find_by_id(id)
            .await
            .map_err(RecommendError::Lookup)?
            .ok_or(RecommendError::NotFound(id))?;

        let recommended = coffee.recommend(Utc::now())?;
        let record = NewDomainEvent::from_typed(&recommended)?;

        let mut session = self
            .sessions
            .begin()
            .await
            .map_err(RecommendError::TransactionFailure)?;

        match self.write(&mut session, &coffee, record).await {
            Ok(recommendation) => {
                self.sessions
                    .commit(session)
                    .await
                    .map_err(RecommendError::TransactionFailure)?;
                info!(
                    recommendations = recommendation.coffee.recommendations(),
                    event_id = %recommendation.event.id,
                    "coffee recommended"
                );
                Ok(recommendation)
            }
            Err(err) => {
                if let Err(abort_err) = self.sessions.abort(session).await {
                    warn!(error = %abort_err, cause = %err, "failed to abort recommendation session");
                }
                Err(RecommendError::TransactionFailure(err))
            }
        }
    }

    async fn write(
        &self,
        session: &mut S::Session,
        coffee: &Coffee,
        record: NewDomainEvent,
    ) -> Result<Recommendation, StoreError> {
        let coffee = self.catalog.save_in(session, coffee).await?;
        let event = self.events.append_in(session, record).await?;
        Ok(Recommendation { coffee, event })
    }
}
