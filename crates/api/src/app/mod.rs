//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store wiring (in-memory or Postgres) behind one enum
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: query DTOs, the `{ "data": ... }` envelope, path parsing
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use coffees_infra::config::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the tests).
///
/// Layers, outermost first: request logging, request timeout, API key guard.
pub fn build_app(config: &AppConfig, services: AppServices) -> Router {
    let services = Arc::new(services);
    let api_key = middleware::ApiKeyState::new(config.api_key.clone());

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .fallback(routes::system::not_found)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_requests))
                .layer(axum::middleware::from_fn_with_state(
                    config.request_timeout,
                    middleware::request_timeout,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    api_key,
                    middleware::require_api_key,
                )),
        )
}
