use axum::Router;

pub mod coffees;
pub mod events;
pub mod system;

/// Router for the resource endpoints (`/health` is mounted by `build_app`).
pub fn router() -> Router {
    Router::new()
        .nest("/coffees", coffees::router())
        .nest("/events", events::router())
}
