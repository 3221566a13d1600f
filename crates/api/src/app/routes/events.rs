use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path, Query, rejection::QueryRejection},
    http::StatusCode,
    response::Response,
    routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_events))
        .route("/:id", get(get_event))
}

/// Events by `(name, type)`, oldest first. Both query parameters are required.
pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::EventsQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", e.body_text()),
    };

    match services.events_by_key(&query.key(), query.pagination()).await {
        Ok(events) => dto::ok(events),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match dto::parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.event(id).await {
        Ok(event) => dto::ok(event),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
