use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use tracing::error;

use coffees_catalog::{CreateCoffee, UpdateCoffee};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_coffees).post(create_coffee))
        .route(
            "/:id",
            get(get_coffee).patch(update_coffee).delete(remove_coffee),
        )
        .route("/:id/recommend", post(recommend_coffee))
}

pub async fn list_coffees(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::PageQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", e.body_text()),
    };

    match services.list(query.pagination()).await {
        Ok(coffees) => dto::ok(coffees),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_coffee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match dto::parse_coffee_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get(id).await {
        Ok(coffee) => dto::ok(coffee),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_coffee(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateCoffee>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services.create(body).await {
        Ok(coffee) => dto::respond(StatusCode::CREATED, coffee),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_coffee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateCoffee>, JsonRejection>,
) -> Response {
    let id = match dto::parse_coffee_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services.update(id, body).await {
        Ok(coffee) => dto::ok(coffee),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn remove_coffee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match dto::parse_coffee_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.remove(id).await {
        Ok(coffee) => dto::ok(coffee),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// Runs the workflow on its own task: if the request times out, the task still
/// reaches commit or abort instead of being dropped mid-transaction.
pub async fn recommend_coffee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match dto::parse_coffee_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let task = tokio::spawn(async move { services.recommend(id).await });

    match task.await {
        Ok(Ok(recommendation)) => dto::ok(recommendation),
        Ok(Err(e)) => errors::catalog_error_to_response(e),
        Err(join_err) => {
            error!(coffee_id = %id, error = %join_err, "recommendation task did not complete");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "recommendation task did not complete",
            )
        }
    }
}
