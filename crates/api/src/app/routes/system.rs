use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::Response};
use serde_json::json;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> Response {
    dto::ok(json!({
        "status": "ok",
        "backend": services.backend(),
    }))
}

pub async fn not_found() -> Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "no such route")
}
