use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use coffees_core::DomainError;
use coffees_infra::{CatalogError, RecommendError, StoreError};

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::NotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("coffee {id} not found"),
        ),
        CatalogError::EventNotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("event {id} not found"),
        ),
        CatalogError::Domain(e) => domain_error_to_response(e),
        CatalogError::Store(e) => store_error_to_response(e),
        CatalogError::Recommend(e) => recommend_error_to_response(e),
    }
}

fn recommend_error_to_response(err: RecommendError) -> axum::response::Response {
    match err {
        RecommendError::NotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("coffee {id} not found"),
        ),
        RecommendError::Invariant(e) => domain_error_to_response(e),
        RecommendError::Lookup(e) => store_error_to_response(e),
        RecommendError::Payload(e) => {
            error!(error = %e, "recommendation event could not be encoded");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "serialization_error",
                e.to_string(),
            )
        }
        RecommendError::TransactionFailure(e) => {
            error!(error = %e, "recommendation transaction failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "transaction_failed",
                e.to_string(),
            )
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
    }
}

fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Backend(msg) => {
            error!(error = %msg, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
