use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use crate::app::errors::json_error;

/// `GET` paths that stay reachable without an API key.
pub const PUBLIC_GET_PATHS: &[&str] = &["/coffees", "/health"];

pub fn is_public(method: &Method, path: &str) -> bool {
    method == Method::GET && PUBLIC_GET_PATHS.contains(&path)
}

#[derive(Clone)]
pub struct ApiKeyState {
    key: Option<Arc<str>>,
}

impl ApiKeyState {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: key.map(Arc::from),
        }
    }
}

/// Without a configured key every request passes.
pub async fn require_api_key(
    State(state): State<ApiKeyState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.key.as_deref() else {
        return next.run(req).await;
    };
    if is_public(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    match extract_key(req.headers()) {
        Some(provided) if provided == expected => next.run(req).await,
        _ => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid API key",
        ),
    }
}

fn extract_key(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?;
    let key = value.to_str().ok()?.trim();
    (!key.is_empty()).then_some(key)
}

pub async fn request_timeout(
    State(timeout): State<Duration>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    match tokio::time::timeout(timeout, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(%method, path = %path, timeout_ms = millis(timeout), "request timed out");
            json_error(
                StatusCode::REQUEST_TIMEOUT,
                "request_timeout",
                format!("request exceeded {} ms", timeout.as_millis()),
            )
        }
    }
}

pub async fn log_requests(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = millis(started.elapsed()),
        "request completed"
    );
    response
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
