use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use coffees_core::{CoffeeId, EventId};
use coffees_events::EventKey;
use coffees_infra::Pagination;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

// Coffee bodies deserialize straight into `coffees_catalog::{CreateCoffee, UpdateCoffee}`.

/// `?limit=&offset=`; both optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.limit, self.offset)
    }
}

/// `GET /events?name=&type=&limit=&offset=`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsQuery {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl EventsQuery {
    /// Missing parts become empty strings and are rejected by the service.
    pub fn key(&self) -> EventKey {
        EventKey::new(
            self.name.clone().unwrap_or_default(),
            self.event_type.clone().unwrap_or_default(),
        )
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.limit, self.offset)
    }
}

// -------------------------
// Response envelope
// -------------------------

/// Every successful body is wrapped as `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

pub fn respond<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(Data { data: body })).into_response()
}

pub fn ok<T: Serialize>(body: T) -> Response {
    respond(StatusCode::OK, body)
}

// -------------------------
// Path parsing helpers
// -------------------------

pub fn parse_coffee_id(raw: &str) -> Result<CoffeeId, Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid coffee id")
    })
}

pub fn parse_event_id(raw: &str) -> Result<EventId, Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid event id")
    })
}
