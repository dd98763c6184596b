//! HTTP handlers: status probe and the guest-task lookup.

pub mod example;
pub mod status;
pub use example::*;
pub use status::*;

use crate::response::ResponseEnvelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// `200` for a successful envelope, `400` otherwise; the envelope is always the body.
pub fn envelope_response<T: Serialize>(envelope: ResponseEnvelope<T>) -> Response {
    let status = if envelope.status {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(envelope)).into_response()
}
