//! Liveness envelope.

use crate::handlers::envelope_response;
use crate::response::ResponseEnvelope;
use crate::state::AppState;
use axum::{extract::State, response::Response};
use serde_json::Value;

pub async fn status(State(state): State<AppState>) -> Response {
    envelope_response(ResponseEnvelope::<Vec<Value>>::status_ok(&state.settings))
}
