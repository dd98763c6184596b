//! Guest-task lookup handler.

use crate::extractors::{ValidatedPath, ValidationErrors};
use crate::handlers::envelope_response;
use crate::service::USER_NAME_MAX_LEN;
use crate::state::AppState;
use axum::{extract::State, response::Response};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GuestTaskPath {
    pub user: String,
    pub task: i16,
}

pub async fn guest_tasks(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<GuestTaskPath>,
) -> Response {
    let mut errors = ValidationErrors::default();
    if path.user.trim().is_empty() {
        errors.add("user", "user is required");
    } else if path.user.chars().count() > USER_NAME_MAX_LEN {
        errors.add("user", format!("user must be at most {} characters", USER_NAME_MAX_LEN));
    }
    if !errors.is_empty() {
        return envelope_response(errors.into_envelope(&state.settings));
    }

    let envelope = state.example.guest_tasks(&path.user, path.task).await;
    envelope_response(envelope)
}
