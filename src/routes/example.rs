//! Guest-task routes.

use crate::handlers::guest_tasks;
use crate::state::AppState;
use axum::{routing::get, Router};

/// GET /api/example/:user/:task.
pub fn example_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/example/:user/:task", get(guest_tasks))
        .with_state(state)
}
