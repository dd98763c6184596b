//! Common routes: service status.

use crate::handlers::status;
use crate::state::AppState;
use axum::{routing::get, Router};

/// GET /api/status.
pub fn common_routes(state: AppState) -> Router {
    Router::new().route("/api/status", get(status)).with_state(state)
}
