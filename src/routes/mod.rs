//! Router assembly.

mod common;
mod example;
pub use common::common_routes;
pub use example::example_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// All routes with HTTP request tracing.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(example_routes(state))
        .layer(TraceLayer::new_for_http())
}
