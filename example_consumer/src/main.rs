//! Example consumer: serves the status and guest-task routes.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Settings come from `appsettings.json` (or `SETTINGS_PATH`), `.env` and the environment,
//! e.g. `ConnectionStrings__ConnectionString=postgres://localhost/app Version=1.0.0`.

use sproc_gateway::{api_routes, AppState, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Arc::new(Settings::load()?);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sproc_gateway=info,tower_http=info")),
        )
        .init();

    let state = AppState::new(settings);
    let app = api_routes(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
