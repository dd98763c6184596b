//! Shared application state for all routes. Built once at start-up; read-only afterwards.

use crate::config::Settings;
use crate::service::{ExampleService, ProcedureExecutor};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub example: ExampleService,
}

impl AppState {
    /// Executor built from the settings' connection string.
    pub fn new(settings: Arc<Settings>) -> Self {
        let executor = Arc::new(ProcedureExecutor::new(settings.clone()));
        AppState {
            settings,
            example: ExampleService::new(executor),
        }
    }
}
