//! Stored-procedure gateway: runs PostgreSQL routines and reports every outcome in a uniform envelope.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{Settings, CONNECTION_STRING_KEY};
pub use error::{CommandError, ConfigError, ErrorCode, ExecError};
pub use response::{
    ResponseEnvelope, MSG_API_FAILURE, MSG_DATABASE_FAILURE, MSG_STATUS_OK, MSG_SUCCESS, MSG_UNCONTROLLED,
    UNKNOWN_VERSION,
};
pub use routes::{api_routes, common_routes, example_routes};
pub use service::{ExampleService, ProcedureExecutor, RowExt, UserModel, GUEST_TASK_PROCEDURE};
pub use sql::{Direction, ProcedureParam, Routine, RoutineKind, SqlType, SqlValue};
pub use state::AppState;
