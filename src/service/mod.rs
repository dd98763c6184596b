//! Routine execution and the services built on it.

mod example;
mod executor;
mod row;
pub use example::{ExampleService, UserModel, GUEST_TASK_PROCEDURE, USER_NAME_MAX_LEN};
pub use executor::ProcedureExecutor;
pub use row::RowExt;
