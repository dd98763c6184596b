//! Typed errors and the envelope error-code taxonomy.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("settings read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("settings parse: {0}")]
    Parse(String),
}

/// Invalid routine invocation, detected before anything is sent to the database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid routine name: '{0}'")]
    InvalidRoutineName(String),
    #[error("invalid parameter name: '{0}'")]
    InvalidParameterName(String),
    #[error("duplicate parameter name: '{0}'")]
    DuplicateParameter(String),
}

/// Failure inside one executor run. Never leaves the executor; it is folded into the envelope.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("{}", database_error_text(.0))]
    Database(sqlx::Error),
    #[error("{0}")]
    Mapping(String),
    #[error("row mapper panicked: {0}")]
    MapperPanicked(String),
    /// Driver failure outside the database layer (encoding, configuration).
    #[error("{0}")]
    Driver(sqlx::Error),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("connection string is not configured or invalid: {0}")]
    NotConfigured(String),
}

impl From<sqlx::Error> for ExecError {
    fn from(err: sqlx::Error) -> Self {
        if is_database_layer(&err) {
            ExecError::Database(err)
        } else {
            ExecError::Driver(err)
        }
    }
}

impl ExecError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ExecError::Database(e) => ErrorCode::Database(native_error_code(e)),
            _ => ErrorCode::Application,
        }
    }
}

/// Classification tag carried in `errorCode`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// `1-<native code>`: the driver or server reported the failure.
    Database(String),
    /// `2`: mapping or other application logic failed.
    Application,
    /// `3`: input rejected before reaching the executor.
    Uncontrolled,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Database(native) => write!(f, "1-{}", native),
            ErrorCode::Application => f.write_str("2"),
            ErrorCode::Uncontrolled => f.write_str("3"),
        }
    }
}

/// Server errors carry their SQLSTATE; socket errors their OS errno; other driver
/// transport failures have no native code and report `0`.
pub fn native_error_code(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()).unwrap_or_else(|| "0".into()),
        sqlx::Error::Io(io) => io.raw_os_error().unwrap_or(0).to_string(),
        _ => "0".into(),
    }
}

/// Database errors are reported with the server message only; everything else uses the driver's text.
fn database_error_text(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => db.message().to_string(),
        other => other.to_string(),
    }
}

/// Driver errors that belong to the database layer. Decode/column errors are mapping failures
/// and configuration errors are application failures.
pub(crate) fn is_database_layer(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;

    /// Server-side error stand-in for tests that cannot reach a database.
    #[derive(Debug)]
    pub(crate) struct FakeDbError {
        pub code: Option<&'static str>,
        pub message: &'static str,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl std::error::Error for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    pub(crate) fn db_error(code: &'static str, message: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError {
            code: Some(code),
            message,
        }))
    }

    #[test]
    fn error_code_wire_tags() {
        assert_eq!(ErrorCode::Database("28P01".into()).to_string(), "1-28P01");
        assert_eq!(ErrorCode::Application.to_string(), "2");
        assert_eq!(ErrorCode::Uncontrolled.to_string(), "3");
    }

    #[test]
    fn database_error_keeps_sqlstate_and_server_message() {
        let err = ExecError::Database(db_error("28P01", "password authentication failed for user \"app\""));
        assert_eq!(err.code(), ErrorCode::Database("28P01".into()));
        assert_eq!(err.to_string(), "password authentication failed for user \"app\"");
    }

    #[test]
    fn database_error_without_code_reports_zero() {
        let err = sqlx::Error::Database(Box::new(FakeDbError { code: None, message: "boom" }));
        assert_eq!(native_error_code(&err), "0");
    }

    #[test]
    fn io_error_reports_errno() {
        let err = sqlx::Error::Io(std::io::Error::from_raw_os_error(111));
        assert_eq!(native_error_code(&err), "111");
        assert!(is_database_layer(&err));
        assert_eq!(native_error_code(&sqlx::Error::PoolTimedOut), "0");
    }

    #[test]
    fn non_database_failures_are_application_errors() {
        assert!(!is_database_layer(&sqlx::Error::ColumnNotFound("x".into())));
        assert!(!is_database_layer(&sqlx::Error::Configuration("bad url".into())));
        assert!(matches!(ExecError::from(sqlx::Error::PoolTimedOut), ExecError::Database(_)));
        assert_eq!(
            ExecError::from(sqlx::Error::ColumnNotFound("x".into())).code(),
            ErrorCode::Application
        );
        assert_eq!(ExecError::Mapping("bad row".into()).code(), ErrorCode::Application);
        assert_eq!(
            ExecError::from(CommandError::InvalidRoutineName("x;".into())).code(),
            ErrorCode::Application
        );
    }
}
