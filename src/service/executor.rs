//! Generic routine execution against PostgreSQL, folded into a `ResponseEnvelope`.

use crate::config::{Settings, CONNECTION_STRING_KEY};
use crate::error::{ErrorCode, ExecError};
use crate::response::{ResponseEnvelope, MSG_API_FAILURE, MSG_DATABASE_FAILURE, MSG_SUCCESS};
use crate::sql::{bind_value, build_call, echo_parameters, ProcedureParam, Routine};
use futures_util::{Stream, TryStreamExt};
use serde_json::{Map, Value};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::Connection;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

/// Runs one routine per call on its own connection.
///
/// Stateless between calls: the connect options and the settings snapshot are read-only.
/// The connection is closed when the call ends; on error paths (and when the returned
/// future is dropped) the socket is released by `PgConnection`'s drop.
pub struct ProcedureExecutor {
    connect: Result<PgConnectOptions, String>,
    settings: Arc<Settings>,
}

impl ProcedureExecutor {
    /// Parses the configured connection string once. A missing or unparsable connection
    /// string is not fatal here; every `execute` then reports it.
    pub fn new(settings: Arc<Settings>) -> Self {
        let connect = match settings.connection_string() {
            Some(url) => PgConnectOptions::from_str(url).map_err(|e| e.to_string()),
            None => Err(format!("'{}' is not set", CONNECTION_STRING_KEY)),
        };
        if let Err(reason) = &connect {
            tracing::warn!(reason = %reason, "procedure executor has no usable connection string");
        }
        ProcedureExecutor { connect, settings }
    }

    /// Execute `routine` with `params`, mapping each result row through `map_row` in order.
    ///
    /// Never fails: database-layer errors give `errorCode = "1-<SQLSTATE>"`, anything else
    /// (mapper error or panic, invalid names, missing connection string) gives `"2"`.
    /// On failure no partially mapped rows are returned.
    pub async fn execute<T, F, E>(
        &self,
        routine: impl Into<Routine>,
        map_row: F,
        params: &[ProcedureParam],
    ) -> ResponseEnvelope<Vec<T>>
    where
        F: FnMut(&PgRow) -> Result<T, E>,
        E: fmt::Display,
    {
        let routine = routine.into();
        let echo = echo_parameters(params);
        tracing::debug!(procedure = %routine.name, params = ?echo, "execute");
        let result = self.run(&routine, params, map_row).await;
        self.envelope(&routine.name, echo, result)
    }

    async fn run<T, F, E>(&self, routine: &Routine, params: &[ProcedureParam], map_row: F) -> Result<Vec<T>, ExecError>
    where
        F: FnMut(&PgRow) -> Result<T, E>,
        E: fmt::Display,
    {
        let call = build_call(routine, params)?;
        let options = self
            .connect
            .as_ref()
            .map_err(|reason| ExecError::NotConfigured(reason.clone()))?;
        let mut conn = PgConnection::connect_with(options).await?;
        tracing::debug!(sql = %call.sql, "query");
        let mut query = sqlx::query(&call.sql);
        for v in call.values.iter().copied() {
            query = bind_value(query, v);
        }
        let result = drain(query.fetch(&mut conn), map_row).await;
        if result.is_ok() {
            if let Err(e) = conn.close().await {
                tracing::debug!(error = %e, "connection close failed");
            }
        }
        result
    }

    fn envelope<T>(&self, name: &str, echo: Map<String, Value>, result: Result<Vec<T>, ExecError>) -> ResponseEnvelope<Vec<T>> {
        match result {
            Ok(rows) => {
                tracing::info!(procedure = %name, rows = rows.len(), "procedure succeeded");
                ResponseEnvelope::new(rows, &self.settings)
                    .for_procedure(name, echo)
                    .succeeded(MSG_SUCCESS)
            }
            Err(err) => {
                let code = err.code();
                let message = match code {
                    ErrorCode::Database(_) => MSG_DATABASE_FAILURE,
                    _ => MSG_API_FAILURE,
                };
                let mut text = err.to_string();
                if text.is_empty() {
                    text = message.to_string();
                }
                tracing::warn!(procedure = %name, error_code = %code, error = %text, "procedure failed");
                ResponseEnvelope::new(Vec::new(), &self.settings)
                    .for_procedure(name, echo)
                    .failed(code, message, text)
            }
        }
    }
}

/// Read the forward-only row stream to the end, mapping rows in arrival order.
/// Stops at the first stream or mapper failure; rows mapped so far are dropped.
pub(crate) async fn drain<R, T, S, F, E>(mut rows: S, mut map_row: F) -> Result<Vec<T>, ExecError>
where
    S: Stream<Item = Result<R, sqlx::Error>> + Unpin,
    F: FnMut(&R) -> Result<T, E>,
    E: fmt::Display,
{
    let mut out = Vec::new();
    while let Some(row) = rows.try_next().await? {
        let mapped = panic::catch_unwind(AssertUnwindSafe(|| map_row(&row)))
            .map_err(|payload| ExecError::MapperPanicked(panic_message(payload.as_ref())))?
            .map_err(|e| ExecError::Mapping(e.to_string()))?;
        out.push(mapped);
    }
    Ok(out)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::tests::db_error;
    use crate::response::UNKNOWN_VERSION;
    use crate::sql::SqlType;
    use futures_util::stream;

    fn rows<R>(items: Vec<Result<R, sqlx::Error>>) -> impl Stream<Item = Result<R, sqlx::Error>> + Unpin {
        stream::iter(items)
    }

    fn unconfigured() -> ProcedureExecutor {
        ProcedureExecutor::new(Arc::new(Settings::from_pairs([("Version", "3.1.0")])))
    }

    #[tokio::test]
    async fn drain_keeps_row_order() {
        let out = drain(rows(vec![Ok(3), Ok(1), Ok(2), Ok(1)]), |r: &i32| Ok::<_, String>(r * 10))
            .await
            .unwrap();
        assert_eq!(out, vec![30, 10, 20, 10]);
    }

    #[tokio::test]
    async fn drain_empty_result_is_not_an_error() {
        let out = drain(rows::<i32>(vec![]), |r: &i32| Ok::<_, String>(*r)).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn mapper_failure_on_second_row_discards_everything() {
        let mut seen = Vec::new();
        let err = drain(rows(vec![Ok(1), Ok(2), Ok(3)]), |r: &i32| {
            seen.push(*r);
            if *r == 2 {
                Err(format!("cannot convert row {}", r))
            } else {
                Ok(*r)
            }
        })
        .await
        .unwrap_err();
        assert!(matches!(&err, ExecError::Mapping(m) if m == "cannot convert row 2"));
        assert_eq!(seen, vec![1, 2]);

        let env = unconfigured().envelope("demo", Map::new(), Err::<Vec<i32>, _>(err));
        assert!(!env.status);
        assert_eq!(env.error_code, "2");
        assert_eq!(env.message, MSG_API_FAILURE);
        assert_eq!(env.error, "cannot convert row 2");
        assert!(env.data.is_empty());
    }

    #[tokio::test]
    async fn mapper_panic_is_an_application_failure() {
        let err = drain(rows(vec![Ok(1)]), |_: &i32| -> Result<i32, String> { panic!("index out of range") })
            .await
            .unwrap_err();
        assert!(matches!(&err, ExecError::MapperPanicked(m) if m == "index out of range"));
        assert_eq!(err.code(), ErrorCode::Application);
    }

    #[tokio::test]
    async fn stream_error_is_a_database_failure() {
        let err = drain(
            rows(vec![Ok(1), Err(db_error("57P01", "terminating connection due to administrator command"))]),
            |r: &i32| Ok::<_, String>(*r),
        )
        .await
        .unwrap_err();

        let env = unconfigured().envelope("demo", Map::new(), Err::<Vec<i32>, _>(err));
        assert!(!env.status);
        assert_eq!(env.error_code, "1-57P01");
        assert_eq!(env.message, MSG_DATABASE_FAILURE);
        assert_eq!(env.error, "terminating connection due to administrator command");
        assert!(env.data.is_empty());
    }

    #[test]
    fn success_envelope_has_empty_error_fields() {
        let mut echo = Map::new();
        echo.insert("@pTarea".into(), Value::from(1));
        let env = unconfigured().envelope("demo", echo, Ok(vec!["a", "b", "c"]));
        assert!(env.status);
        assert_eq!(env.message, MSG_SUCCESS);
        assert_eq!(env.error, "");
        assert_eq!(env.error_code, "");
        assert_eq!(env.data, vec!["a", "b", "c"]);
        assert_eq!(env.procedure_name, "demo");
        assert_eq!(env.parameters.unwrap()["@pTarea"], 1);
        assert_eq!(env.version, "3.1.0");
    }

    #[tokio::test]
    async fn missing_connection_string_reports_code_2_with_echo() {
        let exec = ProcedureExecutor::new(Arc::new(Settings::default()));
        let params = vec![
            ProcedureParam::input("@pUserName", SqlType::VarChar(Some(30)), "ana"),
            ProcedureParam::input("@pTarea", SqlType::SmallInt, 2i16),
        ];
        let env = exec
            .execute("PA_bsc_Tarea_Invitado", |_: &PgRow| Ok::<_, String>(()), &params)
            .await;
        assert!(!env.status);
        assert_eq!(env.error_code, "2");
        assert_eq!(env.message, MSG_API_FAILURE);
        assert!(env.error.contains(CONNECTION_STRING_KEY));
        assert_eq!(env.procedure_name, "PA_bsc_Tarea_Invitado");
        let echo = env.parameters.unwrap();
        assert_eq!(echo["@pUserName"], "ana");
        assert_eq!(echo["@pTarea"], 2);
        assert_eq!(env.version, UNKNOWN_VERSION);
    }

    #[tokio::test]
    async fn unparsable_connection_string_reports_code_2() {
        let settings = Settings::from_pairs([(CONNECTION_STRING_KEY, "definitely not a url")]);
        let exec = ProcedureExecutor::new(Arc::new(settings));
        let env = exec.execute("f", |_: &PgRow| Ok::<_, String>(()), &[]).await;
        assert_eq!(env.error_code, "2");
        assert!(!env.error.is_empty());
    }

    // Port 1 on loopback has no listener; the connect must fail fast with the OS errno.
    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn refused_connection_reports_os_errno_quickly() {
        let settings = Settings::from_pairs([(CONNECTION_STRING_KEY, "postgres://u:p@127.0.0.1:1/db")]);
        let exec = ProcedureExecutor::new(Arc::new(settings));
        let params = vec![
            ProcedureParam::input("@pUserName", SqlType::VarChar(Some(30)), "ana"),
            ProcedureParam::input("@pTarea", SqlType::SmallInt, 2i16),
        ];

        let started = std::time::Instant::now();
        let env = exec.execute("f", |_: &PgRow| Ok::<_, String>(()), &params).await;

        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert!(!env.status);
        assert_eq!(env.message, MSG_DATABASE_FAILURE);
        assert_eq!(env.error_code, "1-111");
        assert!(!env.error.is_empty());
        assert!(env.data.is_empty());
        assert_eq!(env.procedure_name, "f");
        let echo = env.parameters.unwrap();
        assert_eq!(echo["@pUserName"], "ana");
        assert_eq!(echo["@pTarea"], 2);
    }

    #[tokio::test]
    async fn invalid_routine_name_is_rejected_before_connecting() {
        let env = unconfigured()
            .execute("f(); DROP TABLE users", |_: &PgRow| Ok::<_, String>(()), &[])
            .await;
        assert_eq!(env.error_code, "2");
        assert_eq!(env.error, "invalid routine name: 'f(); DROP TABLE users'");
        assert_eq!(env.parameters, Some(Map::new()));
    }
}
