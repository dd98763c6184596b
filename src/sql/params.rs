//! Typed routine parameters: declared type, direction, value; bind and echo forms.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// Declared PostgreSQL type of a parameter. Rendered as an explicit cast on the placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SqlType {
    VarChar(Option<u32>),
    Text,
    SmallInt,
    Int,
    BigInt,
    Double,
    Bool,
    Uuid,
    Date,
    TimestampTz,
    Jsonb,
}

impl SqlType {
    pub fn pg_name(&self) -> String {
        match self {
            SqlType::VarChar(Some(n)) => format!("varchar({})", n),
            SqlType::VarChar(None) => "varchar".into(),
            SqlType::Text => "text".into(),
            SqlType::SmallInt => "smallint".into(),
            SqlType::Int => "integer".into(),
            SqlType::BigInt => "bigint".into(),
            SqlType::Double => "double precision".into(),
            SqlType::Bool => "boolean".into(),
            SqlType::Uuid => "uuid".into(),
            SqlType::Date => "date".into(),
            SqlType::TimestampTz => "timestamptz".into(),
            SqlType::Jsonb => "jsonb".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

impl Direction {
    /// Whether the caller's value is sent to the server.
    pub fn sends_value(self) -> bool {
        matches!(self, Direction::Input | Direction::InputOutput)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Double(f64),
    Text(String),
    Uuid(uuid::Uuid),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Json(Value),
}

impl SqlValue {
    /// Diagnostic echo form: stable JSON for every variant.
    pub fn to_echo(&self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Bool(*b),
            SqlValue::SmallInt(n) => Value::from(*n),
            SqlValue::Int(n) => Value::from(*n),
            SqlValue::BigInt(n) => Value::from(*n),
            SqlValue::Double(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
            SqlValue::Text(s) => Value::String(s.clone()),
            SqlValue::Uuid(u) => Value::String(u.hyphenated().to_string()),
            SqlValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            SqlValue::Timestamp(t) => Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            SqlValue::Json(v) => v.clone(),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::SmallInt(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::BigInt(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Double(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<uuid::Uuid> for SqlValue {
    fn from(v: uuid::Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<Value> for SqlValue {
    fn from(v: Value) -> Self {
        SqlValue::Json(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// One routine argument. `name` may carry a leading `@`; it is kept verbatim in the echo.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcedureParam {
    pub name: String,
    pub sql_type: SqlType,
    pub direction: Direction,
    pub value: SqlValue,
}

impl ProcedureParam {
    pub fn input(name: impl Into<String>, sql_type: SqlType, value: impl Into<SqlValue>) -> Self {
        ProcedureParam {
            name: name.into(),
            sql_type,
            direction: Direction::Input,
            value: value.into(),
        }
    }

    pub fn output(name: impl Into<String>, sql_type: SqlType) -> Self {
        ProcedureParam {
            name: name.into(),
            sql_type,
            direction: Direction::Output,
            value: SqlValue::Null,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Argument name as sent to the server (leading `@` removed).
    pub fn call_name(&self) -> &str {
        self.name.strip_prefix('@').unwrap_or(&self.name)
    }
}

/// Name -> value echo in binding order. Output placeholders echo as `null`; on duplicate names the last wins.
pub fn echo_parameters(params: &[ProcedureParam]) -> Map<String, Value> {
    let mut map = Map::new();
    for p in params {
        let v = if p.direction.sends_value() {
            p.value.to_echo()
        } else {
            Value::Null
        };
        map.insert(p.name.clone(), v);
    }
    map
}

/// Attach one value with its native PostgreSQL encoding; the placeholder cast fixes the server type.
pub fn bind_value<'q>(query: Query<'q, Postgres, PgArguments>, value: &'q SqlValue) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::SmallInt(n) => query.bind(*n),
        SqlValue::Int(n) => query.bind(*n),
        SqlValue::BigInt(n) => query.bind(*n),
        SqlValue::Double(n) => query.bind(*n),
        SqlValue::Text(s) => query.bind(s.as_str()),
        SqlValue::Uuid(u) => query.bind(*u),
        SqlValue::Date(d) => query.bind(*d),
        SqlValue::Timestamp(t) => query.bind(*t),
        SqlValue::Json(v) => query.bind(v),
    }
}
