//! Uniform response envelope: outcome, diagnostics, payload and deployment metadata.

use crate::config::{
    Settings, RELEASE_DAY_KEY, RELEASE_HOUR_KEY, RELEASE_MINUTE_KEY, RELEASE_MONTH_KEY, RELEASE_YEAR_KEY,
    VERSION_KEY,
};
use crate::error::ErrorCode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

pub const UNKNOWN_VERSION: &str = "Desconocida";
pub const MSG_SUCCESS: &str = "Operacion exitosa";
pub const MSG_DATABASE_FAILURE: &str = "Error en la base de datos";
pub const MSG_API_FAILURE: &str = "Error en el API";
pub const MSG_UNCONTROLLED: &str = "Error no controlado";
pub const MSG_STATUS_OK: &str = "Ok";

/// Outcome of one operation. Built once per executor call (or directly for static responses).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    pub status: bool,
    pub message: String,
    pub error: String,
    pub error_code: String,
    pub procedure_name: String,
    /// Echo of bound inputs, in binding order.
    pub parameters: Option<Map<String, Value>>,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub release_date: Option<DateTime<Utc>>,
}

impl<T> ResponseEnvelope<T> {
    pub fn new(data: T, settings: &Settings) -> Self {
        ResponseEnvelope {
            status: false,
            message: String::new(),
            error: String::new(),
            error_code: String::new(),
            procedure_name: String::new(),
            parameters: None,
            data,
            timestamp: Utc::now(),
            version: resolve_version(settings),
            release_date: resolve_release_date(settings),
        }
    }

    pub fn succeeded(mut self, message: impl Into<String>) -> Self {
        self.status = true;
        self.message = message.into();
        self.error.clear();
        self.error_code.clear();
        self
    }

    pub fn failed(mut self, code: ErrorCode, message: impl Into<String>, error: impl Into<String>) -> Self {
        self.status = false;
        self.message = message.into();
        self.error = error.into();
        self.error_code = code.to_string();
        self
    }

    pub fn for_procedure(mut self, name: impl Into<String>, parameters: Map<String, Value>) -> Self {
        self.procedure_name = name.into();
        self.parameters = Some(parameters);
        self
    }
}

impl<T> ResponseEnvelope<Vec<T>> {
    /// Liveness response: `status=true`, message `Ok`, empty payload.
    pub fn status_ok(settings: &Settings) -> Self {
        ResponseEnvelope::new(Vec::new(), settings).succeeded(MSG_STATUS_OK)
    }
}

pub fn resolve_version(settings: &Settings) -> String {
    settings.get(VERSION_KEY).unwrap_or(UNKNOWN_VERSION).to_string()
}

/// Release instant from the five `ReleaseDate:*` entries, seconds fixed to zero.
/// Any missing, non-numeric or out-of-range component yields `None`.
pub fn resolve_release_date(settings: &Settings) -> Option<DateTime<Utc>> {
    let field = |key: &str| settings.get(key).and_then(|v| v.trim().parse::<u32>().ok());
    let year = settings.get(RELEASE_YEAR_KEY).and_then(|v| v.trim().parse::<i32>().ok())?;
    let month = field(RELEASE_MONTH_KEY)?;
    let day = field(RELEASE_DAY_KEY)?;
    let hour = field(RELEASE_HOUR_KEY)?;
    let minute = field(RELEASE_MINUTE_KEY)?;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .map(|dt| dt.and_utc())
}
