//! Field-level input errors, reported as an uncontrolled-failure envelope (`errorCode = "3"`).

use crate::config::Settings;
use crate::error::ErrorCode;
use crate::response::{ResponseEnvelope, MSG_UNCONTROLLED};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `error` holds the JSON object `{field: [messages]}`.
    pub fn into_envelope(self, settings: &Settings) -> ResponseEnvelope<Vec<Value>> {
        let error = serde_json::to_string(&self.fields).unwrap_or_default();
        ResponseEnvelope::new(Vec::new(), settings).failed(ErrorCode::Uncontrolled, MSG_UNCONTROLLED, error)
    }
}
