//! Immutable settings snapshot: case-insensitive `Section:Key` lookups built once at start-up.

use crate::error::ConfigError;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Connection string entry, as in `ConnectionStrings:ConnectionString`.
pub const CONNECTION_STRING_KEY: &str = "ConnectionStrings:ConnectionString";
/// Fallback connection string entry.
pub const DATABASE_URL_KEY: &str = "DATABASE_URL";
pub const VERSION_KEY: &str = "Version";
pub const RELEASE_YEAR_KEY: &str = "ReleaseDate:Year";
pub const RELEASE_MONTH_KEY: &str = "ReleaseDate:Month";
pub const RELEASE_DAY_KEY: &str = "ReleaseDate:Date";
pub const RELEASE_HOUR_KEY: &str = "ReleaseDate:Hour";
pub const RELEASE_MINUTE_KEY: &str = "ReleaseDate:Minute";

/// Env var naming the optional JSON settings file. Default `appsettings.json`.
pub const SETTINGS_PATH_ENV: &str = "SETTINGS_PATH";

/// Read-only key/value configuration. Keys are compared case-insensitively; nested sections use `:`.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings = Settings::default();
        settings.extend(pairs);
        settings
    }

    /// Environment-style pairs: `__` is a section separator (`ReleaseDate__Year` -> `ReleaseDate:Year`).
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::from_pairs(vars.into_iter().map(|(k, v)| (k.replace("__", ":"), v)))
    }

    /// Nested JSON object flattened into `Section:Key` entries. Arrays use the element index as key.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if !root.is_object() {
            return Err(ConfigError::Parse("settings root must be a JSON object".into()));
        }
        let mut settings = Settings::default();
        flatten_into(&mut settings.values, None, &root);
        Ok(settings)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&text)
    }

    /// Layered load: optional JSON file from `SETTINGS_PATH` (default `appsettings.json`),
    /// then `.env`, then process environment (later layers override).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let path = std::env::var(SETTINGS_PATH_ENV).unwrap_or_else(|_| "appsettings.json".into());
        let mut settings = if Path::new(&path).exists() {
            Self::from_json_file(&path)?
        } else {
            tracing::debug!(path = %path, "settings file not found, using environment only");
            Settings::default()
        };
        settings.merge(Self::from_vars(std::env::vars()));
        Ok(settings)
    }

    /// Override entries with those of `other`.
    pub fn merge(&mut self, other: Settings) {
        self.values.extend(other.values);
    }

    fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (k, v) in pairs {
            self.values.insert(normalize_key(k.as_ref()), v.into());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// Connection string: `ConnectionStrings:ConnectionString`, else `DATABASE_URL`. Blank counts as absent.
    pub fn connection_string(&self) -> Option<&str> {
        let present = |key: &str| self.get(key).filter(|s| !s.trim().is_empty());
        present(CONNECTION_STRING_KEY).or_else(|| present(DATABASE_URL_KEY))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

fn flatten_into(out: &mut HashMap<String, String>, prefix: Option<&str>, value: &Value) {
    let join = |k: &str| match prefix {
        Some(p) => format!("{}:{}", p, k),
        None => k.to_string(),
    };
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                flatten_into(out, Some(join(k).as_str()), v);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_into(out, Some(join(&i.to_string()).as_str()), v);
            }
        }
        Value::Null => {}
        Value::String(s) => {
            if let Some(p) = prefix {
                out.insert(normalize_key(p), s.clone());
            }
        }
        Value::Bool(_) | Value::Number(_) => {
            if let Some(p) = prefix {
                out.insert(normalize_key(p), value.to_string());
            }
        }
    }
}
