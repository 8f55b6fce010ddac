//! Type configuration settings.
//!
//! # Responsibility
//! - Describe how a `TypeConfiguration` is assembled: standard catalog,
//!   extra backend type codes and optional logging.
//! - Load settings from JSON text or files.
//!
//! # Invariants
//! - Missing fields take documented defaults; unknown fields are rejected.

use crate::logging::{default_log_level, init_logging};
use rusqlite::types::Type;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Settings for one type configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSettings {
    /// Registers `StandardBasicTypes` eagerly. Defaults to `true`.
    #[serde(default = "default_true")]
    pub register_standard_types: bool,
    /// Backend type codes added on top of the standard table.
    #[serde(default)]
    pub extra_jdbc_types: Vec<JdbcTypeSetting>,
    #[serde(default)]
    pub log: Option<LogSettings>,
}

impl Default for TypeSettings {
    fn default() -> Self {
        Self {
            register_standard_types: true,
            extra_jdbc_types: Vec::new(),
            log: None,
        }
    }
}

/// One additional backend type code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JdbcTypeSetting {
    pub code: i32,
    pub name: String,
    pub storage: StorageSetting,
}

/// Storage class names accepted in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageSetting {
    Integer,
    Real,
    Text,
    Blob,
}

impl From<StorageSetting> for Type {
    fn from(value: StorageSetting) -> Self {
        match value {
            StorageSetting::Integer => Type::Integer,
            StorageSetting::Real => Type::Real,
            StorageSetting::Text => Type::Text,
            StorageSetting::Blob => Type::Blob,
        }
    }
}

/// Logging section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String,
    /// Absolute log directory.
    pub dir: String,
}

/// Settings load errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Logging(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read settings: {err}"),
            Self::Parse(err) => write!(f, "invalid settings: {err}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl TypeSettings {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Starts file logging when a `log` section is present.
    ///
    /// Returns `Ok(false)` when no section is configured.
    pub fn apply_logging(&self) -> Result<bool, ConfigError> {
        let Some(log) = &self.log else {
            return Ok(false);
        };
        init_logging(&log.level, &log.dir).map_err(ConfigError::Logging)?;
        Ok(true)
    }
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    default_log_level().to_string()
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StorageSetting, TypeSettings};

    #[test]
    fn empty_object_uses_defaults() {
        let settings = TypeSettings::from_json_str("{}").expect("empty settings parse");
        assert_eq!(settings, TypeSettings::default());
        assert!(settings.register_standard_types);
    }

    #[test]
    fn parses_extra_codes_and_log_section() {
        let settings = TypeSettings::from_json_str(
            r#"{
                "register_standard_types": false,
                "extra_jdbc_types": [{ "code": 4242, "name": "JSON", "storage": "text" }],
                "log": { "dir": "/tmp/relmap-logs" }
            }"#,
        )
        .expect("settings parse");

        assert!(!settings.register_standard_types);
        assert_eq!(settings.extra_jdbc_types[0].storage, StorageSetting::Text);
        let log = settings.log.expect("log section");
        assert_eq!(log.dir, "/tmp/relmap-logs");
        assert!(!log.level.is_empty());
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = TypeSettings::from_json_str(r#"{ "register_standard": true }"#)
            .expect_err("unknown field must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_settings_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("types.json");
        std::fs::write(&path, r#"{ "register_standard_types": false }"#).expect("write settings");

        let settings = TypeSettings::load(&path).expect("settings load");
        assert!(!settings.register_standard_types);
        assert!(matches!(
            TypeSettings::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn apply_logging_without_section_is_noop() {
        let settings = TypeSettings::default();
        assert!(!settings.apply_logging().expect("no-op logging"));
    }
}
