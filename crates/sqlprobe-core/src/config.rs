//! Configuration schema (sqlprobe.toml)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::secret::SecretSource;

/// Default schema for PostgreSQL table listing
pub const DEFAULT_SCHEMA: &str = "public";

/// Default environment variable holding the connection string
pub const DEFAULT_CONNECTION_ENV: &str = "DATABASE_URL";

/// Where the connection string comes from.
///
/// At most one of `env`, `file` or `value` may be set; with none set the
/// `DATABASE_URL` environment variable is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Environment variable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,

    /// Path to a file containing the connection string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Inline connection string (discouraged outside local development)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ConnectionConfig {
    /// Turn the configured location into a secret source
    pub fn secret_source(&self) -> Result<SecretSource, ConfigError> {
        match (&self.env, &self.file, &self.value) {
            (None, None, None) => Ok(SecretSource::Env(DEFAULT_CONNECTION_ENV.to_string())),
            (Some(env), None, None) => Ok(SecretSource::Env(env.clone())),
            (None, Some(file), None) => Ok(SecretSource::File(file.clone())),
            (None, None, Some(value)) => Ok(SecretSource::Value(value.clone())),
            _ => Err(ConfigError::Invalid(
                "[connection] accepts only one of 'env', 'file' or 'value'".to_string(),
            )),
        }
    }
}

/// Query behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Schema used when listing tables without an explicit schema
    #[serde(default = "default_schema")]
    pub default_schema: String,

    /// Treat a query that returns no rows as an error
    #[serde(default)]
    pub empty_result_is_error: bool,

    /// Upper bound for connect + query, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_schema: default_schema(),
            empty_result_is_error: false,
            timeout_secs: None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Connection secret location
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Query behaviour
    #[serde(default)]
    pub query: QueryConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Surface conflicting connection settings at load time
        config.connection.secret_source()?;

        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.query.default_schema, "public");
        assert!(!config.query.empty_result_is_error);
        assert_eq!(config.query.timeout_secs, None);
        assert_eq!(
            config.connection.secret_source().unwrap(),
            SecretSource::Env("DATABASE_URL".to_string())
        );
    }

    #[test]
    fn parse_full_config() {
        let config = Config::from_toml(
            r#"
            [connection]
            file = "/run/secrets/db"

            [query]
            default_schema = "analytics"
            empty_result_is_error = true
            timeout_secs = 15
            "#,
        )
        .unwrap();

        assert_eq!(
            config.connection.secret_source().unwrap(),
            SecretSource::File(PathBuf::from("/run/secrets/db"))
        );
        assert_eq!(config.query.default_schema, "analytics");
        assert!(config.query.empty_result_is_error);
        assert_eq!(config.query.timeout_secs, Some(15));
    }

    #[test]
    fn partial_query_section_keeps_defaults() {
        let config = Config::from_toml("[query]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(config.query.default_schema, "public");
        assert!(!config.query.empty_result_is_error);
    }

    #[test]
    fn conflicting_connection_settings_rejected() {
        let result = Config::from_toml(
            r#"
            [connection]
            env = "PG_URL"
            value = "postgres://u:p@h/db"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_toml_rejected() {
        assert!(matches!(
            Config::from_toml("[query\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sqlprobe.toml");

        let mut config = Config::default();
        config.connection.env = Some("PG_URL".to_string());
        config.query.timeout_secs = Some(30);
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
