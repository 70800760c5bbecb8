//! Connection secrets
//!
//! A [`SecretSource`] says where the connection string lives. It is resolved
//! into a [`Plaintext`] at the start of each operation and dropped when the
//! operation returns.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where to read the connection string from
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretSource {
    /// Environment variable name
    Env(String),

    /// File whose (trimmed) contents are the connection string
    File(PathBuf),

    /// Inline connection string
    Value(String),
}

impl SecretSource {
    /// Read the connection string
    pub fn resolve(&self) -> Result<Plaintext, SecretError> {
        let raw = match self {
            Self::Env(name) => {
                std::env::var(name).map_err(|e| SecretError::EnvVar(name.clone(), e.to_string()))?
            }
            Self::File(path) => std::fs::read_to_string(path)
                .map_err(|e| SecretError::File(path.display().to_string(), e.to_string()))?,
            Self::Value(value) => value.clone(),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SecretError::Empty(self.describe()));
        }

        Ok(Plaintext(trimmed.to_string()))
    }

    /// Human-readable origin that never includes the secret itself
    pub fn describe(&self) -> String {
        match self {
            Self::Env(name) => format!("env:{}", name),
            Self::File(path) => format!("file:{}", path.display()),
            Self::Value(_) => "inline value".to_string(),
        }
    }
}

impl Default for SecretSource {
    fn default() -> Self {
        Self::Env("DATABASE_URL".to_string())
    }
}

impl std::fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(_) => f.write_str("SecretSource::Value(***)"),
            other => write!(f, "SecretSource({})", other.describe()),
        }
    }
}

/// A resolved connection string
///
/// `Debug` and `Display` are masked. Use [`Plaintext::expose`] to read it.
#[derive(Clone, PartialEq, Eq)]
pub struct Plaintext(String);

impl Plaintext {
    /// Wrap an already-resolved connection string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the connection string
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Plaintext(***)")
    }
}

impl std::fmt::Display for Plaintext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// Secret resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    #[error("Environment variable {0} is not available: {1}")]
    EnvVar(String, String),

    #[error("Cannot read secret file {0}: {1}")]
    File(String, String),

    #[error("Secret from {0} is empty")]
    Empty(String),
}
