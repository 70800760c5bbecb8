//! Database adapter traits for running introspection queries

use sqlprobe_core::{ConnectionDescriptor, DialectError, Plaintext, ResultSet, ScanError, SecretError};

/// Errors that can occur while talking to a database
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Secret resolution failed: {0}")]
    SecretResolutionFailed(String),

    #[error(transparent)]
    Dialect(#[from] DialectError),

    #[error("Connection failed: {0}")]
    ConnectionOpenFailed(String),

    #[error("Failed to close connection: {0}")]
    ConnectionCloseFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Row scan failed: {0}")]
    RowScanFailed(String),

    #[error("Row iteration failed: {0}")]
    RowIterationFailed(String),

    #[error("No results found")]
    NoResults,

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<SecretError> for FetchError {
    fn from(err: SecretError) -> Self {
        Self::SecretResolutionFailed(err.to_string())
    }
}

impl From<ScanError> for FetchError {
    fn from(err: ScanError) -> Self {
        Self::RowScanFailed(err.to_string())
    }
}

/// An open connection that can run text queries
///
/// Each connector operation opens one adapter, runs one query and closes it.
#[async_trait::async_trait]
pub trait DatabaseAdapter: Send {
    /// Get the adapter name (e.g., "PostgreSQL", "MySQL")
    fn name(&self) -> &'static str;

    /// Run a query and return every row as text
    async fn query(&mut self, sql: &str) -> Result<ResultSet, FetchError>;

    /// Release the underlying connection
    async fn close(self: Box<Self>) -> Result<(), FetchError>;
}

/// Opens adapters for classified connection strings
#[async_trait::async_trait]
pub trait AdapterFactory: Send + Sync {
    /// Open a connection for the given dialect and connection string
    async fn open(
        &self,
        descriptor: &ConnectionDescriptor,
        connection_string: &Plaintext,
    ) -> Result<Box<dyn DatabaseAdapter>, FetchError>;
}

/// Factory that dispatches to the compiled-in drivers
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverFactory;

#[async_trait::async_trait]
impl AdapterFactory for DriverFactory {
    async fn open(
        &self,
        descriptor: &ConnectionDescriptor,
        connection_string: &Plaintext,
    ) -> Result<Box<dyn DatabaseAdapter>, FetchError> {
        match descriptor.dialect() {
            sqlprobe_core::Dialect::Postgres => {
                let adapter = crate::postgres::PostgresAdapter::connect(connection_string).await?;
                Ok(Box::new(adapter))
            }
            sqlprobe_core::Dialect::MySql => {
                let adapter = crate::mysql::MySqlAdapter::connect(connection_string).await?;
                Ok(Box::new(adapter))
            }
        }
    }
}
