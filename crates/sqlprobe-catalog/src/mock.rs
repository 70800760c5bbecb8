//! Mock database for testing
//!
//! Returns canned result sets without connecting to any server. It's useful for:
//! - Unit testing the connector's row mapping
//! - Checking which SQL each operation generates
//! - Verifying connections are released on every path
//! - Simulating driver failures and stalls
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlprobe_catalog::{MockDatabase, SqlConnector};
//! use sqlprobe_core::{ResultSet, SecretSource};
//!
//! let db = MockDatabase::new();
//! db.add_response(
//!     "information_schema.tables",
//!     ResultSet::from_strs(&["table_name"], &[&[Some("users")]]),
//! ).await;
//!
//! let connector = SqlConnector::with_factory(
//!     SecretSource::Value("postgres://u:p@localhost/app".into()),
//!     db.clone(),
//! );
//! assert_eq!(connector.list_tables(None).await?, vec!["users"]);
//! assert_eq!(db.close_count(), 1);
//! ```

use crate::adapter::{AdapterFactory, DatabaseAdapter, FetchError};
use sqlprobe_core::{ConnectionDescriptor, Dialect, Plaintext, ResultSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct MockState {
    /// Responses keyed by SQL fragment, checked in insertion order
    responses: RwLock<Vec<(String, Result<ResultSet, FetchError>)>>,

    /// Every statement executed, in order
    executed: RwLock<Vec<String>>,

    /// Dialects of opened connections, in order
    opened: RwLock<Vec<Dialect>>,

    opens: AtomicUsize,
    closes: AtomicUsize,
}

/// Mock database acting as an [`AdapterFactory`]
///
/// Clones share state, so a test can keep one handle for assertions and
/// hand another to the connector.
#[derive(Clone)]
pub struct MockDatabase {
    state: Arc<MockState>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate failure while closing
    fail_close: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,

    /// Simulate a slow close (milliseconds)
    close_latency_ms: u64,

    /// Name reported by opened connections
    adapter_name: &'static str,
}

impl MockDatabase {
    /// Create a mock database with no canned responses
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState::default()),
            fail_connection: false,
            fail_close: false,
            latency_ms: 0,
            close_latency_ms: 0,
            adapter_name: "Mock",
        }
    }

    /// Return `result` for any statement containing `sql_fragment`
    pub async fn add_response(&self, sql_fragment: impl Into<String>, result: ResultSet) {
        self.state
            .responses
            .write()
            .await
            .push((sql_fragment.into(), Ok(result)));
    }

    /// Fail any statement containing `sql_fragment` with `error`
    pub async fn add_error(&self, sql_fragment: impl Into<String>, error: FetchError) {
        self.state
            .responses
            .write()
            .await
            .push((sql_fragment.into(), Err(error)));
    }

    /// Configure to fail every connection attempt
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure to fail when a connection is closed
    pub fn with_close_failure(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Configure simulated latency before each query returns
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Configure simulated latency before each close completes
    pub fn with_close_latency(mut self, latency_ms: u64) -> Self {
        self.close_latency_ms = latency_ms;
        self
    }

    /// Set a custom adapter name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.adapter_name = name;
        self
    }

    /// Statements executed so far
    pub async fn executed(&self) -> Vec<String> {
        self.state.executed.read().await.clone()
    }

    /// Dialects of the connections opened so far
    pub async fn opened_dialects(&self) -> Vec<Dialect> {
        self.state.opened.read().await.clone()
    }

    /// Number of connections opened
    pub fn open_count(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    /// Number of connections closed
    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// Clear canned responses and recorded history
    pub async fn reset(&self) {
        self.state.responses.write().await.clear();
        self.state.executed.write().await.clear();
        self.state.opened.write().await.clear();
        self.state.opens.store(0, Ordering::SeqCst);
        self.state.closes.store(0, Ordering::SeqCst);
    }
}

impl Default for MockDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AdapterFactory for MockDatabase {
    async fn open(
        &self,
        descriptor: &ConnectionDescriptor,
        _connection_string: &Plaintext,
    ) -> Result<Box<dyn DatabaseAdapter>, FetchError> {
        if self.fail_connection {
            return Err(FetchError::ConnectionOpenFailed(
                "Simulated connection failure".to_string(),
            ));
        }

        self.state.opens.fetch_add(1, Ordering::SeqCst);
        self.state.opened.write().await.push(descriptor.dialect());

        Ok(Box::new(MockConnection {
            db: self.clone(),
        }))
    }
}

/// Connection handed out by [`MockDatabase`]
pub struct MockConnection {
    db: MockDatabase,
}

#[async_trait::async_trait]
impl DatabaseAdapter for MockConnection {
    fn name(&self) -> &'static str {
        self.db.adapter_name
    }

    async fn query(&mut self, sql: &str) -> Result<ResultSet, FetchError> {
        if self.db.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.db.latency_ms)).await;
        }

        self.db.state.executed.write().await.push(sql.to_string());

        let responses = self.db.state.responses.read().await;
        responses
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| Ok(ResultSet::default()))
    }

    async fn close(self: Box<Self>) -> Result<(), FetchError> {
        self.db.state.closes.fetch_add(1, Ordering::SeqCst);
        if self.db.close_latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.db.close_latency_ms)).await;
        }
        if self.db.fail_close {
            return Err(FetchError::ConnectionCloseFailed(
                "Simulated close failure".to_string(),
            ));
        }
        Ok(())
    }
}
