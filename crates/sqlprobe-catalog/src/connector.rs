//! High-level introspection and query API
//!
//! [`SqlConnector`] resolves the connection secret, classifies it, renders the
//! SQL for the requested operation and only then touches the network. Every
//! call uses its own connection, which is closed before the call returns.

use crate::adapter::{AdapterFactory, DatabaseAdapter, DriverFactory, FetchError};
use sqlprobe_core::{
    build_query, classify, redact, ColumnInfo, ConnectionDescriptor, Operation, Plaintext,
    QueryConfig, QueryOutput, ResultSet, SecretSource, TableList,
};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Connector behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorOptions {
    /// Schema used by `list_tables(None)`
    pub default_schema: String,

    /// Fail `run_query` with [`FetchError::NoResults`] when no rows come back
    pub empty_result_is_error: bool,

    /// Bound on opening the connection plus running the query
    pub query_timeout: Option<Duration>,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self::from(&QueryConfig::default())
    }
}

impl From<&QueryConfig> for ConnectorOptions {
    fn from(config: &QueryConfig) -> Self {
        Self {
            default_schema: config.default_schema.clone(),
            empty_result_is_error: config.empty_result_is_error,
            query_timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Entry point for the introspection operations
#[derive(Debug)]
pub struct SqlConnector<F: AdapterFactory = DriverFactory> {
    secret: SecretSource,
    factory: F,
    options: ConnectorOptions,
}

impl SqlConnector<DriverFactory> {
    /// Create a connector backed by the compiled-in drivers
    pub fn new(secret: SecretSource) -> Self {
        Self::with_factory(secret, DriverFactory)
    }
}

impl<F: AdapterFactory> SqlConnector<F> {
    /// Create a connector that opens connections through `factory`
    pub fn with_factory(secret: SecretSource, factory: F) -> Self {
        Self {
            secret,
            factory,
            options: ConnectorOptions::default(),
        }
    }

    /// Replace the default options
    pub fn with_options(mut self, options: ConnectorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ConnectorOptions {
        &self.options
    }

    pub fn secret(&self) -> &SecretSource {
        &self.secret
    }

    /// Resolve and classify the connection string without connecting
    pub fn describe(&self) -> Result<ConnectionDescriptor, FetchError> {
        let secret = self.secret.resolve()?;
        Ok(classify(secret.expose())?)
    }

    /// Table names in `schema`, or in the default schema when `None`
    ///
    /// MySQL has no schema level below the database, so the schema argument
    /// only affects PostgreSQL.
    pub async fn list_tables(&self, schema: Option<&str>) -> Result<TableList, FetchError> {
        let schema = schema.unwrap_or(self.options.default_schema.as_str()).to_string();
        let rows = self
            .fetch_operation(Operation::ListTables { schema })
            .await?;

        let tables = (0..rows.len())
            .map(|row| rows.get_str(row, 0).map(str::to_string))
            .collect::<Result<TableList, _>>()?;

        tracing::info!(operation = "list_tables", rows = tables.len(), "Listed tables");
        Ok(tables)
    }

    /// Name, type and nullability of every column in `table`
    pub async fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, FetchError> {
        let rows = self
            .fetch_operation(Operation::ListColumns {
                table: table.to_string(),
            })
            .await?;

        let columns = column_infos(&rows)?;
        tracing::info!(operation = "list_columns", table, rows = columns.len(), "Listed columns");
        Ok(columns)
    }

    /// Column names of `table` in ordinal order
    pub async fn list_column_names(&self, table: &str) -> Result<Vec<String>, FetchError> {
        Ok(self
            .list_columns(table)
            .await?
            .into_iter()
            .map(|column| column.name)
            .collect())
    }

    /// Metadata for a single column
    ///
    /// Returns [`FetchError::ColumnNotFound`] when the column does not exist.
    pub async fn column_details(&self, table: &str, column: &str) -> Result<ColumnInfo, FetchError> {
        let rows = self
            .fetch_operation(Operation::ColumnDetail {
                table: table.to_string(),
                column: column.to_string(),
            })
            .await?;

        let info = column_infos(&rows)?
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::ColumnNotFound(format!("{}.{}", table, column)))?;

        tracing::info!(operation = "column_details", table, column, "Fetched column details");
        Ok(info)
    }

    /// Run arbitrary SQL and stringify every row
    pub async fn run_query(&self, sql: &str) -> Result<QueryOutput, FetchError> {
        let secret = self.secret.resolve()?;
        let descriptor = classify(secret.expose())?;
        log_descriptor(&descriptor, "run_query");

        let rows = self.execute(&descriptor, &secret, sql).await?;
        if rows.is_empty() && self.options.empty_result_is_error {
            return Err(FetchError::NoResults);
        }

        let output = QueryOutput::from(rows);
        tracing::info!(operation = "run_query", rows = output.rows.len(), "Query completed");
        Ok(output)
    }

    /// Run arbitrary SQL and return the rows as comma-separated lines
    pub async fn run_query_text(&self, sql: &str) -> Result<String, FetchError> {
        Ok(self.run_query(sql).await?.to_text())
    }

    async fn fetch_operation(&self, operation: Operation) -> Result<ResultSet, FetchError> {
        let secret = self.secret.resolve()?;
        let descriptor = classify(secret.expose())?;
        log_descriptor(&descriptor, operation.kind());

        let sql = build_query(&descriptor, &operation)?;
        self.execute(&descriptor, &secret, &sql).await
    }

    /// Open, query, and always close
    async fn execute(
        &self,
        descriptor: &ConnectionDescriptor,
        secret: &Plaintext,
        sql: &str,
    ) -> Result<ResultSet, FetchError> {
        tracing::debug!(sql, "Executing query");

        let deadline = self
            .options
            .query_timeout
            .map(|limit| (Instant::now() + limit, limit));

        let mut adapter = within(deadline, "opening connection", self.factory.open(descriptor, secret))
            .await
            .map_err(|e| match e {
                FetchError::ConnectionOpenFailed(msg) => FetchError::ConnectionOpenFailed(format!(
                    "{}: {}",
                    redact(secret.expose()),
                    msg
                )),
                other => other,
            })?;

        let result = within(deadline, "running query", adapter.query(sql)).await;
        release(adapter, deadline.map(|(at, _)| at)).await;

        result
    }
}

fn log_descriptor(descriptor: &ConnectionDescriptor, operation: &str) {
    tracing::debug!(
        operation,
        dialect = %descriptor.dialect(),
        database = descriptor.database_name(),
        "Classified connection string"
    );
}

/// Close the adapter, giving up at `deadline`
///
/// A close that is still pending at the deadline is dropped.
async fn release(adapter: Box<dyn DatabaseAdapter>, deadline: Option<Instant>) {
    let name = adapter.name();
    let closed = match deadline {
        None => adapter.close().await,
        Some(at) => tokio::time::timeout_at(at, adapter.close())
            .await
            .unwrap_or_else(|_| Err(FetchError::Timeout("closing connection".to_string()))),
    };

    if let Err(e) = closed {
        tracing::warn!(adapter = name, error = %e, "Failed to close connection");
    }
}

async fn within<T, Fut>(
    deadline: Option<(Instant, Duration)>,
    step: &str,
    future: Fut,
) -> Result<T, FetchError>
where
    Fut: Future<Output = Result<T, FetchError>>,
{
    match deadline {
        None => future.await,
        Some((at, limit)) => tokio::time::timeout_at(at, future)
            .await
            .map_err(|_| FetchError::Timeout(format!("{} exceeded {:?}", step, limit)))?,
    }
}

/// Map `column_name, data_type, is_nullable` rows
fn column_infos(rows: &ResultSet) -> Result<Vec<ColumnInfo>, FetchError> {
    let mut columns = Vec::with_capacity(rows.len());
    for row in 0..rows.len() {
        columns.push(ColumnInfo::new(
            rows.get_str(row, 0)?,
            rows.get_str(row, 1)?,
            ColumnInfo::nullable_from_str(rows.get_str(row, 2)?),
        ));
    }
    Ok(columns)
}
