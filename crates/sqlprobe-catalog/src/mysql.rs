//! MySQL adapter using mysql_async
//!
//! Accepts `mysql://` URLs as well as DSN-style strings
//! (`user:pass@tcp(host:3306)/db`, `user:pass@unix(/path.sock)/db`,
//! `user:pass@/db`). Queries run over the text protocol and every value is
//! rendered to a string.

use crate::adapter::{DatabaseAdapter, FetchError};
use sqlprobe_core::{Plaintext, ResultSet};

#[cfg(feature = "mysql")]
use mysql_async::prelude::*;

#[cfg(feature = "mysql")]
use mysql_async::{Conn, Opts, OptsBuilder};

#[cfg(feature = "mysql")]
use sqlprobe_core::{redact, MySqlDsn};

/// MySQL adapter
pub struct MySqlAdapter {
    #[cfg(feature = "mysql")]
    conn: Conn,

    /// Placeholder for when feature is disabled
    #[cfg(not(feature = "mysql"))]
    _phantom: std::marker::PhantomData<()>,
}

impl MySqlAdapter {
    /// Open a connection
    #[cfg(feature = "mysql")]
    pub async fn connect(connection_string: &Plaintext) -> Result<Self, FetchError> {
        let opts = connection_opts(connection_string.expose())?;

        let conn = Conn::new(opts)
            .await
            .map_err(|e| FetchError::ConnectionOpenFailed(format!(
                "Failed to connect to MySQL: {}", e
            )))?;

        Ok(Self { conn })
    }

    /// Create adapter without mysql feature (returns error)
    #[cfg(not(feature = "mysql"))]
    pub async fn connect(_connection_string: &Plaintext) -> Result<Self, FetchError> {
        Err(FetchError::ConfigError(
            "MySQL support not compiled. Rebuild with: cargo build --features mysql".to_string()
        ))
    }
}

/// Build driver options from either MySQL connection string form
#[cfg(feature = "mysql")]
pub fn connection_opts(raw: &str) -> Result<Opts, FetchError> {
    if raw.to_lowercase().starts_with("mysql://") {
        return Opts::from_url(raw).map_err(|e| FetchError::ConnectionOpenFailed(format!(
            "Invalid MySQL connection string {}: {}", redact(raw), e
        )));
    }

    let dsn = MySqlDsn::parse(raw)?;
    let mut builder = OptsBuilder::default()
        .user(dsn.user.clone())
        .pass(dsn.password.clone())
        .db_name(Some(dsn.database.clone()));

    if dsn.protocol == "unix" {
        builder = builder.socket(Some(dsn.address.clone()));
    } else {
        let (host, port) = dsn.host_port();
        builder = builder.ip_or_hostname(host.into_owned());
        if let Some(port) = port {
            builder = builder.tcp_port(port);
        }
    }

    Ok(Opts::from(builder))
}

/// Render a MySQL value as text; `None` for NULL
#[cfg(feature = "mysql")]
pub fn value_to_text(value: &mysql_async::Value) -> Option<String> {
    use mysql_async::Value;

    match value {
        Value::NULL => None,
        Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        Value::Int(n) => Some(n.to_string()),
        Value::UInt(n) => Some(n.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Double(d) => Some(d.to_string()),
        Value::Date(year, month, day, hour, min, sec, micro) => {
            let mut text = format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, min, sec
            );
            if *micro > 0 {
                text.push_str(&format!(".{:06}", micro));
            }
            Some(text)
        }
        Value::Time(negative, days, hours, min, sec, micro) => {
            let total_hours = *days * 24 + u32::from(*hours);
            let mut text = format!(
                "{}{:02}:{:02}:{:02}",
                if *negative { "-" } else { "" },
                total_hours,
                min,
                sec
            );
            if *micro > 0 {
                text.push_str(&format!(".{:06}", micro));
            }
            Some(text)
        }
    }
}

#[async_trait::async_trait]
impl DatabaseAdapter for MySqlAdapter {
    fn name(&self) -> &'static str {
        "MySQL"
    }

    #[cfg(feature = "mysql")]
    async fn query(&mut self, sql: &str) -> Result<ResultSet, FetchError> {
        let result = self.conn
            .query_iter(sql)
            .await
            .map_err(|e| FetchError::QueryFailed(format!("{}: {}", sql, e)))?;

        let rows: Vec<mysql_async::Row> = result
            .collect_and_drop()
            .await
            .map_err(|e| FetchError::RowIterationFailed(format!("{}: {}", sql, e)))?;

        let mut output = ResultSet::default();

        for (row_idx, row) in rows.iter().enumerate() {
            if output.columns.is_empty() {
                output.columns = row
                    .columns_ref()
                    .iter()
                    .map(|c| c.name_str().to_string())
                    .collect();
            }

            let mut values = Vec::with_capacity(row.len());
            for idx in 0..row.len() {
                let value = row.as_ref(idx).ok_or_else(|| FetchError::RowScanFailed(format!(
                    "row {} column {} is not available", row_idx, idx
                )))?;
                values.push(value_to_text(value));
            }
            output.rows.push(values);
        }

        Ok(output)
    }

    #[cfg(not(feature = "mysql"))]
    async fn query(&mut self, _sql: &str) -> Result<ResultSet, FetchError> {
        Err(FetchError::ConfigError(
            "MySQL support not compiled. Rebuild with: cargo build --features mysql".to_string()
        ))
    }

    #[cfg(feature = "mysql")]
    async fn close(self: Box<Self>) -> Result<(), FetchError> {
        self.conn
            .disconnect()
            .await
            .map_err(|e| FetchError::ConnectionCloseFailed(format!("Failed to disconnect from MySQL: {}", e)))
    }

    #[cfg(not(feature = "mysql"))]
    async fn close(self: Box<Self>) -> Result<(), FetchError> {
        Ok(())
    }
}
