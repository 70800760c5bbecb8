//! sqlprobe core
//!
//! Connection-string classification and information_schema query templating
//! for MySQL and PostgreSQL. Nothing in this crate performs I/O against a
//! database; drivers live in `sqlprobe-catalog`.

pub mod config;
pub mod dialect;
pub mod dsn;
pub mod query;
pub mod secret;
pub mod security;
pub mod types;

pub use config::{Config, ConfigError, ConnectionConfig, QueryConfig};
pub use dialect::{classify, ConnectionDescriptor, Dialect, DialectError};
pub use dsn::{redact, MySqlDsn};
pub use query::{build_query, Operation};
pub use secret::{Plaintext, SecretError, SecretSource};
pub use security::validate_identifier;
pub use types::{ColumnInfo, QueryOutput, ResultSet, ScanError, TableList};
