//! Database adapters and the introspection connector
//!
//! This crate opens connections to MySQL and PostgreSQL, runs the SQL that
//! `sqlprobe-core` renders, and maps the rows into typed results.
//!
//! ## Features
//!
//! Enable driver support via Cargo features:
//! - `postgres` - PostgreSQL support (tokio-postgres)
//! - `mysql` - MySQL support (mysql_async)
//! - `all-databases` - All drivers
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqlprobe_catalog::SqlConnector;
//! use sqlprobe_core::SecretSource;
//!
//! let connector = SqlConnector::new(SecretSource::Env("DATABASE_URL".into()));
//! for table in connector.list_tables(None).await? {
//!     println!("{}", table);
//! }
//! ```

pub mod adapter;
pub mod connector;
pub mod mock;
pub mod mysql;
pub mod postgres;

pub use adapter::{AdapterFactory, DatabaseAdapter, DriverFactory, FetchError};
pub use connector::{ConnectorOptions, SqlConnector};
pub use mock::{MockConnection, MockDatabase};
pub use mysql::MySqlAdapter;
pub use postgres::PostgresAdapter;
