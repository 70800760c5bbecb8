//! Dialect-specific information_schema query templates
//!
//! PostgreSQL queries are scoped by `table_catalog` (the database from the
//! connection string). MySQL connections are already scoped to one database,
//! so only table listing filters on it, via `table_schema`.
//!
//! Values are interpolated as quoted literals after passing
//! [`validate_identifier`].

use crate::dialect::{ConnectionDescriptor, Dialect, DialectError};
use crate::security::validate_identifier;

/// Introspection operations that need generated SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Names of the tables in a schema
    ListTables { schema: String },

    /// Name, type and nullability for every column of a table
    ListColumns { table: String },

    /// Name, type and nullability for one column
    ColumnDetail { table: String, column: String },
}

impl Operation {
    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ListTables { .. } => "list_tables",
            Self::ListColumns { .. } => "list_columns",
            Self::ColumnDetail { .. } => "column_detail",
        }
    }
}

const COLUMN_FIELDS: &str = "column_name, data_type, is_nullable";

/// Build the SQL text for an operation against the described database.
///
/// # Example
///
/// ```
/// use sqlprobe_core::{build_query, classify, Operation};
///
/// let desc = classify("postgres://u:p@localhost/mydb").unwrap();
/// let sql = build_query(&desc, &Operation::ListColumns { table: "users".into() }).unwrap();
/// assert!(sql.contains("table_name = 'users'"));
/// assert!(sql.contains("table_catalog = 'mydb'"));
/// ```
pub fn build_query(
    descriptor: &ConnectionDescriptor,
    operation: &Operation,
) -> Result<String, DialectError> {
    let database = descriptor.database_name();
    validate_identifier(database)?;

    let sql = match (descriptor.dialect(), operation) {
        (Dialect::Postgres, Operation::ListTables { schema }) => {
            validate_identifier(schema)?;
            format!(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = '{}' AND table_catalog = '{}' \
                 ORDER BY table_name",
                schema, database
            )
        }
        (Dialect::MySql, Operation::ListTables { schema: _ }) => format!(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = '{}' \
             ORDER BY table_name",
            database
        ),
        (Dialect::Postgres, Operation::ListColumns { table }) => {
            validate_identifier(table)?;
            format!(
                "SELECT {} FROM information_schema.columns \
                 WHERE table_name = '{}' AND table_catalog = '{}' \
                 ORDER BY ordinal_position",
                COLUMN_FIELDS, table, database
            )
        }
        (Dialect::MySql, Operation::ListColumns { table }) => {
            validate_identifier(table)?;
            format!(
                "SELECT {} FROM information_schema.columns \
                 WHERE table_name = '{}' \
                 ORDER BY ordinal_position",
                COLUMN_FIELDS, table
            )
        }
        (Dialect::Postgres, Operation::ColumnDetail { table, column }) => {
            validate_identifier(table)?;
            validate_identifier(column)?;
            format!(
                "SELECT {} FROM information_schema.columns \
                 WHERE table_name = '{}' AND table_catalog = '{}' AND column_name = '{}'",
                COLUMN_FIELDS, table, database, column
            )
        }
        (Dialect::MySql, Operation::ColumnDetail { table, column }) => {
            validate_identifier(table)?;
            validate_identifier(column)?;
            format!(
                "SELECT {} FROM information_schema.columns \
                 WHERE table_name = '{}' AND column_name = '{}'",
                COLUMN_FIELDS, table, column
            )
        }
    };

    Ok(sql)
}
