//! Result types shared by the drivers and the connector

use serde::{Deserialize, Serialize};

/// Ordered table names, rebuilt on every call
pub type TableList = Vec<String>;

/// Metadata for a single column from information_schema.columns
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// Driver-reported data type (e.g. `integer`, `varchar`)
    pub data_type: String,

    /// Whether the column accepts NULL
    pub nullable: bool,
}

impl ColumnInfo {
    /// Create a new column description
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
        }
    }

    /// Map information_schema `is_nullable` text to a flag.
    ///
    /// Only `YES` (any case) counts as nullable.
    pub fn nullable_from_str(is_nullable: &str) -> bool {
        is_nullable.trim().eq_ignore_ascii_case("YES")
    }
}

/// Failure to read a cell out of a [`ResultSet`] row
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("row {row} has no column {column}")]
    MissingColumn { row: usize, column: usize },

    #[error("row {row} column {column} is NULL")]
    UnexpectedNull { row: usize, column: usize },
}

/// Text-protocol rows as returned by a driver adapter
///
/// Every value is carried as its textual rendering; `None` is SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names in select-list order
    pub columns: Vec<String>,

    /// Row values
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    /// Build a result set from column names and rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Build a result set from string literals, mainly for tests and mocks
    pub fn from_strs(columns: &[&str], rows: &[&[Option<&str>]]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|v| v.map(str::to_string)).collect())
                .collect(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Read a non-NULL cell
    pub fn get_str(&self, row: usize, column: usize) -> Result<&str, ScanError> {
        self.get_opt(row, column)?
            .ok_or(ScanError::UnexpectedNull { row, column })
    }

    /// Read a cell that may be NULL
    pub fn get_opt(&self, row: usize, column: usize) -> Result<Option<&str>, ScanError> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|v| v.as_deref())
            .ok_or(ScanError::MissingColumn { row, column })
    }
}

/// Flattened output of an arbitrary query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutput {
    /// Column names in select-list order
    pub columns: Vec<String>,

    /// Stringified rows; NULL is rendered as `NULL`
    pub rows: Vec<Vec<String>>,
}

impl QueryOutput {
    /// Text used for SQL NULL values
    pub const NULL_TEXT: &'static str = "NULL";

    /// Whether the query returned no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows joined by newlines, values joined by commas
    pub fn to_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join(","))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<ResultSet> for QueryOutput {
    fn from(result: ResultSet) -> Self {
        Self {
            columns: result.columns,
            rows: result
                .rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|v| v.unwrap_or_else(|| Self::NULL_TEXT.to_string()))
                        .collect()
                })
                .collect(),
        }
    }
}
