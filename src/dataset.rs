//! The tabular data-set abstraction wrapped by the scriptable decorator.
//!
//! These traits describe the external data source: an ordered sequence of
//! tables, each with a row count, column metadata and cell lookup by row and
//! column. They are implemented both by plain sources such as
//! [`MemoryDataSet`](crate::MemoryDataSet) and by the scriptable wrappers, so
//! wrapping stays fully transparent to existing consumers.

use crate::value::CellValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error type for data-set operations.
#[derive(Debug)]
pub enum DataSetError {
    NoSuchColumn {
        table: String,
        column: String,
    },
    RowOutOfBounds {
        table: String,
        row: usize,
        row_count: usize,
    },
    /// The iterator is positioned before the first or past the last table.
    NoCurrentTable,
    EmptyConfiguration,
    InvalidConfiguration(String),
    NoEngineForLanguage {
        language: String,
    },
    /// A handler or the engine failed while dispatching a cell script. The
    /// original cause is preserved and exposed through [`std::error::Error::source`].
    ScriptExecution {
        language: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for DataSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSetError::NoSuchColumn { table, column } => {
                write!(f, "Table '{}' has no column '{}'", table, column)
            }
            DataSetError::RowOutOfBounds { table, row, row_count } => {
                write!(f, "Row {} out of bounds for table '{}' with {} rows", row, table, row_count)
            }
            DataSetError::NoCurrentTable => {
                write!(f, "Iterator is not positioned on a table")
            }
            DataSetError::EmptyConfiguration => {
                write!(f, "At least one script configuration is required")
            }
            DataSetError::InvalidConfiguration(msg) => {
                write!(f, "Invalid script configuration: {}", msg)
            }
            DataSetError::NoEngineForLanguage { language } => {
                write!(f, "No script engine found for language \"{}\"", language)
            }
            DataSetError::ScriptExecution { language, source } => {
                write!(f, "Script execution failed for language \"{}\": {}", language, source)
            }
        }
    }
}

impl std::error::Error for DataSetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataSetError::ScriptExecution { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Name and ordered column list of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetaData {
    table_name: String,
    columns: Vec<String>,
}

impl TableMetaData {
    pub fn new(
        table_name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column in the declared column order.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }
}

/// One table of a data set.
pub trait Table {
    fn metadata(&self) -> &TableMetaData;

    fn row_count(&self) -> usize;

    /// Reads the cell at `row` (zero-based) in the named column.
    fn value(&self, row: usize, column: &str) -> Result<CellValue, DataSetError>;
}

/// Cursor over the tables of a data set.
///
/// A fresh iterator is positioned before the first table; [`advance`](Self::advance)
/// moves to the next table and returns `false` once the sequence is exhausted.
pub trait TableIterator {
    fn advance(&mut self) -> Result<bool, DataSetError>;

    /// Metadata of the current table.
    fn metadata(&self) -> Result<TableMetaData, DataSetError>;

    /// The current table.
    fn table(&self) -> Result<Box<dyn Table>, DataSetError>;
}

/// An ordered collection of tables, iterable in both directions.
pub trait DataSet {
    fn iterator(&self) -> Result<Box<dyn TableIterator + '_>, DataSetError>;

    fn reverse_iterator(&self) -> Result<Box<dyn TableIterator + '_>, DataSetError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        let metadata = TableMetaData::new("location", ["num", "addr", "date"]);

        assert_eq!(metadata.table_name(), "location");
        assert_eq!(metadata.column_index("addr"), Some(1));
        assert_eq!(metadata.column_index("missing"), None);
    }

    #[test]
    fn test_script_execution_error_preserves_cause() {
        let cause = crate::handlers::HandlerError::Invocation("boom".to_string());
        let error = DataSetError::ScriptExecution {
            language: "rhai".to_string(),
            source: Box::new(cause),
        };

        let source = std::error::Error::source(&error).expect("cause should be preserved");
        assert!(source.to_string().contains("boom"));
        assert!(error.to_string().contains("rhai"));
    }
}
