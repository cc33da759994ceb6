//! In-memory data set used as the wrapped source in fixtures and tests.
//!
//! Plays the role an XML fixture loader plays in a full test setup: a plain
//! data source with no scripting behavior of its own.

use crate::dataset::{DataSet, DataSetError, Table, TableIterator, TableMetaData};
use crate::value::CellValue;

/// A table held entirely in memory.
///
/// Rows may be shorter than the column list; missing trailing cells read as
/// null, matching the loose shape of fixture files.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    metadata: TableMetaData,
    rows: Vec<Vec<CellValue>>,
}

impl MemoryTable {
    pub fn new(
        table_name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            metadata: TableMetaData::new(table_name, columns),
            rows: Vec::new(),
        }
    }

    /// Appends a row, builder style.
    pub fn with_row(mut self, row: Vec<CellValue>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn add_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }
}

impl Table for MemoryTable {
    fn metadata(&self) -> &TableMetaData {
        &self.metadata
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn value(&self, row: usize, column: &str) -> Result<CellValue, DataSetError> {
        let index = self.metadata.column_index(column).ok_or_else(|| DataSetError::NoSuchColumn {
            table: self.metadata.table_name().to_string(),
            column: column.to_string(),
        })?;

        let cells = self.rows.get(row).ok_or_else(|| DataSetError::RowOutOfBounds {
            table: self.metadata.table_name().to_string(),
            row,
            row_count: self.rows.len(),
        })?;

        Ok(cells.get(index).cloned().unwrap_or(CellValue::Null))
    }
}

/// An ordered set of [`MemoryTable`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataSet {
    tables: Vec<MemoryTable>,
}

impl MemoryDataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a table, builder style.
    pub fn with_table(mut self, table: MemoryTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn add_table(&mut self, table: MemoryTable) {
        self.tables.push(table);
    }
}

impl DataSet for MemoryDataSet {
    fn iterator(&self) -> Result<Box<dyn TableIterator + '_>, DataSetError> {
        Ok(Box::new(MemoryIterator::new(self.tables.iter().collect())))
    }

    fn reverse_iterator(&self) -> Result<Box<dyn TableIterator + '_>, DataSetError> {
        Ok(Box::new(MemoryIterator::new(self.tables.iter().rev().collect())))
    }
}

struct MemoryIterator<'a> {
    tables: Vec<&'a MemoryTable>,
    next: usize,
    current: Option<usize>,
}

impl<'a> MemoryIterator<'a> {
    fn new(tables: Vec<&'a MemoryTable>) -> Self {
        Self { tables, next: 0, current: None }
    }

    fn current_table(&self) -> Result<&MemoryTable, DataSetError> {
        self.current
            .and_then(|index| self.tables.get(index).copied())
            .ok_or(DataSetError::NoCurrentTable)
    }
}

impl TableIterator for MemoryIterator<'_> {
    fn advance(&mut self) -> Result<bool, DataSetError> {
        if self.next < self.tables.len() {
            self.current = Some(self.next);
            self.next += 1;
            Ok(true)
        } else {
            self.current = None;
            Ok(false)
        }
    }

    fn metadata(&self) -> Result<TableMetaData, DataSetError> {
        Ok(self.current_table()?.metadata().clone())
    }

    fn table(&self) -> Result<Box<dyn Table>, DataSetError> {
        Ok(Box::new(self.current_table()?.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> MemoryTable {
        MemoryTable::new("location", ["num", "addr"])
            .with_row(vec![CellValue::Integer(1), CellValue::from("Webster Street")])
    }

    #[test]
    fn test_value_lookup() {
        let table = sample_table();

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.value(0, "addr").unwrap(), CellValue::from("Webster Street"));
    }

    #[test]
    fn test_unknown_column() {
        let table = sample_table();

        assert!(matches!(table.value(0, "missing"), Err(DataSetError::NoSuchColumn { .. })));
    }

    #[test]
    fn test_row_out_of_bounds() {
        let table = sample_table();

        assert!(matches!(table.value(7, "num"), Err(DataSetError::RowOutOfBounds { row: 7, .. })));
    }

    #[test]
    fn test_short_row_reads_as_null() {
        let table = MemoryTable::new("location", ["num", "addr"]).with_row(vec![CellValue::Integer(1)]);

        assert_eq!(table.value(0, "addr").unwrap(), CellValue::Null);
    }

    #[test]
    fn test_forward_and_reverse_iteration() {
        let data_set = MemoryDataSet::new()
            .with_table(MemoryTable::new("first", ["a"]))
            .with_table(MemoryTable::new("second", ["a"]));

        let mut forward = data_set.iterator().unwrap();
        assert!(forward.advance().unwrap());
        assert_eq!(forward.metadata().unwrap().table_name(), "first");
        assert!(forward.advance().unwrap());
        assert_eq!(forward.metadata().unwrap().table_name(), "second");
        assert!(!forward.advance().unwrap());

        let mut reverse = data_set.reverse_iterator().unwrap();
        assert!(reverse.advance().unwrap());
        assert_eq!(reverse.metadata().unwrap().table_name(), "second");
    }

    #[test]
    fn test_metadata_before_advance_fails() {
        let data_set = MemoryDataSet::new().with_table(sample_table());

        let iterator = data_set.iterator().unwrap();
        assert!(matches!(iterator.metadata(), Err(DataSetError::NoCurrentTable)));
    }
}
