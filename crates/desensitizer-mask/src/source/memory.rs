use std::sync::atomic::{AtomicU64, Ordering};

use futures::StreamExt;
use futures::stream;

use desensitizer_core::{CellValue, Columns, NameMatch, Row, columns, match_name};

use crate::errors::RowSourceError;
use crate::source::{RowStream, TableSource};

struct MemoryTable {
    name: String,
    columns: Columns,
    rows: Vec<Row>,
    fail_after: Option<usize>,
}

/// In-memory row source.
///
/// Counts opened streams and rows handed out, and can be told to fail a
/// table's stream after a number of rows.
#[derive(Default)]
pub struct MemorySource {
    tables: Vec<MemoryTable>,
    opened: AtomicU64,
    rows_read: AtomicU64,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table. Every row must have one value per column.
    pub fn with_table<I, S>(
        mut self,
        name: &str,
        column_names: I,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, RowSourceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns(column_names);
        let rows = rows
            .into_iter()
            .map(|values| Row::new(columns.clone(), values))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| RowSourceError::with_source(format!("bad row for '{name}'"), err))?;
        self.tables.push(MemoryTable {
            name: name.to_string(),
            columns,
            rows,
            fail_after: None,
        });
        Ok(self)
    }

    /// Make the stream of `table` fail once `rows` rows were read.
    pub fn fail_after(mut self, table: &str, rows: usize) -> Self {
        if let Some(entry) = self.table_mut(table) {
            entry.fail_after = Some(rows);
        }
        self
    }

    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read.load(Ordering::SeqCst)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.name.clone()).collect()
    }

    fn table(&self, name: &str) -> Option<&MemoryTable> {
        let names: Vec<&str> = self.tables.iter().map(|table| table.name.as_str()).collect();
        match match_name(&names[..], name) {
            NameMatch::Found(index) => self.tables.get(index),
            NameMatch::Missing | NameMatch::Ambiguous => None,
        }
    }

    fn table_mut(&mut self, name: &str) -> Option<&mut MemoryTable> {
        self.tables
            .iter_mut()
            .find(|table| table.name.eq_ignore_ascii_case(name))
    }
}

impl TableSource for MemorySource {
    fn describe(&self, table: &str) -> Result<Option<Columns>, RowSourceError> {
        Ok(self.table(table).map(|entry| entry.columns.clone()))
    }

    fn open<'a>(&'a self, table: &str) -> Result<RowStream<'a>, RowSourceError> {
        let entry = self
            .table(table)
            .ok_or_else(|| RowSourceError::new(format!("table '{table}' not found")))?;
        self.opened.fetch_add(1, Ordering::SeqCst);

        let rows_read = &self.rows_read;
        let rows = entry.rows.iter().cloned().map(move |row| {
            rows_read.fetch_add(1, Ordering::SeqCst);
            Ok(row)
        });

        match entry.fail_after {
            Some(limit) => {
                let failure = std::iter::once(Err(RowSourceError::new(format!(
                    "connection lost while reading '{}'",
                    entry.name
                ))));
                Ok(stream::iter(rows.take(limit).chain(failure)).boxed())
            }
            None => Ok(stream::iter(rows).boxed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use desensitizer_core::position_of;
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn rows_are_counted_lazily() {
        let source = MemorySource::new()
            .with_table(
                "customers",
                ["id", "name"],
                vec![
                    vec![CellValue::Int(1), CellValue::text("Acme Inc")],
                    vec![CellValue::Int(2), CellValue::text("Globex")],
                ],
            )
            .expect("table");

        let stream = source.open("CUSTOMERS").expect("open");
        assert_eq!(source.opened(), 1);
        assert_eq!(source.rows_read(), 0);

        let rows: Vec<_> = block_on(stream.collect::<Vec<_>>());
        assert_eq!(rows.len(), 2);
        assert_eq!(source.rows_read(), 2);
        let columns = source.describe("customers").expect("describe").expect("exists");
        assert_eq!(position_of(&columns, "NAME"), Some(1));
    }

    #[test]
    fn injected_failure_ends_the_stream() {
        let source = MemorySource::new()
            .with_table(
                "orders",
                ["id"],
                vec![vec![CellValue::Int(1)], vec![CellValue::Int(2)]],
            )
            .expect("table")
            .fail_after("orders", 1);

        let items: Vec<_> = block_on(source.open("orders").expect("open").collect::<Vec<_>>());
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = MemorySource::new().with_table("t", ["a", "b"], vec![vec![CellValue::Null]]);
        assert!(result.is_err());
    }
}
