use std::sync::{Arc, Mutex, MutexGuard};

use desensitizer_core::{Columns, Row};

use crate::errors::SinkError;
use crate::output::{RowSink, SinkFactory, check_shape};

/// Rows captured for one table.
#[derive(Debug, Clone)]
pub struct CapturedTable {
    pub table: String,
    pub columns: Columns,
    pub rows: Vec<Row>,
    pub finished: bool,
}

/// Keeps every emitted row in memory. Clones share the captured tables.
#[derive(Debug, Clone, Default)]
pub struct MemorySinks {
    tables: Arc<Mutex<Vec<CapturedTable>>>,
}

impl MemorySinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured tables, in open order.
    pub fn tables(&self) -> Vec<CapturedTable> {
        self.tables
            .lock()
            .map(|tables| tables.clone())
            .unwrap_or_default()
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables()
            .into_iter()
            .find(|captured| captured.table.eq_ignore_ascii_case(table))
            .map(|captured| captured.rows)
            .unwrap_or_default()
    }
}

impl SinkFactory for MemorySinks {
    fn open(&mut self, table: &str, columns: &Columns) -> Result<Box<dyn RowSink>, SinkError> {
        let mut tables = lock(&self.tables)?;
        tables.push(CapturedTable {
            table: table.to_string(),
            columns: columns.clone(),
            rows: Vec::new(),
            finished: false,
        });
        Ok(Box::new(MemorySink {
            tables: Arc::clone(&self.tables),
            index: tables.len() - 1,
            columns: columns.clone(),
        }))
    }
}

struct MemorySink {
    tables: Arc<Mutex<Vec<CapturedTable>>>,
    index: usize,
    columns: Columns,
}

impl RowSink for MemorySink {
    fn write_row(&mut self, row: &Row) -> Result<(), SinkError> {
        check_shape(&self.columns, row)?;
        let mut tables = lock(&self.tables)?;
        tables[self.index].rows.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<u64, SinkError> {
        let mut tables = lock(&self.tables)?;
        tables[self.index].finished = true;
        Ok(0)
    }
}

type Captured<'a> = MutexGuard<'a, Vec<CapturedTable>>;

fn lock(tables: &Mutex<Vec<CapturedTable>>) -> Result<Captured<'_>, SinkError> {
    tables
        .lock()
        .map_err(|_| SinkError::Io(std::io::Error::other("memory sink lock poisoned")))
}
