//! Output sinks for transformed rows.

use std::io::Write;

use desensitizer_core::{Columns, Row};

use crate::errors::SinkError;

pub mod csv;
pub mod directory;
pub mod memory;
pub mod sql;

pub use self::csv::CsvSink;
pub use directory::DirectorySinks;
pub use memory::{CapturedTable, MemorySinks};
pub use sql::{SqlDialect, SqlSink};

/// Accepts the transformed rows of one table, in order.
pub trait RowSink: Send {
    fn write_row(&mut self, row: &Row) -> Result<(), SinkError>;

    /// Flush buffered output and return the bytes written so far.
    ///
    /// Called once when the table completes and also when it fails or the run
    /// is cancelled.
    fn finish(&mut self) -> Result<u64, SinkError>;
}

/// Opens one sink per table.
pub trait SinkFactory {
    fn open(&mut self, table: &str, columns: &Columns) -> Result<Box<dyn RowSink>, SinkError>;
}

fn check_shape(columns: &Columns, row: &Row) -> Result<(), SinkError> {
    if row.len() != columns.len() {
        return Err(SinkError::ShapeMismatch);
    }
    Ok(())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
