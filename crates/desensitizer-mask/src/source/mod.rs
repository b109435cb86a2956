//! Row source contract consumed by the engine.

use futures::stream::BoxStream;

use desensitizer_core::{Columns, Row};

use crate::errors::RowSourceError;

mod memory;

pub use memory::MemorySource;

/// Lazy, finite, forward-only rows of one table.
pub type RowStream<'a> = BoxStream<'a, Result<Row, RowSourceError>>;

/// Provides the rows of named tables.
pub trait TableSource {
    /// Ordered column names of `table`, or `None` when the table does not
    /// exist. Must not read any row.
    fn describe(&self, table: &str) -> Result<Option<Columns>, RowSourceError>;

    /// Open a row stream for `table`.
    fn open<'a>(&'a self, table: &str) -> Result<RowStream<'a>, RowSourceError>;
}
