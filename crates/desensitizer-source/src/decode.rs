use futures::stream::BoxStream;
use futures::StreamExt;

use desensitizer_core::{CellValue, Columns, Row};
use desensitizer_mask::{RowSourceError, RowStream};

/// Turn a database row of text-cast columns into a [`Row`].
pub(crate) fn decode_row<R>(columns: &Columns, row: &R) -> Result<Row, RowSourceError>
where
    R: sqlx::Row,
    for<'r> Option<String>: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
    usize: sqlx::ColumnIndex<R>,
{
    let mut values = Vec::with_capacity(columns.len());
    for (index, name) in columns.iter().enumerate() {
        let value: Option<String> = row.try_get(index).map_err(|err| {
            RowSourceError::with_source(format!("column '{name}' could not be decoded"), err)
        })?;
        values.push(CellValue::from(value));
    }
    Row::new(columns.clone(), values)
        .map_err(|err| RowSourceError::with_source("row does not match described columns", err))
}

/// Adapt a sqlx row stream to the engine's row stream.
pub(crate) fn row_stream<'a, R>(
    table: &str,
    columns: Columns,
    rows: BoxStream<'a, Result<R, sqlx::Error>>,
) -> RowStream<'a>
where
    R: sqlx::Row + 'a,
    for<'r> Option<String>: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
    usize: sqlx::ColumnIndex<R>,
{
    let table = table.to_string();
    rows.map(move |result| {
        let row = result.map_err(|err| {
            RowSourceError::with_source(format!("failed to read rows of '{table}'"), err)
        })?;
        decode_row(&columns, &row)
    })
    .boxed()
}
