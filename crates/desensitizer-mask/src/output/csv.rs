use std::io::Write;

use desensitizer_core::{CellValue, Columns, Row};

use crate::errors::SinkError;
use crate::output::{CountingWriter, RowSink, check_shape};

/// Header row followed by one record per row. Null renders as an empty field.
pub struct CsvSink<W: Write + Send> {
    columns: Columns,
    writer: csv::Writer<CountingWriter<W>>,
}

impl<W: Write + Send> CsvSink<W> {
    pub fn new(inner: W, columns: Columns) -> Result<Self, SinkError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(CountingWriter::new(inner));
        writer.write_record(columns.iter())?;
        Ok(Self { columns, writer })
    }
}

impl<W: Write + Send> RowSink for CsvSink<W> {
    fn write_row(&mut self, row: &Row) -> Result<(), SinkError> {
        check_shape(&self.columns, row)?;
        self.writer
            .write_record(row.values().iter().map(CellValue::to_csv))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<u64, SinkError> {
        self.writer.flush()?;
        Ok(self.writer.get_ref().bytes_written())
    }
}

#[cfg(test)]
mod tests {
    use desensitizer_core::columns;

    use super::*;

    #[test]
    fn writes_header_and_quotes_fields() {
        let header = columns(["id", "name", "note"]);
        let mut buffer = Vec::new();
        let bytes = {
            let mut sink = CsvSink::new(&mut buffer, header.clone()).expect("sink");
            let row = Row::new(
                header.clone(),
                vec![
                    CellValue::Int(1),
                    CellValue::text("Acme, Inc"),
                    CellValue::Null,
                ],
            )
            .expect("row");
            sink.write_row(&row).expect("write");
            sink.finish().expect("finish")
        };

        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(text, "id,name,note\n1,\"Acme, Inc\",\n");
        assert_eq!(bytes, text.len() as u64);
    }

    #[test]
    fn rejects_rows_of_another_table() {
        let mut sink = CsvSink::new(Vec::new(), columns(["id"])).expect("sink");
        let row = Row::new(columns(["a", "b"]), vec![CellValue::Null, CellValue::Null])
            .expect("row");
        assert!(matches!(sink.write_row(&row), Err(SinkError::ShapeMismatch)));
    }
}
