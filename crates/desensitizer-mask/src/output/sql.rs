use std::io::Write;

use desensitizer_core::{CellValue, Columns, Row};

use crate::errors::SinkError;
use crate::output::{CountingWriter, RowSink, check_shape};

/// Identifier quoting rules of the target database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SqlDialect {
    #[default]
    Ansi,
    Postgres,
    MySql,
}

impl SqlDialect {
    pub fn quote_ident(self, ident: &str) -> String {
        match self {
            SqlDialect::MySql => format!("`{}`", ident.replace('`', "``")),
            SqlDialect::Ansi | SqlDialect::Postgres => {
                format!("\"{}\"", ident.replace('"', "\"\""))
            }
        }
    }
}

/// SQL literal for a cell: `NULL`, bare numbers and booleans, quoted text.
pub fn sql_literal(value: &CellValue) -> String {
    match value {
        CellValue::Null => "NULL".to_string(),
        CellValue::Text(text) => quote_text(text),
        CellValue::Int(value) => value.to_string(),
        CellValue::Float(value) if value.is_finite() => value.to_string(),
        CellValue::Float(_) => "NULL".to_string(),
        CellValue::Bool(true) => "TRUE".to_string(),
        CellValue::Bool(false) => "FALSE".to_string(),
        date @ CellValue::Date(_) => quote_text(&date.to_string()),
    }
}

fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Optional DDL preamble, then one `INSERT` statement per row.
pub struct SqlSink<W: Write + Send> {
    columns: Columns,
    table: String,
    out: CountingWriter<W>,
}

impl<W: Write + Send> SqlSink<W> {
    pub fn new(
        inner: W,
        table: &str,
        columns: Columns,
        dialect: SqlDialect,
        preamble: Option<&str>,
    ) -> Result<Self, SinkError> {
        let mut out = CountingWriter::new(inner);
        if let Some(preamble) = preamble {
            writeln!(out, "{}", preamble.trim_end())?;
            writeln!(out)?;
        }
        Ok(Self {
            columns,
            table: dialect.quote_ident(table),
            out,
        })
    }
}

impl<W: Write + Send> RowSink for SqlSink<W> {
    fn write_row(&mut self, row: &Row) -> Result<(), SinkError> {
        check_shape(&self.columns, row)?;
        let values = row
            .values()
            .iter()
            .map(sql_literal)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(self.out, "INSERT INTO {} VALUES ({values});", self.table)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<u64, SinkError> {
        self.out.flush()?;
        Ok(self.out.bytes_written())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use desensitizer_core::columns;

    use super::*;

    #[test]
    fn literals_follow_value_kind() {
        assert_eq!(sql_literal(&CellValue::Null), "NULL");
        assert_eq!(sql_literal(&CellValue::text("O'Brien")), "'O''Brien'");
        assert_eq!(sql_literal(&CellValue::Int(-3)), "-3");
        assert_eq!(sql_literal(&CellValue::Float(12.5)), "12.5");
        assert_eq!(sql_literal(&CellValue::Bool(true)), "TRUE");
        let date = NaiveDate::from_ymd_opt(2001, 2, 3).expect("date");
        assert_eq!(sql_literal(&CellValue::Date(date)), "'2001-02-03'");
    }

    #[test]
    fn identifiers_are_quoted_per_dialect() {
        assert_eq!(SqlDialect::MySql.quote_ident("order`s"), "`order``s`");
        assert_eq!(SqlDialect::Postgres.quote_ident("Customers"), "\"Customers\"");
    }

    #[test]
    fn writes_preamble_then_inserts() {
        let header = columns(["id", "name"]);
        let mut buffer = Vec::new();
        {
            let mut sink = SqlSink::new(
                &mut buffer,
                "customers",
                header.clone(),
                SqlDialect::MySql,
                Some("CREATE TABLE IF NOT EXISTS `customers` (`id` int, `name` text);"),
            )
            .expect("sink");
            let row = Row::new(header, vec![CellValue::Int(1), CellValue::Null]).expect("row");
            sink.write_row(&row).expect("write");
            sink.finish().expect("finish");
        }

        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(
            text,
            "CREATE TABLE IF NOT EXISTS `customers` (`id` int, `name` text);\n\n\
             INSERT INTO `customers` VALUES (1, NULL);\n"
        );
    }
}
