use std::collections::HashMap;
use std::fs::{File, create_dir_all};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use desensitizer_config::OutputFormat;
use desensitizer_core::Columns;

use crate::errors::SinkError;
use crate::output::{CsvSink, RowSink, SinkFactory, SqlDialect, SqlSink};

/// Writes each table to `<dir>/<table>_desensitized.<csv|sql>`.
#[derive(Debug, Clone)]
pub struct DirectorySinks {
    dir: PathBuf,
    format: OutputFormat,
    dialect: SqlDialect,
    preambles: HashMap<String, String>,
}

impl DirectorySinks {
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            dialect: SqlDialect::default(),
            preambles: HashMap::new(),
        }
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// DDL written ahead of the inserts of `table` in SQL output.
    pub fn with_preamble(mut self, table: &str, ddl: String) -> Self {
        self.preambles.insert(table.to_lowercase(), ddl);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, table: &str) -> PathBuf {
        self.dir
            .join(format!("{table}_desensitized.{}", self.format.extension()))
    }
}

impl SinkFactory for DirectorySinks {
    fn open(&mut self, table: &str, columns: &Columns) -> Result<Box<dyn RowSink>, SinkError> {
        create_dir_all(&self.dir)?;
        let writer = BufWriter::new(File::create(self.path_for(table))?);
        let sink: Box<dyn RowSink> = match self.format {
            OutputFormat::Csv => Box::new(CsvSink::new(writer, columns.clone())?),
            OutputFormat::Sql => Box::new(SqlSink::new(
                writer,
                table,
                columns.clone(),
                self.dialect,
                self.preambles.get(&table.to_lowercase()).map(String::as_str),
            )?),
        };
        Ok(sink)
    }
}
