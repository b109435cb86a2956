use std::error::Error as StdError;

use thiserror::Error;

use desensitizer_config::ValidationReport;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Raised before any row is read when the configuration cannot be turned
/// into column plans.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid configuration: {}", describe_report(.0))]
    Invalid(ValidationReport),
    #[error("unknown type '{type_tag}' for column '{table}.{column}'")]
    UnknownType {
        table: String,
        column: String,
        type_tag: String,
    },
    #[error("table '{table}' not found in source")]
    UnknownTable { table: String },
    #[error("column '{table}.{column}' not found in source table")]
    MissingColumn { table: String, column: String },
    #[error("column '{table}.{column}' matches several source columns differing only by case")]
    AmbiguousColumn { table: String, column: String },
}

fn describe_report(report: &ValidationReport) -> String {
    report
        .errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Registry lookup miss.
#[derive(Debug, Error)]
#[error("unknown type tag '{0}'")]
pub struct UnknownTypeError(pub String);

/// A generator could not produce a value for a seed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GeneratorError {
    message: String,
}

impl GeneratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure reported by a row source.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RowSourceError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl RowSourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Failure reported by an output sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row does not match the table's columns")]
    ShapeMismatch,
}

/// Errors emitted by a desensitization run.
///
/// Every table-scoped variant carries the number of rows already emitted for
/// that table, so callers can decide whether partial output is usable.
#[derive(Debug, Error)]
pub enum DesensitizeError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error(
        "generator '{type_tag}' failed for '{table}.{column}' at row {row_index} (scope {scope}): {source}"
    )]
    GeneratorFailure {
        table: String,
        column: String,
        row_index: u64,
        scope: String,
        type_tag: String,
        #[source]
        source: GeneratorError,
    },
    #[error("row source failed for table '{table}' after {rows_emitted} rows: {source}")]
    RowSource {
        table: String,
        rows_emitted: u64,
        #[source]
        source: RowSourceError,
    },
    #[error("sink write failed for table '{table}' after {rows_emitted} rows: {source}")]
    SinkWrite {
        table: String,
        rows_emitted: u64,
        #[source]
        source: SinkError,
    },
    #[error("run cancelled during table '{table}' after {rows_emitted} rows")]
    Cancelled { table: String, rows_emitted: u64 },
}

impl DesensitizeError {
    /// Table the failure belongs to, when it is table-scoped.
    pub fn table(&self) -> Option<&str> {
        match self {
            DesensitizeError::Configuration(_) => None,
            DesensitizeError::GeneratorFailure { table, .. }
            | DesensitizeError::RowSource { table, .. }
            | DesensitizeError::SinkWrite { table, .. }
            | DesensitizeError::Cancelled { table, .. } => Some(table),
        }
    }

    /// Rows successfully emitted for the failing table.
    pub fn rows_emitted(&self) -> Option<u64> {
        match self {
            DesensitizeError::GeneratorFailure { row_index, .. } => Some(*row_index),
            DesensitizeError::RowSource { rows_emitted, .. }
            | DesensitizeError::SinkWrite { rows_emitted, .. }
            | DesensitizeError::Cancelled { rows_emitted, .. } => Some(*rows_emitted),
            DesensitizeError::Configuration(_) => None,
        }
    }
}
