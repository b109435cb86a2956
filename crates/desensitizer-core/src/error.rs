use thiserror::Error;

/// Core error type shared across desensitizer crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A row carried a different number of values than its table has columns.
    #[error("row has {actual} values but the table has {expected} columns")]
    ShapeMismatch { expected: usize, actual: usize },
    /// A connection string could not be parsed.
    #[error("invalid connection string: {0}")]
    InvalidConnection(String),
}

/// Convenience alias for results returned by desensitizer crates.
pub type Result<T> = std::result::Result<T, Error>;
