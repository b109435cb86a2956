use thiserror::Error;

/// Errors raised while connecting to or describing a source database.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("table '{table}' not found")]
    TableNotFound { table: String },
    #[error("table '{table}' matches several tables differing only by case")]
    AmbiguousTable { table: String },
    #[error("unsupported database engine '{0}' (expected postgres or mysql)")]
    UnsupportedEngine(String),
    #[error("connection does not select a database")]
    NoDatabase,
}

pub type Result<T> = std::result::Result<T, SourceError>;
