use std::time::Duration;

/// Options that control how sources connect and read.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// PostgreSQL schema to read tables from. Ignored for MySQL.
    pub schema: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}
