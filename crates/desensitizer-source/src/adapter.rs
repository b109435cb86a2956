use async_trait::async_trait;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use desensitizer_core::{NameMatch, match_name, redact_connection_string};
use desensitizer_mask::{RowStream, SqlDialect};

use crate::error::{Result, SourceError};
use crate::mysql::MySqlSource;
use crate::options::SourceOptions;
use crate::postgres::PostgresSource;
use crate::table::SourceTable;

/// Trait implemented by database adapters that can serve table rows.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    fn dialect(&self) -> SqlDialect;

    /// Name of the connected database.
    async fn database_name(&self) -> Result<String>;

    /// Base tables, sorted by name.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Columns in ordinal order, primary key and the row query of `table`.
    /// The name is matched case-insensitively.
    async fn describe_table(&self, table: &str) -> Result<SourceTable>;

    /// Stream every row of a described table.
    fn rows<'a>(&'a self, table: &'a SourceTable) -> RowStream<'a>;
}

/// Connect to the database named by `database_url`, picking the adapter from
/// the URL scheme.
pub async fn connect(
    database_url: &str,
    options: &SourceOptions,
) -> Result<Box<dyn SourceAdapter>> {
    let engine = database_url
        .split_once("://")
        .map(|(scheme, _)| scheme)
        .unwrap_or_default();
    let redacted = redact_connection_string(database_url);

    let adapter: Box<dyn SourceAdapter> = match engine {
        "postgres" | "postgresql" => {
            let pool = PgPoolOptions::new()
                .max_connections(options.max_connections)
                .acquire_timeout(options.acquire_timeout)
                .connect(database_url)
                .await?;
            Box::new(PostgresSource::new(pool, options.schema.clone()))
        }
        "mysql" | "mariadb" => {
            let pool = MySqlPoolOptions::new()
                .max_connections(options.max_connections)
                .acquire_timeout(options.acquire_timeout)
                .connect(database_url)
                .await?;
            Box::new(MySqlSource::new(pool))
        }
        other => return Err(SourceError::UnsupportedEngine(other.to_string())),
    };

    info!(
        engine = adapter.engine(),
        connection = %redacted.redacted,
        "connected to source database"
    );
    Ok(adapter)
}

/// Locate `wanted` among `tables`: the exact name first, then a unique
/// case-insensitive match.
pub(crate) fn resolve_table_name(tables: &[String], wanted: &str) -> Result<String> {
    match match_name(tables, wanted) {
        NameMatch::Found(index) => Ok(tables[index].clone()),
        NameMatch::Missing => Err(SourceError::TableNotFound {
            table: wanted.to_string(),
        }),
        NameMatch::Ambiguous => Err(SourceError::AmbiguousTable {
            table: wanted.to_string(),
        }),
    }
}
