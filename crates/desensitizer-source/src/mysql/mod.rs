use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::debug;

use desensitizer_mask::{RowStream, SqlDialect};

use crate::adapter::{SourceAdapter, resolve_table_name};
use crate::decode::row_stream;
use crate::error::{Result, SourceError};
use crate::table::{SourceColumn, SourceTable};

mod queries;

/// Adapter for MySQL and MariaDB, reading the connection's default database.
#[derive(Debug, Clone)]
pub struct MySqlSource {
    pool: MySqlPool,
}

impl MySqlSource {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SourceAdapter for MySqlSource {
    fn engine(&self) -> &'static str {
        "mysql"
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::MySql
    }

    async fn database_name(&self) -> Result<String> {
        queries::fetch_database_name(&self.pool)
            .await?
            .ok_or(SourceError::NoDatabase)
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        queries::list_tables(&self.pool).await
    }

    async fn describe_table(&self, table: &str) -> Result<SourceTable> {
        let name = resolve_table_name(&self.list_tables().await?, table)?;
        let columns = queries::list_columns(&self.pool, &name)
            .await?
            .into_iter()
            .map(|(name, data_type, nullable)| SourceColumn {
                name,
                data_type,
                nullable: nullable.eq_ignore_ascii_case("YES"),
            })
            .collect::<Vec<_>>();
        let primary_key = queries::primary_key(&self.pool, &name).await?;
        debug!(table = %name, columns = columns.len(), "described table");
        Ok(SourceTable::new(
            self.dialect(),
            None,
            name,
            columns,
            primary_key,
        ))
    }

    fn rows<'a>(&'a self, table: &'a SourceTable) -> RowStream<'a> {
        let rows = sqlx::query(&table.select_sql).fetch(&self.pool);
        row_stream(&table.name, table.column_names().clone(), rows)
    }
}
