use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use desensitizer_mask::{RowStream, SqlDialect};

use crate::adapter::{SourceAdapter, resolve_table_name};
use crate::decode::row_stream;
use crate::error::Result;
use crate::table::{SourceColumn, SourceTable};

mod queries;

/// Adapter for PostgreSQL databases, reading one schema.
#[derive(Debug, Clone)]
pub struct PostgresSource {
    pool: PgPool,
    schema: String,
}

impl PostgresSource {
    /// Create a new adapter using a pre-configured pool.
    pub fn new(pool: PgPool, schema: String) -> Self {
        Self { pool, schema }
    }
}

#[async_trait]
impl SourceAdapter for PostgresSource {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::Postgres
    }

    async fn database_name(&self) -> Result<String> {
        queries::fetch_database_name(&self.pool).await
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        queries::list_tables(&self.pool, &self.schema).await
    }

    async fn describe_table(&self, table: &str) -> Result<SourceTable> {
        let name = resolve_table_name(&self.list_tables().await?, table)?;
        let columns = queries::list_columns(&self.pool, &self.schema, &name)
            .await?
            .into_iter()
            .map(|(name, data_type, nullable)| SourceColumn {
                name,
                data_type,
                nullable,
            })
            .collect::<Vec<_>>();
        let primary_key = queries::primary_key(&self.pool, &self.schema, &name).await?;
        debug!(
            schema = %self.schema,
            table = %name,
            columns = columns.len(),
            "described table"
        );
        Ok(SourceTable::new(
            self.dialect(),
            Some(self.schema.clone()),
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
