use tracing::{debug, warn};

use desensitizer_core::{Columns, NameMatch, match_name};
use desensitizer_mask::{RowSourceError, RowStream, TableSource};

use crate::adapter::SourceAdapter;
use crate::error::{Result, SourceError};
use crate::table::{SourceTable, render_create_table};

/// Pre-described tables of one database, served to the masking engine.
///
/// Every table is described when the catalog is loaded, so the engine can
/// bind its column plans before a single row is read. Tables that do not
/// exist are left out and surface as unknown tables when the run binds.
pub struct CatalogSource {
    adapter: Box<dyn SourceAdapter>,
    tables: Vec<SourceTable>,
}

impl CatalogSource {
    pub async fn load<I, S>(adapter: Box<dyn SourceAdapter>, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tables = Vec::new();
        for name in names {
            match adapter.describe_table(name.as_ref()).await {
                Ok(table) => tables.push(table),
                Err(SourceError::TableNotFound { table }) => {
                    warn!(table = %table, "table not found in source database");
                }
                Err(err) => return Err(err),
            }
        }
        debug!(
            engine = adapter.engine(),
            tables = tables.len(),
            "source catalog loaded"
        );
        Ok(Self { adapter, tables })
    }

    pub fn adapter(&self) -> &dyn SourceAdapter {
        self.adapter.as_ref()
    }

    pub fn tables(&self) -> &[SourceTable] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&SourceTable> {
        let names: Vec<&str> = self.tables.iter().map(|table| table.name.as_str()).collect();
        match match_name(&names[..], name) {
            NameMatch::Found(index) => self.tables.get(index),
            NameMatch::Missing | NameMatch::Ambiguous => None,
        }
    }

    /// DDL recreating `name` in the adapter's dialect.
    pub fn create_table_sql(&self, name: &str) -> Option<String> {
        self.table(name)
            .map(|table| render_create_table(table, self.adapter.dialect()))
    }
}

impl TableSource for CatalogSource {
    fn describe(&self, table: &str) -> std::result::Result<Option<Columns>, RowSourceError> {
        Ok(self.table(table).map(|entry| entry.column_names().clone()))
    }

    fn open<'a>(&'a self, table: &str) -> std::result::Result<RowStream<'a>, RowSourceError> {
        let entry = self
            .table(table)
            .ok_or_else(|| RowSourceError::new(format!("table '{table}' was not described")))?;
        Ok(self.adapter.rows(entry))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use futures::{StreamExt, stream};

    use desensitizer_core::{CellValue, Row};
    use desensitizer_mask::SqlDialect;

    use super::*;
    use crate::table::SourceColumn;

    struct FixedAdapter;

    fn customers() -> SourceTable {
        SourceTable::new(
            SqlDialect::MySql,
            None,
            "customers".to_string(),
            vec![SourceColumn {
                name: "customerName".to_string(),
                data_type: "varchar(50)".to_string(),
                nullable: false,
            }],
            Vec::new(),
        )
    }

    #[async_trait]
    impl SourceAdapter for FixedAdapter {
        fn engine(&self) -> &'static str {
            "fixed"
        }

        fn dialect(&self) -> SqlDialect {
            SqlDialect::MySql
        }

        async fn database_name(&self) -> Result<String> {
            Ok("classicmodels".to_string())
        }

        async fn list_tables(&self) -> Result<Vec<String>> {
            Ok(vec!["customers".to_string()])
        }

        async fn describe_table(&self, table: &str) -> Result<SourceTable> {
            if table.eq_ignore_ascii_case("customers") {
                Ok(customers())
            } else {
                Err(SourceError::TableNotFound {
                    table: table.to_string(),
                })
            }
        }

        fn rows<'a>(&'a self, table: &'a SourceTable) -> RowStream<'a> {
            let row = Row::new(
                table.column_names().clone(),
                vec![CellValue::text("Acme Inc")],
            );
            stream::iter(vec![row.map_err(|err| RowSourceError::with_source("bad row", err))])
                .boxed()
        }
    }

    #[tokio::test]
    async fn missing_tables_are_left_out() {
        let catalog = CatalogSource::load(Box::new(FixedAdapter), ["Customers", "payments"])
            .await
            .expect("load catalog");

        assert_eq!(catalog.tables().len(), 1);
        assert!(catalog.describe("payments").expect("describe").is_none());
        let columns = catalog
            .describe("CUSTOMERS")
            .expect("describe")
            .expect("customers described");
        assert_eq!(columns.to_vec(), vec!["customerName".to_string()]);
    }

    #[tokio::test]
    async fn open_streams_rows_of_described_tables() {
        let catalog = CatalogSource::load(Box::new(FixedAdapter), ["customers"])
            .await
            .expect("load catalog");

        let rows: Vec<_> = catalog.open("customers").expect("open").collect().await;
        assert_eq!(rows.len(), 1);
        assert!(catalog.open("payments").is_err());
        assert_eq!(
            catalog.create_table_sql("customers").as_deref(),
            Some("CREATE TABLE IF NOT EXISTS `customers` (\n  `customerName` varchar(50) NOT NULL\n);")
        );
    }
}
