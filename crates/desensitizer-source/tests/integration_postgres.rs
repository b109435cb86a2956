use std::env;

use anyhow::{Context, Result};
use desensitizer_core::CellValue;
use desensitizer_mask::TableSource;
use desensitizer_source::{CatalogSource, PostgresSource, SourceAdapter};
use futures::StreamExt;
use sqlx::{PgPool, postgres::PgPoolOptions};

const FIXTURE: &str = r#"
drop table if exists desensitizer_customers;
create table desensitizer_customers (
  customer_number integer primary key,
  customer_name varchar(50) not null,
  credit_limit numeric(10, 2),
  phone text
);
insert into desensitizer_customers values
  (114, 'Globex', 117300.00, '03 9520 4555'),
  (103, 'Acme Inc', 21000.00, null),
  (112, 'Acme Inc', 71800.00, '40.32.2555')
"#;

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
        .filter(|url| url.starts_with("postgres"))
}

async fn load_fixture(pool: &PgPool) -> Result<()> {
    for statement in FIXTURE.split(';') {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql)
            .execute(pool)
            .await
            .with_context(|| format!("executing fixture statement: {sql}"))?;
    }
    Ok(())
}

#[tokio::test]
async fn streams_text_cast_rows_in_primary_key_order() -> Result<()> {
    let Some(db_url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL to a PostgreSQL database");
        return Ok(());
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&db_url)
        .await
        .context("connecting to test database")?;
    load_fixture(&pool).await?;

    let adapter = PostgresSource::new(pool, "public".to_string());
    let table = adapter.describe_table("DESENSITIZER_CUSTOMERS").await?;
    assert_eq!(table.primary_key, vec!["customer_number".to_string()]);
    assert_eq!(table.columns.len(), 4);
    assert!(!table.columns[1].nullable);

    let catalog = CatalogSource::load(Box::new(adapter), ["desensitizer_customers"]).await?;
    let rows: Vec<_> = catalog
        .open("desensitizer_customers")
        .context("opening rows")?
        .collect()
        .await;
    let rows = rows.into_iter().collect::<Result<Vec<_>, _>>()?;

    let numbers: Vec<_> = rows
        .iter()
        .map(|row| row.get("customer_number").cloned())
        .collect();
    assert_eq!(
        numbers,
        vec![
            Some(CellValue::text("103")),
            Some(CellValue::text("112")),
            Some(CellValue::text("114")),
        ]
    );
    assert_eq!(rows[0].get("phone"), Some(&CellValue::Null));
    assert_eq!(rows[0].get("credit_limit"), Some(&CellValue::text("21000.00")));
    Ok(())
}
