use sqlx::MySqlPool;

use crate::error::Result;

// information_schema columns are cast to CHAR so they decode as text on
// every server version.

pub async fn fetch_database_name(pool: &MySqlPool) -> Result<Option<String>> {
    let name = sqlx::query_scalar::<_, Option<String>>("select cast(database() as char)")
        .fetch_one(pool)
        .await?;
    Ok(name)
}

pub async fn list_tables(pool: &MySqlPool) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        select cast(table_name as char)
        from information_schema.tables
        where table_schema = database()
          and table_type = 'BASE TABLE'
        order by table_name
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(names)
}

pub async fn list_columns(pool: &MySqlPool, table: &str) -> Result<Vec<(String, String, String)>> {
    let rows = sqlx::query_as::<_, (String, String, String)>(
        r#"
        select
          cast(column_name as char),
          cast(column_type as char),
          cast(is_nullable as char)
        from information_schema.columns
        where table_schema = database()
          and table_name = ?
        order by ordinal_position
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn primary_key(pool: &MySqlPool, table: &str) -> Result<Vec<String>> {
    let columns = sqlx::query_scalar::<_, String>(
        r#"
        select cast(column_name as char)
        from information_schema.key_column_usage
        where table_schema = database()
          and table_name = ?
          and constraint_name = 'PRIMARY'
        order by ordinal_position
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await?;
    Ok(columns)
}
