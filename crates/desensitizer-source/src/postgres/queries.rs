use sqlx::PgPool;

use crate::error::Result;

pub async fn fetch_database_name(pool: &PgPool) -> Result<String> {
    let name = sqlx::query_scalar::<_, String>("select current_database()::text")
        .fetch_one(pool)
        .await?;
    Ok(name)
}

pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        select table_name::text
        from information_schema.tables
        where table_schema = $1
          and table_type = 'BASE TABLE'
        order by table_name
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await?;
    Ok(names)
}

pub async fn list_columns(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<(String, String, bool)>> {
    let rows = sqlx::query_as::<_, (String, String, bool)>(
        r#"
        select
          column_name::text,
          data_type::text,
          is_nullable = 'YES'
        from information_schema.columns
        where table_schema = $1
          and table_name = $2
        order by ordinal_position
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn primary_key(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<String>> {
    let columns = sqlx::query_scalar::<_, String>(
        r#"
        select kcu.column_name::text
        from information_schema.table_constraints tc
        join information_schema.key_column_usage kcu
          on kcu.constraint_name = tc.constraint_name
         and kcu.table_schema = tc.table_schema
         and kcu.table_name = tc.table_name
        where tc.constraint_type = 'PRIMARY KEY'
          and tc.table_schema = $1
          and tc.table_name = $2
        order by kcu.ordinal_position
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await?;
    Ok(columns)
}
