use desensitizer_core::{Columns, columns as column_list};
use desensitizer_mask::SqlDialect;

/// One column of a described table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    pub name: String,
    /// Type as reported by the database catalog (ex.: `varchar(50)`).
    pub data_type: String,
    pub nullable: bool,
}

/// A described source table and the query that streams its rows.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub name: String,
    pub schema: Option<String>,
    pub columns: Vec<SourceColumn>,
    pub primary_key: Vec<String>,
    pub select_sql: String,
    column_names: Columns,
}

impl SourceTable {
    pub fn new(
        dialect: SqlDialect,
        schema: Option<String>,
        name: String,
        columns: Vec<SourceColumn>,
        primary_key: Vec<String>,
    ) -> Self {
        let select_sql = select_sql(dialect, schema.as_deref(), &name, &columns, &primary_key);
        let column_names = column_list(columns.iter().map(|column| column.name.clone()));
        Self {
            name,
            schema,
            columns,
            primary_key,
            select_sql,
            column_names,
        }
    }

    /// Ordered column names shared by every row read from this table.
    pub fn column_names(&self) -> &Columns {
        &self.column_names
    }
}

fn qualified_name(dialect: SqlDialect, schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", dialect.quote_ident(schema), dialect.quote_ident(table)),
        None => dialect.quote_ident(table),
    }
}

fn text_projection(dialect: SqlDialect, column: &str) -> String {
    let ident = dialect.quote_ident(column);
    match dialect {
        SqlDialect::MySql => format!("CAST({ident} AS CHAR) AS {ident}"),
        SqlDialect::Postgres | SqlDialect::Ansi => format!("CAST({ident} AS TEXT) AS {ident}"),
    }
}

/// Row query casting every column to text, ordered by primary key when the
/// table has one.
pub fn select_sql(
    dialect: SqlDialect,
    schema: Option<&str>,
    table: &str,
    columns: &[SourceColumn],
    primary_key: &[String],
) -> String {
    let projection = columns
        .iter()
        .map(|column| text_projection(dialect, &column.name))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!(
        "SELECT {projection} FROM {}",
        qualified_name(dialect, schema, table)
    );
    if !primary_key.is_empty() {
        let order = primary_key
            .iter()
            .map(|column| dialect.quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" ORDER BY {order}"));
    }
    sql
}

/// `CREATE TABLE IF NOT EXISTS` statement recreating the table's columns and
/// primary key. Written ahead of the inserts in SQL output.
pub fn render_create_table(table: &SourceTable, dialect: SqlDialect) -> String {
    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            let null = if column.nullable { "" } else { " NOT NULL" };
            format!(
                "  {} {}{null}",
                dialect.quote_ident(&column.name),
                column.data_type
            )
        })
        .collect();
    if !table.primary_key.is_empty() {
        let key = table
            .primary_key
            .iter()
            .map(|column| dialect.quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("  PRIMARY KEY ({key})"));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        dialect.quote_ident(&table.name),
        lines.join(",\n")
    )
}
