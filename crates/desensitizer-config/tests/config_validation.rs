use std::fs;
use std::path::PathBuf;

use desensitizer_config::{
    ConfigError, MissingColumnPolicy, OutputFormat, ScopeSelector, StrategyKind, load_config,
    validate_config, validate_config_json,
};
use serde_json::json;

#[test]
fn minimal_config_validates_with_defaults() {
    let document = json!({
        "seed": 7,
        "tables": [
            {"name": "customers", "columns": [{"name": "customerName", "type": "company"}]}
        ]
    });

    let validated = validate_config(&document).expect("config should validate");
    let config = validated.config;
    assert!(validated.warnings.is_empty(), "unexpected warnings");
    assert_eq!(config.output_format, OutputFormat::Csv);
    assert_eq!(config.strategy, StrategyKind::Hashed);
    assert_eq!(config.default_scope, ScopeSelector::Type);
    assert_eq!(config.on_missing_column, MissingColumnPolicy::Error);
    assert!(!config.include_unconfigured_tables);
    assert_eq!(config.tables[0].columns[0].type_tag, "company");
}

#[test]
fn scope_selectors_parse_from_strings_and_objects() {
    let document = json!({
        "seed": 1,
        "default_scope": "column",
        "tables": [{"name": "orders", "columns": [
            {"name": "a", "type": "company", "scope": "global"},
            {"name": "b", "type": "city", "scope": {"named": "places"}},
            {"name": "c", "type": "city"}
        ]}]
    });

    let config = validate_config(&document).expect("config should validate").config;
    let columns = &config.tables[0].columns;
    assert_eq!(columns[0].scope, Some(ScopeSelector::Global));
    assert_eq!(columns[1].scope, Some(ScopeSelector::Named("places".to_string())));
    assert_eq!(columns[2].scope_or(&config.default_scope), &ScopeSelector::Column);
}

#[test]
fn unknown_fields_are_schema_violations() {
    let document = json!({
        "tables": [{"name": "customers", "colums": []}]
    });

    let report = validate_config_json(&document).expect("compile schema");
    assert!(!report.is_ok());
    assert!(report.has_code("schema_violation"));
}

#[test]
fn unsupported_strategy_is_rejected() {
    let document = json!({"strategy": "random", "tables": []});

    let report = validate_config(&document).expect_err("strategy must be rejected");
    assert!(report.has_code("schema_violation"));
}

#[test]
fn duplicate_tables_and_columns_are_errors() {
    let document = json!({
        "seed": 3,
        "tables": [
            {"name": "customers", "columns": [
                {"name": "phone", "type": "phone"},
                {"name": "PHONE", "type": "phone"}
            ]},
            {"name": "Customers", "columns": []}
        ]
    });

    let report = validate_config(&document).expect_err("duplicates must be rejected");
    assert!(report.has_code("table_duplicate"));
    assert!(report.has_code("column_duplicate"));
}

#[test]
fn shared_scope_cannot_span_two_types() {
    let document = json!({
        "seed": 3,
        "default_scope": "global",
        "tables": [{"name": "employees", "columns": [
            {"name": "firstName", "type": "first_name"},
            {"name": "lastName", "type": "last_name"},
            {"name": "notes", "type": "blank"}
        ]}]
    });

    let report = validate_config(&document).expect_err("mixed global scope must be rejected");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, "scope_mixed_types");
    assert_eq!(report.errors[0].path, "/tables/0/columns/1/scope");
}

#[test]
fn named_scope_may_span_tables_with_one_type() {
    let document = json!({
        "seed": 3,
        "tables": [
            {"name": "customers", "columns": [
                {"name": "customerName", "type": "company", "scope": {"named": "customer"}}
            ]},
            {"name": "orders", "columns": [
                {"name": "customer", "type": "company", "scope": {"named": "customer"}}
            ]}
        ]
    });

    assert!(validate_config(&document).is_ok());
}

#[test]
fn hashed_strategy_without_seed_warns() {
    let document = json!({
        "tables": [{"name": "customers", "columns": [{"name": "city", "type": "city"}]}]
    });

    let validated = validate_config(&document).expect("config should validate");
    assert_eq!(validated.warnings.len(), 1);
    assert_eq!(validated.warnings[0].code, "seed_not_set");
}

#[test]
fn empty_table_list_requires_passthrough_flag() {
    let document = json!({"seed": 1, "tables": []});
    let report = validate_config(&document).expect_err("empty tables must be rejected");
    assert!(report.has_code("tables_empty"));

    let document = json!({"seed": 1, "include_unconfigured_tables": true, "tables": []});
    assert!(validate_config(&document).is_ok());
}

#[test]
fn loads_toml_configuration_files() {
    let path = temp_path("config.toml");
    fs::write(
        &path,
        r#"
output_format = "sql"
strategy = "cached"

[[tables]]
name = "customers"
columns = [
  { name = "customerName", type = "company" },
  { name = "phone", type = "phone", scope = "column" },
]
"#,
    )
    .expect("write toml config");

    let validated = load_config(&path).expect("load toml config");
    assert_eq!(validated.config.output_format, OutputFormat::Sql);
    assert_eq!(validated.config.strategy, StrategyKind::Cached);
    assert_eq!(validated.config.tables[0].columns.len(), 2);
}

#[test]
fn invalid_file_reports_every_error() {
    let path = temp_path("config.json");
    fs::write(
        &path,
        r#"{"seed": 1, "tables": [{"name": "", "columns": [{"name": "x", "type": ""}]}]}"#,
    )
    .expect("write json config");

    match load_config(&path) {
        Err(ConfigError::Invalid(report)) => {
            assert!(report.has_code("table_name_empty"));
            assert!(report.has_code("type_empty"));
        }
        other => panic!("expected invalid config, got {other:?}"),
    }
}

fn temp_path(file_name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("desensitizer_config_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir.join(file_name)
}
