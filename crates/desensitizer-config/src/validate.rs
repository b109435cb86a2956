use std::collections::{HashMap, HashSet};

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{ConfigError, ValidationIssue, ValidationReport};
use crate::model::{DesensitizeConfig, ScopeSelector, StrategyKind, TableSpec};
use crate::schema::config_json_schema;

/// Type tag that suppresses a column to the empty string.
pub const BLANK_TYPE: &str = "blank";

/// Validated configuration with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub config: DesensitizeConfig,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a configuration document against the configuration JSON Schema.
pub fn validate_config_json(config_json: &Value) -> Result<ValidationReport, ConfigError> {
    let schema = serde_json::to_value(config_json_schema())?;
    let compiled = JSONSchema::compile(&schema).map_err(|err| ConfigError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();
    if let Err(errors) = compiled.validate(config_json) {
        for error in errors {
            report.push(ValidationIssue::error(
                "schema_violation",
                normalized_json_pointer(&error.instance_path.to_string()),
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Semantic checks on a parsed configuration.
///
/// Type tags are not checked here; they are resolved against the generator
/// registry when column plans are built.
pub fn validate_config_semantics(config: &DesensitizeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.tables.is_empty() && !config.include_unconfigured_tables {
        report.push(ValidationIssue::error(
            "tables_empty",
            "/tables",
            "configuration lists no tables",
            Some("add at least one table or set include_unconfigured_tables"),
        ));
    }

    if config.strategy == StrategyKind::Hashed && config.seed.is_none() {
        report.push(ValidationIssue::warning(
            "seed_not_set",
            "/seed",
            "hashed strategy without a seed uses the default key",
            Some("set a private seed so the mapping cannot be replayed from the configuration alone"),
        ));
    }

    validate_scope_name("/default_scope", &config.default_scope, &mut report);

    let mut seen_tables = HashSet::new();
    for (idx, table) in config.tables.iter().enumerate() {
        let base_path = format!("/tables/{idx}");
        if table.name.trim().is_empty() {
            report.push(ValidationIssue::error(
                "table_name_empty",
                format!("{base_path}/name"),
                "table name must not be empty",
                None,
            ));
        } else if !seen_tables.insert(table.name.to_lowercase()) {
            report.push(ValidationIssue::error(
                "table_duplicate",
                format!("{base_path}/name"),
                format!("table '{}' is declared more than once", table.name),
                Some("merge the column lists into a single table entry"),
            ));
        }

        if table.columns.is_empty() {
            report.push(ValidationIssue::warning(
                "table_passthrough",
                format!("{base_path}/columns"),
                format!("table '{}' has no masked columns and is exported unchanged", table.name),
                None,
            ));
        }

        validate_columns(table, &base_path, &mut report);
    }

    validate_scope_bindings(config, &mut report);

    report
}

/// Validate the configuration end-to-end, returning structured issues on failure.
pub fn validate_config(config_json: &Value) -> Result<ValidatedConfig, ValidationReport> {
    let structural = match validate_config_json(config_json) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "schema_validation_error",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };
    if !structural.is_ok() {
        return Err(structural);
    }

    let config: DesensitizeConfig = match serde_json::from_value(config_json.clone()) {
        Ok(config) => config,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "invalid_config_json",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    let semantic = validate_config_semantics(&config);
    if !semantic.is_ok() {
        return Err(semantic);
    }

    Ok(ValidatedConfig {
        config,
        warnings: semantic.warnings,
    })
}

fn validate_columns(table: &TableSpec, base_path: &str, report: &mut ValidationReport) {
    let mut seen = HashSet::new();
    for (idx, column) in table.columns.iter().enumerate() {
        let path = format!("{base_path}/columns/{idx}");
        if column.name.trim().is_empty() {
            report.push(ValidationIssue::error(
                "column_name_empty",
                format!("{path}/name"),
                "column name must not be empty",
                None,
            ));
        } else if !seen.insert(column.name.to_lowercase()) {
            report.push(ValidationIssue::error(
                "column_duplicate",
                format!("{path}/name"),
                format!(
                    "column '{}.{}' is configured more than once",
                    table.name, column.name
                ),
                Some("keep a single entry per column"),
            ));
        }

        if column.type_tag.trim().is_empty() {
            report.push(ValidationIssue::error(
                "type_empty",
                format!("{path}/type"),
                "type tag must not be empty",
                None,
            ));
        }

        if let Some(scope) = &column.scope {
            validate_scope_name(&format!("{path}/scope"), scope, report);
        }
    }
}

fn validate_scope_name(path: &str, scope: &ScopeSelector, report: &mut ValidationReport) {
    if let ScopeSelector::Named(name) = scope
        && name.trim().is_empty()
    {
        report.push(ValidationIssue::error(
            "scope_name_empty",
            path,
            "named scope must not be empty",
            None,
        ));
    }
}

/// A shared scope must be fed by a single generator, otherwise equal
/// originals could not map to one synthetic value.
fn validate_scope_bindings(config: &DesensitizeConfig, report: &mut ValidationReport) {
    let mut bindings: HashMap<String, (String, String)> = HashMap::new();

    for (table_idx, table) in config.tables.iter().enumerate() {
        for (column_idx, column) in table.columns.iter().enumerate() {
            if column.type_tag == BLANK_TYPE {
                continue;
            }
            let key = match column.scope_or(&config.default_scope) {
                ScopeSelector::Global => "global".to_string(),
                ScopeSelector::Named(name) => format!("named:{name}"),
                ScopeSelector::Type | ScopeSelector::Column => continue,
            };
            let path = format!("/tables/{table_idx}/columns/{column_idx}/scope");
            match bindings.get(&key) {
                Some((tag, _)) if *tag == column.type_tag => {}
                Some((tag, first_path)) => report.push(ValidationIssue::error(
                    "scope_mixed_types",
                    path,
                    format!(
                        "scope '{key}' is bound to type '{tag}' at {first_path} and to '{}' here",
                        column.type_tag
                    ),
                    Some("use one type per shared scope, or give these columns separate scopes"),
                )),
                None => {
                    bindings.insert(key, (column.type_tag.clone(), path));
                }
            }
        }
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
