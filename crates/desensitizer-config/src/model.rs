use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical desensitization configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DesensitizeConfig {
    /// Output format for desensitized tables.
    #[serde(default)]
    pub output_format: OutputFormat,
    /// How original values are turned into stable synthetic values.
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Run seed. Keys the hash strategy and seeds the cached strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Scope applied to columns that do not declare one.
    #[serde(default)]
    pub default_scope: ScopeSelector,
    /// What to do when a configured column is absent from its source table.
    #[serde(default)]
    pub on_missing_column: MissingColumnPolicy,
    /// Also export source tables that are not listed, unchanged.
    #[serde(default)]
    pub include_unconfigured_tables: bool,
    /// Tables to desensitize, processed in declaration order.
    pub tables: Vec<TableSpec>,
}

/// One table and the columns to mask in it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    pub name: String,
    /// Columns to mask. Columns not listed pass through unchanged.
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

/// One masked column.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub name: String,
    /// Semantic type tag (ex.: `company`, `first_name`, `blank`).
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Overrides the configuration's `default_scope`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeSelector>,
}

impl ColumnSpec {
    pub fn scope_or<'a>(&'a self, default: &'a ScopeSelector) -> &'a ScopeSelector {
        self.scope.as_ref().unwrap_or(default)
    }
}

/// Output formats supported by the sinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Sql,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Sql => "sql",
        }
    }
}

/// Value mapping strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Seed derived from a stable hash of (seed, scope, value). Bounded memory.
    #[default]
    Hashed,
    /// Explicit (scope, value) → synthetic cache filled with fresh random seeds.
    Cached,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Hashed => "hashed",
            StrategyKind::Cached => "cached",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects the mapping namespace of a column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScopeSelector {
    /// One namespace per type tag, shared by every table.
    #[default]
    Type,
    /// One namespace per table and column.
    Column,
    /// A single namespace for the whole run.
    Global,
    /// An explicitly named namespace, shared by every column naming it.
    Named(String),
}

/// Policy for configured columns missing from the source table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MissingColumnPolicy {
    #[default]
    Error,
    Warn,
}

impl DesensitizeConfig {
    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables
            .iter()
            .find(|table| table.name.eq_ignore_ascii_case(name))
    }
}
