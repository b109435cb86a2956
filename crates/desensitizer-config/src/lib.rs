//! Configuration contracts and validation for desensitization runs.
//!
//! The configuration is a whitelist: it names the tables to export and, per
//! table, the columns to mask with their semantic type tag and mapping scope.

pub mod errors;
pub mod load;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{ConfigError, IssueSeverity, ValidationIssue, ValidationReport};
pub use load::{load_config, read_config_document};
pub use model::{
    ColumnSpec, DesensitizeConfig, MissingColumnPolicy, OutputFormat, ScopeSelector,
    StrategyKind, TableSpec,
};
pub use schema::config_json_schema;
pub use validate::{
    BLANK_TYPE, ValidatedConfig, validate_config, validate_config_json,
    validate_config_semantics,
};
