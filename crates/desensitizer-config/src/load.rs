use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{ConfigError, Result};
use crate::validate::{ValidatedConfig, validate_config};

/// Read a configuration file into a JSON document.
///
/// Files ending in `.toml` are parsed as TOML; everything else as JSON.
pub fn read_config_document(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        let value: toml::Value = toml::from_str(&contents)?;
        Ok(serde_json::to_value(value)?)
    } else {
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<ValidatedConfig> {
    let document = read_config_document(path)?;
    let validated = validate_config(&document).map_err(ConfigError::Invalid)?;

    for issue in &validated.warnings {
        warn!(code = %issue.code, path = %issue.path, "{}", issue.message);
    }
    debug!(
        path = %path.display(),
        tables = validated.config.tables.len(),
        strategy = %validated.config.strategy,
        "configuration loaded"
    );

    Ok(validated)
}
