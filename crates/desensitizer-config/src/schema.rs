use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::DesensitizeConfig;

/// Emit the JSON Schema for the configuration file.
pub fn config_json_schema() -> RootSchema {
    schema_for!(DesensitizeConfig)
}
