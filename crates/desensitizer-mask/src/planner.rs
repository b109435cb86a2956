use std::fmt;
use std::sync::Arc;

use tracing::warn;

use desensitizer_config::{
    DesensitizeConfig, MissingColumnPolicy, StrategyKind, validate_config_semantics,
};
use desensitizer_core::{Columns, NameMatch, match_name};

use crate::errors::ConfigurationError;
use crate::generators::{Generator, GeneratorRegistry};
use crate::mapper::MappingScope;

/// Resolved binding of one configured column to a generator and a scope.
#[derive(Clone)]
pub struct ColumnPlan {
    pub table_name: String,
    pub column_name: String,
    pub generator_type: String,
    pub scope: MappingScope,
    pub generator: Arc<dyn Generator>,
}

impl fmt::Debug for ColumnPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnPlan")
            .field("table_name", &self.table_name)
            .field("column_name", &self.column_name)
            .field("generator_type", &self.generator_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Column plans of one table, in configuration order.
#[derive(Debug, Clone)]
pub struct TablePlan {
    pub table_name: String,
    pub columns: Vec<ColumnPlan>,
}

/// Immutable plan for a whole run.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub tables: Vec<TablePlan>,
    pub strategy: StrategyKind,
    pub seed: Option<u64>,
    pub on_missing_column: MissingColumnPolicy,
}

/// A column plan located in the source table's column list.
#[derive(Debug, Clone)]
pub struct BoundColumn {
    pub index: usize,
    pub plan: ColumnPlan,
}

/// A table plan checked against the columns its source exposes.
#[derive(Debug, Clone)]
pub struct BoundTable {
    pub table_name: String,
    pub columns: Columns,
    pub masked: Vec<BoundColumn>,
}

/// Build column plans from a configuration.
///
/// Runs the semantic checks, then resolves every type tag. Nothing here
/// touches a row source.
pub fn build_run_plan(
    config: &DesensitizeConfig,
    registry: &GeneratorRegistry,
) -> Result<RunPlan, ConfigurationError> {
    let report = validate_config_semantics(config);
    if !report.is_ok() {
        return Err(ConfigurationError::Invalid(report));
    }

    let mut tables = Vec::with_capacity(config.tables.len());
    for table in &config.tables {
        let mut columns = Vec::with_capacity(table.columns.len());
        for column in &table.columns {
            let generator =
                registry
                    .resolve(&column.type_tag)
                    .map_err(|_| ConfigurationError::UnknownType {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        type_tag: column.type_tag.clone(),
                    })?;
            let scope = MappingScope::resolve(
                column.scope_or(&config.default_scope),
                &table.name,
                &column.name,
                &column.type_tag,
            );
            columns.push(ColumnPlan {
                table_name: table.name.clone(),
                column_name: column.name.clone(),
                generator_type: column.type_tag.clone(),
                scope,
                generator,
            });
        }
        tables.push(TablePlan {
            table_name: table.name.clone(),
            columns,
        });
    }

    Ok(RunPlan {
        tables,
        strategy: config.strategy,
        seed: config.seed,
        on_missing_column: config.on_missing_column,
    })
}

impl RunPlan {
    pub fn table(&self, name: &str) -> Option<&TablePlan> {
        self.tables
            .iter()
            .find(|table| table.table_name.eq_ignore_ascii_case(name))
    }

    /// Append a table exported unchanged, unless it is already planned.
    pub fn push_passthrough(&mut self, table_name: &str) -> bool {
        if self.table(table_name).is_some() {
            return false;
        }
        self.tables.push(TablePlan {
            table_name: table_name.to_string(),
            columns: Vec::new(),
        });
        true
    }
}

impl TablePlan {
    /// Locate every planned column in `columns`: the exact name first, then a
    /// unique case-insensitive match.
    pub fn bind(
        &self,
        columns: Columns,
        policy: MissingColumnPolicy,
    ) -> Result<BoundTable, ConfigurationError> {
        let mut masked = Vec::with_capacity(self.columns.len());
        for plan in &self.columns {
            match match_name(&columns[..], &plan.column_name) {
                NameMatch::Found(index) => masked.push(BoundColumn {
                    index,
                    plan: plan.clone(),
                }),
                NameMatch::Ambiguous => {
                    return Err(ConfigurationError::AmbiguousColumn {
                        table: self.table_name.clone(),
                        column: plan.column_name.clone(),
                    });
                }
                NameMatch::Missing if policy == MissingColumnPolicy::Warn => {
                    warn!(
                        table = %self.table_name,
                        column = %plan.column_name,
                        "configured column not found in source table; skipped"
                    );
                }
                NameMatch::Missing => {
                    return Err(ConfigurationError::MissingColumn {
                        table: self.table_name.clone(),
                        column: plan.column_name.clone(),
                    });
                }
            }
        }
        Ok(BoundTable {
            table_name: self.table_name.clone(),
            columns,
            masked,
        })
    }
}

impl BoundTable {
    pub fn masked_column_names(&self) -> Vec<String> {
        self.masked
            .iter()
            .map(|bound| self.columns[bound.index].clone())
            .collect()
    }
}
