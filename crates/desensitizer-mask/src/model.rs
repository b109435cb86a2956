use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use desensitizer_config::StrategyKind;

/// Summary of one desensitized table. Counts only, never values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub rows_emitted: u64,
    pub masked_columns: Vec<String>,
    pub cells_masked: u64,
    pub nulls_preserved: u64,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

/// Report for a desensitization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub strategy: StrategyKind,
    pub started_at: String,
    pub duration_ms: u64,
    pub tables: Vec<TableReport>,
    /// Stored pairs at the end of the run; absent for the hashed strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct_mappings: Option<u64>,
    pub generator_usage: BTreeMap<String, u64>,
}

impl RunReport {
    pub fn new(run_id: String, strategy: StrategyKind, started_at: String) -> Self {
        Self {
            run_id,
            strategy,
            started_at,
            duration_ms: 0,
            tables: Vec::new(),
            distinct_mappings: None,
            generator_usage: BTreeMap::new(),
        }
    }

    pub fn record_generator_usage(&mut self, type_tag: &str, cells: u64) {
        if cells == 0 {
            return;
        }
        *self.generator_usage.entry(type_tag.to_string()).or_insert(0) += cells;
    }

    pub fn rows_total(&self) -> u64 {
        self.tables.iter().map(|table| table.rows_emitted).sum()
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables
            .iter()
            .find(|table| table.table.eq_ignore_ascii_case(name))
    }
}
