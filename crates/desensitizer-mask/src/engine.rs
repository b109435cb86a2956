use std::time::Instant;

use tracing::{error, info, warn};

use desensitizer_config::DesensitizeConfig;

use crate::cancel::CancellationToken;
use crate::errors::{ConfigurationError, DesensitizeError};
use crate::generators::GeneratorRegistry;
use crate::mapper::ValueMapper;
use crate::model::{RunReport, TableReport};
use crate::output::SinkFactory;
use crate::pipeline::TablePipeline;
use crate::planner::{BoundTable, RunPlan, build_run_plan};
use crate::source::TableSource;

/// One desensitization run over a set of tables.
///
/// Tables are processed sequentially in plan order and share a single
/// [`ValueMapper`], so equal originals under one scope get the same synthetic
/// value in every table. The mapper lives exactly as long as [`execute`].
///
/// [`execute`]: DesensitizationRun::execute
#[derive(Debug)]
pub struct DesensitizationRun {
    plan: RunPlan,
    cancel: CancellationToken,
    run_id: String,
}

impl DesensitizationRun {
    /// Build every column plan up front. Fails before any source is touched.
    pub fn new(
        config: &DesensitizeConfig,
        registry: &GeneratorRegistry,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::from_plan(build_run_plan(config, registry)?))
    }

    pub fn from_plan(plan: RunPlan) -> Self {
        Self {
            plan,
            cancel: CancellationToken::new(),
            run_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Identifier carried by the run's logs and report.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Export additional tables unchanged, after the configured ones.
    pub fn with_passthrough_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for table in tables {
            self.plan.push_passthrough(table.as_ref());
        }
        self
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub async fn execute<S, F>(
        self,
        source: &S,
        sinks: &mut F,
    ) -> Result<RunReport, DesensitizeError>
    where
        S: TableSource + ?Sized,
        F: SinkFactory + ?Sized,
    {
        let start = Instant::now();
        let run_id = self.run_id.clone();
        let started_at = chrono::Utc::now().to_rfc3339();

        let bound = self.bind_tables(source)?;
        let mut mapper = ValueMapper::new(self.plan.strategy, self.plan.seed);
        let mut report = RunReport::new(run_id.clone(), self.plan.strategy, started_at);

        info!(
            run_id = %run_id,
            tables = bound.len(),
            strategy = %self.plan.strategy,
            seeded = self.plan.seed.is_some(),
            "desensitization started"
        );

        for table in &bound {
            let (table_report, cells_by_column) =
                self.run_table(table, source, sinks, &mut mapper).await?;
            for (column, cells) in table.masked.iter().zip(cells_by_column) {
                report.record_generator_usage(&column.plan.generator_type, cells);
            }
            report.tables.push(table_report);
        }

        report.distinct_mappings = mapper.distinct_mappings();
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            run_id = %run_id,
            tables = report.tables.len(),
            rows = report.rows_total(),
            duration_ms = report.duration_ms,
            "desensitization finished"
        );

        Ok(report)
    }

    /// Resolve every planned table against the source before any row is read.
    fn bind_tables<S>(&self, source: &S) -> Result<Vec<BoundTable>, DesensitizeError>
    where
        S: TableSource + ?Sized,
    {
        let mut bound = Vec::with_capacity(self.plan.tables.len());
        for table in &self.plan.tables {
            let columns = source
                .describe(&table.table_name)
                .map_err(|source| DesensitizeError::RowSource {
                    table: table.table_name.clone(),
                    rows_emitted: 0,
                    source,
                })?
                .ok_or_else(|| ConfigurationError::UnknownTable {
                    table: table.table_name.clone(),
                })?;
            bound.push(table.bind(columns, self.plan.on_missing_column)?);
        }
        Ok(bound)
    }

    async fn run_table<S, F>(
        &self,
        table: &BoundTable,
        source: &S,
        sinks: &mut F,
        mapper: &mut ValueMapper,
    ) -> Result<(TableReport, Vec<u64>), DesensitizeError>
    where
        S: TableSource + ?Sized,
        F: SinkFactory + ?Sized,
    {
        let name = &table.table_name;
        if self.cancel.is_cancelled() {
            return Err(DesensitizeError::Cancelled {
                table: name.clone(),
                rows_emitted: 0,
            });
        }

        let table_start = Instant::now();
        info!(
            table = %name,
            masked_columns = table.masked.len(),
            "desensitizing table"
        );

        let mut sink = sinks
            .open(name, &table.columns)
            .map_err(|source| DesensitizeError::SinkWrite {
                table: name.clone(),
                rows_emitted: 0,
                source,
            })?;
        let rows = source
            .open(name)
            .map_err(|source| DesensitizeError::RowSource {
                table: name.clone(),
                rows_emitted: 0,
                source,
            })?;

        let outcome = match TablePipeline::new(table)
            .run(rows, mapper, sink.as_mut(), &self.cancel)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Err(flush_err) = sink.finish() {
                    warn!(table = %name, error = %flush_err, "failed to flush partial output");
                }
                error!(
                    table = %name,
                    rows_emitted = err.rows_emitted().unwrap_or_default(),
                    error = %err,
                    "table failed"
                );
                return Err(err);
            }
        };

        let bytes_written = sink
            .finish()
            .map_err(|source| DesensitizeError::SinkWrite {
                table: name.clone(),
                rows_emitted: outcome.rows_emitted,
                source,
            })?;
        let duration_ms = table_start.elapsed().as_millis() as u64;

        info!(
            table = %name,
            rows = outcome.rows_emitted,
            cells_masked = outcome.cells_masked,
            nulls_preserved = outcome.nulls_preserved,
            bytes = bytes_written,
            "table desensitized"
        );

        let report = TableReport {
            table: name.clone(),
            rows_emitted: outcome.rows_emitted,
            masked_columns: table.masked_column_names(),
            cells_masked: outcome.cells_masked,
            nulls_preserved: outcome.nulls_preserved,
            bytes_written,
            duration_ms,
        };
        Ok((report, outcome.cells_by_column))
    }
}
