use std::sync::Arc;

use futures::{Stream, StreamExt};

use desensitizer_core::{Columns, Row};

use crate::cancel::CancellationToken;
use crate::errors::{DesensitizeError, RowSourceError};
use crate::mapper::ValueMapper;
use crate::output::RowSink;
use crate::planner::BoundTable;

/// Counters collected while streaming one table.
#[derive(Debug, Clone, Default)]
pub struct TableOutcome {
    pub rows_emitted: u64,
    pub cells_masked: u64,
    pub nulls_preserved: u64,
    /// Masked cells per bound column, in binding order.
    pub cells_by_column: Vec<u64>,
}

/// Streams the rows of one table through its column plans.
///
/// Rows are handled one at a time and emitted in arrival order. A row only
/// reaches the sink once every masked column of it has been transformed.
pub struct TablePipeline<'p> {
    table: &'p BoundTable,
}

impl<'p> TablePipeline<'p> {
    pub fn new(table: &'p BoundTable) -> Self {
        Self { table }
    }

    pub async fn run<S>(
        &self,
        rows: S,
        mapper: &mut ValueMapper,
        sink: &mut dyn RowSink,
        cancel: &CancellationToken,
    ) -> Result<TableOutcome, DesensitizeError>
    where
        S: Stream<Item = Result<Row, RowSourceError>>,
    {
        let mut rows = std::pin::pin!(rows);
        let mut outcome = TableOutcome {
            cells_by_column: vec![0; self.table.masked.len()],
            ..TableOutcome::default()
        };

        loop {
            if cancel.is_cancelled() {
                return Err(DesensitizeError::Cancelled {
                    table: self.table.table_name.clone(),
                    rows_emitted: outcome.rows_emitted,
                });
            }
            let Some(next) = rows.next().await else {
                break;
            };
            let row = next.map_err(|source| self.source_error(outcome.rows_emitted, source))?;
            let masked = self.mask_row(row, mapper, &mut outcome)?;
            sink.write_row(&masked)
                .map_err(|source| DesensitizeError::SinkWrite {
                    table: self.table.table_name.clone(),
                    rows_emitted: outcome.rows_emitted,
                    source,
                })?;
            outcome.rows_emitted += 1;
        }

        Ok(outcome)
    }

    fn mask_row(
        &self,
        row: Row,
        mapper: &mut ValueMapper,
        outcome: &mut TableOutcome,
    ) -> Result<Row, DesensitizeError> {
        let row_index = outcome.rows_emitted;
        if !same_columns(&self.table.columns, row.columns()) {
            return Err(self.source_error(
                row_index,
                RowSourceError::new("row columns do not match the described table"),
            ));
        }

        let mut values = row.values().to_vec();
        let mut masked_in_row = vec![0_u64; self.table.masked.len()];
        let mut nulls = 0_u64;
        for (slot, bound) in self.table.masked.iter().enumerate() {
            let original = &values[bound.index];
            if original.is_null() {
                nulls += 1;
                continue;
            }
            if !original.is_vacant() {
                masked_in_row[slot] = 1;
            }
            let plan = &bound.plan;
            let synthetic = mapper
                .map(&plan.scope, original, plan.generator.as_ref())
                .map_err(|source| DesensitizeError::GeneratorFailure {
                    table: self.table.table_name.clone(),
                    column: plan.column_name.clone(),
                    row_index,
                    scope: plan.scope.to_string(),
                    type_tag: plan.generator_type.clone(),
                    source,
                })?;
            values[bound.index] = synthetic;
        }

        let masked = row.with_values(values).map_err(|err| {
            self.source_error(row_index, RowSourceError::with_source("malformed row", err))
        })?;

        outcome.nulls_preserved += nulls;
        for (total, cells) in outcome.cells_by_column.iter_mut().zip(masked_in_row) {
            *total += cells;
            outcome.cells_masked += cells;
        }
        Ok(masked)
    }

    fn source_error(&self, rows_emitted: u64, source: RowSourceError) -> DesensitizeError {
        DesensitizeError::RowSource {
            table: self.table.table_name.clone(),
            rows_emitted,
            source,
        }
    }
}

fn same_columns(expected: &Columns, actual: &Columns) -> bool {
    Arc::ptr_eq(expected, actual)
        || (expected.len() == actual.len()
            && expected
                .iter()
                .zip(actual.iter())
                .all(|(left, right)| left.eq_ignore_ascii_case(right)))
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use futures::stream;

    use desensitizer_config::{MissingColumnPolicy, StrategyKind};
    use desensitizer_core::{CellValue, columns};

    use super::*;
    use crate::errors::GeneratorError;
    use crate::generators::{Generator, GeneratorRegistry};
    use crate::mapper::MappingScope;
    use crate::output::{MemorySinks, SinkFactory};
    use crate::planner::{ColumnPlan, TablePlan};

    struct Failing;

    impl Generator for Failing {
        fn type_tag(&self) -> &str {
            "failing"
        }

        fn generate(&self, _seed: u64) -> Result<CellValue, GeneratorError> {
            Err(GeneratorError::new("exhausted"))
        }
    }

    fn bound(plans: Vec<(&str, Arc<dyn Generator>)>) -> BoundTable {
        let plan = TablePlan {
            table_name: "customers".to_string(),
            columns: plans
                .into_iter()
                .map(|(column, generator)| ColumnPlan {
                    table_name: "customers".to_string(),
                    column_name: column.to_string(),
                    generator_type: generator.type_tag().to_string(),
                    scope: MappingScope::for_type(generator.type_tag()),
                    generator,
                })
                .collect(),
        };
        plan.bind(columns(["id", "name", "city"]), MissingColumnPolicy::Error)
            .expect("bind")
    }

    fn row(values: [CellValue; 3]) -> Row {
        Row::new(columns(["id", "name", "city"]), values.to_vec()).expect("row")
    }

    #[test]
    fn generator_failure_never_emits_a_partial_row() {
        let registry = GeneratorRegistry::new();
        let table = bound(vec![
            ("name", registry.resolve("company").expect("company")),
            ("city", Arc::new(Failing) as Arc<dyn Generator>),
        ]);
        let rows = stream::iter(vec![
            Ok(row([CellValue::Int(1), CellValue::text("Acme Inc"), CellValue::Null])),
            Ok(row([CellValue::Int(2), CellValue::text("Globex"), CellValue::text("Oslo")])),
        ]);
        let mut sinks = MemorySinks::new();
        let mut sink = sinks.open("customers", &table.columns).expect("open");
        let mut mapper = ValueMapper::new(StrategyKind::Hashed, Some(1));

        let err = block_on(TablePipeline::new(&table).run(
            rows,
            &mut mapper,
            sink.as_mut(),
            &CancellationToken::new(),
        ))
        .expect_err("generator must fail");

        match err {
            DesensitizeError::GeneratorFailure {
                column, row_index, ..
            } => {
                assert_eq!(column, "city");
                assert_eq!(row_index, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sinks.rows("customers").len(), 1);
    }

    #[test]
    fn counts_masked_cells_and_preserved_nulls() {
        let registry = GeneratorRegistry::new();
        let table = bound(vec![
            ("name", registry.resolve("company").expect("company")),
            ("city", registry.resolve("city").expect("city")),
        ]);
        let rows = stream::iter(vec![
            Ok(row([CellValue::Int(1), CellValue::text("Acme Inc"), CellValue::Null])),
            Ok(row([CellValue::Int(2), CellValue::text(""), CellValue::text("Oslo")])),
        ]);
        let mut sinks = MemorySinks::new();
        let mut sink = sinks.open("customers", &table.columns).expect("open");
        let mut mapper = ValueMapper::new(StrategyKind::Hashed, Some(1));

        let outcome = block_on(TablePipeline::new(&table).run(
            rows,
            &mut mapper,
            sink.as_mut(),
            &CancellationToken::new(),
        ))
        .expect("run");

        assert_eq!(outcome.rows_emitted, 2);
        assert_eq!(outcome.cells_masked, 2);
        assert_eq!(outcome.nulls_preserved, 1);
        assert_eq!(outcome.cells_by_column, vec![1, 1]);
        let emitted = sinks.rows("customers");
        assert_eq!(emitted[1].values()[1], CellValue::text(""));
        assert_eq!(emitted[0].values()[2], CellValue::Null);
    }

    #[test]
    fn cancellation_stops_before_the_next_row() {
        let table = bound(Vec::new());
        let rows = stream::iter(vec![Ok(row([
            CellValue::Int(1),
            CellValue::Null,
            CellValue::Null,
        ]))]);
        let mut sinks = MemorySinks::new();
        let mut sink = sinks.open("customers", &table.columns).expect("open");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = block_on(TablePipeline::new(&table).run(
            rows,
            &mut ValueMapper::hashed(0),
            sink.as_mut(),
            &cancel,
        ))
        .expect_err("cancelled");
        assert!(matches!(err, DesensitizeError::Cancelled { rows_emitted: 0, .. }));
        assert!(sinks.rows("customers").is_empty());
    }
}
