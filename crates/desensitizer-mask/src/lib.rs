//! Deterministic, relationship-preserving value substitution.
//!
//! Rows stream from a [`TableSource`] through per-table column plans; every
//! masked cell goes through one run-wide [`ValueMapper`] so that equal
//! originals under a scope map to the same synthetic value across rows and
//! tables. Transformed rows go to a [`SinkFactory`] as CSV or SQL.

pub mod cancel;
pub mod engine;
pub mod errors;
pub mod generators;
pub mod mapper;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod planner;
pub mod source;

pub use cancel::CancellationToken;
pub use engine::DesensitizationRun;
pub use errors::{
    ConfigurationError, DesensitizeError, GeneratorError, RowSourceError, SinkError,
    UnknownTypeError,
};
pub use generators::{Generator, GeneratorRegistry};
pub use mapper::{MappingScope, ValueMapper};
pub use model::{RunReport, TableReport};
pub use output::{
    CsvSink, DirectorySinks, MemorySinks, RowSink, SinkFactory, SqlDialect, SqlSink,
};
pub use pipeline::{TableOutcome, TablePipeline};
pub use planner::{BoundTable, ColumnPlan, RunPlan, TablePlan, build_run_plan};
pub use source::{MemorySource, RowStream, TableSource};
