//! Database row sources.
//!
//! Adapters describe tables and stream their rows with every column cast to
//! text, so any column type can be masked. [`CatalogSource`] pre-describes a
//! set of tables and serves them to the masking engine.

pub mod adapter;
pub mod catalog;
pub mod error;
pub mod mysql;
pub mod options;
pub mod postgres;
pub mod table;

mod decode;

pub use adapter::{SourceAdapter, connect};
pub use catalog::CatalogSource;
pub use error::{Result, SourceError};
pub use mysql::MySqlSource;
pub use options::SourceOptions;
pub use postgres::PostgresSource;
pub use table::{SourceColumn, SourceTable, render_create_table};
