//! Core contracts shared by the desensitizer crates.
//!
//! Defines cell values and rows as they flow from row sources through the
//! masking engine to output sinks, plus small helpers used by the CLI.

pub mod error;
pub mod redaction;
pub mod row;
pub mod value;

pub use error::{Error, Result};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use row::{Columns, NameMatch, Row, columns, match_name, position_of};
pub use value::CellValue;
