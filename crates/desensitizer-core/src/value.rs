use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single cell value, as read from a source or produced by a generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// True for `Null` and for the empty string. Whitespace is content.
    pub fn is_vacant(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(value) => value.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Stable textual identity used to key mappings.
    ///
    /// The variant is part of the key so that `Text("5")` and `Int(5)` never
    /// share an entry. Returns `None` for `Null`.
    pub fn mapping_key(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Null => None,
            CellValue::Text(value) => Some(Cow::Owned(format!("t:{value}"))),
            CellValue::Int(value) => Some(Cow::Owned(format!("i:{value}"))),
            CellValue::Float(value) => Some(Cow::Owned(format!("f:{:016x}", value.to_bits()))),
            CellValue::Bool(true) => Some(Cow::Borrowed("b:1")),
            CellValue::Bool(false) => Some(Cow::Borrowed("b:0")),
            CellValue::Date(value) => Some(Cow::Owned(format!("d:{}", value.format("%Y-%m-%d")))),
        }
    }

    /// Rendering used for CSV fields. Null renders as the empty field.
    pub fn to_csv(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("NULL"),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Int(value) => write!(f, "{value}"),
            CellValue::Float(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
            CellValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
        }
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map(CellValue::Text).unwrap_or(CellValue::Null)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_null_are_vacant_but_whitespace_is_not() {
        assert!(CellValue::Null.is_vacant());
        assert!(CellValue::text("").is_vacant());
        assert!(!CellValue::text("  ").is_vacant());
        assert!(!CellValue::Int(0).is_vacant());
    }

    #[test]
    fn mapping_key_distinguishes_variants() {
        assert_ne!(
            CellValue::text("5").mapping_key(),
            CellValue::Int(5).mapping_key()
        );
        assert_eq!(CellValue::Null.mapping_key(), None);
        assert_eq!(
            CellValue::text("Acme Inc").mapping_key(),
            CellValue::text("Acme Inc").mapping_key()
        );
    }

    #[test]
    fn null_renders_as_empty_csv_field() {
        assert_eq!(CellValue::Null.to_csv(), "");
        assert_eq!(CellValue::Float(45.67).to_csv(), "45.67");
        let date = NaiveDate::from_ymd_opt(2021, 3, 9).unwrap_or_default();
        assert_eq!(CellValue::Date(date).to_csv(), "2021-03-09");
    }
}
