use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::CellValue;

/// Ordered column names shared by every row of a table.
pub type Columns = Arc<[String]>;

/// One row of a table: an ordered mapping from column name to value.
///
/// Column names are shared between all rows of a table, so a row only owns
/// its values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Columns,
    values: Vec<CellValue>,
}

impl Row {
    pub fn new(columns: Columns, values: Vec<CellValue>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(Error::ShapeMismatch {
                expected: columns.len(),
                actual: values.len(),
            });
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        position_of(&self.columns, column).map(|index| &self.values[index])
    }

    pub fn value_at(&self, index: usize) -> Option<&CellValue> {
        self.values.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Replace the values wholesale, keeping the column set.
    pub fn with_values(&self, values: Vec<CellValue>) -> Result<Self> {
        Self::new(Arc::clone(&self.columns), values)
    }

    pub fn into_values(self) -> Vec<CellValue> {
        self.values
    }
}

/// Result of looking up an identifier among names that may differ only by
/// case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Found(usize),
    Missing,
    /// No exact match and more than one case-insensitive one.
    Ambiguous,
}

/// Exact match first; otherwise the single case-insensitive match.
pub fn match_name<S: AsRef<str>>(names: &[S], wanted: &str) -> NameMatch {
    if let Some(index) = names.iter().position(|name| name.as_ref() == wanted) {
        return NameMatch::Found(index);
    }
    let mut folded = names
        .iter()
        .enumerate()
        .filter(|(_, name)| name.as_ref().eq_ignore_ascii_case(wanted))
        .map(|(index, _)| index);
    match (folded.next(), folded.next()) {
        (Some(index), None) => NameMatch::Found(index),
        (None, _) => NameMatch::Missing,
        (Some(_), Some(_)) => NameMatch::Ambiguous,
    }
}

/// Position of a column under [`match_name`]; `None` when missing or
/// ambiguous.
pub fn position_of(columns: &[String], column: &str) -> Option<usize> {
    match match_name(columns, column) {
        NameMatch::Found(index) => Some(index),
        NameMatch::Missing | NameMatch::Ambiguous => None,
    }
}

/// Build a shared column list.
pub fn columns<I, S>(names: I) -> Columns
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect::<Vec<_>>().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_values_that_do_not_match_columns() {
        let cols = columns(["id", "name"]);
        let err = Row::new(cols, vec![CellValue::text("1")]).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn lookup_ignores_case() {
        let cols = columns(["customerName"]);
        let row = Row::new(cols, vec![CellValue::text("Acme Inc")]).unwrap();
        assert_eq!(row.get("CUSTOMERNAME"), Some(&CellValue::text("Acme Inc")));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn exact_name_wins_over_case_folded_ones() {
        let cols = columns(["Name", "name"]);
        assert_eq!(match_name(&cols[..], "name"), NameMatch::Found(1));
        assert_eq!(match_name(&cols[..], "Name"), NameMatch::Found(0));
        assert_eq!(match_name(&cols[..], "NAME"), NameMatch::Ambiguous);
        assert_eq!(match_name(&cols[..], "email"), NameMatch::Missing);
        assert_eq!(position_of(&cols, "NAME"), None);
    }
}
