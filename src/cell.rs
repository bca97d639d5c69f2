use serde::{Deserialize, Serialize};
use std::fmt;

/// A single grid cell value as the grid widget sees it.
///
/// Serialized untagged so that a cell travels over the wire as the bare JSON
/// value (`null`, `true`, `42`, `"text"`).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// One edit reported by the grid widget: `(row, column, old_value, new_value)`.
///
/// Travels as a 4-element JSON array, the same shape the widget hands to its
/// change callback. Indices are zero-based.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(
    from = "(usize, usize, CellValue, CellValue)",
    into = "(usize, usize, CellValue, CellValue)"
)]
pub struct CellChange {
    pub row: usize,
    pub column: usize,
    pub old_value: CellValue,
    pub new_value: CellValue,
}

impl CellChange {
    pub fn new(
        row: usize,
        column: usize,
        old_value: impl Into<CellValue>,
        new_value: impl Into<CellValue>,
    ) -> Self {
        CellChange {
            row,
            column,
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }

    /// Spreadsheet-style name of the edited cell, e.g. `B1` for `(0, 1)`.
    pub fn cell_name(&self) -> String {
        cell_name(self.row, self.column)
    }
}

impl From<(usize, usize, CellValue, CellValue)> for CellChange {
    fn from((row, column, old_value, new_value): (usize, usize, CellValue, CellValue)) -> Self {
        CellChange {
            row,
            column,
            old_value,
            new_value,
        }
    }
}

impl From<CellChange> for (usize, usize, CellValue, CellValue) {
    fn from(change: CellChange) -> Self {
        (change.row, change.column, change.old_value, change.new_value)
    }
}

impl fmt::Display for CellChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: '{}' -> '{}'",
            self.cell_name(),
            self.old_value,
            self.new_value
        )
    }
}

/// Convert a zero-based column index to its letter label (0 = A, 26 = AA).
pub fn column_label(column: usize) -> String {
    let mut n = column;
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Name of a zero-based `(row, column)` position, e.g. `(9, 27)` is `AB10`.
pub fn cell_name(row: usize, column: usize) -> String {
    format!("{}{}", column_label(column), row as u128 + 1)
}
