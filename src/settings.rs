use crate::cell::{CellChange, CellValue};
use crate::mock_data::mock_workbook_default_data;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_COLUMN_WIDTH: u32 = 100;
pub const DEFAULT_SPARE_ROWS: u32 = 160;
pub const DEFAULT_SPARE_COLUMNS: u32 = 26;

type Row = Arc<Vec<CellValue>>;

/// The grid's 2-D data.
///
/// Rows are shared between successive states: producing a changed matrix
/// copies only the rows that were edited, every other row keeps pointing at
/// the same allocation as before. Rows may have different lengths.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct Matrix {
    rows: Arc<Vec<Row>>,
}

impl Matrix {
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Matrix {
            rows: Arc::new(rows.into_iter().map(Arc::new).collect()),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of one row, `None` when the row does not exist.
    pub fn row_len(&self, row: usize) -> Option<usize> {
        self.rows.get(row).map(|r| r.len())
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn contains(&self, row: usize, column: usize) -> bool {
        self.get(row, column).is_some()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn to_rows(&self) -> Vec<Vec<CellValue>> {
        self.rows.iter().map(|r| r.as_ref().clone()).collect()
    }

    /// Length of the longest row.
    pub fn max_row_len(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Returns a new matrix with every change inside `bounds` applied in
    /// order. `bounds` is `(rows, columns)`.
    ///
    /// A change past the end of the existing rows or of its row grows the
    /// matrix, padding with empty cells. Changes outside `bounds` are
    /// skipped. `old_value` is not compared against the current cell. `self`
    /// is left untouched.
    pub fn with_changes(&self, changes: &[CellChange], bounds: (usize, usize)) -> Matrix {
        let (max_rows, max_columns) = bounds;
        let mut rows: Vec<Row> = self.rows.as_ref().clone();

        for change in changes {
            if change.row >= max_rows || change.column >= max_columns {
                continue;
            }
            if change.row >= rows.len() {
                rows.resize_with(change.row + 1, || Arc::new(Vec::new()));
            }
            // first write to a row copies it, later writes reuse the copy
            let row = Arc::make_mut(&mut rows[change.row]);
            if change.column >= row.len() {
                row.resize(change.column + 1, CellValue::Empty);
            }
            row[change.column] = change.new_value.clone();
        }

        Matrix {
            rows: Arc::new(rows),
        }
    }

    /// Whether both matrices are the same allocation.
    pub fn ptr_eq(a: &Matrix, b: &Matrix) -> bool {
        Arc::ptr_eq(&a.rows, &b.rows)
    }

    /// Whether row `row` is the same allocation in both matrices.
    pub fn shares_row(a: &Matrix, b: &Matrix, row: usize) -> bool {
        match (a.rows.get(row), b.rows.get(row)) {
            (Some(x), Some(y)) => Arc::ptr_eq(x, y),
            _ => false,
        }
    }
}

impl From<Vec<Vec<CellValue>>> for Matrix {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        Matrix::from_rows(rows)
    }
}

/// Settings object rendered by the grid widget.
///
/// Field names on the wire are the widget's own setting keys.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct GridSettings {
    pub data: Matrix,

    #[serde(rename = "colHeaders")]
    pub column_headers_visible: bool,

    #[serde(rename = "rowHeaders")]
    pub row_headers_visible: bool,

    /// When set the widget rejects user edits.
    #[serde(rename = "readOnly")]
    pub read_only: bool,

    /// Width applied to columns without an explicit width.
    #[serde(rename = "colWidths")]
    pub column_width: u32,

    /// Blank rows kept below the data so the grid can grow.
    #[serde(rename = "minSpareRows")]
    pub spare_row_count: u32,

    /// Blank columns kept right of the data so the grid can grow.
    #[serde(rename = "minSpareCols")]
    pub spare_column_count: u32,
}

impl GridSettings {
    pub fn with_data(data: Matrix) -> Self {
        GridSettings {
            data,
            column_headers_visible: true,
            row_headers_visible: true,
            read_only: false,
            column_width: DEFAULT_COLUMN_WIDTH,
            spare_row_count: DEFAULT_SPARE_ROWS,
            spare_column_count: DEFAULT_SPARE_COLUMNS,
        }
    }

    /// `(rows, columns)` the widget lets the user edit: the data plus the
    /// spare rows and columns appended to it.
    pub fn declared_bounds(&self) -> (usize, usize) {
        (
            self.data
                .row_count()
                .saturating_add(self.spare_row_count as usize),
            self.data
                .max_row_len()
                .saturating_add(self.spare_column_count as usize),
        )
    }

    /// Whether an edit at `(row, column)` lands inside the declared bounds.
    pub fn accepts(&self, row: usize, column: usize) -> bool {
        let (rows, columns) = self.declared_bounds();
        row < rows && column < columns
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings::with_data(mock_workbook_default_data())
    }
}

/// Workbook slice of the application state.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct WorkbookState {
    pub settings: GridSettings,
}

impl WorkbookState {
    pub fn new(settings: GridSettings) -> Self {
        WorkbookState { settings }
    }
}
