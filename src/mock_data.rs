use crate::cell::CellValue;
use crate::settings::Matrix;

const YEARS: [&str; 5] = ["2017", "2018", "2019", "2020", "2021"];
const MAKERS: [&str; 6] = ["Tesla", "Volvo", "Toyota", "Ford", "Honda", "Kia"];

/// Seed data shown before any real data source is connected.
///
/// A header row of makers followed by one row per year. Values are
/// deterministic so tests and first renders agree.
pub fn mock_workbook_default_data() -> Matrix {
    let mut rows = Vec::with_capacity(YEARS.len() + 1);

    let mut header = vec![CellValue::Empty];
    header.extend(MAKERS.iter().map(|m| CellValue::from(*m)));
    rows.push(header);

    for (r, year) in YEARS.iter().enumerate() {
        let mut row = vec![CellValue::from(*year)];
        for c in 0..MAKERS.len() {
            row.push(CellValue::from(((r + 1) * 10 + c) as i32));
        }
        rows.push(row);
    }

    Matrix::from_rows(rows)
}
