//! CSV export of a filtered, visible record set.

use crate::store::Portal;

/// One CSV cell. Text is quoted, numbers are written bare.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(i64),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<u32> for Cell {
    fn from(n: u32) -> Self {
        Cell::Number(n.into())
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Cell::Number(n as i64)
    }
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Text(s) => format!("\"{}\"", s.replace('"', "\"\"")),
            Cell::Number(n) => n.to_string(),
        }
    }
}

/// Row layout of an entity in CSV exports.
pub trait Exportable {
    const CSV_HEADER: &'static [&'static str];

    /// Cells in `CSV_HEADER` order. `portal` resolves parent labels.
    fn csv_row(&self, portal: &Portal) -> Vec<Cell>;
}

/// Render `records` as CSV: header line, then one line per record.
pub fn to_csv<E: Exportable>(records: &[&E], portal: &Portal) -> String {
    let mut out = E::CSV_HEADER.join(",");
    out.push('\n');
    for record in records {
        let line: Vec<String> = record.csv_row(portal).iter().map(Cell::render).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}
