// src/table/mod.rs

pub mod read;
pub mod write;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::fmt;

use crate::config::column_index_to_letter;
use crate::error::{Error, Result};

pub use read::{load_table, SheetFormat};
pub use write::{output_file_name, render_table};

/// A single spreadsheet value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Excel date/time serial (days since 1899-12-30).
    DateTime(f64),
    /// Excel elapsed-time serial, in days.
    Duration(f64),
}

impl Cell {
    /// Display form of the value; `Empty` renders as "".
    pub fn text(&self) -> String {
        self.to_string()
    }

    /// Empty, or text that is only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Bool(true) => f.write_str("TRUE"),
            Cell::Bool(false) => f.write_str("FALSE"),
            Cell::DateTime(serial) => match serial_to_datetime(*serial) {
                Some(dt) if *serial < 1.0 => write!(f, "{}", dt.format("%H:%M:%S")),
                Some(dt) if serial.fract() == 0.0 => write!(f, "{}", dt.format("%Y-%m-%d")),
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{}", serial),
            },
            Cell::Duration(days) => {
                let secs = (days * 86_400.0).round() as i64;
                write!(f, "{}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
            }
        }
    }
}

/// Excel's 1900 date system, ignoring the fictitious 1900-02-29.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::milliseconds(millis))
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

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

/// One sheet: a header row plus rectangular data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Source file name, used for logging and output naming.
    pub name: String,
    pub format: SheetFormat,
    pub headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl Table {
    /// Build a table, padding every row (and the header) to the widest one.
    pub fn new(
        name: impl Into<String>,
        format: SheetFormat,
        mut headers: Vec<String>,
        mut rows: Vec<Vec<Cell>>,
    ) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);
        headers.resize(width, String::new());
        for row in rows.iter_mut() {
            row.resize(width, Cell::Empty);
        }
        Self {
            name: name.into(),
            format,
            headers,
            rows,
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn has_column(&self, col: usize) -> bool {
        col < self.width
    }

    /// `None` when `row` or `col` is out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Write a cell, returning whether its value changed.
    pub fn set(&mut self, row: usize, col: usize, value: Cell) -> Result<bool> {
        let width = self.width;
        let row_count = self.rows.len();
        let name = &self.name;
        let cells = self.rows.get_mut(row).ok_or_else(|| {
            Error::Unclassified(anyhow::anyhow!(
                "row {} is outside table `{}` ({} rows)",
                row,
                name,
                row_count
            ))
        })?;
        let cell = cells.get_mut(col).ok_or_else(|| Error::Bounds {
            column: column_index_to_letter(col),
            index: col,
            width,
        })?;
        if *cell == value {
            return Ok(false);
        }
        *cell = value;
        Ok(true)
    }

    /// Like [`Table::set`] but columns beyond the table width are silently skipped.
    pub fn set_if_present(&mut self, row: usize, col: usize, value: Cell) -> Result<bool> {
        if !self.has_column(col) {
            return Ok(false);
        }
        self.set(row, col, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            "sample.csv",
            SheetFormat::Csv,
            vec!["A".into(), "B".into()],
            vec![vec![Cell::Int(1)], vec![Cell::from("x"), Cell::Empty, Cell::from("z")]],
        )
    }

    #[test]
    fn rows_are_padded_to_widest() {
        let t = sample();
        assert_eq!(t.width(), 3);
        assert_eq!(t.headers, vec!["A", "B", ""]);
        assert_eq!(t.get(0, 2), Some(&Cell::Empty));
        assert_eq!(t.get(0, 3), None);
    }

    #[test]
    fn set_reports_changes_and_bounds() {
        let mut t = sample();
        assert!(!t.set(0, 0, Cell::Int(1)).unwrap());
        assert!(t.set(0, 0, Cell::Int(2)).unwrap());

        match t.set(1, 5, Cell::from("y")) {
            Err(Error::Bounds { column, index, width }) => {
                assert_eq!(column, "F");
                assert_eq!(index, 5);
                assert_eq!(width, 3);
            }
            other => panic!("expected bounds error, got {:?}", other),
        }
        assert!(!t.set_if_present(1, 5, Cell::from("y")).unwrap());

        match t.set(2, 0, Cell::from("y")) {
            Err(Error::Unclassified(e)) => assert!(e.to_string().contains("sample.csv")),
            other => panic!("expected missing-row error, got {:?}", other),
        }
    }

    #[test]
    fn cell_text_forms() {
        assert_eq!(Cell::Empty.text(), "");
        assert_eq!(Cell::Int(7).text(), "7");
        assert_eq!(Cell::Float(12.0).text(), "12");
        assert_eq!(Cell::Float(1.5).text(), "1.5");
        assert_eq!(Cell::Bool(true).text(), "TRUE");
        assert!(Cell::from("  ").is_blank());
        assert!(!Cell::Int(0).is_blank());
        assert_eq!(Cell::DateTime(45296.0).text(), "2024-01-05");
        assert_eq!(Cell::DateTime(45296.5).text(), "2024-01-05 12:00:00");
        assert_eq!(Cell::DateTime(205.0 / 86_400.0).text(), "00:03:25");
        assert_eq!(Cell::Duration(1.5).text(), "36:00:00");
        assert!(!Cell::DateTime(0.0).is_blank());
    }
}
