// src/table/read.rs

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, instrument, warn};

use super::{Cell, Table};

/// On-disk flavour of a table, which also decides how it is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    Csv,
    Excel,
}

impl SheetFormat {
    /// Classify a path by extension; `None` for anything that is not a sheet.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(SheetFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(SheetFormat::Excel),
            _ => None,
        }
    }
}

/// Load the first sheet of `path`. The first row is the header.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let format = SheetFormat::from_path(path)
        .ok_or_else(|| anyhow!("unsupported spreadsheet type: {}", path.display()))?;

    let (headers, rows) = match format {
        SheetFormat::Csv => read_csv(path)?,
        SheetFormat::Excel => read_workbook(path)?,
    };
    debug!(columns = headers.len(), rows = rows.len(), "loaded sheet");
    Ok(Table::new(name, format, headers, rows))
}

fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<Cell>>)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;

    let mut records = rdr.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .with_context(|| format!("reading CSV header of {}", path.display()))?
            .iter()
            .map(|s| s.to_string())
            .collect(),
        None => {
            warn!(path = %path.display(), "CSV file is empty");
            return Ok((Vec::new(), Vec::new()));
        }
    };

    let mut rows = Vec::new();
    for (idx, result) in records.enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx + 1))?;
        rows.push(
            record
                .iter()
                .map(|s| {
                    if s.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(s.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok((headers, rows))
}

fn read_workbook(path: &Path) -> Result<(Vec<String>, Vec<Vec<Cell>>)> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("workbook {} has no worksheets", path.display()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading worksheet `{}` of {}", sheet_name, path.display()))?;

    // The range starts at the first used cell; shift it back so that column
    // indices match spreadsheet letters.
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(cell_from_data));
        grid.push(cells);
    }

    if grid.is_empty() {
        warn!(path = %path.display(), sheet = %sheet_name, "worksheet is empty");
        return Ok((Vec::new(), Vec::new()));
    }
    let header_row = grid.remove(0);
    let headers = header_row.iter().map(Cell::text).collect();
    Ok((headers, grid))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => Cell::Duration(dt.as_f64()),
        Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}
