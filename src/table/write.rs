// src/table/write.rs

use anyhow::{anyhow, Context, Result};
use csv::WriterBuilder;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::{debug, instrument};

use super::{Cell, SheetFormat, Table};

/// Sheet name used for every emitted workbook.
pub const SHEET_NAME: &str = "Sheet1";

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const TIME_FORMAT: &str = "hh:mm:ss";
const DURATION_FORMAT: &str = "[h]:mm:ss";

/// File name the table is emitted under. Non-xlsx workbooks become `.xlsx`.
pub fn output_file_name(table: &Table) -> String {
    match table.format {
        SheetFormat::Csv => table.name.clone(),
        SheetFormat::Excel => {
            let path = Path::new(&table.name);
            let is_xlsx = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("xlsx"))
                .unwrap_or(false);
            if is_xlsx {
                table.name.clone()
            } else {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| table.name.clone());
                format!("{}.xlsx", stem)
            }
        }
    }
}

/// Serialize `table` into the bytes of its output file.
#[instrument(level = "debug", skip(table), fields(table = %table.name))]
pub fn render_table(table: &Table, max_width: usize) -> Result<Vec<u8>> {
    let bytes = match table.format {
        SheetFormat::Csv => render_csv(table)?,
        SheetFormat::Excel => render_xlsx(table, max_width)?,
    };
    debug!(bytes = bytes.len(), "rendered table");
    Ok(bytes)
}

fn render_csv(table: &Table) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new().flexible(false).from_writer(Vec::new());
    wtr.write_record(&table.headers)
        .context("writing CSV header")?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(Cell::text))
            .context("writing CSV row")?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow!("flushing CSV output: {}", e.error()))
}

/// Width per column: longest header or value plus padding, capped at `max_width`.
pub fn column_widths(table: &Table, max_width: usize) -> Vec<usize> {
    (0..table.width())
        .map(|col| {
            let header = table.headers[col].chars().count();
            let longest = table
                .rows()
                .iter()
                .map(|row| row[col].text().chars().count())
                .max()
                .unwrap_or(0);
            (header.max(longest) + 2).min(max_width)
        })
        .collect()
}

fn render_xlsx(table: &Table, max_width: usize) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let date = Format::new().set_num_format(DATE_FORMAT);
    let datetime = Format::new().set_num_format(DATETIME_FORMAT);
    let time = Format::new().set_num_format(TIME_FORMAT);
    let duration = Format::new().set_num_format(DURATION_FORMAT);

    for (c, header) in table.headers.iter().enumerate() {
        sheet.write_string(0, col_num(c)?, header)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let r = u32::try_from(r + 1).context("too many rows for a worksheet")?;
        for (c, cell) in row.iter().enumerate() {
            let c = col_num(c)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    sheet.write_string(r, c, s)?;
                }
                Cell::Int(i) => {
                    sheet.write_number(r, c, *i as f64)?;
                }
                Cell::Float(v) => {
                    sheet.write_number(r, c, *v)?;
                }
                Cell::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                Cell::DateTime(serial) => {
                    let format = if *serial < 1.0 {
                        &time
                    } else if serial.fract() == 0.0 {
                        &date
                    } else {
                        &datetime
                    };
                    sheet.write_number_with_format(r, c, *serial, format)?;
                }
                Cell::Duration(days) => {
                    sheet.write_number_with_format(r, c, *days, &duration)?;
                }
            }
        }
    }

    for (c, width) in column_widths(table, max_width).into_iter().enumerate() {
        sheet.set_column_width(col_num(c)?, width as f64)?;
    }

    workbook
        .save_to_buffer()
        .with_context(|| format!("serializing workbook for {}", table.name))
}

fn col_num(c: usize) -> Result<u16> {
    u16::try_from(c).context("too many columns for a worksheet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::load_table;
    use tempfile::tempdir;

    fn table(format: SheetFormat, name: &str) -> Table {
        Table::new(
            name,
            format,
            vec!["No".into(), "Filename".into(), "Notes".into()],
            vec![
                vec![Cell::Int(1), Cell::from("01_TRK_Song_STEMBass.wav"), Cell::Empty],
                vec![Cell::Int(2), Cell::from("x"), Cell::from("y".repeat(120))],
            ],
        )
    }

    #[test]
    fn widths_are_header_aware_and_capped() {
        let t = table(SheetFormat::Csv, "t.csv");
        assert_eq!(column_widths(&t, 70), vec![4, 26, 70]);
    }

    #[test]
    fn output_names() {
        assert_eq!(output_file_name(&table(SheetFormat::Csv, "a.csv")), "a.csv");
        assert_eq!(output_file_name(&table(SheetFormat::Excel, "b.xlsx")), "b.xlsx");
        assert_eq!(output_file_name(&table(SheetFormat::Excel, "c.xls")), "c.xlsx");
    }

    fn round_trip(t: &Table) -> Result<Table> {
        let dir = tempdir()?;
        let path = dir.path().join(output_file_name(t));
        std::fs::write(&path, render_table(t, 70)?)?;
        load_table(&path)
    }

    #[test]
    fn csv_round_trips() -> Result<()> {
        let t = table(SheetFormat::Csv, "round.csv");
        let back = round_trip(&t)?;
        assert_eq!(back.headers, t.headers);
        assert_eq!(back.get(0, 0), Some(&Cell::from("1")));
        assert_eq!(back.get(0, 1), Some(&Cell::from("01_TRK_Song_STEMBass.wav")));
        assert_eq!(back.get(0, 2), Some(&Cell::Empty));
        Ok(())
    }

    #[test]
    fn xlsx_round_trips() -> Result<()> {
        let t = table(SheetFormat::Excel, "round.xlsx");
        let back = round_trip(&t)?;
        assert_eq!(back.headers, t.headers);
        assert_eq!(back.row_count(), 2);
        assert_eq!(back.get(1, 0).map(Cell::text), Some("2".to_string()));
        assert_eq!(back.get(0, 1), Some(&Cell::from("01_TRK_Song_STEMBass.wav")));
        Ok(())
    }

    #[test]
    fn xlsx_keeps_dates_and_times() -> Result<()> {
        let time = 205.0 / 86_400.0;
        let t = Table::new(
            "dated.xlsx",
            SheetFormat::Excel,
            vec!["Released".into(), "Length".into(), "Stamp".into()],
            vec![vec![
                Cell::DateTime(45296.0),
                Cell::DateTime(time),
                Cell::DateTime(45296.5),
            ]],
        );
        let back = round_trip(&t)?;

        let serial = |col| match back.get(0, col) {
            Some(Cell::DateTime(v)) => *v,
            other => panic!("column {} came back as {:?}", col, other),
        };
        assert!((serial(0) - 45296.0).abs() < 1e-9);
        assert!((serial(1) - time).abs() < 1e-9);
        assert!((serial(2) - 45296.5).abs() < 1e-9);
        assert_eq!(back.get(0, 0).map(Cell::text), Some("2024-01-05".to_string()));
        assert_eq!(back.get(0, 1).map(Cell::text), Some("00:03:25".to_string()));
        Ok(())
    }
}
