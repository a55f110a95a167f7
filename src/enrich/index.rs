// src/enrich/index.rs

use std::collections::HashMap;
use tracing::debug;

use super::filename::{main_title, track_number};
use crate::config::{ColumnRole, ResolvedLayout};
use crate::table::{Cell, Table};

/// Snapshot of a row taken before any enrichment touched the table.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// Position of the row in the table.
    pub row: usize,
    pub cells: Vec<Cell>,
}

impl SourceRow {
    /// `None` when the snapshot is narrower than `col`.
    pub fn get(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    pub fn width(&self) -> usize {
        self.cells.len()
    }
}

/// Lookups built in one forward pass over an unmodified table.
/// First occurrence wins for both maps.
#[derive(Debug, Default)]
pub struct TitleIndex {
    by_title: HashMap<String, SourceRow>,
    track_numbers: HashMap<String, String>,
}

impl TitleIndex {
    pub fn build(table: &Table, layout: &ResolvedLayout) -> Self {
        let title_col = layout.index(ColumnRole::TrackTitle);
        let filename_col = layout.index(ColumnRole::Filename);
        let mut index = TitleIndex::default();

        for (row, cells) in table.rows().iter().enumerate() {
            if let Some(cell) = cells.get(title_col).filter(|c| !c.is_empty()) {
                let title = cell.text().trim().to_string();
                if !title.is_empty() && !index.by_title.contains_key(&title) {
                    index.by_title.insert(
                        title,
                        SourceRow {
                            row,
                            cells: cells.clone(),
                        },
                    );
                }
            }

            if let Some(cell) = cells.get(filename_col).filter(|c| !c.is_empty()) {
                let filename = cell.text();
                if let Some(title) = main_title(&filename) {
                    if !index.track_numbers.contains_key(&title) {
                        let number = track_number(&filename);
                        if !number.is_empty() {
                            index.track_numbers.insert(title, number);
                        }
                    }
                }
            }
        }

        debug!(
            titles = index.by_title.len(),
            track_numbers = index.track_numbers.len(),
            "built title index"
        );
        index
    }

    /// First row carrying `title` in its track-title column.
    pub fn source_row(&self, title: &str) -> Option<&SourceRow> {
        self.by_title.get(title)
    }

    /// Track number of the first filename whose main title is `title`.
    pub fn first_track_number(&self, title: &str) -> Option<&str> {
        self.track_numbers.get(title).map(String::as_str)
    }
}
