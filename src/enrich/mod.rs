// src/enrich/mod.rs

pub mod filename;
pub mod index;
pub mod keywords;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

use crate::config::{ColumnRole, ResolvedLayout};
use crate::error::Result;
use crate::table::{Cell, Table};
pub use filename::FilenameTokens;
pub use index::{SourceRow, TitleIndex};

/// Literal inserted between the main title and the stem descriptor.
pub const STEM_LABEL: &str = "STEM";
pub const VOCAL_DESCRIPTION: &str = "Submix, Song, Lyrics, Vocals";
pub const NON_VOCAL_DESCRIPTION: &str = "Submix, No Lyrics, No Vocals";
pub const FIXED_FLAG: &str = "N";
pub const BACKGROUND_VOCAL_CATEGORY: &str = "Vocal Textures - Vocal Background";
pub const NO_VOCAL_CATEGORY: &str = "No Vocal";

static FULL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bFull\b").unwrap());

/// What one enrichment pass did to a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichSummary {
    /// Rows with a filename, i.e. rows the rules ran on.
    pub rows_enriched: usize,
    pub titles_filled: usize,
    pub source_matches: usize,
    pub cells_changed: usize,
}

impl EnrichSummary {
    pub fn modified(&self) -> bool {
        self.cells_changed > 0
    }
}

/// Enrich every row of `table` in place, in row order.
///
/// Rows without a filename are left alone. The title index is taken from the
/// table as it was before this call, so copy-forward always reads original
/// values. Derived columns outside the table width are skipped; a track title
/// that cannot be written aborts with a bounds error.
/// The vocal category is only written when the vocal-boolean column exists.
#[instrument(level = "info", skip(table, layout), fields(table = %table.name))]
pub fn enrich_table(table: &mut Table, layout: &ResolvedLayout) -> Result<EnrichSummary> {
    let mut summary = EnrichSummary::default();

    let filename_col = layout.index(ColumnRole::Filename);
    if !table.has_column(filename_col) {
        warn!(
            width = table.width(),
            filename_col, "filename column outside table; nothing to enrich"
        );
        return Ok(summary);
    }

    let index = TitleIndex::build(table, layout);

    // Both numbering columns count rows that carry a filename, so they share one counter.
    let mut sequence: i64 = 0;

    for row in 0..table.row_count() {
        let filename = match table.get(row, filename_col) {
            Some(cell) if !cell.is_blank() => cell.text(),
            _ => continue,
        };
        sequence += 1;

        let mut pass = RowPass {
            table: &mut *table,
            layout,
            index: &index,
            row,
            changed: 0,
        };
        let outcome = pass.run(&filename, sequence)?;
        let changed = pass.changed;

        summary.rows_enriched += 1;
        summary.cells_changed += changed;
        if outcome.title_filled {
            summary.titles_filled += 1;
        }
        if outcome.matched {
            summary.source_matches += 1;
        }
        trace!(row, changed, ?outcome, "row enriched");
    }

    debug!(?summary, "enrichment pass finished");
    Ok(summary)
}

#[derive(Debug, Default)]
struct RowOutcome {
    title_filled: bool,
    matched: bool,
}

/// Rule application for a single row.
struct RowPass<'a> {
    table: &'a mut Table,
    layout: &'a ResolvedLayout,
    index: &'a TitleIndex,
    row: usize,
    changed: usize,
}

impl<'a> RowPass<'a> {
    fn run(&mut self, file_name: &str, sequence: i64) -> Result<RowOutcome> {
        let tokens = FilenameTokens::parse(file_name);
        let mut outcome = RowOutcome::default();

        self.number(ColumnRole::Sequence, sequence)?;
        self.number(ColumnRole::SecondarySequence, sequence)?;

        let source = self.backfill_title(&tokens, &mut outcome)?;
        if let Some(source) = source {
            self.copy_forward(source)?;
        }
        self.derive_columns(file_name, &tokens, source)?;
        Ok(outcome)
    }

    fn col(&self, role: ColumnRole) -> usize {
        self.layout.index(role)
    }

    fn cell(&self, role: ColumnRole) -> Option<&Cell> {
        self.table.get(self.row, self.col(role))
    }

    /// Write that fails if the column is outside the table.
    fn set(&mut self, col: usize, value: Cell) -> Result<()> {
        if self.table.set(self.row, col, value)? {
            self.changed += 1;
        }
        Ok(())
    }

    /// Write that silently skips columns outside the table.
    fn put(&mut self, role: ColumnRole, value: impl Into<Cell>) -> Result<()> {
        let col = self.col(role);
        if self.table.set_if_present(self.row, col, value.into())? {
            self.changed += 1;
        }
        Ok(())
    }

    fn number(&mut self, role: ColumnRole, expected: i64) -> Result<()> {
        let col = self.col(role);
        if !self.table.has_column(col) {
            return Ok(());
        }
        let current = self.cell(role).map(Cell::text).unwrap_or_default();
        if current != expected.to_string() {
            self.set(col, Cell::Int(expected))?;
        }
        Ok(())
    }

    /// Fill an empty track title from the filename and look up the full-mix row.
    fn backfill_title(
        &mut self,
        tokens: &FilenameTokens,
        outcome: &mut RowOutcome,
    ) -> Result<Option<&'a SourceRow>> {
        let title = match tokens.main_title.as_deref() {
            Some(t) => t,
            None => return Ok(None),
        };
        let has_title = self
            .cell(ColumnRole::TrackTitle)
            .map(|c| !c.is_blank())
            .unwrap_or(false);
        if has_title {
            return Ok(None);
        }

        self.set(self.col(ColumnRole::TrackTitle), Cell::from(title))?;
        outcome.title_filled = true;

        let index: &'a TitleIndex = self.index;
        let source = index.source_row(title);
        outcome.matched = source.is_some();
        debug!(row = self.row, title, matched = outcome.matched, "backfilled title");

        if let Some(number) = index.first_track_number(title) {
            self.put(ColumnRole::FirstTrackNumber, number)?;
        }
        Ok(source)
    }

    /// Copy shared metadata from the matched row, leaving protected columns alone.
    /// Only columns present in both this table and the snapshot are copied.
    fn copy_forward(&mut self, source: &SourceRow) -> Result<()> {
        let limit = self.table.width().min(source.width());
        for col in 0..limit {
            if self.layout.is_copy_protected(col) {
                continue;
            }
            if let Some(value) = source.get(col) {
                self.set(col, value.clone())?;
            }
        }
        Ok(())
    }

    fn derive_columns(
        &mut self,
        file_name: &str,
        tokens: &FilenameTokens,
        source: Option<&SourceRow>,
    ) -> Result<()> {
        let stem = tokens.stem_suffix_formatted.as_str();
        let title = tokens.main_title.as_deref().unwrap_or("");
        let is_vocal = tokens.is_vocal();
        let layout = self.layout;
        let from_source = |role: ColumnRole| -> Option<Cell> {
            source.and_then(|s| s.get(layout.index(role))).cloned()
        };

        self.put(
            ColumnRole::NormalizedFilename,
            filename::strip_extension(file_name),
        )?;

        let prefix = self
            .cell(ColumnRole::NumericPrefix)
            .map(Cell::text)
            .unwrap_or_default();
        let display = format!("{} {} {} {}", prefix, title, STEM_LABEL, stem);
        self.put(ColumnRole::DisplayTitle, display.trim())?;

        self.put(ColumnRole::GroupKey, tokens.group_key.clone())?;

        let short_label = format!("{} {}", STEM_LABEL, stem);
        self.put(ColumnRole::ShortStemLabel, short_label.trim())?;

        let description = if is_vocal {
            vocal_description(from_source(ColumnRole::ContentDescription))
        } else {
            NON_VOCAL_DESCRIPTION.to_string()
        };
        self.put(ColumnRole::ContentDescription, description)?;

        self.put(ColumnRole::FixedFlag, FIXED_FLAG)?;

        if is_vocal {
            if let Some(value) = from_source(ColumnRole::VocalDependentCopy) {
                self.put(ColumnRole::VocalDependentCopy, value)?;
            }
        }

        // The category follows the boolean: no boolean column, no category.
        if self.table.has_column(self.col(ColumnRole::VocalBoolean)) {
            self.put(ColumnRole::VocalBoolean, if is_vocal { "1" } else { "0" })?;

            if is_vocal {
                let lower = stem.to_lowercase();
                if lower == "vocal background" || lower == "vocals background" {
                    self.put(ColumnRole::VocalCategory, BACKGROUND_VOCAL_CATEGORY)?;
                } else if let Some(value) = from_source(ColumnRole::VocalCategory) {
                    self.put(ColumnRole::VocalCategory, value)?;
                }
            } else {
                self.put(ColumnRole::VocalCategory, NO_VOCAL_CATEGORY)?;
            }
        }

        if let Some(category) = keywords::classify(stem) {
            self.put(ColumnRole::Instrumentation, category)?;
        }
        Ok(())
    }
}

/// Reuse the full mix's description with its first "Full" turned into "Submix".
fn vocal_description(source: Option<Cell>) -> String {
    let original = match source {
        Some(cell) => cell.text(),
        None => return VOCAL_DESCRIPTION.to_string(),
    };
    let replaced = FULL_WORD.replacen(&original, 1, "Submix");
    if replaced != original {
        replaced.into_owned()
    } else if !original.trim().is_empty() {
        original
    } else {
        VOCAL_DESCRIPTION.to_string()
    }
}
