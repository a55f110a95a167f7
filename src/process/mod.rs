// src/process/mod.rs
pub mod bundle;
pub mod inputs;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{error, info, instrument};

use crate::config::ResolvedLayout;
use crate::enrich::{enrich_table, EnrichSummary};
use crate::error::Result;
use crate::table::{load_table, output_file_name, write::render_table, Table};
pub use bundle::{Packaging, RenderedTable};
pub use inputs::collect_inputs;

/// Default cap on emitted column widths.
pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 70;

/// Result of enriching one input.
#[derive(Debug)]
pub enum TableOutcome {
    Modified(Table, EnrichSummary),
    Unchanged(EnrichSummary),
}

/// Load, enrich and classify a single table.
#[instrument(level = "info", skip(path, layout), fields(path = %path.as_ref().display()))]
pub fn process_file<P: AsRef<Path>>(path: P, layout: &ResolvedLayout) -> Result<TableOutcome> {
    let mut table = load_table(path.as_ref())?;
    let summary = enrich_table(&mut table, layout)?;
    if summary.modified() {
        Ok(TableOutcome::Modified(table, summary))
    } else {
        Ok(TableOutcome::Unchanged(summary))
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub out_dir: PathBuf,
    pub packaging: Packaging,
    pub max_column_width: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("processed"),
            packaging: Packaging::Auto,
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TableStatus {
    Modified {
        output: String,
        #[serde(flatten)]
        summary: EnrichSummary,
    },
    Unchanged {
        #[serde(flatten)]
        summary: EnrichSummary,
    },
    Skipped {
        kind: String,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub input: PathBuf,
    #[serde(flatten)]
    pub status: TableStatus,
}

/// Everything a batch run did, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub processed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub tables: Vec<TableReport>,
    pub artifacts: Vec<PathBuf>,
}

impl BatchReport {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            processed: 0,
            unchanged: 0,
            skipped: 0,
            tables: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Write the report as pretty JSON (tmp file + rename).
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let tmp_path = path.with_extension("json.tmp");
        let mut tmp = fs::File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        serde_json::to_writer_pretty(&mut tmp, self).context("serializing run report")?;
        tmp.write_all(b"\n")?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
        Ok(())
    }
}

/// Process every input in order. A failing table is recorded as skipped and
/// the batch moves on; only emitting the outputs can fail the whole run.
pub fn run_batch(
    inputs: &[PathBuf],
    layout: &ResolvedLayout,
    options: &BatchOptions,
) -> anyhow::Result<BatchReport> {
    let start = Instant::now();
    let mut report = BatchReport::new();
    let mut outputs: Vec<RenderedTable> = Vec::new();
    let total = inputs.len();

    for (i, path) in inputs.iter().enumerate() {
        info!(file = %path.display(), "processing {}/{}", i + 1, total);

        let status = match process_file(path, layout) {
            Ok(TableOutcome::Modified(table, summary)) => {
                let file_name = output_file_name(&table);
                match render_table(&table, options.max_column_width) {
                    Ok(bytes) => {
                        report.processed += 1;
                        outputs.push(RenderedTable {
                            file_name: file_name.clone(),
                            bytes,
                        });
                        TableStatus::Modified {
                            output: file_name,
                            summary,
                        }
                    }
                    Err(e) => {
                        error!(file = %path.display(), "failed to serialize: {:#}", e);
                        report.skipped += 1;
                        TableStatus::Skipped {
                            kind: "unclassified".into(),
                            error: format!("{:#}", e),
                        }
                    }
                }
            }
            Ok(TableOutcome::Unchanged(summary)) => {
                info!(file = %path.display(), "no changes");
                report.unchanged += 1;
                TableStatus::Unchanged { summary }
            }
            Err(e) => {
                error!(file = %path.display(), kind = e.kind(), "skipped: {:#}", e);
                report.skipped += 1;
                TableStatus::Skipped {
                    kind: e.kind().into(),
                    error: format!("{:#}", e),
                }
            }
        };
        report.tables.push(TableReport {
            input: path.clone(),
            status,
        });
    }

    report.artifacts = bundle::emit(&outputs, &options.out_dir, options.packaging)?;
    report.finished_at = Utc::now();

    if report.processed == 0 && report.skipped == 0 {
        info!(
            inputs = total,
            "processing complete; no files were modified or met criteria for changes"
        );
    } else {
        info!(
            elapsed = ?start.elapsed(),
            "batch processing complete: {} file(s) processed, {} file(s) skipped/errored",
            report.processed,
            report.skipped
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use std::fs::File;
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    use zip::ZipArchive;

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,stemsheet=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// Header A..R plus rows with filename in B and title in R.
    fn stem_csv(rows: &[(&str, &str)]) -> String {
        let mut out = String::new();
        let header: Vec<String> = (0..18).map(crate::config::column_index_to_letter).collect();
        out.push_str(&header.join(","));
        out.push('\n');
        for (file, title) in rows {
            let mut cells = vec![String::new(); 18];
            cells[1] = file.to_string();
            cells[17] = title.to_string();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }

    #[test]
    fn batch_isolates_failures_and_skips_unchanged() -> anyhow::Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let input = dir.path().join("in");
        fs::create_dir(&input)?;

        let good = input.join("good.csv");
        fs::write(
            &good,
            stem_csv(&[
                ("LIB_001_Song_Full.wav", "Song"),
                ("LIB_001_Song_STEMBass.wav", ""),
            ]),
        )?;
        // no filenames at all
        let idle = input.join("idle.csv");
        fs::write(&idle, stem_csv(&[("", "Song")]))?;
        // title column R missing while a title must be filled
        let narrow = input.join("narrow.csv");
        fs::write(&narrow, "A,B\n,LIB_001_Song_STEMBass.wav\n")?;
        // not a spreadsheet at all
        let broken = input.join("broken.xlsx");
        fs::write(&broken, b"not a zip")?;

        let options = BatchOptions {
            out_dir: dir.path().join("out"),
            ..BatchOptions::default()
        };
        let inputs = vec![good, idle, narrow, broken];
        let report = run_batch(&inputs, &ResolvedLayout::default(), &options)?;

        assert_eq!(report.processed, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.artifacts, vec![options.out_dir.join("good.csv")]);
        assert!(matches!(
            &report.tables[2].status,
            TableStatus::Skipped { kind, .. } if kind == "bounds"
        ));
        assert!(matches!(
            &report.tables[3].status,
            TableStatus::Skipped { kind, .. } if kind == "unclassified"
        ));

        let written = load_table(options.out_dir.join("good.csv"))?;
        assert_eq!(written.get(1, 17), Some(&Cell::from("Song")));
        assert_eq!(written.get(1, 0), Some(&Cell::from("2")));
        assert_eq!(written.get(1, 4), Some(&Cell::from("LIB_001")));
        Ok(())
    }

    #[test]
    fn many_outputs_are_bundled() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let mut inputs = Vec::new();
        for i in 0..3 {
            let path = dir.path().join(format!("listing{}.csv", i));
            let file = format!("L_00{}_Song_STEMPiano.wav", i);
            fs::write(&path, stem_csv(&[(file.as_str(), "")]))?;
            inputs.push(path);
        }
        let options = BatchOptions {
            out_dir: dir.path().join("out"),
            ..BatchOptions::default()
        };
        let report = run_batch(&inputs, &ResolvedLayout::default(), &options)?;

        assert_eq!(report.processed, 3);
        assert_eq!(report.artifacts.len(), 1);
        let archive = ZipArchive::new(File::open(&report.artifacts[0])?)?;
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["listing0.csv", "listing1.csv", "listing2.csv"]);
        Ok(())
    }

    #[test]
    fn report_serializes_to_json() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.csv");
        fs::write(&path, stem_csv(&[("L_001_Song_STEMVocal.wav", "")]))?;
        let options = BatchOptions {
            out_dir: dir.path().join("out"),
            ..BatchOptions::default()
        };
        let report = run_batch(&[path], &ResolvedLayout::default(), &options)?;

        let json_path = dir.path().join("reports/run.json");
        report.write_json(&json_path)?;
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path)?)?;
        assert_eq!(value["processed"], 1);
        assert_eq!(value["tables"][0]["status"], "modified");
        assert_eq!(value["tables"][0]["output"], "a.csv");
        assert_eq!(value["tables"][0]["titles_filled"], 1);
        Ok(())
    }

    #[test]
    fn workbook_dates_survive_enrichment() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let released = 45296.0;
        let length = 205.0 / 86_400.0;
        let mut full = vec![Cell::Empty; 18];
        full[1] = Cell::from("LIB_001_Song_Full.wav");
        full[5] = Cell::DateTime(released);
        full[6] = Cell::DateTime(length);
        full[17] = Cell::from("Song");
        let mut stem = vec![Cell::Empty; 18];
        stem[1] = Cell::from("LIB_001_Song_STEMBass.wav");
        let headers = (0..18).map(crate::config::column_index_to_letter).collect();
        let input = Table::new("dated.xlsx", crate::table::SheetFormat::Excel, headers, vec![full, stem]);
        let path = dir.path().join("dated.xlsx");
        fs::write(&path, render_table(&input, DEFAULT_MAX_COLUMN_WIDTH)?)?;

        let options = BatchOptions {
            out_dir: dir.path().join("out"),
            ..BatchOptions::default()
        };
        let report = run_batch(&[path], &ResolvedLayout::default(), &options)?;
        assert_eq!(report.processed, 1);

        let written = load_table(options.out_dir.join("dated.xlsx"))?;
        for row in [0, 1] {
            match (written.get(row, 5), written.get(row, 6)) {
                (Some(Cell::DateTime(d)), Some(Cell::DateTime(t))) => {
                    assert!((d - released).abs() < 1e-9);
                    assert!((t - length).abs() < 1e-9);
                }
                other => panic!("row {} lost its date cells: {:?}", row, other),
            }
        }
        Ok(())
    }
}
