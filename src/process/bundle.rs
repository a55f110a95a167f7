// src/process/bundle.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::{
    collections::HashSet,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// With `Packaging::Auto`, more outputs than this are zipped together.
pub const AUTO_ZIP_THRESHOLD: usize = 2;

/// How modified tables are handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Packaging {
    /// Separate files for one or two outputs, a zip bundle beyond that.
    #[default]
    Auto,
    /// Always one file per table.
    Files,
    /// Always a single zip bundle.
    Zip,
}

/// A serialized table waiting to be emitted.
#[derive(Debug, Clone)]
pub struct RenderedTable {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Zip bundle name, e.g. `processed_files_20250101T120000.zip`.
pub fn bundle_name(at: DateTime<Utc>) -> String {
    format!("processed_files_{}.zip", at.format("%Y%m%dT%H%M%S"))
}

/// Write `outputs` into `out_dir` according to `packaging`; returns the artifacts created.
#[instrument(level = "info", skip(outputs, out_dir), fields(outputs = outputs.len(), out_dir = %out_dir.display()))]
pub fn emit(outputs: &[RenderedTable], out_dir: &Path, packaging: Packaging) -> Result<Vec<PathBuf>> {
    if outputs.is_empty() {
        info!("no modified tables; nothing to emit");
        return Ok(Vec::new());
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let names = unique_names(outputs.iter().map(|o| o.file_name.as_str()));
    let zipped = match packaging {
        Packaging::Auto => outputs.len() > AUTO_ZIP_THRESHOLD,
        Packaging::Files => false,
        Packaging::Zip => true,
    };

    if zipped {
        let path = out_dir.join(bundle_name(Utc::now()));
        write_zip(&path, names.iter().map(String::as_str).zip(outputs))?;
        info!(path = %path.display(), files = outputs.len(), "wrote zip bundle");
        return Ok(vec![path]);
    }

    let mut written = Vec::with_capacity(outputs.len());
    for (name, output) in names.iter().zip(outputs) {
        let path = out_dir.join(name);
        fs::write(&path, &output.bytes).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), bytes = output.bytes.len(), "wrote table");
        written.push(path);
    }
    Ok(written)
}

fn write_zip<'a>(
    path: &Path,
    entries: impl Iterator<Item = (&'a str, &'a RenderedTable)>,
) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, output) in entries {
        zip.start_file(name, options)
            .with_context(|| format!("adding {} to bundle", name))?;
        zip.write_all(&output.bytes)?;
    }
    zip.finish().context("finishing zip bundle")?;
    Ok(())
}

/// Disambiguate repeated file names: `a.csv`, `a_2.csv`, `a_3.csv`.
fn unique_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .map(|name| {
            if seen.insert(name.to_string()) {
                return name.to_string();
            }
            let path = Path::new(name);
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let ext = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            let mut n = 2;
            loop {
                let candidate = format!("{}_{}{}", stem, n, ext);
                if seen.insert(candidate.clone()) {
                    return candidate;
                }
                n += 1;
            }
        })
        .collect()
}
