// src/process/inputs.rs

use anyhow::{Context, Result};
use glob::glob;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::table::SheetFormat;

/// Expand CLI arguments into spreadsheet paths, keeping argument order.
///
/// Each argument may be a file, a directory (its spreadsheets, sorted by name)
/// or a glob pattern. Office lock files (`~$...`) are ignored.
pub fn collect_inputs<S: AsRef<str>>(args: &[S]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut inputs = Vec::new();

    for arg in args {
        let arg = arg.as_ref();
        let path = Path::new(arg);
        let found: Vec<PathBuf> = if path.is_dir() {
            spreadsheets_in(path)?
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            glob(arg)
                .with_context(|| format!("Failed to read glob pattern '{}'", arg))?
                .filter_map(|entry| entry.ok())
                .filter(|p| p.is_file() && is_spreadsheet(p))
                .collect()
        };

        if found.is_empty() {
            warn!(input = arg, "no spreadsheets matched");
        }
        for p in found {
            if seen.insert(p.clone()) {
                inputs.push(p);
            }
        }
    }

    debug!(count = inputs.len(), "collected inputs");
    Ok(inputs)
}

fn spreadsheets_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_spreadsheet(p))
        .collect();
    found.sort();
    Ok(found)
}

fn is_spreadsheet(path: &Path) -> bool {
    let lock_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("~$"))
        .unwrap_or(false);
    !lock_file && SheetFormat::from_path(path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn expands_dirs_files_and_globs() -> Result<()> {
        let dir = tempdir()?;
        for name in ["b.csv", "a.xlsx", "notes.txt", "~$a.xlsx"] {
            fs::write(dir.path().join(name), b"x")?;
        }
        let sub = dir.path().join("more");
        fs::create_dir(&sub)?;
        fs::write(sub.join("c.csv"), b"x")?;

        let dir_arg = dir.path().display().to_string();
        let glob_arg = format!("{}/*/*.csv", dir.path().display());
        let file_arg = dir.path().join("b.csv").display().to_string();

        let inputs = collect_inputs(&[dir_arg, glob_arg, file_arg])?;
        let names: Vec<_> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        // b.csv appears once even though it was named twice
        assert_eq!(names, vec!["a.xlsx", "b.csv", "c.csv"]);
        Ok(())
    }

    #[test]
    fn unmatched_pattern_yields_nothing() -> Result<()> {
        let dir = tempdir()?;
        let inputs = collect_inputs(&[format!("{}/*.csv", dir.path().display())])?;
        assert!(inputs.is_empty());
        Ok(())
    }
}
