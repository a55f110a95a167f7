// src/enrich/filename.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Marker separating the main title from the per-stem descriptor.
pub const STEM_MARKER: &str = "_STEM";
/// Marker used by full-mix filenames.
pub const FULL_MARKER: &str = "_Full";

static LOWER_OR_DIGIT_TO_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").unwrap());
static CAPS_RUN_TO_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z])([A-Z][a-z])").unwrap());
static LETTER_TO_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z])(\d)").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Everything the enrichment rules need from one filename.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilenameTokens {
    pub track_number: String,
    pub stem_suffix_raw: Option<String>,
    pub stem_suffix_formatted: String,
    pub main_title: Option<String>,
    pub group_key: String,
}

impl FilenameTokens {
    pub fn parse(filename: &str) -> Self {
        let stem_suffix_raw = stem_suffix_raw(filename);
        let stem_suffix_formatted = format_stem_suffix(stem_suffix_raw.as_deref().unwrap_or(""));
        Self {
            track_number: track_number(filename),
            stem_suffix_formatted,
            stem_suffix_raw,
            main_title: main_title(filename),
            group_key: group_key(filename),
        }
    }

    /// The stem descriptor mentions a vocal ("Vocal", "Vocals", "BackingVocal" ...).
    pub fn is_vocal(&self) -> bool {
        self.stem_suffix_formatted.to_lowercase().contains("vocal")
    }
}

/// Drop the extension the way a path-splitting routine would: only the last
/// dot of the final path component counts, and leading dots do not.
pub fn strip_extension(filename: &str) -> &str {
    let name_start = filename.rfind('/').map(|i| i + 1).unwrap_or(0);
    match filename.rfind('.') {
        Some(dot) if dot > name_start => {
            let base = &filename[name_start..dot];
            if base.chars().all(|c| c == '.') {
                filename
            } else {
                &filename[..dot]
            }
        }
        _ => filename,
    }
}

/// Text after the first `_STEM` marker, without extension.
pub fn stem_suffix_raw(filename: &str) -> Option<String> {
    let name = strip_extension(filename);
    let start = name.find(STEM_MARKER)? + STEM_MARKER.len();
    let suffix = name[start..].lines().next().unwrap_or("");
    if suffix.is_empty() {
        None
    } else {
        Some(suffix.to_string())
    }
}

/// Split a CamelCase/alnum stem descriptor into words: "VocalLead2" → "Vocal Lead 2".
pub fn format_stem_suffix(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let txt = LOWER_OR_DIGIT_TO_UPPER.replace_all(raw, "$1 $2");
    let txt = CAPS_RUN_TO_WORD.replace_all(&txt, "$1 $2");
    let txt = LETTER_TO_DIGIT.replace_all(&txt, "$1 $2");
    WHITESPACE_RUN.replace_all(&txt, " ").trim().to_string()
}

/// Song title recovered from `<prefix>_<track>_<title...>[_STEM...|_Full...].<ext>`.
pub fn main_title(filename: &str) -> Option<String> {
    if filename.trim().is_empty() {
        return None;
    }
    let mut name = strip_extension(filename);
    for marker in [STEM_MARKER, FULL_MARKER] {
        if let Some(pos) = name.find(marker) {
            name = &name[..pos];
            break;
        }
    }

    let parts: Vec<&str> = name.split('_').collect();
    let title = match parts.len() {
        n if n >= 3 => parts[2..].join("_"),
        2 => parts[1].to_string(),
        _ => name.to_string(),
    };
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Second underscore segment of the extension-less name, or "".
pub fn track_number(filename: &str) -> String {
    if filename.trim().is_empty() {
        return String::new();
    }
    strip_extension(filename)
        .split('_')
        .nth(1)
        .unwrap_or("")
        .to_string()
}

/// First two underscore segments joined with `_` (or the single segment).
pub fn group_key(filename: &str) -> String {
    if filename.trim().is_empty() {
        return String::new();
    }
    strip_extension(filename)
        .splitn(3, '_')
        .take(2)
        .collect::<Vec<_>>()
        .join("_")
}
