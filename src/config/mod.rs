// src/config/mod.rs

pub mod columns;

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::{debug, info};

use crate::error::{Error, Result};
pub use columns::{column_index_to_letter, column_letter_to_index};

/// Semantic meaning of a column in a stem listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnRole {
    Sequence,
    SecondarySequence,
    Filename,
    TrackTitle,
    DisplayTitle,
    GroupKey,
    NormalizedFilename,
    NumericPrefix,
    ShortStemLabel,
    ContentDescription,
    FixedFlag,
    FirstTrackNumber,
    Instrumentation,
    VocalDependentCopy,
    VocalBoolean,
    VocalCategory,
}

/// Column letters per role, as written in a layout YAML file.
///
/// Every field defaults to the standard stem-listing layout, so a YAML file
/// only needs to name the columns that differ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnLayout {
    pub sequence: String,
    pub secondary_sequence: String,
    pub filename: String,
    pub track_title: String,
    pub display_title: String,
    pub group_key: String,
    pub normalized_filename: String,
    pub numeric_prefix: String,
    pub short_stem_label: String,
    pub content_description: String,
    pub fixed_flag: String,
    pub first_track_number: String,
    pub instrumentation: String,
    pub vocal_dependent_copy: String,
    pub vocal_boolean: String,
    pub vocal_category: String,
    /// Identity/manual columns never overwritten by copy-forward.
    pub copy_exclusions: Vec<String>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        let s = |v: &str| v.to_string();
        Self {
            sequence: s("A"),
            secondary_sequence: s("AE"),
            filename: s("B"),
            track_title: s("R"),
            display_title: s("C"),
            group_key: s("E"),
            normalized_filename: s("K"),
            numeric_prefix: s("P"),
            short_stem_label: s("S"),
            content_description: s("T"),
            fixed_flag: s("U"),
            first_track_number: s("V"),
            instrumentation: s("Y"),
            vocal_dependent_copy: s("AI"),
            vocal_boolean: s("BC"),
            vocal_category: s("BD"),
            copy_exclusions: [
                "A", "B", "C", "D", "E", "K", "S", "T", "U", "V", "X", "Y", "AE", "AI", "AP",
                "BC", "BD",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

impl ColumnLayout {
    /// Load a layout from YAML. Missing fields keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("reading layout {}: {}", path.display(), e))
        })?;
        let layout: ColumnLayout = serde_yaml::from_str(&text).map_err(|e| {
            Error::Configuration(format!("parsing layout {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "loaded column layout");
        Ok(layout)
    }

    fn letters(&self) -> [(ColumnRole, &str); 16] {
        use ColumnRole::*;
        [
            (Sequence, self.sequence.as_str()),
            (SecondarySequence, self.secondary_sequence.as_str()),
            (Filename, self.filename.as_str()),
            (TrackTitle, self.track_title.as_str()),
            (DisplayTitle, self.display_title.as_str()),
            (GroupKey, self.group_key.as_str()),
            (NormalizedFilename, self.normalized_filename.as_str()),
            (NumericPrefix, self.numeric_prefix.as_str()),
            (ShortStemLabel, self.short_stem_label.as_str()),
            (ContentDescription, self.content_description.as_str()),
            (FixedFlag, self.fixed_flag.as_str()),
            (FirstTrackNumber, self.first_track_number.as_str()),
            (Instrumentation, self.instrumentation.as_str()),
            (VocalDependentCopy, self.vocal_dependent_copy.as_str()),
            (VocalBoolean, self.vocal_boolean.as_str()),
            (VocalCategory, self.vocal_category.as_str()),
        ]
    }

    /// Convert every letter to an index once. Any bad letter is a configuration error.
    pub fn resolve(&self) -> Result<ResolvedLayout> {
        let mut indices = BTreeMap::new();
        for (role, letter) in self.letters() {
            let idx = column_letter_to_index(letter)
                .map_err(|e| Error::Configuration(format!("{:?} column: {}", role, e)))?;
            indices.insert(role, idx);
        }

        let mut exclusions = self
            .copy_exclusions
            .iter()
            .map(|l| column_letter_to_index(l))
            .collect::<Result<Vec<_>>>()?;
        exclusions.sort_unstable();
        exclusions.dedup();

        debug!(?indices, ?exclusions, "resolved column layout");
        Ok(ResolvedLayout {
            indices,
            exclusions,
        })
    }
}

/// Role → column index bindings, fixed for a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    indices: BTreeMap<ColumnRole, usize>,
    exclusions: Vec<usize>,
}

impl ResolvedLayout {
    pub fn index(&self, role: ColumnRole) -> usize {
        // resolve() binds every role
        self.indices[&role]
    }

    /// Columns that copy-forward must leave alone.
    pub fn is_copy_protected(&self, col: usize) -> bool {
        col == self.index(ColumnRole::Filename)
            || col == self.index(ColumnRole::TrackTitle)
            || self.exclusions.binary_search(&col).is_ok()
    }
}

impl Default for ResolvedLayout {
    fn default() -> Self {
        ColumnLayout::default()
            .resolve()
            .unwrap_or_else(|e| unreachable!("default layout is valid: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_layout_resolves() {
        let layout = ResolvedLayout::default();
        assert_eq!(layout.index(ColumnRole::Sequence), 0);
        assert_eq!(layout.index(ColumnRole::Filename), 1);
        assert_eq!(layout.index(ColumnRole::TrackTitle), 17);
        assert_eq!(layout.index(ColumnRole::SecondarySequence), 30);
        assert_eq!(layout.index(ColumnRole::VocalCategory), 55);
        assert_eq!(layout.exclusions.len(), 17);
        assert!(layout.is_copy_protected(1));
        assert!(layout.is_copy_protected(17));
        assert!(layout.is_copy_protected(41)); // AP
        assert!(!layout.is_copy_protected(15)); // P
    }

    #[test]
    fn yaml_overrides_only_named_fields() -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "filename: C\ntrack_title: D\ncopy_exclusions: [a, a, B]")?;

        let layout = ColumnLayout::from_yaml_file(tmp.path())?;
        assert_eq!(layout.filename, "C");
        assert_eq!(layout.sequence, "A");

        let resolved = layout.resolve()?;
        assert_eq!(resolved.index(ColumnRole::Filename), 2);
        assert_eq!(resolved.index(ColumnRole::TrackTitle), 3);
        assert_eq!(resolved.exclusions, vec![0, 1]);
        Ok(())
    }

    #[test]
    fn bad_letter_is_configuration_error() {
        let layout = ColumnLayout {
            track_title: "R2".into(),
            ..ColumnLayout::default()
        };
        assert!(matches!(layout.resolve(), Err(Error::Configuration(_))));
    }

    #[test]
    fn unknown_yaml_field_is_rejected() -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "file_name: C")?;
        assert!(matches!(
            ColumnLayout::from_yaml_file(tmp.path()),
            Err(Error::Configuration(_))
        ));
        Ok(())
    }
}
