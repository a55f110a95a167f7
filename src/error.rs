// src/error.rs

use thiserror::Error;

/// Failure classes surfaced by the batch processor.
///
/// `Configuration` is fatal and raised before any table is touched.
/// `Bounds` and `Unclassified` abandon the table they occurred in; the batch
/// carries on with the next one.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("column {column} (index {index}) is outside the table width of {width} columns")]
    Bounds {
        column: String,
        index: usize,
        width: usize,
    },

    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl Error {
    /// Short label used in logs and the run report.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::Bounds { .. } => "bounds",
            Error::Unclassified(_) => "unclassified",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
