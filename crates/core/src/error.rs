use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for report processing.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Reading the input or writing an output file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An annotation zone appeared before any index zone.
    ///
    /// Every annotation block is attributed to a binary through the index, so
    /// a report in this shape was not produced with the expected
    /// `callgrind_annotate` options and cannot be processed.
    #[error("Annotation for {source_file} found before any index data; wrong report format")]
    MissingIndex { source_file: String },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// True for the malformed-report condition.
    pub fn is_missing_index(&self) -> bool {
        matches!(self, Self::MissingIndex { .. })
    }
}

/// Convenience result type for report processing.
pub type ReportResult<T> = Result<T, ReportError>;
