use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default name of the aggregated JSON report.
pub const DEFAULT_REPORT_FILE_NAME: &str = "report.json";

/// Default prefix of the per-binary annotation files.
pub const DEFAULT_SINK_PREFIX: &str = "report-";

/// Settings for one processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Directory receiving the JSON report and the per-binary files.
    pub out_dir: PathBuf,
    /// Directory relative paths inside the report are resolved against.
    pub base_dir: PathBuf,
    /// File name of the aggregated report inside `out_dir`.
    #[serde(default = "default_report_file_name")]
    pub report_file_name: String,
    /// Prefix joined to a binary's base name to name its annotation file.
    #[serde(default = "default_sink_prefix")]
    pub sink_prefix: String,
}

fn default_report_file_name() -> String {
    DEFAULT_REPORT_FILE_NAME.to_string()
}

fn default_sink_prefix() -> String {
    DEFAULT_SINK_PREFIX.to_string()
}

impl ProcessConfig {
    /// Write outputs to `out_dir`, resolving report paths against `base_dir`.
    pub fn new(out_dir: impl Into<PathBuf>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            base_dir: base_dir.into(),
            report_file_name: default_report_file_name(),
            sink_prefix: default_sink_prefix(),
        }
    }

    /// Use `dir` both as output directory and as resolution base.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self::new(dir.clone(), dir)
    }

    pub fn with_report_file_name(mut self, name: impl Into<String>) -> Self {
        self.report_file_name = name.into();
        self
    }

    pub fn with_sink_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sink_prefix = prefix.into();
        self
    }
}
