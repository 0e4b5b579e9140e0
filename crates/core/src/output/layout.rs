use std::path::PathBuf;

use crate::output::ProcessConfig;
use crate::paths::base_name;

/// Where a run's outputs land on disk.
///
/// Derived from a [`ProcessConfig`]; it does not perform any IO itself.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    /// Directory receiving every output.
    pub out_dir: PathBuf,
    /// Path of the aggregated JSON report.
    pub report_path: PathBuf,
    sink_prefix: String,
}

impl OutputLayout {
    pub fn new(config: &ProcessConfig) -> Self {
        Self {
            out_dir: config.out_dir.clone(),
            report_path: config.out_dir.join(&config.report_file_name),
            sink_prefix: config.sink_prefix.clone(),
        }
    }

    /// File name of the annotation file for `binary` (prefix + base name).
    pub fn sink_file_name(&self, binary: &str) -> String {
        format!("{}{}", self.sink_prefix, base_name(binary))
    }

    /// Path of the annotation file for `binary`.
    pub fn sink_path(&self, binary: &str) -> PathBuf {
        self.out_dir.join(self.sink_file_name(binary))
    }
}
