use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod commands;

/// Create `dir` if needed and return it as an absolute path.
///
/// `.` maps to the current working directory.
pub fn prepare_out_dir(dir: &str) -> Result<PathBuf> {
    let path = Path::new(dir);
    if path == Path::new(".") {
        return env::current_dir().context("Failed to get current directory");
    }
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create output dir: {}", path.display()))?;
    path.canonicalize()
        .with_context(|| format!("Failed to resolve output dir: {}", path.display()))
}
