use std::path::Path;

use anyhow::{Context, Result};
use grindsplit_core::{process_report, ProcessConfig, ReportError, RunSummary, REGENERATE_HINT};

use crate::commands::print_statistics;
use crate::prepare_out_dir;

/// How a processing run ended.
#[derive(Debug)]
pub enum ProcessOutcome {
    Completed(Box<RunSummary>),
    /// Annotation data came before any index data; nothing was written.
    MalformedReport,
}

/// Print guidance for regenerating a report this tool can read.
pub fn print_wrong_format_hint() {
    println!("Wrong report format!");
    println!("Generate the report with:");
    println!("\t{REGENERATE_HINT}");
}

/// Process one annotated report, writing outputs into `out_dir`.
///
/// Relative paths inside the report resolve against the current directory.
/// With `json`, stdout carries only the statistics document; progress and
/// mismatch lines move to stderr.
pub fn process_command(
    filename: &Path,
    out_dir: &str,
    summary: bool,
    json: bool,
) -> Result<ProcessOutcome> {
    let out_dir = prepare_out_dir(out_dir)?;
    let base_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = ProcessConfig::new(out_dir, base_dir);

    let say = |line: &str| {
        if json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    };

    say(&format!("Processing {}...", filename.display()));
    let run = match process_report(filename, &config) {
        Ok(run) => run,
        Err(ReportError::MissingIndex { source_file }) => {
            log::error!("annotation for {source_file} precedes any index data");
            print_wrong_format_hint();
            return Ok(ProcessOutcome::MalformedReport);
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to process report {}", filename.display()))
        }
    };

    if let Some(mismatch) = &run.mismatch {
        for line in mismatch.describe() {
            say(&line);
        }
    }

    if summary || json {
        print_statistics(&run.report.statistics, json)?;
    }

    Ok(ProcessOutcome::Completed(Box::new(run)))
}
