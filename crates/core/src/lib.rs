//! grindsplit-core
//!
//! Core library for splitting `callgrind_annotate --auto=yes` reports.
//!
//! A single pass over the report classifies each line, builds the
//! binary -> file -> function index, and copies every auto-annotated source
//! block into a per-binary text file. After the pass, the inverse
//! function -> binary -> file index and a set of counts are derived and
//! written as one JSON report.
//!
//! The CLI is a thin wrapper; everything testable lives here.

pub mod aggregate;
pub mod error;
pub mod model;
pub mod output;
pub mod paths;
pub mod scan;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

pub use aggregate::{build_report, check_consistency, Aggregator, FileSetMismatch, ScanOutcome};
pub use error::{ReportError, ReportResult};
pub use model::Report;
pub use output::{OutputLayout, ProcessConfig};

/// Command that produces a report in the shape this crate understands.
pub const REGENERATE_HINT: &str =
    "callgrind_annotate --auto=yes --show-percs=no --context=0 callgrind.out.* > callgrind.annotated";

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: Report,
    pub report_path: PathBuf,
    /// Per-binary annotation files, in opening order.
    pub sink_paths: Vec<PathBuf>,
    /// Set when indexed and annotated files disagree.
    pub mismatch: Option<FileSetMismatch>,
}

/// Process the report at `input`.
pub fn process_report(input: &Path, config: &ProcessConfig) -> ReportResult<RunSummary> {
    info!("processing {}", input.display());
    let file = File::open(input).map_err(|e| ReportError::io(input, e))?;
    process_reader(BufReader::new(file), input, config)
}

/// Process a report read from `reader`; `source` only labels I/O errors.
///
/// The JSON report is written only when the whole input was scanned; on the
/// malformed-report error no report is written, and every annotation file
/// opened so far is closed when the aggregator is dropped.
pub fn process_reader<R: BufRead>(
    mut reader: R,
    source: &Path,
    config: &ProcessConfig,
) -> ReportResult<RunSummary> {
    let mut aggregator = Aggregator::new(config);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).map_err(|e| ReportError::io(source, e))?;
        if n == 0 {
            break;
        }
        aggregator.feed(&String::from_utf8_lossy(&buf))?;
    }
    let outcome = aggregator.finish()?;

    let report = build_report(&outcome);
    let layout = OutputLayout::new(config);
    fs::write(&layout.report_path, render_report(&report)?)
        .map_err(|e| ReportError::io(&layout.report_path, e))?;
    info!(
        "wrote {} ({} binaries, {} annotation files)",
        layout.report_path.display(),
        report.dsos.len(),
        outcome.sink_paths.len()
    );

    let mismatch = check_consistency(&outcome.indexed_files, &outcome.annotated_files);
    Ok(RunSummary { report, report_path: layout.report_path, sink_paths: outcome.sink_paths, mismatch })
}

/// Serialize `report` with sorted keys and four-space indentation.
pub fn render_report(report: &Report) -> ReportResult<String> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    report.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
