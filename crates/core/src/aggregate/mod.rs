//! Aggregation over classifier events.
//!
//! The [`Aggregator`] runs in lock-step with the [`LineClassifier`]: each
//! input line is classified and its event applied before the next line is
//! read. Once the input is exhausted, [`Aggregator::finish`] closes the
//! per-binary sinks and hands back a [`ScanOutcome`], from which
//! [`build_report`] derives the inverse index and the statistics.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;

use log::{debug, warn};

use crate::error::{ReportError, ReportResult};
use crate::model::{BinaryIndex, FunctionIndex, Report, Statistics};
use crate::output::{AnnotationSinks, OutputLayout, ProcessConfig};
use crate::scan::{parse_index_record, LineClassifier, LineEvent};

/// Everything the single pass collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub index: BinaryIndex,
    /// Source file of every index row, duplicates included.
    pub indexed_files: Vec<String>,
    /// Source file of every annotation marker, duplicates included.
    pub annotated_files: Vec<String>,
    /// Banners entered.
    pub sections: usize,
    /// Annotation files written, in opening order.
    pub sink_paths: Vec<PathBuf>,
}

/// Owns the pass state: the classifier, the index under construction and
/// the open annotation sinks.
pub struct Aggregator {
    classifier: LineClassifier,
    base_dir: PathBuf,
    index: BinaryIndex,
    indexed_files: Vec<String>,
    annotated_files: Vec<String>,
    sinks: AnnotationSinks,
    /// Binary whose sink receives the current annotation zone's lines.
    current_binary: Option<String>,
}

impl Aggregator {
    pub fn new(config: &ProcessConfig) -> Self {
        Self {
            classifier: LineClassifier::new(&config.base_dir),
            base_dir: config.base_dir.clone(),
            index: BinaryIndex::new(),
            indexed_files: Vec::new(),
            annotated_files: Vec::new(),
            sinks: AnnotationSinks::new(OutputLayout::new(config)),
            current_binary: None,
        }
    }

    /// Classify and apply one input line.
    pub fn feed(&mut self, line: &str) -> ReportResult<()> {
        match self.classifier.classify(line) {
            LineEvent::IndexRow(row) => match parse_index_record(row, &self.base_dir) {
                Some(record) => {
                    self.indexed_files.push(record.source_file.clone());
                    self.index.record(&record);
                }
                None => warn!("skipping index row without a path column: {row:?}"),
            },
            LineEvent::AnnotationHeader { source_file } => self.begin_annotation(source_file)?,
            LineEvent::AnnotationLine(text) => {
                if let Some(binary) = &self.current_binary {
                    self.sinks.write_line(binary, text)?;
                }
            }
            LineEvent::BannerOpened
            | LineEvent::BannerClosed
            | LineEvent::IndexHeader
            | LineEvent::UnrecognizedBanner
            | LineEvent::Blank => {}
        }
        Ok(())
    }

    fn begin_annotation(&mut self, source_file: String) -> ReportResult<()> {
        self.annotated_files.push(source_file.clone());
        if self.index.is_empty() {
            return Err(ReportError::MissingIndex { source_file });
        }

        let binary = match self.index.binary_for_file(&source_file) {
            Some(binary) => binary.to_string(),
            None => {
                // The index is non-empty, so a last binary exists.
                let fallback = self.index.last_binary().unwrap_or_default().to_string();
                warn!("{source_file} is not listed in any index zone; attributing it to {fallback}");
                fallback
            }
        };
        debug!("annotating {source_file} under {binary}");
        self.sinks.begin_block(&binary, &source_file)?;
        self.current_binary = Some(binary);
        Ok(())
    }

    /// Close every sink and return what the pass collected.
    pub fn finish(mut self) -> ReportResult<ScanOutcome> {
        let sink_paths = self.sinks.close_all()?;
        Ok(ScanOutcome {
            index: self.index,
            indexed_files: self.indexed_files,
            annotated_files: self.annotated_files,
            sections: self.classifier.sections(),
            sink_paths,
        })
    }
}

/// Build the inverse index and the statistics. Pure; repeated calls over the
/// same outcome produce equal reports.
pub fn build_report(outcome: &ScanOutcome) -> Report {
    let index = &outcome.index;
    let mut functions = FunctionIndex::new();
    let mut function_count: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_functions = 0;

    for (binary, file, function) in index.triples() {
        functions.insert(function, binary, file);
        *function_count.entry(binary.to_string()).or_default() += 1;
        total_functions += 1;
    }

    let file_count =
        index.binaries().map(|binary| (binary.to_string(), index.file_count(binary))).collect();

    let statistics = Statistics {
        annotated_files: outcome.annotated_files.len(),
        annotated_files_unique: unique_count(&outcome.annotated_files),
        file_count,
        function_count,
        indexed_files: outcome.indexed_files.len(),
        indexed_files_unique: unique_count(&outcome.indexed_files),
        sections: outcome.sections,
        functions: total_functions,
        functions_unique: functions.len(),
    };

    Report { dsos: index.clone(), statistics, functions }
}

fn unique_count(items: &[String]) -> usize {
    items.iter().collect::<HashSet<_>>().len()
}

/// Indexed and annotated file sets that disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSetMismatch {
    pub indexed: BTreeSet<String>,
    pub annotated: BTreeSet<String>,
}

impl FileSetMismatch {
    /// Files listed in an index zone but never annotated.
    pub fn indexed_only(&self) -> Vec<&str> {
        self.indexed.difference(&self.annotated).map(|s| s.as_str()).collect()
    }

    /// Files annotated but never listed in an index zone.
    pub fn annotated_only(&self) -> Vec<&str> {
        self.annotated.difference(&self.indexed).map(|s| s.as_str()).collect()
    }

    /// Human-readable diagnostic, one line per entry.
    pub fn describe(&self) -> Vec<String> {
        vec![
            "Error: index doesn't match annotation sections:".to_string(),
            format!("Indexed files ({}): {:?}", self.indexed.len(), as_list(&self.indexed)),
            format!("Annotated files ({}): {:?}", self.annotated.len(), as_list(&self.annotated)),
        ]
    }
}

fn as_list(files: &BTreeSet<String>) -> Vec<&str> {
    files.iter().map(|s| s.as_str()).collect()
}

/// Compare the distinct indexed files against the distinct annotated files.
pub fn check_consistency(indexed: &[String], annotated: &[String]) -> Option<FileSetMismatch> {
    let indexed: BTreeSet<String> = indexed.iter().cloned().collect();
    let annotated: BTreeSet<String> = annotated.iter().cloned().collect();
    if indexed == annotated {
        None
    } else {
        Some(FileSetMismatch { indexed, annotated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn equal_sets_are_consistent_regardless_of_order_and_duplicates() {
        let indexed = files(&["/b.c", "/a.c", "/a.c"]);
        let annotated = files(&["/a.c", "/b.c"]);
        assert!(check_consistency(&indexed, &annotated).is_none());
    }

    #[test]
    fn mismatch_reports_both_differences() {
        let mismatch =
            check_consistency(&files(&["/x.c", "/a.c"]), &files(&["/a.c", "/y.c"])).unwrap();
        assert_eq!(mismatch.indexed_only(), vec!["/x.c"]);
        assert_eq!(mismatch.annotated_only(), vec!["/y.c"]);
        let lines = mismatch.describe();
        assert_eq!(lines[0], "Error: index doesn't match annotation sections:");
        assert_eq!(lines[1], r#"Indexed files (2): ["/a.c", "/x.c"]"#);
        assert_eq!(lines[2], r#"Annotated files (2): ["/a.c", "/y.c"]"#);
    }
}
