//! Line classifier for `callgrind_annotate` output.
//!
//! The report is a flat text stream. Delimiter lines (80 dashes) bracket
//! header banners; the banner's content decides what the following body is:
//!
//! ```text
//! --------------------------------------------------------------------------------
//! Ir      file:function
//! --------------------------------------------------------------------------------
//! 10  /a/b.c:foo (libx.so)
//! --------------------------------------------------------------------------------
//! -- Auto-annotated source: /a/b.c
//! --------------------------------------------------------------------------------
//!  5 return 1;
//! ```
//!
//! The zone flags are carried across banners rather than reset when a banner
//! closes; only banner content changes them.

use std::path::{Path, PathBuf};

use log::debug;

use crate::model::{AnnotationBlock, IndexRecord, UNKNOWN_BINARY};
use crate::paths::absolutize;

/// Width of a delimiter line.
pub const DELIMITER_WIDTH: usize = 80;

/// Banner line announcing an index zone.
pub const INDEX_HEADER: &str = "Ir      file:function";

/// Banner line announcing an annotation zone; the source path follows it.
pub const ANNOTATION_MARKER: &str = "-- Auto-annotated source:";

/// A full delimiter line.
pub fn delimiter() -> String {
    "-".repeat(DELIMITER_WIDTH)
}

fn is_delimiter(line: &str) -> bool {
    line.len() == DELIMITER_WIDTH && line.bytes().all(|b| b == b'-')
}

/// Structural zone flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneState {
    pub in_banner: bool,
    pub in_index: bool,
    pub in_annotation: bool,
}

impl ZoneState {
    /// True outside any banner and with no body kind pending.
    pub fn is_outside(&self) -> bool {
        !self.in_banner && !self.in_index && !self.in_annotation
    }
}

/// Classification of one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent<'a> {
    BannerOpened,
    BannerClosed,
    IndexHeader,
    /// Annotation marker, with the source path already resolved.
    AnnotationHeader { source_file: String },
    /// Banner content of a kind this tool does not use; clears both zones.
    UnrecognizedBanner,
    /// Non-blank body line of an index zone, whitespace-trimmed.
    IndexRow(&'a str),
    /// Non-blank body line of an annotation zone, left-trimmed.
    AnnotationLine(&'a str),
    /// Blank line, or body text outside any known zone.
    Blank,
}

/// Stateful, lookahead-free classifier.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    state: ZoneState,
    sections: usize,
    base_dir: PathBuf,
}

impl LineClassifier {
    /// Relative paths in annotation markers are resolved against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { state: ZoneState::default(), sections: 0, base_dir: base_dir.into() }
    }

    pub fn state(&self) -> ZoneState {
        self.state
    }

    /// Number of banners entered so far.
    pub fn sections(&self) -> usize {
        self.sections
    }

    /// Classify `line` (with or without its newline) and advance the state.
    pub fn classify<'a>(&mut self, line: &'a str) -> LineEvent<'a> {
        let line = line.trim_end();

        if is_delimiter(line) {
            self.state.in_banner = !self.state.in_banner;
            if self.state.in_banner {
                self.sections += 1;
                return LineEvent::BannerOpened;
            }
            return LineEvent::BannerClosed;
        }

        if self.state.in_banner {
            return self.classify_banner(line);
        }

        let body = line.trim_start();
        if body.is_empty() {
            return LineEvent::Blank;
        }
        if self.state.in_index {
            LineEvent::IndexRow(body)
        } else if self.state.in_annotation {
            LineEvent::AnnotationLine(body)
        } else {
            LineEvent::Blank
        }
    }

    fn classify_banner<'a>(&mut self, line: &'a str) -> LineEvent<'a> {
        if line.starts_with(INDEX_HEADER) {
            debug!("section {}: index zone", self.sections);
            self.state.in_index = true;
            LineEvent::IndexHeader
        } else if let Some(rest) = line.strip_prefix(ANNOTATION_MARKER) {
            // Drop the single separator character after the marker.
            let mut chars = rest.chars();
            chars.next();
            let source_file = absolutize(chars.as_str(), &self.base_dir);
            debug!("section {}: annotation zone for {source_file}", self.sections);
            self.state.in_annotation = true;
            self.state.in_index = false;
            LineEvent::AnnotationHeader { source_file }
        } else {
            self.state.in_index = false;
            self.state.in_annotation = false;
            LineEvent::UnrecognizedBanner
        }
    }
}

/// Parse one non-blank index-zone row into an [`IndexRecord`].
///
/// Rows look like `<cost> <file>:<function> [(<binary>)]`. The path column
/// may contain one embedded space, which shows up as a fourth field; the two
/// halves are rejoined and the following field is taken as the binary.
/// Returns `None` for a row with no path column.
pub fn parse_index_record(line: &str, base_dir: &Path) -> Option<IndexRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2 {
        return None;
    }

    let (path_spec, binary_token) = if fields.len() > 3 {
        (format!("{} {}", fields[1], fields[2]), Some(fields[3]))
    } else {
        (fields[1].to_string(), fields.get(2).copied())
    };

    let resolved = absolutize(&path_spec, base_dir);
    let (source_file, function) = match resolved.split_once(':') {
        Some((file, func)) => (file.to_string(), func.to_string()),
        None => (resolved, String::new()),
    };

    let binary = match binary_token {
        Some(token) => strip_parens(token).to_string(),
        None => UNKNOWN_BINARY.to_string(),
    };

    Some(IndexRecord { binary, source_file, function })
}

/// Collect the annotation blocks in `lines`.
///
/// Works on a full report as well as on a per-binary annotation file, which
/// uses the same banner format.
pub fn annotation_blocks<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    base_dir: &Path,
) -> Vec<AnnotationBlock> {
    let mut classifier = LineClassifier::new(base_dir);
    let mut blocks: Vec<AnnotationBlock> = Vec::new();
    for line in lines {
        match classifier.classify(line) {
            LineEvent::AnnotationHeader { source_file } => {
                blocks.push(AnnotationBlock::new(source_file))
            }
            LineEvent::AnnotationLine(text) => {
                if let Some(block) = blocks.last_mut() {
                    block.lines.push(text.to_string());
                }
            }
            _ => {}
        }
    }
    blocks
}

fn strip_parens(token: &str) -> &str {
    let token = token.strip_prefix('(').unwrap_or(token);
    token.strip_suffix(')').unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> LineClassifier {
        LineClassifier::new("/work")
    }

    #[test]
    fn delimiter_toggles_banner_and_counts_sections() {
        let mut c = classifier();
        let dashes = delimiter();
        assert_eq!(c.classify(&dashes), LineEvent::BannerOpened);
        assert!(c.state().in_banner);
        assert_eq!(c.classify(&format!("{dashes}  \n")), LineEvent::BannerClosed);
        assert!(!c.state().in_banner);
        c.classify(&dashes);
        assert_eq!(c.sections(), 2);
    }

    #[test]
    fn short_or_long_dash_lines_are_not_delimiters() {
        let mut c = classifier();
        assert_eq!(c.classify(&"-".repeat(79)), LineEvent::Blank);
        assert_eq!(c.classify(&"-".repeat(81)), LineEvent::Blank);
        assert_eq!(c.sections(), 0);
    }

    #[test]
    fn zone_flags_survive_banner_close() {
        let mut c = classifier();
        let dashes = delimiter();
        c.classify(&dashes);
        assert_eq!(c.classify("Ir      file:function"), LineEvent::IndexHeader);
        c.classify(&dashes);
        assert!(c.state().in_index);
        assert_eq!(c.classify("  10  /a/b.c:foo (libx.so)"), LineEvent::IndexRow("10  /a/b.c:foo (libx.so)"));
        assert_eq!(c.classify("   "), LineEvent::Blank);
    }

    #[test]
    fn annotation_marker_resolves_path_and_clears_index() {
        let mut c = classifier();
        let dashes = delimiter();
        c.classify(&dashes);
        c.classify(INDEX_HEADER);
        c.classify(&dashes);
        c.classify(&dashes);
        let event = c.classify("-- Auto-annotated source: src/b.c");
        assert_eq!(event, LineEvent::AnnotationHeader { source_file: "/work/src/b.c".into() });
        c.classify(&dashes);
        assert!(c.state().in_annotation);
        assert!(!c.state().in_index);
        assert_eq!(c.classify("  5 return 1;"), LineEvent::AnnotationLine("5 return 1;"));
    }

    #[test]
    fn unrecognized_banner_clears_both_zones() {
        let mut c = classifier();
        let dashes = delimiter();
        c.classify(&dashes);
        c.classify("-- Auto-annotated source: /a/b.c");
        c.classify(&dashes);
        c.classify(&dashes);
        assert_eq!(c.classify("-- User-annotated source: /a/b.c"), LineEvent::UnrecognizedBanner);
        c.classify(&dashes);
        assert!(c.state().is_outside());
        assert_eq!(c.classify("text"), LineEvent::Blank);
    }

    #[test]
    fn index_takes_precedence_when_both_zones_set() {
        let mut c = classifier();
        let dashes = delimiter();
        c.classify(&dashes);
        c.classify("-- Auto-annotated source: /a/b.c");
        c.classify(&dashes);
        c.classify(&dashes);
        c.classify(INDEX_HEADER);
        c.classify(&dashes);
        let state = c.state();
        assert!(state.in_index && state.in_annotation);
        assert_eq!(c.classify("3 /a/b.c:bar"), LineEvent::IndexRow("3 /a/b.c:bar"));
    }

    #[test]
    fn parses_three_field_row() {
        let rec = parse_index_record("10  /a/b.c:foo (libx.so)", Path::new("/work")).unwrap();
        assert_eq!(rec, IndexRecord::new("libx.so", "/a/b.c", "foo"));
    }

    #[test]
    fn rejoins_path_split_by_embedded_space() {
        let rec = parse_index_record("7 /my dir/b.c:foo (/usr/lib/liby.so)", Path::new("/work"))
            .unwrap();
        assert_eq!(rec, IndexRecord::new("/usr/lib/liby.so", "/my dir/b.c", "foo"));
    }

    #[test]
    fn missing_binary_defaults_to_unknown() {
        let rec = parse_index_record("1,024 b.c:main", Path::new("/work")).unwrap();
        assert_eq!(rec, IndexRecord::new(UNKNOWN_BINARY, "/work/b.c", "main"));
    }

    #[test]
    fn missing_function_is_recorded_as_empty() {
        let rec = parse_index_record("3 /a/data.c (libx.so)", Path::new("/work")).unwrap();
        assert_eq!(rec.function, "");
        assert_eq!(rec.source_file, "/a/data.c");
    }

    #[test]
    fn function_keeps_text_after_first_colon() {
        let rec = parse_index_record("3 /a/x.cc:ns::f() (libx.so)", Path::new("/work")).unwrap();
        assert_eq!(rec.function, "ns::f()");
    }

    #[test]
    fn only_literal_parentheses_are_stripped_from_binary() {
        let base = Path::new("/work");
        assert_eq!(parse_index_record("10 /a.c:f (libx.so)", base).unwrap().binary, "libx.so");
        assert_eq!(parse_index_record("10 /a.c:f [libx.so]", base).unwrap().binary, "[libx.so]");
        assert_eq!(parse_index_record("10 /a.c:f libx.so)", base).unwrap().binary, "libx.so");
    }

    #[test]
    fn row_without_path_column_is_rejected() {
        assert!(parse_index_record("42", Path::new("/work")).is_none());
    }
}
