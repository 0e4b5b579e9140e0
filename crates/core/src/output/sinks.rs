use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::debug;

use crate::error::{ReportError, ReportResult};
use crate::output::OutputLayout;
use crate::scan::{delimiter, ANNOTATION_MARKER};

struct Sink {
    path: PathBuf,
    writer: BufWriter<File>,
}

/// Per-binary annotation files, opened on first reference.
///
/// Sinks are keyed by file name, so binaries sharing a base name share a
/// file. A sink is created (truncating any previous content) once per run and
/// then only appended to. Dropping this value closes every open sink, which
/// covers early exits; [`AnnotationSinks::close_all`] is the checked path.
pub struct AnnotationSinks {
    layout: OutputLayout,
    open: IndexMap<String, Sink>,
}

impl AnnotationSinks {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout, open: IndexMap::new() }
    }

    /// Start a new block for `source_file` in the sink of `binary`.
    pub fn begin_block(&mut self, binary: &str, source_file: &str) -> ReportResult<()> {
        let dashes = delimiter();
        let sink = self.sink(binary)?;
        writeln!(sink.writer, "{dashes}")
            .and_then(|_| writeln!(sink.writer, "{ANNOTATION_MARKER} {source_file}"))
            .and_then(|_| writeln!(sink.writer, "{dashes}"))
            .map_err(|e| ReportError::io(&sink.path, e))
    }

    /// Append one line of annotated source to the sink of `binary`.
    pub fn write_line(&mut self, binary: &str, text: &str) -> ReportResult<()> {
        let sink = self.sink(binary)?;
        writeln!(sink.writer, "{text}").map_err(|e| ReportError::io(&sink.path, e))
    }

    /// Number of sinks opened so far.
    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Flush and close every sink; returns their paths in opening order.
    ///
    /// All sinks are closed even when one fails to flush; the first failure
    /// is returned.
    pub fn close_all(&mut self) -> ReportResult<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(self.open.len());
        let mut first_err = None;
        for (_, mut sink) in self.open.drain(..) {
            if let Err(e) = sink.writer.flush() {
                if first_err.is_none() {
                    first_err = Some(ReportError::io(&sink.path, e));
                }
            }
            debug!("closed {}", sink.path.display());
            paths.push(sink.path);
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(paths),
        }
    }

    fn sink(&mut self, binary: &str) -> ReportResult<&mut Sink> {
        match self.open.entry(self.layout.sink_file_name(binary)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.layout.sink_path(binary);
                let file = File::create(&path).map_err(|e| ReportError::io(&path, e))?;
                debug!("opened {}", path.display());
                Ok(entry.insert(Sink { path, writer: BufWriter::new(file) }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::output::ProcessConfig;

    #[test]
    fn close_all_returns_paths_in_opening_order() {
        let temp = tempfile::tempdir().unwrap();
        let mut sinks = AnnotationSinks::new(OutputLayout::new(&ProcessConfig::in_dir(temp.path())));
        sinks.begin_block("/lib/liby.so", "/y.c").unwrap();
        sinks.begin_block("libx.so", "/x.c").unwrap();
        sinks.write_line("/lib/liby.so", "1 y();").unwrap();
        assert_eq!(sinks.len(), 2);

        let paths = sinks.close_all().unwrap();
        assert_eq!(paths, vec![temp.path().join("report-liby.so"), temp.path().join("report-libx.so")]);
        assert!(sinks.is_empty());
        assert!(fs::read_to_string(&paths[0]).unwrap().ends_with("1 y();\n"));
    }

    #[test]
    fn dropping_sinks_flushes_buffered_lines() {
        let temp = tempfile::tempdir().unwrap();
        {
            let mut sinks =
                AnnotationSinks::new(OutputLayout::new(&ProcessConfig::in_dir(temp.path())));
            sinks.begin_block("libx.so", "/x.c").unwrap();
            sinks.write_line("libx.so", "2 x();").unwrap();
        }
        let body = fs::read_to_string(temp.path().join("report-libx.so")).unwrap();
        assert!(body.ends_with("2 x();\n"));
    }
}
