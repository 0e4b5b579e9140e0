//! Core data model for an annotated callgrind report.
//!
//! The two indexes built here are the whole point of a run:
//! - `BinaryIndex`: binary -> source file -> functions, in the order the
//!   report's index zones listed them.
//! - `FunctionIndex`: the inverse view, function -> binary -> source files.
//!
//! Both serialize with sorted keys so reports diff cleanly across runs.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Binary name used when an index row carries no `(binary)` column.
pub const UNKNOWN_BINARY: &str = "unknown";

/// One row of an index zone, reduced to its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub binary: String,
    pub source_file: String,
    /// Empty when the row's path had no `:function` part.
    pub function: String,
}

impl IndexRecord {
    pub fn new(
        binary: impl Into<String>,
        source_file: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self { binary: binary.into(), source_file: source_file.into(), function: function.into() }
    }
}

/// Source text reproduced under one `-- Auto-annotated source:` marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationBlock {
    pub source_file: String,
    pub lines: Vec<String>,
}

impl AnnotationBlock {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self { source_file: source_file.into(), lines: Vec::new() }
    }
}

type FileFunctions = IndexMap<String, Vec<String>>;

/// binary -> source file -> functions.
///
/// Insertion order of binaries and of files within a binary is preserved
/// because annotation resolution picks the *first* binary that lists a file.
/// Function lists keep duplicates: a report may name the same
/// `file:function` pair on several cost rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryIndex {
    binaries: IndexMap<String, FileFunctions>,
}

impl BinaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the record's function to `self[binary][file]`, creating both
    /// levels on first reference.
    pub fn record(&mut self, record: &IndexRecord) {
        self.binaries
            .entry(record.binary.clone())
            .or_default()
            .entry(record.source_file.clone())
            .or_default()
            .push(record.function.clone());
    }

    pub fn is_empty(&self) -> bool {
        self.binaries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.binaries.len()
    }

    /// Binary names in first-insertion order.
    pub fn binaries(&self) -> impl Iterator<Item = &str> {
        self.binaries.keys().map(|name| name.as_str())
    }

    /// Files recorded under `binary`, in first-insertion order.
    pub fn files(&self, binary: &str) -> Vec<&str> {
        self.binaries
            .get(binary)
            .map(|files| files.keys().map(|path| path.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn functions(&self, binary: &str, file: &str) -> Option<&[String]> {
        self.binaries.get(binary).and_then(|files| files.get(file)).map(|f| f.as_slice())
    }

    /// Number of distinct files recorded under `binary`.
    pub fn file_count(&self, binary: &str) -> usize {
        self.binaries.get(binary).map(|files| files.len()).unwrap_or(0)
    }

    /// First binary, in insertion order, whose file set contains `file`.
    ///
    /// A file can legitimately sit under several binaries (a header inlined
    /// into two libraries); the earliest one wins.
    pub fn binary_for_file(&self, file: &str) -> Option<&str> {
        self.binaries
            .iter()
            .find(|(_, files)| files.contains_key(file))
            .map(|(name, _)| name.as_str())
    }

    /// Most recently inserted binary.
    pub fn last_binary(&self) -> Option<&str> {
        self.binaries.last().map(|(name, _)| name.as_str())
    }

    /// Every recorded `(binary, file, function)` occurrence, in insertion order.
    pub fn triples(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.binaries.iter().flat_map(|(binary, files)| {
            files.iter().flat_map(move |(file, functions)| {
                functions.iter().map(move |func| (binary.as_str(), file.as_str(), func.as_str()))
            })
        })
    }

    fn to_sorted(&self) -> BTreeMap<&str, BTreeMap<&str, &[String]>> {
        self.binaries
            .iter()
            .map(|(binary, files)| {
                let files = files.iter().map(|(f, funcs)| (f.as_str(), funcs.as_slice())).collect();
                (binary.as_str(), files)
            })
            .collect()
    }
}

impl Serialize for BinaryIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_sorted().serialize(serializer)
    }
}

/// function -> binary -> source files the function was seen in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionIndex {
    entries: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl FunctionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, function: &str, binary: &str, file: &str) {
        self.entries
            .entry(function.to_string())
            .or_default()
            .entry(binary.to_string())
            .or_default()
            .push(file.to_string());
    }

    pub fn files(&self, function: &str, binary: &str) -> Option<&[String]> {
        self.entries.get(function).and_then(|b| b.get(binary)).map(|f| f.as_slice())
    }

    /// Number of distinct function names (the empty name included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counts reported under the `Statistics` key.
///
/// Fields are declared in the sorted order of their serialized names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "annotations file count")]
    pub annotated_files: usize,
    #[serde(rename = "annotations file count (unique)")]
    pub annotated_files_unique: usize,
    /// Distinct files per binary.
    #[serde(rename = "file count")]
    pub file_count: BTreeMap<String, usize>,
    /// Function occurrences (not distinct names) per binary.
    #[serde(rename = "function count")]
    pub function_count: BTreeMap<String, usize>,
    #[serde(rename = "index file count")]
    pub indexed_files: usize,
    #[serde(rename = "index file count (unique)")]
    pub indexed_files_unique: usize,
    #[serde(rename = "section count")]
    pub sections: usize,
    #[serde(rename = "total function count")]
    pub functions: usize,
    #[serde(rename = "total function count (unique)")]
    pub functions_unique: usize,
}

/// Everything written to the aggregated JSON report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    #[serde(rename = "DSOs")]
    pub dsos: BinaryIndex,
    #[serde(rename = "Statistics")]
    pub statistics: Statistics,
    pub functions: FunctionIndex,
}
