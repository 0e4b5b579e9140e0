//! Output side of a run: configuration, on-disk layout, and the per-binary
//! annotation files.

mod config;
mod layout;
mod sinks;

pub use config::{ProcessConfig, DEFAULT_REPORT_FILE_NAME, DEFAULT_SINK_PREFIX};
pub use layout::OutputLayout;
pub use sinks::AnnotationSinks;
