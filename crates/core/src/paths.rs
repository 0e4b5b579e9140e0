//! Path helpers shared by the scanner and the output side.
//!
//! Resolution is purely lexical: the report names files on the machine that
//! produced it, so nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Resolve `text` to an absolute path string against `base_dir`.
///
/// Relative text is joined onto `base_dir`; `.` segments are dropped and `..`
/// pops the previous segment (never above the root). Empty text resolves to
/// `base_dir` itself.
pub fn absolutize(text: &str, base_dir: &Path) -> String {
    let joined = if text.is_empty() { base_dir.to_path_buf() } else { base_dir.join(text) };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if out.parent().is_some() {
                    out.pop();
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(Component::RootDir.as_os_str());
    }
    out.to_string_lossy().to_string()
}

/// Final `/`-separated segment of a binary name.
///
/// Binary names come straight from the report text, so this splits on `/`
/// rather than on the host's separator.
pub fn base_name(binary: &str) -> &str {
    binary.rsplit('/').next().unwrap_or(binary)
}
