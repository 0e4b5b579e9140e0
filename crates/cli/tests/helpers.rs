use std::fs;

use grindsplit::commands::statistics_lines;
use grindsplit::prepare_out_dir;
use grindsplit_core::model::Statistics;
use tempfile::tempdir;

#[test]
fn prepare_out_dir_returns_cwd_for_dot() {
    let cwd = std::env::current_dir().expect("cwd");
    assert_eq!(prepare_out_dir(".").expect("resolve"), cwd);
}

#[test]
fn prepare_out_dir_creates_missing_directories() {
    let tmp = tempdir().expect("tempdir");
    let nested = tmp.path().join("out").join("nested");
    let resolved = prepare_out_dir(&nested.to_string_lossy()).expect("create");
    assert!(nested.is_dir());
    assert_eq!(resolved, nested.canonicalize().expect("canon"));
}

#[test]
fn prepare_out_dir_fails_when_path_is_a_file() {
    let tmp = tempdir().expect("tempdir");
    let file = tmp.path().join("occupied");
    fs::write(&file, b"x").expect("write");
    let err = prepare_out_dir(&file.join("sub").to_string_lossy()).unwrap_err();
    assert!(err.to_string().contains("Failed to create output dir"), "unexpected error: {err}");
}

#[test]
fn statistics_lines_list_each_binary() {
    let mut stats = Statistics { sections: 3, functions: 5, functions_unique: 4, ..Default::default() };
    stats.file_count.insert("libx.so".into(), 2);
    stats.function_count.insert("libx.so".into(), 5);

    let lines = statistics_lines(&stats);
    assert!(lines.contains(&"Sections: 3".to_string()));
    assert!(lines.contains(&"Functions: 5 (4 unique)".to_string()));
    assert!(lines.contains(&"  - libx.so: 2 files, 5 functions".to_string()));
}

#[test]
fn statistics_lines_mark_empty_runs() {
    let lines = statistics_lines(&Statistics::default());
    assert_eq!(lines.last().map(String::as_str), Some("  (none)"));
}
