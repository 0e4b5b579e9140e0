use anyhow::{Context, Result};
use grindsplit_core::model::Statistics;

/// Print run statistics, as JSON or as an indented listing.
pub fn print_statistics(stats: &Statistics, json: bool) -> Result<()> {
    if json {
        let serialized = serde_json::to_string_pretty(stats)
            .context("Failed to serialize statistics to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    for line in statistics_lines(stats) {
        println!("{line}");
    }
    Ok(())
}

/// Human-readable statistics, one entry per line.
pub fn statistics_lines(stats: &Statistics) -> Vec<String> {
    let mut lines = vec![
        "Statistics".to_string(),
        "==========".to_string(),
        format!("Sections: {}", stats.sections),
        format!("Indexed files: {} ({} unique)", stats.indexed_files, stats.indexed_files_unique),
        format!(
            "Annotated files: {} ({} unique)",
            stats.annotated_files, stats.annotated_files_unique
        ),
        format!("Functions: {} ({} unique)", stats.functions, stats.functions_unique),
    ];

    lines.push(format!("Binaries ({}):", stats.file_count.len()));
    if stats.file_count.is_empty() {
        lines.push("  (none)".to_string());
    }
    for (binary, files) in &stats.file_count {
        let functions = stats.function_count.get(binary).copied().unwrap_or(0);
        lines.push(format!("  - {binary}: {files} files, {functions} functions"));
    }
    lines
}
