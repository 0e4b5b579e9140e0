use std::path::PathBuf;

use anyhow::Result;
use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser};
use grindsplit::commands::{process_command, ProcessOutcome};

const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;

/// Splits annotated callgrind reports.
///
/// Reads a `callgrind_annotate --auto=yes` report, writes one
/// `report-<binary>` file per binary with that binary's annotated sources,
/// and writes `report.json` indexing binaries, files, and functions.
#[derive(Parser, Debug)]
#[command(
    name = "grindsplit",
    version,
    about = "callgrind report parser",
    after_help = "process annotated callgrind reports",
    disable_version_flag = true
)]
struct Cli {
    /// Annotated callgrind report filename.
    filename: PathBuf,

    /// Directory receiving report.json and the per-binary files.
    #[arg(short = 'o', long, default_value = ".")]
    out_dir: String,

    /// Print statistics after processing.
    #[arg(long, default_value_t = false)]
    summary: bool,

    /// Print statistics as JSON after processing.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_cli() -> Cli {
    // `-v` rather than clap's default `-V`.
    let command = Cli::command().arg(
        Arg::new("version")
            .short('v')
            .long("version")
            .action(ArgAction::Version)
            .help("Print version"),
    );
    let matches = command.get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

fn run() -> Result<i32> {
    let cli = parse_cli();
    match process_command(&cli.filename, &cli.out_dir, cli.summary, cli.json)? {
        ProcessOutcome::Completed(_) => Ok(EXIT_SUCCESS),
        ProcessOutcome::MalformedReport => Ok(EXIT_ERROR),
    }
}
