use checkin_core::*;
use clap::{CommandFactory, Parser};
use std::io;
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  checkin --scan
  checkin --export --start=2024-10-25
  checkin --export --start=2024-10-24 --end=2024-10-26

Single-dash spellings (-scan, -export, -start=..., -end=..., -help) are also accepted.";

#[derive(Parser)]
#[command(name = "checkin")]
#[command(about = "Barcode check-in logger", long_about = None, after_help = EXAMPLES)]
struct Cli {
    /// Start barcode scanning mode
    #[arg(long, conflicts_with = "export")]
    scan: bool,

    /// Export records within a date or date range
    #[arg(long)]
    export: bool,

    /// Start date for export (required in export mode)
    #[arg(long, value_name = "YYYY-MM-DD")]
    start: Option<String>,

    /// End date for export (optional, for a date range)
    #[arg(long, value_name = "YYYY-MM-DD")]
    end: Option<String>,

    /// Override the scan store location
    #[arg(long)]
    store: Option<PathBuf>,

    /// Load configuration from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    checkin_core::logging::init();

    let args = normalize_args(std::env::args());
    if !has_flags(&args) {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let cli = Cli::parse_from(args);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let store = CsvStore::new(cli.store.unwrap_or_else(|| config.store.path.clone()));

    if cli.scan {
        cmd_scan(store, &config)
    } else if cli.export {
        cmd_export(&store, cli.start.as_deref(), cli.end.as_deref(), &config)
    } else {
        println!("Error: Please specify either --scan or --export.");
        Ok(())
    }
}

/// Usage is shown unless at least one flag was given
fn has_flags(args: &[String]) -> bool {
    args.iter().skip(1).any(|arg| arg.starts_with('-'))
}

/// Rewrite `-flag` and `-flag=value` into their double-dash forms
fn normalize_args(args: impl IntoIterator<Item = String>) -> Vec<String> {
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            let is_single_dash_word = i > 0
                && arg.len() > 2
                && arg.starts_with('-')
                && !arg.starts_with("--")
                && arg[1..].starts_with(|c: char| c.is_ascii_alphabetic());
            if is_single_dash_word {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

fn cmd_scan(store: CsvStore, config: &Config) -> Result<()> {
    let records = match store.read_records() {
        Ok(records) => records,
        Err(e) => {
            println!("Error opening store {}: {}", store.path().display(), e);
            return Ok(());
        }
    };
    tracing::debug!(
        "Loaded {} records from {}",
        records.len(),
        store.path().display()
    );

    let index = ScanIndex::from_records(&records);
    let mut scanner = Scanner::new(store, index, config.scan.duplicate_window());

    let stdin = io::stdin();
    run_session(&mut scanner, stdin.lock(), io::stdout(), local_now)?;
    Ok(())
}

fn cmd_export(
    store: &CsvStore,
    start: Option<&str>,
    end: Option<&str>,
    config: &Config,
) -> Result<()> {
    let Some(start) = start else {
        println!("Error: Start date is required for export mode.");
        return Ok(());
    };

    let window = match DateWindow::parse(start, end) {
        Ok(window) => window,
        Err(e) => {
            println!("Error: {}", e);
            return Ok(());
        }
    };

    match export(store, &window, &chrono::Local, &config.export.output_dir) {
        Ok(ExportOutcome::Written { path, count }) => {
            println!("Exported {} records to {}", count, path.display());
        }
        Ok(ExportOutcome::Empty) => {
            println!("No records found for the specified date range.");
        }
        Err(e) => {
            println!("Error: {}", e);
        }
    }

    Ok(())
}
