use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use text_table_infer::{
    Inference, InferenceReport, InferOptions, decode_text, infer_table, write_table_csv,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "text2table",
    version,
    about = "Infer typed tables from CSV, TSV, markdown or aligned text"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Infer a table and its chart views from a text file.
    Infer(InferArgs),
}

#[derive(Debug, Args)]
struct InferArgs {
    /// Input text path.
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for table.csv and view_N.csv. Prints JSON when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the full JSON report even when writing CSV files.
    #[arg(long)]
    json: bool,

    /// Output delimiter character for CSV files.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Keep the parsed table as the only view.
    #[arg(long)]
    no_decompose: bool,

    /// Do not merge a wrapped second header line into the header.
    #[arg(long)]
    no_header_merge: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &InferArgs) -> InferOptions {
    InferOptions {
        decompose: !args.no_decompose,
        merge_headers: !args.no_header_merge,
        ..InferOptions::default()
    }
}

fn log_report(report: &InferenceReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} column={:?} rows={:?}: {}",
                warning.code, warning.column, warning.rows, warning.message
            );
        }
    }
}

fn write_outputs(report: &InferenceReport, dir: &Path, delimiter: u8) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;

    write_table_csv(&dir.join("table.csv"), &report.table, delimiter)
        .context("failed to write table.csv")?;
    for (index, view) in report.views.iter().enumerate() {
        let name = format!("view_{}.csv", index + 1);
        write_table_csv(&dir.join(&name), &view.table, delimiter)
            .with_context(|| format!("failed to write {name}"))?;
    }
    Ok(())
}

fn run_infer(args: &InferArgs) -> Result<Inference> {
    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let bytes = fs::read(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let text = decode_text(&bytes);
    let inference = infer_table(&text, &parse_options(args));

    if let Inference::Tabular(report) = &inference {
        if let Some(dir) = &args.output {
            write_outputs(report, dir, args.delimiter as u8)?;
        }
        if args.output.is_none() || args.json {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }

    Ok(inference)
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("text_table_infer=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Infer(args) => match run_infer(&args) {
            Ok(Inference::Tabular(report)) => {
                log_report(&report, args.verbose);
                ExitCode::SUCCESS
            }
            Ok(Inference::NotTabular) => {
                eprintln!("no table structure detected in '{}'", args.input.display());
                ExitCode::from(2)
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
