use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use edu_content_core::{
    CropConfig, CropOutput, CropResponse, DirectoryStore, FixedTrimAdvisor, JsonOcrClient,
    NoTrimAdvisor, ProblemCropper, TrimAdvisor, format_execution_time,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "crop-page",
    version,
    about = "Crop a single exam problem out of a page image using precomputed OCR tokens"
)]
struct Cli {
    /// Page image (PNG or JPEG).
    #[arg(long)]
    image: PathBuf,

    /// OCR tokens as JSON: an array of tokens or {"tokens": [...]}.
    #[arg(long)]
    ocr: PathBuf,

    /// Directory the crop is written to.
    #[arg(long)]
    out_dir: PathBuf,

    /// Only consider these problem numbers. Repeatable.
    #[arg(long = "problem")]
    problems: Vec<String>,

    /// Cropper config JSON; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trim suggestion to apply, as returned by a vision model.
    #[arg(long)]
    trim: Option<PathBuf>,
}

fn build_cropper(cli: &Cli) -> Result<ProblemCropper> {
    let ocr = JsonOcrClient::from_path(&cli.ocr)
        .with_context(|| format!("failed to load OCR tokens from '{}'", cli.ocr.display()))?;
    let advisor: Arc<dyn TrimAdvisor> = match &cli.trim {
        Some(path) => Arc::new(
            FixedTrimAdvisor::from_path(path)
                .with_context(|| format!("failed to load trim suggestion '{}'", path.display()))?,
        ),
        None => Arc::new(NoTrimAdvisor),
    };
    let config = match &cli.config {
        Some(path) => CropConfig::from_json_file(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => CropConfig::default(),
    };

    Ok(ProblemCropper::new(
        Arc::new(ocr),
        advisor,
        Arc::new(DirectoryStore::new(&cli.out_dir)),
    )
    .with_config(config)
    .with_targets(cli.problems.iter().cloned()))
}

fn print_response(response: &CropResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let cropper = build_cropper(cli)?;
    let image = tokio::fs::read(&cli.image)
        .await
        .with_context(|| format!("failed to read '{}'", cli.image.display()))?;

    let started = Instant::now();
    match cropper.detect_and_segment(&image).await {
        Ok(CropOutput {
            file_path, elapsed, ..
        }) => {
            print_response(&CropResponse::Success {
                file_path,
                execution_time: format_execution_time(elapsed),
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            let code = if error.is_no_problem() { 2 } else { 1 };
            print_response(&CropResponse::Failure {
                error: error.user_message(),
                execution_time: format_execution_time(started.elapsed()),
            })?;
            eprintln!("error: {}: {error}", error.code());
            Ok(ExitCode::from(code))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("edu_content_core=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
