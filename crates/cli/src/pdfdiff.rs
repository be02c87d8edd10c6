//! pdfdiff - Compare two directories of document revisions
//!
//! Every document in the old directory is compared page by page with the
//! document of the same name in the new directory. Documents that differ get
//! an annotated `diff_<name>.pdf` in the output directory: changed pixels are
//! tinted, added words are labeled green and removed words red.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vellum_core::batch::{BatchOptions, BatchReport, BatchRunner};
use vellum_core::compare::CompareOptions;
use vellum_core::document::{BundleLoader, BundleRenderer};
use vellum_core::utils::Rgb8;

/// Compare old and new document revisions and write annotated PDF diffs.
#[derive(Parser, Debug)]
#[command(name = "pdfdiff")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory with the old revisions
    #[arg(default_value = "./Old_Documents")]
    old_dir: PathBuf,

    /// Directory with the new revisions
    #[arg(default_value = "./New_Documents")]
    new_dir: PathBuf,

    /// Directory the annotated diffs are written to
    #[arg(short = 'o', long = "output-dir", default_value = "./Output")]
    output_dir: PathBuf,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    // === Comparison options ===
    /// Zoom factor applied to rendering and label geometry
    #[arg(short = 'q', long, default_value = "2.0")]
    quality: f64,

    /// Label font size, before scaling by quality
    #[arg(short = 'f', long = "font-size", default_value = "8.0")]
    font_size: f64,

    /// Overlay tint for changed pixels, as "r,g,b"
    #[arg(long, default_value = "170,51,106", value_parser = parse_tint)]
    tint: Rgb8,

    /// Overlay tint opacity (0.0 to 1.0)
    #[arg(long, default_value = "0.5")]
    opacity: f64,

    /// Number of pages of one document compared concurrently
    #[arg(long = "page-threads", default_value = "1")]
    page_threads: usize,

    // === Batch options ===
    /// Number of documents compared concurrently
    #[arg(short = 'j', long, default_value = "1")]
    jobs: usize,

    /// Keep existing files in the output directory
    #[arg(long = "keep-output", action = ArgAction::SetTrue)]
    keep_output: bool,

    /// Write a JSON report of every document pair to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Exit with an error if any document pair failed
    #[arg(long = "fail-on-error", action = ArgAction::SetTrue)]
    fail_on_error: bool,
}

/// Parse a tint given as three comma-separated 0-255 components.
fn parse_tint(s: &str) -> std::result::Result<Rgb8, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("tint must be \"r,g,b\", got {s:?}"));
    }

    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        *slot = part
            .parse::<u8>()
            .map_err(|_| format!("invalid tint component: {part}"))?;
    }
    Ok(rgb)
}

/// Build batch options from command line arguments.
fn build_options(args: &Args) -> Result<BatchOptions> {
    let compare = CompareOptions::new(
        args.quality,
        args.font_size,
        args.tint,
        args.opacity,
        args.page_threads,
    )?;

    let mut options = BatchOptions::new(&args.old_dir, &args.new_dir, &args.output_dir);
    options.jobs = args.jobs;
    options.clear_output = !args.keep_output;
    options.compare = compare;
    options.validate()?;
    Ok(options)
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn write_report(report: &BatchReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("failed to write report {}", path.display()))
}

fn run(args: &Args) -> Result<BatchReport> {
    for dir in [&args.old_dir, &args.new_dir] {
        if !dir.is_dir() {
            bail!("directory not found: {}", dir.display());
        }
    }

    let options = build_options(args).context("invalid options")?;
    let runner = BatchRunner::new(BundleLoader, BundleRenderer, options)?;
    let report = runner.run().with_context(|| {
        format!(
            "failed to compare {} with {}",
            args.old_dir.display(),
            args.new_dir.display()
        )
    })?;

    if let Some(path) = &args.report {
        write_report(&report, path)?;
        info!(path = %path.display(), "report written");
    }
    Ok(report)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args) {
        Ok(report) => {
            println!(
                "{} documents compared, {} with differences, {} missing, {} failed ({:.2}s)",
                report.pairs.len(),
                report.with_differences(),
                report.missing(),
                report.failures(),
                report.total_secs
            );
            if args.fail_on_error && report.failures() > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
