use anyhow::{Context, Result};
use clap::Parser;
use heapshape::{
    cli::{Cli, OutputFormat},
    config::AnalysisConfig,
    csv_output::DelimitedOutput,
    dispatch::{self, BatchOutput},
    json_output::JsonReport,
    reduce::{self, CoverageCurves, GlobalFrequencyReport, GlobalVisibilityReport},
};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber
///
/// `RUST_LOG` decides the filter when set, otherwise warnings only.
/// `--debug` raises everything to debug on top of either.
fn init_tracing(debug: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if debug {
        filter = filter.add_directive(tracing::Level::DEBUG.into());
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

/// Emit the reports in the requested format
fn emit_reports(
    args: &Cli,
    batch: &BatchOutput,
    frequency: &GlobalFrequencyReport,
    visibility: &GlobalVisibilityReport,
    coverage: &CoverageCurves,
) -> Result<()> {
    if args.format == OutputFormat::Json {
        for flag in args.ignored_by_json() {
            tracing::warn!(
                flag,
                "ignored with --format json, the document already holds every report"
            );
        }
        let json = JsonReport::new(frequency, visibility, &batch.empty, &batch.failures)
            .with_coverage(coverage)
            .to_json()
            .context("Failed to serialize report")?;
        match &args.shapes_output {
            Some(path) => write_output(path, &json)?,
            None => println!("{}", json),
        }
        return Ok(());
    }

    let table = match args.format {
        OutputFormat::Csv => DelimitedOutput::csv(),
        _ => DelimitedOutput::tsv(),
    };

    let shapes = table.frequency_report(frequency);
    let windows = table.visibility_report(visibility);

    match &args.shapes_output {
        Some(path) => write_output(path, &shapes)?,
        None => print!("{}", shapes),
    }
    match &args.visibility_output {
        Some(path) => write_output(path, &windows)?,
        None => {
            if args.shapes_output.is_none() {
                println!();
            }
            print!("{}", windows);
        }
    }
    if let Some(path) = &args.coverage_output {
        write_output(path, &table.coverage(coverage))?;
    }

    Ok(())
}

/// Per-file problems go to stderr so stdout stays a clean report
fn print_batch_summary(batch: &BatchOutput) {
    for benchmark in &batch.empty {
        tracing::info!(benchmark = %benchmark, "no shapes recorded, excluded from reports");
    }
    for path in &batch.duplicates {
        eprintln!("heapshape: skipped duplicate recording {}", path.display());
    }
    if !batch.failures.is_empty() {
        eprintln!(
            "heapshape: {} of {} recordings failed:",
            batch.failures.len(),
            batch.failures.len() + batch.decoded_files()
        );
        for failure in &batch.failures {
            eprintln!("  {}", failure);
        }
    }
    tracing::debug!(
        analyzed = batch.benchmarks.len(),
        empty = batch.empty.len(),
        failed = batch.failures.len(),
        threads = batch.threads_used,
        elapsed_ms = batch.elapsed.as_millis() as u64,
        "batch complete"
    );
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let base = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    let config = args.apply_to(base);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let batch = dispatch::analyze_root(&args.root, &config)?;
    print_batch_summary(&batch);

    let frequency = reduce::reduce_frequencies(&batch.benchmarks);
    let visibility = reduce::reduce_visibility(&batch.benchmarks);
    let coverage = frequency.coverage(config.coverage_ranks);

    emit_reports(&args, &batch, &frequency, &visibility, &coverage)?;

    if batch.decoded_any() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("heapshape: no recording could be decoded");
        Ok(ExitCode::FAILURE)
    }
}
