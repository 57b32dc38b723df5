//! CLI argument parsing for heapshape

use crate::config::AnalysisConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated values (default, read by the plotting scripts)
    Tsv,
    /// Comma-separated values
    Csv,
    /// Single JSON document with both reports
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "heapshape")]
#[command(version)]
#[command(
    about = "Reference-pattern frequency and window visibility reports for recorded heap shapes",
    long_about = None
)]
pub struct Cli {
    /// Directory holding one subdirectory per benchmark run
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// TOML configuration file (flags override its values)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Worker pool size (default: 32)
    #[arg(short = 'j', long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Recording file name inside each benchmark directory (default: shapes.binpb.zst)
    #[arg(long = "file-name", value_name = "NAME")]
    pub file_name: Option<String>,

    /// Smallest window as a power-of-two exponent (default: 6, i.e. 64 bytes)
    #[arg(long = "min-window-exp", value_name = "EXP")]
    pub min_window_exp: Option<u32>,

    /// Largest window as a power-of-two exponent (default: 16, i.e. 65536 bytes)
    #[arg(long = "max-window-exp", value_name = "EXP")]
    pub max_window_exp: Option<u32>,

    /// Give up on a single file after this many seconds
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "tsv")]
    pub format: OutputFormat,

    /// Write the pattern frequency report here instead of stdout
    #[arg(long = "shapes-output", value_name = "PATH")]
    pub shapes_output: Option<PathBuf>,

    /// Write the visibility report here instead of stdout
    #[arg(long = "visibility-output", value_name = "PATH")]
    pub visibility_output: Option<PathBuf>,

    /// Also write the top-rank coverage table here
    #[arg(long = "coverage-output", value_name = "PATH")]
    pub coverage_output: Option<PathBuf>,

    /// Number of ranks in the coverage table (default: 32)
    #[arg(long = "coverage-ranks", value_name = "K")]
    pub coverage_ranks: Option<usize>,

    /// Enable debug logging on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Overlay explicit flags onto `base`
    pub fn apply_to(&self, mut base: AnalysisConfig) -> AnalysisConfig {
        if let Some(threads) = self.threads {
            base.threads = threads;
        }
        if let Some(ref file_name) = self.file_name {
            base.file_name = file_name.clone();
        }
        if let Some(exp) = self.min_window_exp {
            base.min_window_exp = exp;
        }
        if let Some(exp) = self.max_window_exp {
            base.max_window_exp = exp;
        }
        if let Some(secs) = self.timeout_secs {
            base.timeout_secs = Some(secs);
        }
        if let Some(ranks) = self.coverage_ranks {
            base.coverage_ranks = ranks;
        }
        base
    }

    /// Output flags that have no effect with `--format json`
    pub fn ignored_by_json(&self) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if self.format != OutputFormat::Json {
            return ignored;
        }
        if self.visibility_output.is_some() {
            ignored.push("--visibility-output");
        }
        if self.coverage_output.is_some() {
            ignored.push("--coverage-output");
        }
        ignored
    }
}
