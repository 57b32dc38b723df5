//! Parallel per-benchmark dispatch
//!
//! Discovers one recording per benchmark directory and runs
//! decode → classify → aggregate for each on a fixed-size worker pool.
//!
//! # Layout
//!
//! ```text
//! <root>/
//! ├─ lusearch.1700000000/shapes.binpb.zst   → benchmark "lusearch"
//! ├─ xalan.1700000042/shapes.binpb.zst      → benchmark "xalan"
//! └─ ...
//! ```
//!
//! Workers share no mutable state. Each returns one [`FileOutcome`], and the
//! caller only sees the collected [`BatchOutput`] after every file is done.
//! A failing file is reported in `failures` and never stops its siblings.
//!
//! Benchmark names must be unique. When two directories share a leading name
//! segment (`avrora.1`, `avrora.2`), the first in sorted path order wins and
//! every later recording is listed in [`BatchOutput::duplicates`] instead of
//! silently replacing it.

use crate::aggregate::{aggregate, BenchmarkTables};
use crate::config::AnalysisConfig;
use crate::decode::{read_corpus, DecodeError};
use crate::window::WindowSizes;
use crossbeam::channel::{self, RecvTimeoutError};
use rayon::prelude::*;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that abort the whole run
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("failed to read input directory {path}: {source}")]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no '{file_name}' recordings found under {root}")]
    NoInputs { root: PathBuf, file_name: String },

    #[error("failed to create worker pool: {0}")]
    ThreadPool(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// One recording to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub benchmark: String,
    pub path: PathBuf,
}

impl InputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            benchmark: benchmark_name(&path),
            path,
        }
    }
}

/// Per-file failure, kept alongside the successful results
#[derive(Error, Debug)]
#[error("{benchmark}: {error}")]
pub struct FileError {
    pub benchmark: String,
    pub path: PathBuf,
    #[source]
    pub error: DecodeError,
}

/// Result of processing one file
#[derive(Debug)]
pub enum FileOutcome {
    Analyzed(Box<BenchmarkTables>),
    /// Decoded fine but held no shapes (no collection pass happened)
    Empty { benchmark: String },
    Failed(FileError),
}

/// Everything the worker pool produced
#[derive(Debug)]
pub struct BatchOutput {
    /// Benchmarks with at least one shape, in input order
    pub benchmarks: Vec<BenchmarkTables>,
    /// Benchmarks whose recording held no shapes
    pub empty: Vec<String>,
    pub failures: Vec<FileError>,
    /// Recordings skipped because an earlier one had the same benchmark name
    pub duplicates: Vec<PathBuf>,
    pub elapsed: Duration,
    pub threads_used: usize,
}

impl BatchOutput {
    /// Files that decoded without error (empty ones included)
    pub fn decoded_files(&self) -> usize {
        self.benchmarks.len() + self.empty.len() + self.duplicates.len()
    }

    /// Whether any file at all decoded successfully
    pub fn decoded_any(&self) -> bool {
        self.decoded_files() > 0
    }
}

/// Benchmark name for a recording path
///
/// The leading `.`-delimited segment of the enclosing directory:
/// - `runs/lusearch.1700000000/shapes.binpb.zst` → `lusearch`
/// - `runs/h2/shapes.binpb.zst` → `h2`
///
/// Falls back to the file name when there is no enclosing directory.
pub fn benchmark_name(path: &Path) -> String {
    let segment = path
        .parent()
        .and_then(Path::file_name)
        .or_else(|| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    segment.split('.').next().unwrap_or_default().to_string()
}

/// Find `<root>/*/<file_name>`, sorted by path
pub fn discover_inputs(root: &Path, file_name: &str) -> Result<Vec<InputFile>, BatchError> {
    let read_err = |e: io::Error| BatchError::ReadRoot {
        path: root.to_path_buf(),
        source: e,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(root).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let candidate = entry.path().join(file_name);
        if candidate.is_file() {
            paths.push(candidate);
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(BatchError::NoInputs {
            root: root.to_path_buf(),
            file_name: file_name.to_string(),
        });
    }

    tracing::debug!(root = %root.display(), count = paths.len(), "discovered recordings");
    Ok(paths.into_iter().map(InputFile::new).collect())
}

/// Decode and aggregate one recording
pub fn analyze_file(
    path: &Path,
    benchmark: &str,
    windows: &WindowSizes,
) -> Result<Option<BenchmarkTables>, DecodeError> {
    let corpus = read_corpus(path)?;
    tracing::debug!(
        benchmark,
        epochs = corpus.epochs.len(),
        shapes = corpus.shape_count(),
        "decoded recording"
    );
    Ok(aggregate(benchmark, &corpus, windows))
}

/// Run `work` on a helper thread, giving up after `timeout`
///
/// On expiry the helper is detached; it only owns its own inputs and its
/// result is dropped.
fn run_with_timeout<T, F>(path: &Path, timeout: Duration, work: F) -> Result<T, DecodeError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DecodeError> + Send + 'static,
{
    let (tx, rx) = channel::bounded(1);
    std::thread::Builder::new()
        .name("heapshape-decode".to_string())
        .spawn(move || {
            // Receiver may be gone after a timeout
            let _ = tx.send(work());
        })
        .map_err(|e| DecodeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(DecodeError::Timeout {
            path: path.to_path_buf(),
            timeout,
        }),
        Err(RecvTimeoutError::Disconnected) => Err(DecodeError::WorkerPanicked {
            path: path.to_path_buf(),
        }),
    }
}

/// Fans recordings out over a local rayon pool
#[derive(Debug, Clone)]
pub struct Dispatcher {
    threads: usize,
    windows: WindowSizes,
    timeout: Option<Duration>,
}

impl Dispatcher {
    /// Fails with [`BatchError::Config`] if `threads` is 0
    pub fn new(threads: usize, windows: WindowSizes) -> Result<Self, BatchError> {
        if threads == 0 {
            return Err(BatchError::Config("thread count must be > 0".to_string()));
        }
        Ok(Self {
            threads,
            windows,
            timeout: None,
        })
    }

    /// Bound the time spent on any single file
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, BatchError> {
        config.validate().map_err(BatchError::Config)?;
        let windows = config.window_sizes().map_err(BatchError::Config)?;
        let dispatcher = Self::new(config.threads, windows)?;
        Ok(match config.timeout() {
            Some(timeout) => dispatcher.with_timeout(timeout),
            None => dispatcher,
        })
    }

    pub fn windows(&self) -> &WindowSizes {
        &self.windows
    }

    /// Process one recording; never panics on bad input
    pub fn process_file(&self, input: &InputFile) -> FileOutcome {
        let start = Instant::now();
        tracing::info!(benchmark = %input.benchmark, path = %input.path.display(), "processing");

        let result = match self.timeout {
            None => analyze_file(&input.path, &input.benchmark, &self.windows),
            Some(timeout) => {
                let path = input.path.clone();
                let benchmark = input.benchmark.clone();
                let windows = self.windows.clone();
                run_with_timeout(&input.path, timeout, move || {
                    analyze_file(&path, &benchmark, &windows)
                })
            }
        };

        tracing::debug!(
            benchmark = %input.benchmark,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "finished"
        );

        match result {
            Ok(Some(tables)) => FileOutcome::Analyzed(Box::new(tables)),
            Ok(None) => FileOutcome::Empty {
                benchmark: input.benchmark.clone(),
            },
            Err(error) => {
                tracing::warn!(benchmark = %input.benchmark, "{}", error);
                FileOutcome::Failed(FileError {
                    benchmark: input.benchmark.clone(),
                    path: input.path.clone(),
                    error,
                })
            }
        }
    }

    /// Process every input; returns once all workers are done
    pub fn run(&self, inputs: &[InputFile]) -> Result<BatchOutput, BatchError> {
        let start = Instant::now();

        // Local pool so different dispatchers can use different sizes
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("heapshape-worker-{}", i))
            .build()
            .map_err(|e| BatchError::ThreadPool(e.to_string()))?;

        tracing::debug!(threads = self.threads, files = inputs.len(), "starting workers");

        let outcomes: Vec<FileOutcome> = pool.install(|| {
            inputs
                .par_iter()
                .map(|input| self.process_file(input))
                .collect()
        });

        let mut output = BatchOutput {
            benchmarks: Vec::new(),
            empty: Vec::new(),
            failures: Vec::new(),
            duplicates: Vec::new(),
            elapsed: Duration::ZERO,
            threads_used: self.threads,
        };
        let mut seen = HashSet::new();

        for (input, outcome) in inputs.iter().zip(outcomes) {
            match outcome {
                FileOutcome::Analyzed(tables) => {
                    if seen.insert(tables.benchmark.clone()) {
                        output.benchmarks.push(*tables);
                    } else {
                        tracing::warn!(
                            benchmark = %tables.benchmark,
                            path = %input.path.display(),
                            "duplicate benchmark name, keeping the first recording"
                        );
                        output.duplicates.push(input.path.clone());
                    }
                }
                FileOutcome::Empty { benchmark } => output.empty.push(benchmark),
                FileOutcome::Failed(err) => output.failures.push(err),
            }
        }

        output.elapsed = start.elapsed();
        Ok(output)
    }
}

/// Discover and process every recording under `root`
pub fn analyze_root(root: &Path, config: &AnalysisConfig) -> Result<BatchOutput, BatchError> {
    let dispatcher = Dispatcher::from_config(config)?;
    let inputs = discover_inputs(root, &config.file_name)?;
    dispatcher.run(&inputs)
}
