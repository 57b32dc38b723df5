//! Per-benchmark aggregation
//!
//! Folds every record of a decoded corpus through the classifier into a
//! pattern frequency table and a window visibility table. The fold is a
//! multiset count, so record order never changes the result.
//!
//! A corpus with zero records yields no tables at all: the benchmark never
//! ran a collection pass and is left out of every downstream report.

use crate::classify::classify;
use crate::shape::{Epoch, PatternKey, ShapeRecord, ShapesCorpus};
use crate::window::{WindowSize, WindowSizes};
use std::collections::HashMap;

/// Frequency of one pattern within a benchmark
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyEntry {
    pub pattern: PatternKey,
    /// Number of records with this pattern
    pub count: u64,
    /// `count / total`
    pub fraction: f64,
}

/// Pattern frequencies of one benchmark, in first-seen order
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    total: u64,
    entries: Vec<FrequencyEntry>,
    index: HashMap<PatternKey, usize>,
}

impl FrequencyTable {
    /// Total records counted (sum of every entry's count)
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn get(&self, pattern: &PatternKey) -> Option<&FrequencyEntry> {
        self.index.get(pattern).map(|&i| &self.entries[i])
    }

    pub fn fraction(&self, pattern: &PatternKey) -> Option<f64> {
        self.get(pattern).map(|e| e.fraction)
    }

    /// Number of distinct patterns
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Visible/invisible record counts at one window size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityCounts {
    pub visible: u64,
    pub invisible: u64,
}

impl VisibilityCounts {
    pub fn total(&self) -> u64 {
        self.visible + self.invisible
    }

    /// `invisible / (visible + invisible)`, 0 when nothing was counted
    pub fn invisible_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.invisible as f64 / total as f64,
        }
    }
}

/// Visibility counts of one benchmark, ascending by window size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityTable {
    rows: Vec<(WindowSize, VisibilityCounts)>,
}

impl VisibilityTable {
    pub fn rows(&self) -> &[(WindowSize, VisibilityCounts)] {
        &self.rows
    }

    pub fn get(&self, window: WindowSize) -> Option<VisibilityCounts> {
        self.rows
            .iter()
            .find(|(w, _)| *w == window)
            .map(|&(_, counts)| counts)
    }
}

/// Aggregated tables for one benchmark
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkTables {
    pub benchmark: String,
    /// Number of collection passes in the recording
    pub epochs: usize,
    pub frequency: FrequencyTable,
    pub visibility: VisibilityTable,
}

/// Incremental fold over shape records
#[derive(Debug)]
pub struct Aggregator {
    windows: WindowSizes,
    index: HashMap<PatternKey, usize>,
    counts: Vec<(PatternKey, u64)>,
    visibility: Vec<VisibilityCounts>,
    total: u64,
    epochs: usize,
}

impl Aggregator {
    pub fn new(windows: &WindowSizes) -> Self {
        Self {
            windows: windows.clone(),
            index: HashMap::new(),
            counts: Vec::new(),
            visibility: vec![VisibilityCounts::default(); windows.len()],
            total: 0,
            epochs: 0,
        }
    }

    /// Count one record
    pub fn add(&mut self, record: &ShapeRecord) {
        let classification = classify(record, &self.windows);

        match self.index.get(&classification.pattern) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index
                    .insert(classification.pattern.clone(), self.counts.len());
                self.counts.push((classification.pattern, 1));
            }
        }

        for (slot, (_, visible)) in self
            .visibility
            .iter_mut()
            .zip(classification.visibility.iter())
        {
            if *visible {
                slot.visible += 1;
            } else {
                slot.invisible += 1;
            }
        }

        self.total += 1;
    }

    /// Count every record of an epoch
    pub fn add_epoch(&mut self, epoch: &Epoch) {
        self.epochs += 1;
        for record in &epoch.shapes {
            self.add(record);
        }
    }

    /// Records counted so far
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Normalize into tables; `None` when no record was counted
    pub fn finish(self, benchmark: impl Into<String>) -> Option<BenchmarkTables> {
        if self.total == 0 {
            return None;
        }

        let total = self.total;
        let entries = self
            .counts
            .into_iter()
            .map(|(pattern, count)| FrequencyEntry {
                pattern,
                count,
                fraction: count as f64 / total as f64,
            })
            .collect();

        Some(BenchmarkTables {
            benchmark: benchmark.into(),
            epochs: self.epochs,
            frequency: FrequencyTable {
                total,
                entries,
                index: self.index,
            },
            visibility: VisibilityTable {
                rows: self.windows.iter().zip(self.visibility).collect(),
            },
        })
    }
}

/// Aggregate a whole corpus; `None` when it holds no records
pub fn aggregate(
    benchmark: &str,
    corpus: &ShapesCorpus,
    windows: &WindowSizes,
) -> Option<BenchmarkTables> {
    let mut aggregator = Aggregator::new(windows);
    for epoch in &corpus.epochs {
        aggregator.add_epoch(epoch);
    }
    aggregator.finish(benchmark)
}
