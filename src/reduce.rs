//! Cross-benchmark reduction
//!
//! Runs once, after every worker has returned, over the benchmarks that
//! produced at least one shape (the set `B`).
//!
//! - Frequency: `mean(p) = Σ_b fraction_b(p) / |B|`, a benchmark lacking `p`
//!   contributing 0. Patterns are ranked by descending mean with a stable
//!   sort, so ties keep discovery order (benchmarks by name, then each
//!   table's first-seen order).
//! - Visibility: `invisible / (visible + invisible)` per benchmark and window.
//!   No averaging across benchmarks.

use crate::aggregate::BenchmarkTables;
use crate::shape::PatternKey;
use crate::window::WindowSize;
use serde::Serialize;
use std::collections::HashMap;

/// One ranked pattern
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    /// 1-based rank
    pub rank: usize,
    pub pattern: PatternKey,
    pub mean: f64,
    pub cumulative_mean: f64,
    /// Fraction in each benchmark, aligned with the report's `benchmarks`
    pub per_benchmark: Vec<Option<f64>>,
}

/// Ranked pattern frequencies across all benchmarks
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalFrequencyReport {
    /// Benchmark columns, sorted by name
    pub benchmarks: Vec<String>,
    pub rows: Vec<FrequencyRow>,
}

/// Cumulative share of the top-ranked patterns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRow {
    pub rank: usize,
    pub cumulative_mean: f64,
    /// Running sum of each benchmark's own fractions, largest first
    pub per_benchmark: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageCurves {
    pub benchmarks: Vec<String>,
    pub rows: Vec<CoverageRow>,
}

impl GlobalFrequencyReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, pattern: &PatternKey) -> Option<&FrequencyRow> {
        self.rows.iter().find(|r| &r.pattern == pattern)
    }

    /// Coverage of the first `ranks` ranks
    ///
    /// A benchmark with fewer patterns than `ranks` repeats its final sum.
    pub fn coverage(&self, ranks: usize) -> CoverageCurves {
        let ranks = ranks.min(self.rows.len());

        let running: Vec<Vec<f64>> = (0..self.benchmarks.len())
            .map(|col| {
                let mut fractions: Vec<f64> = self
                    .rows
                    .iter()
                    .filter_map(|row| row.per_benchmark[col])
                    .collect();
                fractions.sort_by(|a, b| b.total_cmp(a));
                fractions
                    .iter()
                    .scan(0.0, |acc, f| {
                        *acc += f;
                        Some(*acc)
                    })
                    .collect()
            })
            .collect();

        let rows = self.rows[..ranks]
            .iter()
            .map(|row| CoverageRow {
                rank: row.rank,
                cumulative_mean: row.cumulative_mean,
                per_benchmark: running
                    .iter()
                    .map(|sums| {
                        let at = row.rank.min(sums.len());
                        if at == 0 {
                            0.0
                        } else {
                            sums[at - 1]
                        }
                    })
                    .collect(),
            })
            .collect();

        CoverageCurves {
            benchmarks: self.benchmarks.clone(),
            rows,
        }
    }
}

/// One (benchmark, window) visibility ratio
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibilityRow {
    pub benchmark: String,
    pub window: WindowSize,
    pub visible: u64,
    pub invisible: u64,
    /// `invisible / (visible + invisible)`
    pub ratio: f64,
}

/// Per-benchmark, per-window visibility ratios
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalVisibilityReport {
    pub rows: Vec<VisibilityRow>,
}

impl GlobalVisibilityReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ratio(&self, benchmark: &str, window: WindowSize) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.benchmark == benchmark && r.window == window)
            .map(|r| r.ratio)
    }
}

fn sorted_by_name(tables: &[BenchmarkTables]) -> Vec<&BenchmarkTables> {
    let mut ordered: Vec<&BenchmarkTables> = tables.iter().collect();
    ordered.sort_by(|a, b| a.benchmark.cmp(&b.benchmark));
    ordered
}

/// Rank patterns by mean fraction across `tables`
pub fn reduce_frequencies(tables: &[BenchmarkTables]) -> GlobalFrequencyReport {
    let ordered = sorted_by_name(tables);
    if ordered.is_empty() {
        return GlobalFrequencyReport::default();
    }

    let mut index: HashMap<&PatternKey, usize> = HashMap::new();
    let mut sums: Vec<(&PatternKey, f64)> = Vec::new();
    for table in &ordered {
        for entry in table.frequency.entries() {
            match index.get(&entry.pattern) {
                Some(&i) => sums[i].1 += entry.fraction,
                None => {
                    index.insert(&entry.pattern, sums.len());
                    sums.push((&entry.pattern, entry.fraction));
                }
            }
        }
    }

    let count = ordered.len() as f64;
    let mut means: Vec<(&PatternKey, f64)> = sums
        .into_iter()
        .map(|(pattern, sum)| (pattern, sum / count))
        .collect();
    // Stable: ties keep discovery order
    means.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut cumulative = 0.0;
    let rows = means
        .into_iter()
        .enumerate()
        .map(|(i, (pattern, mean))| {
            cumulative += mean;
            FrequencyRow {
                rank: i + 1,
                pattern: pattern.clone(),
                mean,
                cumulative_mean: cumulative,
                per_benchmark: ordered
                    .iter()
                    .map(|t| t.frequency.fraction(pattern))
                    .collect(),
            }
        })
        .collect();

    GlobalFrequencyReport {
        benchmarks: ordered.iter().map(|t| t.benchmark.clone()).collect(),
        rows,
    }
}

/// Visibility ratio of every benchmark at every window
pub fn reduce_visibility(tables: &[BenchmarkTables]) -> GlobalVisibilityReport {
    let rows = sorted_by_name(tables)
        .into_iter()
        .flat_map(|table| {
            table
                .visibility
                .rows()
                .iter()
                .map(move |&(window, counts)| VisibilityRow {
                    benchmark: table.benchmark.clone(),
                    window,
                    visible: counts.visible,
                    invisible: counts.invisible,
                    ratio: counts.invisible_ratio(),
                })
        })
        .collect();

    GlobalVisibilityReport { rows }
}
