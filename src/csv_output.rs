//! Delimited (TSV/CSV) output for the global reports
//!
//! TSV is the default and is what downstream plotting reads. Fractions are
//! printed as percentages with two decimals; absent cells are left empty.

use crate::reduce::{CoverageCurves, GlobalFrequencyReport, GlobalVisibilityReport};

/// Tabular formatter parameterized by field delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedOutput {
    delimiter: char,
}

impl DelimitedOutput {
    /// Tab-separated output
    pub fn tsv() -> Self {
        Self { delimiter: '\t' }
    }

    /// Comma-separated output
    pub fn csv() -> Self {
        Self { delimiter: ',' }
    }

    /// Escape a field (handle delimiter, quotes, newlines)
    fn escape_field(&self, field: &str) -> String {
        if field.contains(self.delimiter) || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn row(&self, fields: &[String]) -> String {
        let mut line = fields
            .iter()
            .map(|f| self.escape_field(f))
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string());
        line.push('\n');
        line
    }

    fn header(&self, fixed: &[&str], benchmarks: &[String]) -> String {
        let fields: Vec<String> = fixed
            .iter()
            .map(|s| s.to_string())
            .chain(benchmarks.iter().cloned())
            .collect();
        self.row(&fields)
    }

    /// `rank, reference_pattern, mean, cumulative_mean, <benchmarks...>`
    pub fn frequency_report(&self, report: &GlobalFrequencyReport) -> String {
        let mut output = self.header(
            &["rank", "reference_pattern", "mean", "cumulative_mean"],
            &report.benchmarks,
        );

        for row in &report.rows {
            let mut fields = vec![
                row.rank.to_string(),
                row.pattern.to_string(),
                percent(row.mean),
                percent(row.cumulative_mean),
            ];
            fields.extend(
                row.per_benchmark
                    .iter()
                    .map(|cell| cell.map(percent).unwrap_or_default()),
            );
            output.push_str(&self.row(&fields));
        }

        output
    }

    /// `benchmark, visibility, visible, invisible, ratio`
    pub fn visibility_report(&self, report: &GlobalVisibilityReport) -> String {
        let mut output = self.header(
            &["benchmark", "visibility", "visible", "invisible", "ratio"],
            &[],
        );

        for row in &report.rows {
            output.push_str(&self.row(&[
                row.benchmark.clone(),
                row.window.to_string(),
                row.visible.to_string(),
                row.invisible.to_string(),
                format!("{:.4}", row.ratio),
            ]));
        }

        output
    }

    /// `rank, cumulative_mean, <benchmarks...>`
    pub fn coverage(&self, curves: &CoverageCurves) -> String {
        let mut output = self.header(&["rank", "cumulative_mean"], &curves.benchmarks);

        for row in &curves.rows {
            let mut fields = vec![row.rank.to_string(), percent(row.cumulative_mean)];
            fields.extend(row.per_benchmark.iter().copied().map(percent));
            output.push_str(&self.row(&fields));
        }

        output
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.2}", fraction * 100.0)
}
