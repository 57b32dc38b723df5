//! JSON output for the global reports
//!
//! Emits a single document holding both reports plus the per-file failures,
//! so a machine consumer never has to correlate separate files.

use crate::dispatch::FileError;
use crate::reduce::{CoverageCurves, GlobalFrequencyReport, GlobalVisibilityReport};
use serde::Serialize;

/// A file that could not be analyzed
#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    pub benchmark: String,
    pub path: String,
    pub error: String,
}

impl From<&FileError> for JsonFailure {
    fn from(err: &FileError) -> Self {
        Self {
            benchmark: err.benchmark.clone(),
            path: err.path.display().to_string(),
            error: err.error.to_string(),
        }
    }
}

/// Complete analysis document
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub frequency: &'a GlobalFrequencyReport,
    pub visibility: &'a GlobalVisibilityReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<&'a CoverageCurves>,
    /// Benchmarks whose recording held no shapes
    pub empty_benchmarks: &'a [String],
    pub failures: Vec<JsonFailure>,
}

impl<'a> JsonReport<'a> {
    pub fn new(
        frequency: &'a GlobalFrequencyReport,
        visibility: &'a GlobalVisibilityReport,
        empty_benchmarks: &'a [String],
        failures: &[FileError],
    ) -> Self {
        Self {
            frequency,
            visibility,
            coverage: None,
            empty_benchmarks,
            failures: failures.iter().map(JsonFailure::from).collect(),
        }
    }

    pub fn with_coverage(mut self, coverage: &'a CoverageCurves) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;
    use crate::reduce::{FrequencyRow, VisibilityRow};
    use crate::shape::PatternKey;
    use crate::window::WindowSize;
    use std::path::PathBuf;

    #[test]
    fn test_json_document_shape() {
        let frequency = GlobalFrequencyReport {
            benchmarks: vec!["a".to_string()],
            rows: vec![FrequencyRow {
                rank: 1,
                pattern: PatternKey::Offsets(vec![8, 16]),
                mean: 1.0,
                cumulative_mean: 1.0,
                per_benchmark: vec![Some(1.0)],
            }],
        };
        let visibility = GlobalVisibilityReport {
            rows: vec![VisibilityRow {
                benchmark: "a".to_string(),
                window: WindowSize::from_bytes(64).unwrap(),
                visible: 1,
                invisible: 0,
                ratio: 0.0,
            }],
        };
        let failures = vec![FileError {
            benchmark: "bad".to_string(),
            path: PathBuf::from("bad.1/shapes.binpb.zst"),
            error: DecodeError::WorkerPanicked {
                path: PathBuf::from("bad.1/shapes.binpb.zst"),
            },
        }];
        let empty = vec!["idle".to_string()];

        let json = JsonReport::new(&frequency, &visibility, &empty, &failures)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["frequency"]["rows"][0]["pattern"], "(8, 16)");
        assert_eq!(value["frequency"]["rows"][0]["per_benchmark"][0], 1.0);
        assert_eq!(value["visibility"]["rows"][0]["window"], 64);
        assert_eq!(value["empty_benchmarks"][0], "idle");
        assert_eq!(value["failures"][0]["benchmark"], "bad");
        assert!(value.get("coverage").is_none());
    }

    #[test]
    fn test_json_with_coverage() {
        let frequency = GlobalFrequencyReport::default();
        let visibility = GlobalVisibilityReport::default();
        let coverage = frequency.coverage(4);
        let json = JsonReport::new(&frequency, &visibility, &[], &[])
            .with_coverage(&coverage)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["coverage"]["rows"].as_array().unwrap().is_empty());
    }
}
