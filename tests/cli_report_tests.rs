//! Binary tests: argument handling, report layout, exit codes, logging

mod utils;

use predicates::prelude::*;
use tempfile::TempDir;
use utils::{two_benchmark_root, write_benchmark, write_garbage};

#[test]
fn test_tsv_reports_on_stdout() {
    let root = two_benchmark_root();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "rank\treference_pattern\tmean\tcumulative_mean\talpha\tbeta",
        ))
        .stdout(predicate::str::contains("1\tNoRef\t41.67\t41.67\t33.33\t50.00"))
        .stdout(predicate::str::contains("2\t(8, 16)\t33.33\t75.00\t66.67\t\n"))
        .stdout(predicate::str::contains("3\tObjArray\t25.00\t100.00\t\t50.00"))
        .stdout(predicate::str::contains(
            "benchmark\tvisibility\tvisible\tinvisible\tratio",
        ))
        .stdout(predicate::str::contains("alpha\t65536\t3\t0\t0.0000"));
}

#[test]
fn test_reports_written_to_files() {
    let root = two_benchmark_root();
    let out = TempDir::new().unwrap();
    let shapes = out.path().join("shapes.tsv");
    let visibility = out.path().join("visibility.tsv");
    let coverage = out.path().join("coverage.tsv");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.arg(root.path())
        .arg("--shapes-output")
        .arg(&shapes)
        .arg("--visibility-output")
        .arg(&visibility)
        .arg("--coverage-output")
        .arg(&coverage)
        .arg("--min-window-exp")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let shapes_text = std::fs::read_to_string(&shapes).unwrap();
    assert_eq!(shapes_text.lines().count(), 4);

    let visibility_text = std::fs::read_to_string(&visibility).unwrap();
    assert!(visibility_text.contains("alpha\t8\t1\t2\t0.6667"));
    // header + 2 benchmarks × 14 windows (2^3 .. 2^16)
    assert_eq!(visibility_text.lines().count(), 1 + 2 * 14);

    let coverage_text = std::fs::read_to_string(&coverage).unwrap();
    assert!(coverage_text.starts_with("rank\tcumulative_mean\talpha\tbeta\n"));
}

#[test]
fn test_csv_format() {
    let root = two_benchmark_root();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.arg(root.path())
        .arg("--format")
        .arg("csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("2,\"(8, 16)\",33.33,75.00,66.67,"));
}

#[test]
fn test_json_format() {
    let root = two_benchmark_root();
    write_garbage(root.path(), "broken.1", b"not zstd");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    let output = cmd
        .arg(root.path())
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["frequency"]["benchmarks"][0], "alpha");
    assert_eq!(value["frequency"]["rows"][0]["pattern"], "NoRef");
    assert_eq!(value["failures"][0]["benchmark"], "broken");
}

#[test]
fn test_partial_failure_reported_on_stderr() {
    let root = two_benchmark_root();
    write_garbage(root.path(), "broken.1", b"not zstd");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.arg(root.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 of 3 recordings failed"))
        .stderr(predicate::str::contains("broken"))
        .stdout(predicate::str::contains("alpha"));
}

#[test]
fn test_all_failed_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    write_garbage(dir.path(), "broken.1", b"not zstd");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no recording could be decoded"))
        .stdout(predicate::str::contains("rank\treference_pattern"));
}

#[test]
fn test_only_empty_recordings_succeeds_with_empty_report() {
    let dir = TempDir::new().unwrap();
    write_benchmark(
        dir.path(),
        "idle.1",
        &heapshape::shape::ShapesCorpus::default(),
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("idle").not());
}

#[test]
fn test_missing_root_exits_nonzero() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.arg("/nonexistent/heapshape/input")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read input directory"));
}

#[test]
fn test_no_recordings_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no 'shapes.binpb.zst' recordings found"));
}

#[test]
fn test_config_file_and_override() {
    let root = two_benchmark_root();
    let cfg_dir = TempDir::new().unwrap();
    let cfg = cfg_dir.path().join("heapshape.toml");
    std::fs::write(&cfg, "threads = 2\nmin_window_exp = 10\nmax_window_exp = 10\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.arg(root.path())
        .arg("--config")
        .arg(&cfg)
        .arg("--max-window-exp")
        .arg("11")
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha\t1024\t"))
        .stdout(predicate::str::contains("alpha\t2048\t"))
        .stdout(predicate::str::contains("alpha\t64\t").not());
}

#[test]
fn test_invalid_window_range_rejected() {
    let root = two_benchmark_root();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.arg(root.path())
        .arg("--min-window-exp")
        .arg("12")
        .arg("--max-window-exp")
        .arg("8")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_requires_root_argument() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.assert().failure();
}

#[test]
fn test_rust_log_global_level_is_honoured() {
    let root = two_benchmark_root();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.env("RUST_LOG", "info")
        .arg(root.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("processing"));
}

#[test]
fn test_default_log_level_is_quiet() {
    let root = two_benchmark_root();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.env_remove("RUST_LOG")
        .arg(root.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("processing").not());
}

#[test]
fn test_debug_flag_enables_debug_events() {
    let root = two_benchmark_root();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.env_remove("RUST_LOG")
        .arg(root.path())
        .arg("--debug")
        .assert()
        .success()
        .stderr(predicate::str::contains("batch complete"));
}

#[test]
fn test_json_warns_about_ignored_output_flags() {
    let root = two_benchmark_root();
    let out = TempDir::new().unwrap();
    let visibility = out.path().join("visibility.tsv");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("heapshape");
    cmd.env_remove("RUST_LOG")
        .arg(root.path())
        .arg("--format")
        .arg("json")
        .arg("--visibility-output")
        .arg(&visibility)
        .assert()
        .success()
        .stderr(predicate::str::contains("--visibility-output"))
        .stdout(predicate::str::contains("\"visibility\""));

    assert!(!visibility.exists());
}
