// Shared fixtures for integration tests
//
// Builds benchmark directory trees of zstd-compressed shape recordings.

#![allow(dead_code)] // each test binary uses a different subset

use heapshape::decode::write_corpus;
use heapshape::shape::{Epoch, ShapeRecord, ShapesCorpus};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const RECORDING: &str = "shapes.binpb.zst";

/// Write `corpus` to `<root>/<dir>/shapes.binpb.zst`
pub fn write_benchmark(root: &Path, dir: &str, corpus: &ShapesCorpus) -> PathBuf {
    let bench_dir = root.join(dir);
    std::fs::create_dir_all(&bench_dir).expect("create benchmark dir");
    let path = bench_dir.join(RECORDING);
    write_corpus(&path, corpus).expect("write recording");
    path
}

/// Write raw bytes where a recording is expected
pub fn write_garbage(root: &Path, dir: &str, bytes: &[u8]) -> PathBuf {
    let bench_dir = root.join(dir);
    std::fs::create_dir_all(&bench_dir).expect("create benchmark dir");
    let path = bench_dir.join(RECORDING);
    std::fs::write(&path, bytes).expect("write garbage");
    path
}

/// Benchmark A: one value array and two `(8, 16)` objects
pub fn corpus_a() -> ShapesCorpus {
    ShapesCorpus::new(vec![Epoch::new(vec![
        ShapeRecord::value_array(0x10_0000),
        ShapeRecord::generic(100, vec![8, 16]),
        ShapeRecord::generic(0x20_0040, vec![8, 16]),
    ])])
}

/// Benchmark B: one object array and one reference-free object
pub fn corpus_b() -> ShapesCorpus {
    ShapesCorpus::new(vec![
        Epoch::new(vec![ShapeRecord::object_array(0x30_0000)]),
        Epoch::new(vec![ShapeRecord::generic(0x30_1000, vec![])]),
    ])
}

/// Root with benchmarks A and B
pub fn two_benchmark_root() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    write_benchmark(dir.path(), "alpha.1700000000", &corpus_a());
    write_benchmark(dir.path(), "beta.1700000042", &corpus_b());
    dir
}
