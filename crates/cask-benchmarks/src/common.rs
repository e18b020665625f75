//! Common utilities for benchmarks

use std::path::Path;

use cask_content::{content_path, Algorithm, Integrity};
use cask_core::utils::compute_integrity;
use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// Deterministic filler bytes
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i * 31 % 251) as u8).collect()
}

/// Place `data` in the store at `root` the way a writer would
pub fn store_content(root: &Path, data: &[u8]) -> Integrity {
    let sri = compute_integrity(data, Algorithm::Sha512);
    let cpath = content_path(root, &sri).expect("valid digest");
    std::fs::create_dir_all(cpath.parent().expect("content path has a parent"))
        .expect("create content dir");
    std::fs::write(&cpath, data).expect("write content");
    sri
}

/// A descriptor listing `missing` absent digests ahead of `present`
pub fn with_missing_candidates(present: &Integrity, missing: usize) -> Integrity {
    let mut hashes: Vec<_> = (0..missing)
        .flat_map(|i| compute_integrity(format!("missing-{}", i).as_bytes(), Algorithm::Sha512).hashes)
        .collect();
    hashes.extend(present.hashes.iter().cloned());
    Integrity { hashes }
}
