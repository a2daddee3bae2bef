//! Peak resident memory while loading a file the cap should reject.
//!
//! Kept in its own test binary so no other test moves the high-water mark.

use std::io::Write;

use neuronet_core::{GraphStore, LoadError, LoadOptions};
use tempfile::NamedTempFile;

/// `VmHWM` from `/proc/self/status`, in KiB. `None` off Linux.
fn peak_rss_kib() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status
        .lines()
        .find_map(|l| l.strip_prefix("VmHWM:"))
        .and_then(|rest| rest.trim().trim_end_matches("kB").trim().parse().ok())
}

#[test]
fn huge_source_id_rejected_without_allocating() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(b"100000000 0\n").unwrap();
    f.flush().unwrap();

    let store = GraphStore::with_options(LoadOptions::default().with_max_memory_mb(1));
    let before = peak_rss_kib();

    let err = store.load(f.path()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::MemoryLimitExceeded { limit_mb: 1, .. }
    ));
    assert!(!store.is_loaded());

    // Building the degree table for this id would take ~760 MB.
    if let (Some(before), Some(after)) = (before, peak_rss_kib()) {
        let grown_mb = after.saturating_sub(before) / 1024;
        assert!(grown_mb < 32, "peak RSS grew by {grown_mb} MB");
    }
}
