use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use serde::Serialize;

/// Counters for the mirroring path.
///
/// Mirroring is best-effort and its failures are invisible to API callers, so these counters are the only way to see
/// how it is doing. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct MirrorStats {
    inner: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    dropped: AtomicU64,
    mirrored: AtomicU64,
    failed: AtomicU64,
    fetch_failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MirrorStatsSnapshot {
    /// Jobs accepted onto the mirroring queue
    pub submitted: u64,
    /// Jobs discarded because the queue was full or closed
    pub dropped: u64,
    /// Orders successfully written to the profile store
    pub mirrored: u64,
    /// Orders the profile store rejected or could not be reached for
    pub failed: u64,
    /// History reads that fell back to local records only
    pub fetch_failed: u64,
}

impl MirrorStats {
    pub fn record_submitted(&self) {
        self.inner.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.inner.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mirrored(&self) {
        self.inner.mirrored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.inner.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failed(&self) {
        self.inner.fetch_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MirrorStatsSnapshot {
        MirrorStatsSnapshot {
            submitted: self.inner.submitted.load(Ordering::Relaxed),
            dropped: self.inner.dropped.load(Ordering::Relaxed),
            mirrored: self.inner.mirrored.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
            fetch_failed: self.inner.fetch_failed.load(Ordering::Relaxed),
        }
    }
}
