//! Pipeline statistics tracking.
//!
//! Thread-safe counters for passes, resolutions, and failures by kind. The
//! scheduler writes them and the status server reads them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::FailureKind;

/// Thread-safe pipeline statistics tracker.
///
/// All failure kinds are initialized to zero on creation, so lookups in the
/// failure map never miss.
pub struct PipelineStats {
    failures: HashMap<FailureKind, AtomicUsize>,
    collection_passes: AtomicUsize,
    resolution_passes: AtomicUsize,
    addresses_resolved: AtomicUsize,
    last_collection_ms: AtomicI64,
}

impl PipelineStats {
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in FailureKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }

        PipelineStats {
            failures,
            collection_passes: AtomicUsize::new(0),
            resolution_passes: AtomicUsize::new(0),
            addresses_resolved: AtomicUsize::new(0),
            last_collection_ms: AtomicI64::new(0),
        }
    }

    /// Increment a failure counter.
    pub fn increment_failure(&self, kind: FailureKind) {
        self.add_failures(kind, 1);
    }

    /// Add `count` failures of one kind.
    pub fn add_failures(&self, kind: FailureKind, count: usize) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(count, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map. \
                 This indicates a bug in PipelineStats initialization.",
                kind
            );
        }
    }

    pub fn get_failure_count(&self, kind: FailureKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total_failures(&self) -> usize {
        self.failures
            .values()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }

    /// Records a finished collection pass at the given Unix millis.
    pub fn record_collection(&self, finished_at_ms: i64) {
        self.collection_passes.fetch_add(1, Ordering::Relaxed);
        self.last_collection_ms
            .store(finished_at_ms, Ordering::Relaxed);
    }

    pub fn record_resolution_pass(&self, resolved: usize) {
        self.resolution_passes.fetch_add(1, Ordering::Relaxed);
        self.addresses_resolved
            .fetch_add(resolved, Ordering::Relaxed);
    }

    pub fn collection_passes(&self) -> usize {
        self.collection_passes.load(Ordering::Relaxed)
    }

    pub fn resolution_passes(&self) -> usize {
        self.resolution_passes.load(Ordering::Relaxed)
    }

    pub fn addresses_resolved(&self) -> usize {
        self.addresses_resolved.load(Ordering::Relaxed)
    }

    /// Unix millis of the last successful collection pass, if any.
    pub fn last_collection_ms(&self) -> Option<i64> {
        match self.last_collection_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(ms),
        }
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}
