use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Per-stage metrics collector
///
/// Cloned handles share the same counters, so every worker of a pool and
/// the orchestrator observe one set of totals.
#[derive(Debug, Clone)]
pub struct StageMetrics {
    /// Number of items the stage handled
    items_processed: Arc<AtomicU64>,
    /// Number of items the stage gave up on (source: unreadable files)
    items_skipped: Arc<AtomicU64>,
}

impl StageMetrics {
    /// Create a new metrics collector for a stage
    pub fn new() -> Self {
        Self {
            items_processed: Arc::new(AtomicU64::new(0)),
            items_skipped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a processed item
    pub fn record_processed(&self) {
        self.items_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a skipped item
    pub fn record_skipped(&self) {
        self.items_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of items processed
    pub fn total_processed(&self) -> u64 {
        self.items_processed.load(Ordering::Relaxed)
    }

    /// Get the total number of items skipped
    pub fn total_skipped(&self) -> u64 {
        self.items_skipped.load(Ordering::Relaxed)
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_processed: self.total_processed(),
            items_skipped: self.total_skipped(),
        }
    }
}

impl Default for StageMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub items_processed: u64,
    pub items_skipped: u64,
}

impl MetricsSnapshot {
    /// Format metrics as a human-readable string
    pub fn format(&self) -> String {
        format!(
            "Processed: {}, Skipped: {}",
            self.items_processed, self.items_skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_metrics() {
        let metrics = StageMetrics::new();
        for _ in 0..100 {
            metrics.record_processed();
        }
        metrics.record_skipped();
        assert_eq!(metrics.total_processed(), 100);
        assert_eq!(metrics.total_skipped(), 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = StageMetrics::new();
        let clone = metrics.clone();
        clone.record_processed();
        assert_eq!(metrics.total_processed(), 1);
    }

    #[test]
    fn test_snapshot_format() {
        let metrics = StageMetrics::new();
        metrics.record_processed();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.format(), "Processed: 1, Skipped: 0");
    }
}
