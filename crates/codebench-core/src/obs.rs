//! Global atomic counters for codebench observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a run).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters — no allocations, no locking.
pub struct Metrics {
    executions_completed: AtomicU64,
    timeouts_enforced: AtomicU64,
    harness_retries: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            executions_completed: AtomicU64::new(0),
            timeouts_enforced: AtomicU64::new(0),
            harness_retries: AtomicU64::new(0),
        }
    }

    /// Increment the executions-completed counter by one.
    pub fn inc_executions_completed(&self) {
        self.executions_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "executions_completed", "counter incremented");
    }

    /// Increment the timeouts-enforced counter by one.
    pub fn inc_timeouts_enforced(&self) {
        self.timeouts_enforced.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "timeouts_enforced", "counter incremented");
    }

    /// Increment the harness-retries counter by one.
    pub fn inc_harness_retries(&self) {
        self.harness_retries.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "harness_retries", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    ///
    /// Call this at natural boundaries (end of a run) rather than on
    /// every increment.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            executions_completed = self.executions_completed(),
            timeouts_enforced = self.timeouts_enforced(),
            harness_retries = self.harness_retries(),
        );
    }

    /// Read the current executions-completed count.
    pub fn executions_completed(&self) -> u64 {
        self.executions_completed.load(Ordering::Relaxed)
    }

    /// Read the current timeouts-enforced count.
    pub fn timeouts_enforced(&self) -> u64 {
        self.timeouts_enforced.load(Ordering::Relaxed)
    }

    /// Read the current harness-retries count.
    pub fn harness_retries(&self) -> u64 {
        self.harness_retries.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.executions_completed.store(0, Ordering::Relaxed);
        self.timeouts_enforced.store(0, Ordering::Relaxed);
        self.harness_retries.store(0, Ordering::Relaxed);
    }
}
