//! Process-wide counters for evaluator activity.
//!
//! Counters are bumped at call sites and never read by the scoring paths.
//! Call [`EngineMetrics::flush`] to emit the current values as one
//! `tracing::info!` event, e.g. when a job finishes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counters.
pub static METRICS: EngineMetrics = EngineMetrics::new();

/// Relaxed atomic counters.
pub struct EngineMetrics {
    samples_scored: AtomicU64,
    batches_evaluated: AtomicU64,
    comparisons_run: AtomicU64,
    bootstrap_resamples: AtomicU64,
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    pub const fn new() -> Self {
        Self {
            samples_scored: AtomicU64::new(0),
            batches_evaluated: AtomicU64::new(0),
            comparisons_run: AtomicU64::new(0),
            bootstrap_resamples: AtomicU64::new(0),
        }
    }

    pub fn add_samples_scored(&self, n: u64) {
        self.samples_scored.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_batches(&self) {
        self.batches_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_comparisons(&self) {
        self.comparisons_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bootstrap_resamples(&self, n: u64) {
        self.bootstrap_resamples.fetch_add(n, Ordering::Relaxed);
    }

    /// Emit all counters as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            samples_scored = self.samples_scored(),
            batches_evaluated = self.batches_evaluated(),
            comparisons_run = self.comparisons_run(),
            bootstrap_resamples = self.bootstrap_resamples(),
        );
    }

    pub fn samples_scored(&self) -> u64 {
        self.samples_scored.load(Ordering::Relaxed)
    }

    pub fn batches_evaluated(&self) -> u64 {
        self.batches_evaluated.load(Ordering::Relaxed)
    }

    pub fn comparisons_run(&self) -> u64 {
        self.comparisons_run.load(Ordering::Relaxed)
    }

    pub fn bootstrap_resamples(&self) -> u64 {
        self.bootstrap_resamples.load(Ordering::Relaxed)
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.samples_scored.store(0, Ordering::Relaxed);
        self.batches_evaluated.store(0, Ordering::Relaxed);
        self.comparisons_run.store(0, Ordering::Relaxed);
        self.bootstrap_resamples.store(0, Ordering::Relaxed);
    }
}
