//! Structured tracing events for evaluator calls.
//!
//! Events are emitted at `info!` (warnings at `warn!`) and filtered through the
//! subscriber installed by [`crate::telemetry::init_tracing`].

use tracing::{info, warn};

/// RAII guard entering an evaluator-scoped span.
///
/// ```ignore
/// let _span = EvalSpan::enter("accuracy_eval", "accuracy_score");
/// // events below carry evaluator=accuracy_eval metric=accuracy_score
/// ```
pub struct EvalSpan {
    _span: tracing::span::EnteredSpan,
}

impl EvalSpan {
    pub fn enter(evaluator: &str, metric: &str) -> Self {
        let span = tracing::info_span!("evals.evaluator", evaluator = %evaluator, metric = %metric);
        Self {
            _span: span.entered(),
        }
    }
}

/// A single sample was scored.
pub fn emit_sample_scored(metric: &str, score: f64) {
    tracing::debug!(event = "sample.scored", metric = %metric, score = score);
}

/// A batch was aggregated.
pub fn emit_batch_evaluated(
    metric: &str,
    sample_size: usize,
    mean: f64,
    ci_method: &str,
    confidence_interval: (f64, f64),
) {
    info!(
        event = "batch.evaluated",
        metric = %metric,
        sample_size = sample_size,
        mean = mean,
        ci_method = %ci_method,
        ci_low = confidence_interval.0,
        ci_high = confidence_interval.1,
    );
}

/// Two prediction sets were compared.
pub fn emit_comparison(metric: &str, sample_size: usize, difference: f64, p_value: Option<f64>) {
    info!(
        event = "comparison.completed",
        metric = %metric,
        sample_size = sample_size,
        difference = difference,
        p_value = ?p_value,
    );
}

/// A required sample size was estimated.
pub fn emit_sample_size_estimated(metric: &str, observed: usize, required: usize, std_dev: f64) {
    info!(
        event = "sample_size.estimated",
        metric = %metric,
        observed = observed,
        required = required,
        std_dev = std_dev,
    );
}

/// A configured path resolved to nothing.
pub fn emit_extraction_failed(path: &str) {
    warn!(event = "extraction.failed", path = %path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_span_enter() {
        let _span = EvalSpan::enter("accuracy_eval", "accuracy_score");
        emit_sample_scored("accuracy_score", 1.0);
    }
}
