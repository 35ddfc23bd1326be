//! Evaluator contract and factory.
//!
//! An [`Evaluator`] scores predictions against ground truth for one
//! [`EvaluatorConfig`]. Variants implement the scoring operations; the cache
//! hooks default to no-ops so only variants with expensive scoring (LLM judges,
//! human feedback) need to override them.

pub mod statistical;

use serde_json::Value;

use crate::domain::config::EvaluatorConfig;
use crate::domain::error::{EvalError, Result};
use crate::domain::result::{BatchEvaluationResult, ComparisonResult, EvaluationResult};
use crate::extract::{self, Traverse};

pub use statistical::StatisticalEvaluator;

/// Confidence level of every normal-approximation interval the engine reports.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Polymorphic evaluator interface.
///
/// Implementations hold no mutable state after construction, so one instance
/// can be shared across threads.
pub trait Evaluator: Send + Sync {
    /// The configuration this evaluator was built from.
    fn config(&self) -> &EvaluatorConfig;

    /// Score a single sample.
    fn evaluate(&self, y_true: &Value, y_pred: &Value) -> Result<EvaluationResult>;

    /// Score every pair and aggregate mean, standard deviation and a
    /// confidence interval per the configured `ci_method`.
    fn evaluate_batch(&self, y_true: &[Value], y_pred: &[Value]) -> Result<BatchEvaluationResult>;

    /// Paired comparison of two prediction sets against the same ground truth.
    fn compare(
        &self,
        y_true: &[Value],
        y_pred_1: &[Value],
        y_pred_2: &[Value],
    ) -> Result<ComparisonResult>;

    /// Number of samples needed to reach `margin_of_error` at `confidence`,
    /// based on the variance observed in the given samples.
    fn estimate_sample_size(
        &self,
        y_true: &[Value],
        y_pred: &[Value],
        confidence: f64,
        margin_of_error: f64,
    ) -> Result<usize>;

    /// Build an evaluator from a configuration.
    fn from_config(config: EvaluatorConfig) -> Result<Self>
    where
        Self: Sized;

    fn to_config(&self) -> EvaluatorConfig {
        self.config().clone()
    }

    /// Look up a previously stored result.
    fn check_cache(&self, _y_true: &Value, _y_pred: &Value) -> Option<EvaluationResult> {
        None
    }

    /// Persist a freshly computed result.
    fn store_cache(&self, _y_true: &Value, _y_pred: &Value, _result: &EvaluationResult) {}

    /// [`evaluate`](Evaluator::evaluate) behind the cache hooks.
    fn evaluate_cached(&self, y_true: &Value, y_pred: &Value) -> Result<EvaluationResult> {
        if let Some(hit) = self.check_cache(y_true, y_pred) {
            tracing::debug!(event = "cache.hit", evaluator = %self.config().name);
            return Ok(hit);
        }
        let result = self.evaluate(y_true, y_pred)?;
        self.store_cache(y_true, y_pred, &result);
        Ok(result)
    }

    /// Extract `(y_true, y_pred)` from raw records using the configured paths.
    fn extract_values(
        &self,
        ground_truth: &dyn Traverse,
        predictions: &dyn Traverse,
    ) -> Result<(Value, Value)> {
        extract::extract_values(&self.config().extraction, ground_truth, predictions)
    }
}

/// Construct the evaluator variant named by `config.provider`.
pub fn build_evaluator(config: EvaluatorConfig) -> Result<Box<dyn Evaluator>> {
    match config.provider.as_str() {
        "sklearn" | "statistical" => Ok(Box::new(StatisticalEvaluator::from_config(config)?)),
        other => Err(EvalError::UnknownProvider(other.to_string())),
    }
}

/// Reject empty input and prediction lists whose length differs from `y_true`.
pub(crate) fn check_pairs(y_true: &[Value], y_pred: &[Value]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(EvalError::LengthMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(EvalError::EmptyInput);
    }
    Ok(())
}
