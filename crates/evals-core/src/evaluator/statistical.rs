//! Evaluator backed by a registered statistical scoring function.
//!
//! Every sample is scored on its own through singleton lists
//! (`metric([y_true], [y_pred])`), never through a native batch call, so batch
//! statistics are always over per-sample scores.

use std::fmt;
use std::slice;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

use super::{check_pairs, Evaluator, DEFAULT_CONFIDENCE};
use crate::domain::config::{CiMethod, EvaluatorConfig};
use crate::domain::error::{EvalError, Result};
use crate::domain::result::{
    AdditionalInfo, BatchEvaluationResult, ComparisonResult, EvaluationResult,
};
use crate::metrics::METRICS;
use crate::obs;
use crate::scoring::{MetricFn, MetricRegistry};
use crate::stats;

/// Significance threshold for paired comparisons.
const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Scores samples with a metric resolved from a [`MetricRegistry`].
#[derive(Clone)]
pub struct StatisticalEvaluator {
    config: EvaluatorConfig,
    metric: MetricFn,
}

impl fmt::Debug for StatisticalEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatisticalEvaluator")
            .field("name", &self.config.name)
            .field("namespace", &self.config.metric.namespace)
            .field("metric", &self.config.metric.name)
            .finish()
    }
}

/// Normal-approximation interval around `mean` with standard error `std_dev / sqrt(n)`.
///
/// `(mean, mean)` when `n <= 1`.
fn mean_interval(mean: f64, std_dev: f64, n: usize) -> (f64, f64) {
    if n <= 1 {
        return (mean, mean);
    }
    stats::normal_interval(DEFAULT_CONFIDENCE, mean, std_dev / (n as f64).sqrt())
}

/// Two-sided p-value of a paired z-test on the mean difference.
fn paired_p_value(mean: f64, std_dev: f64, n: usize) -> Option<f64> {
    if n <= 1 {
        return None;
    }
    let standard_error = std_dev / (n as f64).sqrt();
    if standard_error == 0.0 {
        return Some(if mean == 0.0 { 1.0 } else { 0.0 });
    }
    let z = mean.abs() / standard_error;
    Some((2.0 * stats::normal_cdf(-z)).min(1.0))
}

fn info(entries: Value) -> Option<AdditionalInfo> {
    entries.as_object().cloned()
}

impl StatisticalEvaluator {
    /// Resolve the configured metric from the built-in registry.
    pub fn new(config: EvaluatorConfig) -> Result<Self> {
        Self::with_registry(config, MetricRegistry::builtin())
    }

    /// Resolve the configured metric from `registry`. Fails before any sample
    /// is processed when the metric is unknown.
    pub fn with_registry(config: EvaluatorConfig, registry: &MetricRegistry) -> Result<Self> {
        let metric = registry.resolve(&config.metric.namespace, &config.metric.name)?;
        tracing::debug!(
            evaluator = %config.name,
            namespace = %config.metric.namespace,
            metric = %config.metric.name,
            "metric resolved"
        );
        Ok(Self { config, metric })
    }

    fn metric_name(&self) -> &str {
        &self.config.metric.name
    }

    fn score(&self, y_true: &Value, y_pred: &Value) -> Result<f64> {
        let score = (self.metric)(
            slice::from_ref(y_true),
            slice::from_ref(y_pred),
            &self.config.metric.params,
        )?;
        obs::emit_sample_scored(self.metric_name(), score);
        Ok(score)
    }

    fn scores(&self, y_true: &[Value], y_pred: &[Value]) -> Result<Vec<f64>> {
        check_pairs(y_true, y_pred)?;
        let scores = y_true
            .iter()
            .zip(y_pred)
            .map(|(t, p)| self.score(t, p))
            .collect::<Result<Vec<_>>>()?;
        METRICS.add_samples_scored(scores.len() as u64);
        Ok(scores)
    }

    fn bootstrap_interval(&self, scores: &[f64]) -> Result<(f64, f64)> {
        let iterations = self.config.metric.bootstrap_iterations;
        if iterations == 0 {
            return Err(EvalError::InvalidArgument(
                "bootstrap_iterations must be positive".to_string(),
            ));
        }
        let mut rng = match self.config.metric.bootstrap_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let means = stats::bootstrap_means(scores, iterations, &mut rng);
        METRICS.add_bootstrap_resamples(iterations as u64);

        let low = stats::percentile(&means, 2.5);
        let high = stats::percentile(&means, 97.5);
        low.zip(high).ok_or(EvalError::EmptyInput)
    }
}

impl Evaluator for StatisticalEvaluator {
    fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    fn evaluate(&self, y_true: &Value, y_pred: &Value) -> Result<EvaluationResult> {
        let score = self.score(y_true, y_pred)?;
        METRICS.add_samples_scored(1);
        Ok(EvaluationResult::new(self.metric_name(), score))
    }

    fn evaluate_batch(&self, y_true: &[Value], y_pred: &[Value]) -> Result<BatchEvaluationResult> {
        let _span = obs::EvalSpan::enter(&self.config.name, self.metric_name());
        let scores = self.scores(y_true, y_pred)?;
        let n = scores.len();
        let mean = stats::mean(&scores);
        let std_dev = stats::sample_std_dev(&scores);

        let ci_method = &self.config.metric.ci_method;
        let (interval, details) = match ci_method {
            CiMethod::BatchMean => (
                mean_interval(mean, std_dev, n),
                json!({ "ci_method": ci_method.as_str(), "confidence_level": DEFAULT_CONFIDENCE }),
            ),
            CiMethod::Bootstrap => (
                self.bootstrap_interval(&scores)?,
                json!({
                    "ci_method": ci_method.as_str(),
                    "confidence_level": DEFAULT_CONFIDENCE,
                    "bootstrap_iterations": self.config.metric.bootstrap_iterations,
                }),
            ),
            CiMethod::Unsupported(name) => {
                return Err(EvalError::UnsupportedCiMethod(name.clone()));
            }
        };

        METRICS.inc_batches();
        obs::emit_batch_evaluated(self.metric_name(), n, mean, ci_method.as_str(), interval);

        Ok(BatchEvaluationResult {
            metric_name: self.metric_name().to_string(),
            mean,
            std_dev: Some(std_dev),
            confidence_interval: Some(interval),
            sample_size: n,
            additional_info: info(details),
        })
    }

    /// Always uses the normal-approximation interval, whatever `ci_method` says.
    fn compare(
        &self,
        y_true: &[Value],
        y_pred_1: &[Value],
        y_pred_2: &[Value],
    ) -> Result<ComparisonResult> {
        let _span = obs::EvalSpan::enter(&self.config.name, self.metric_name());
        check_pairs(y_true, y_pred_2)?;
        let scores_1 = self.scores(y_true, y_pred_1)?;
        let scores_2 = self.scores(y_true, y_pred_2)?;

        let differences: Vec<f64> = scores_1.iter().zip(&scores_2).map(|(a, b)| a - b).collect();
        let n = differences.len();
        let mean = stats::mean(&differences);
        let std_dev = stats::sample_std_dev(&differences);
        let p_value = paired_p_value(mean, std_dev, n);

        METRICS.inc_comparisons();
        obs::emit_comparison(self.metric_name(), n, mean, p_value);

        Ok(ComparisonResult {
            metric_name: self.metric_name().to_string(),
            difference: mean,
            confidence_interval: Some(mean_interval(mean, std_dev, n)),
            p_value,
            significant: p_value.map(|p| p < SIGNIFICANCE_LEVEL),
            sample_size: Some(n),
            additional_info: info(json!({
                "ci_method": CiMethod::BatchMean.as_str(),
                "confidence_level": DEFAULT_CONFIDENCE,
                "std_dev": std_dev,
            })),
        })
    }

    fn estimate_sample_size(
        &self,
        y_true: &[Value],
        y_pred: &[Value],
        confidence: f64,
        margin_of_error: f64,
    ) -> Result<usize> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(EvalError::InvalidArgument(format!(
                "confidence must be in (0, 1), got {confidence}"
            )));
        }
        if !(margin_of_error > 0.0 && margin_of_error.is_finite()) {
            return Err(EvalError::InvalidArgument(format!(
                "margin_of_error must be positive, got {margin_of_error}"
            )));
        }

        let scores = self.scores(y_true, y_pred)?;
        let std_dev = stats::sample_std_dev(&scores);
        let required = if std_dev == 0.0 {
            scores.len()
        } else {
            let z = stats::z_value(confidence);
            (z * std_dev / margin_of_error).powi(2).ceil() as usize
        };

        obs::emit_sample_size_estimated(self.metric_name(), scores.len(), required, std_dev);
        Ok(required)
    }

    fn from_config(config: EvaluatorConfig) -> Result<Self> {
        Self::new(config)
    }
}
