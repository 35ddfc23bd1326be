//! Result records returned by evaluators.
//!
//! These are transient values; persistence belongs to the caller.

use serde::{Deserialize, Serialize};

/// Free-form details attached to a result.
pub type AdditionalInfo = serde_json::Map<String, serde_json::Value>;

/// Score for a single `(y_true, y_pred)` sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: f64,
    pub metric_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<AdditionalInfo>,
}

impl EvaluationResult {
    pub fn new(metric_name: impl Into<String>, score: f64) -> Self {
        Self {
            score,
            metric_name: metric_name.into(),
            additional_info: None,
        }
    }
}

/// Aggregate statistics over a batch of per-sample scores.
///
/// `sample_size` always equals the number of evaluated pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEvaluationResult {
    pub metric_name: String,
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub confidence_interval: Option<(f64, f64)>,
    pub sample_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<AdditionalInfo>,
}

/// Paired comparison of two prediction sets against one ground truth.
///
/// `difference` is the mean of `score(pred_1) - score(pred_2)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub metric_name: String,
    pub difference: f64,
    pub confidence_interval: Option<(f64, f64)>,
    pub p_value: Option<f64>,
    pub significant: Option<bool>,
    pub sample_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<AdditionalInfo>,
}
