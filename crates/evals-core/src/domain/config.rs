//! Declarative evaluator configuration.
//!
//! An [`EvaluatorConfig`] is built once per evaluation job by the orchestration
//! layer and handed to an evaluator unchanged. It names the dotted paths used to
//! pull ground truth and predictions out of raw records, and the metric (plus
//! confidence-interval strategy) used to score them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::digest::compute_digest;
use crate::domain::error::Result;

/// Keyword parameters forwarded to a metric function.
pub type MetricParams = serde_json::Map<String, serde_json::Value>;

/// Method used to compute batch confidence intervals.
///
/// Unknown method names deserialize into [`CiMethod::Unsupported`] and are
/// rejected only when a batch is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CiMethod {
    /// Normal approximation over per-sample scores.
    #[default]
    BatchMean,
    /// Percentile interval over resampled means.
    Bootstrap,
    /// Any other method name, kept verbatim.
    Unsupported(String),
}

impl CiMethod {
    pub fn as_str(&self) -> &str {
        match self {
            CiMethod::BatchMean => "batch_mean",
            CiMethod::Bootstrap => "bootstrap",
            CiMethod::Unsupported(name) => name,
        }
    }
}

impl From<String> for CiMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "batch_mean" => CiMethod::BatchMean,
            "bootstrap" => CiMethod::Bootstrap,
            _ => CiMethod::Unsupported(value),
        }
    }
}

impl From<&str> for CiMethod {
    fn from(value: &str) -> Self {
        CiMethod::from(value.to_string())
    }
}

impl From<CiMethod> for String {
    fn from(value: CiMethod) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dotted paths locating ground truth and prediction values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldExtractionConfig {
    pub ground_truth_field: String,
    pub prediction_field: String,
}

/// Maps evaluation inputs onto items of a ground-truth dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInputConfig {
    /// Identifier of the ground-truth dataset.
    pub dataset_id: String,
    /// Input name -> dotted path into the item's input data.
    pub input_fields: BTreeMap<String, String>,
    /// Dotted path of the label inside the item's ground-truth label.
    pub label_field: String,
}

fn default_bootstrap_iterations() -> usize {
    1000
}

/// Metric selection and confidence-interval strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFunctionConfig {
    pub namespace: String,
    pub name: String,

    #[serde(default)]
    pub params: MetricParams,

    #[serde(default)]
    pub ci_method: CiMethod,

    /// Number of resamples; only read when `ci_method` is bootstrap.
    #[serde(default = "default_bootstrap_iterations")]
    pub bootstrap_iterations: usize,

    /// Fixed seed for reproducible bootstrap intervals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_seed: Option<u64>,
}

impl MetricFunctionConfig {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            params: MetricParams::new(),
            ci_method: CiMethod::default(),
            bootstrap_iterations: default_bootstrap_iterations(),
            bootstrap_seed: None,
        }
    }
}

/// Complete evaluator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    pub name: String,
    pub description: String,
    /// Free-text identifier of the evaluator family (e.g. `sklearn`).
    pub provider: String,
    pub extraction: FieldExtractionConfig,
    pub metric: MetricFunctionConfig,
    #[serde(default, alias = "dataset_inputs", skip_serializing_if = "Option::is_none")]
    pub dataset_input: Option<DatasetInputConfig>,
}

impl EvaluatorConfig {
    /// Create a config with default metric settings.
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<String>,
        extraction: FieldExtractionConfig,
        metric: MetricFunctionConfig,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            provider: provider.into(),
            extraction,
            metric,
            dataset_input: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_params(mut self, params: MetricParams) -> Self {
        self.metric.params = params;
        self
    }

    pub fn with_ci_method(mut self, ci_method: impl Into<CiMethod>) -> Self {
        self.metric.ci_method = ci_method.into();
        self
    }

    /// Switch to bootstrap intervals with the given iteration count and optional seed.
    pub fn with_bootstrap(mut self, iterations: usize, seed: Option<u64>) -> Self {
        self.metric.ci_method = CiMethod::Bootstrap;
        self.metric.bootstrap_iterations = iterations;
        self.metric.bootstrap_seed = seed;
        self
    }

    pub fn with_dataset_input(mut self, dataset_input: DatasetInputConfig) -> Self {
        self.dataset_input = Some(dataset_input);
        self
    }

    /// Parse a config from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// SHA-256 hex digest of the canonical JSON form of this config.
    pub fn digest(&self) -> Result<String> {
        compute_digest(&serde_json::to_value(self)?)
    }
}
