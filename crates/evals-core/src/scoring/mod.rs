//! Metric registry: `(namespace, name)` -> scoring function.
//!
//! The built-in registry is populated once per process with the
//! `sklearn.metrics` family. Callers needing other metrics build their own
//! [`MetricRegistry`] and [`register`](MetricRegistry::register) functions on it.

pub mod classification;
mod input;
pub mod regression;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use serde_json::Value;

use crate::domain::config::MetricParams;
use crate::domain::error::{EvalError, MetricError, Result};

/// Namespace of the built-in metrics.
pub const SKLEARN_NAMESPACE: &str = "sklearn.metrics";

/// A scoring function: `(y_true, y_pred, params) -> score`.
pub type MetricFn = fn(&[Value], &[Value], &MetricParams) -> std::result::Result<f64, MetricError>;

/// Lookup table of scoring functions.
#[derive(Clone, Default)]
pub struct MetricRegistry {
    metrics: BTreeMap<(String, String), MetricFn>,
}

impl fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.identifiers().map(|(ns, name)| format!("{ns}.{name}")))
            .finish()
    }
}

impl MetricRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh registry holding the built-in metrics.
    pub fn with_builtin_metrics() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, MetricFn); 14] = [
            ("accuracy_score", classification::accuracy_score),
            ("balanced_accuracy_score", classification::balanced_accuracy_score),
            ("zero_one_loss", classification::zero_one_loss),
            ("hamming_loss", classification::hamming_loss),
            ("precision_score", classification::precision_score),
            ("recall_score", classification::recall_score),
            ("f1_score", classification::f1_score),
            ("fbeta_score", classification::fbeta_score),
            ("mean_absolute_error", regression::mean_absolute_error),
            ("mean_squared_error", regression::mean_squared_error),
            ("root_mean_squared_error", regression::root_mean_squared_error),
            ("median_absolute_error", regression::median_absolute_error),
            ("max_error", regression::max_error),
            (
                "mean_absolute_percentage_error",
                regression::mean_absolute_percentage_error,
            ),
        ];
        for (name, metric) in builtins {
            registry.register(SKLEARN_NAMESPACE, name, metric);
        }
        registry
    }

    /// The process-wide built-in registry.
    pub fn builtin() -> &'static MetricRegistry {
        static BUILTIN: OnceLock<MetricRegistry> = OnceLock::new();
        BUILTIN.get_or_init(Self::with_builtin_metrics)
    }

    /// Add or replace a metric, returning the previous function if any.
    pub fn register(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        metric: MetricFn,
    ) -> Option<MetricFn> {
        self.metrics.insert((namespace.into(), name.into()), metric)
    }

    /// Look up a metric by `(namespace, name)`.
    pub fn resolve(&self, namespace: &str, name: &str) -> Result<MetricFn> {
        self.metrics
            .get(&(namespace.to_string(), name.to_string()))
            .copied()
            .ok_or_else(|| EvalError::MetricResolution {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    /// Registered `(namespace, name)` pairs in sorted order.
    pub fn identifiers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metrics.keys().map(|(ns, name)| (ns.as_str(), name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
