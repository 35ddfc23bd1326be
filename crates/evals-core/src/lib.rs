//! Evals Core Library
//!
//! Metric evaluation engine: scores predictions against ground truth, aggregates
//! batch statistics with normal-approximation or bootstrap confidence intervals,
//! compares two prediction sets, and estimates required sample sizes.

pub mod cache;
pub mod dataset;
pub mod domain;
pub mod evaluator;
pub mod extract;
pub mod metrics;
pub mod obs;
pub mod scoring;
pub mod stats;
pub mod telemetry;

pub use cache::{CacheKey, EvaluationCache, InMemoryEvaluationCache};

pub use dataset::{extract_pairs, load_samples, GroundTruthItem, Sample};

pub use domain::{
    AdditionalInfo, BatchEvaluationResult, CiMethod, ComparisonResult, DatasetInputConfig,
    EvalError, EvaluationResult, EvaluatorConfig, FieldExtractionConfig, MetricError,
    MetricFunctionConfig, MetricParams, Result,
};

pub use evaluator::{build_evaluator, Evaluator, StatisticalEvaluator, DEFAULT_CONFIDENCE};

pub use extract::{extract_field, extract_value, extract_values, ChatMessage, Shape, Traverse};

pub use scoring::{MetricFn, MetricRegistry, SKLEARN_NAMESPACE};

/// Crate version, stamped into CLI artifacts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
