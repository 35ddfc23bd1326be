//! Domain models for the evaluation engine.
//!
//! - `EvaluatorConfig`: immutable per-job evaluator descriptor
//! - `EvaluationResult` / `BatchEvaluationResult` / `ComparisonResult`: outputs
//! - `EvalError`: the engine's error taxonomy

pub mod config;
pub mod digest;
pub mod error;
pub mod result;

pub use config::{
    CiMethod, DatasetInputConfig, EvaluatorConfig, FieldExtractionConfig, MetricFunctionConfig,
    MetricParams,
};
pub use error::{EvalError, MetricError, Result};
pub use result::{AdditionalInfo, BatchEvaluationResult, ComparisonResult, EvaluationResult};
