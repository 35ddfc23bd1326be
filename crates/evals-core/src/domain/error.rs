//! Error taxonomy for the evaluation engine.

/// Errors raised by metric scoring functions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    #[error("mix of label input types: {left} and {right}")]
    MixedLabelTypes { left: String, right: String },

    #[error("expected a numeric value, got {0}")]
    NonNumeric(String),

    #[error("unsupported label value: {0}")]
    UnsupportedLabel(String),

    #[error("unexpected parameter for {metric}: {param}")]
    UnexpectedParam { metric: String, param: String },

    #[error("invalid value for parameter {param}: {reason}")]
    InvalidParam { param: String, reason: String },

    #[error("found input variables with inconsistent numbers of samples: [{y_true}, {y_pred}]")]
    LengthMismatch { y_true: usize, y_pred: usize },

    #[error("metric requires at least one sample")]
    EmptyInput,
}

/// Evaluation engine errors.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("failed to extract field at path: '{path}'")]
    FieldExtraction { path: String },

    #[error("index {index} out of range for sequence of length {len} at path '{path}'")]
    IndexOutOfRange { path: String, index: i64, len: usize },

    #[error("expected a sequence of predictions, got {0}")]
    NotASequence(String),

    #[error("metric not found: {namespace}.{name}")]
    MetricResolution { namespace: String, name: String },

    #[error("unsupported ci_method: {0}")]
    UnsupportedCiMethod(String),

    #[error("unknown evaluator provider: {0}")]
    UnknownProvider(String),

    #[error("metric error: {0}")]
    Metric(#[from] MetricError),

    #[error("length mismatch: {expected} ground truth values, {actual} predictions")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("evaluation requires at least one sample")]
    EmptyInput,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid sample at line {line}: {source}")]
    InvalidSample {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for evaluation engine operations.
pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_extraction_error_carries_path() {
        let err = EvalError::FieldExtraction {
            path: "-1.content".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to extract field at path: '-1.content'"
        );
    }

    #[test]
    fn test_metric_resolution_error_names_metric() {
        let err = EvalError::MetricResolution {
            namespace: "sklearn.metrics".to_string(),
            name: "nope".to_string(),
        };
        assert!(err.to_string().contains("sklearn.metrics.nope"));
    }

    #[test]
    fn test_metric_error_converts() {
        let err: EvalError = MetricError::NonNumeric("\"abc\"".to_string()).into();
        assert!(matches!(err, EvalError::Metric(MetricError::NonNumeric(_))));
        assert!(err.to_string().contains("expected a numeric value"));
    }

    #[test]
    fn test_unsupported_ci_method_display() {
        let err = EvalError::UnsupportedCiMethod("jackknife".to_string());
        assert!(err.to_string().contains("jackknife"));
    }
}
