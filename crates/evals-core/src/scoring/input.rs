//! Label coercion, input validation and keyword-parameter access shared by
//! the built-in metrics.

use serde_json::Value;

use crate::domain::config::MetricParams;
use crate::domain::error::MetricError;

/// A class label: numbers and booleans compare numerically, strings by equality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Label<'a> {
    Number(f64),
    Text(&'a str),
}

impl<'a> Label<'a> {
    pub(crate) fn parse(value: &'a Value) -> Result<Self, MetricError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Label::Number)
                .ok_or_else(|| MetricError::UnsupportedLabel(value.to_string())),
            Value::Bool(b) => Ok(Label::Number(if *b { 1.0 } else { 0.0 })),
            Value::String(s) => Ok(Label::Text(s)),
            other => Err(MetricError::UnsupportedLabel(other.to_string())),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Label::Number(_) => "numeric",
            Label::Text(_) => "string",
        }
    }

    /// Equality across kinds is always false; use [`parse_labels`] to reject mixes first.
    pub(crate) fn matches(&self, other: &Label<'_>) -> bool {
        match (self, other) {
            (Label::Number(a), Label::Number(b)) => a == b,
            (Label::Text(a), Label::Text(b)) => a == b,
            _ => false,
        }
    }
}

/// Reject empty and ragged inputs.
pub(crate) fn check_lengths(y_true: &[Value], y_pred: &[Value]) -> Result<(), MetricError> {
    if y_true.len() != y_pred.len() {
        return Err(MetricError::LengthMismatch {
            y_true: y_true.len(),
            y_pred: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(MetricError::EmptyInput);
    }
    Ok(())
}

/// Parse both label vectors, requiring a single label kind across them.
pub(crate) fn parse_labels<'a>(
    y_true: &'a [Value],
    y_pred: &'a [Value],
) -> Result<(Vec<Label<'a>>, Vec<Label<'a>>), MetricError> {
    check_lengths(y_true, y_pred)?;
    let truth = y_true.iter().map(Label::parse).collect::<Result<Vec<_>, _>>()?;
    let pred = y_pred.iter().map(Label::parse).collect::<Result<Vec<_>, _>>()?;

    let first = truth[0];
    if let Some(odd) = truth.iter().chain(&pred).find(|l| l.kind() != first.kind()) {
        return Err(MetricError::MixedLabelTypes {
            left: first.kind().to_string(),
            right: odd.kind().to_string(),
        });
    }
    Ok((truth, pred))
}

/// Distinct labels in first-seen order.
pub(crate) fn unique_labels<'a>(labels: impl IntoIterator<Item = Label<'a>>) -> Vec<Label<'a>> {
    let mut seen: Vec<Label<'a>> = Vec::new();
    for label in labels {
        if !seen.iter().any(|s| s.matches(&label)) {
            seen.push(label);
        }
    }
    seen
}

pub(crate) fn numeric(value: &Value) -> Result<f64, MetricError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| MetricError::NonNumeric(value.to_string())),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(MetricError::NonNumeric(other.to_string())),
    }
}

/// Parse both vectors as numbers.
pub(crate) fn parse_numeric(
    y_true: &[Value],
    y_pred: &[Value],
) -> Result<(Vec<f64>, Vec<f64>), MetricError> {
    check_lengths(y_true, y_pred)?;
    let truth = y_true.iter().map(numeric).collect::<Result<Vec<_>, _>>()?;
    let pred = y_pred.iter().map(numeric).collect::<Result<Vec<_>, _>>()?;
    Ok((truth, pred))
}

/// Typed access to a metric's keyword parameters.
pub(crate) struct Params<'a> {
    params: &'a MetricParams,
}

impl<'a> Params<'a> {
    /// Fail on any parameter name outside `accepted`.
    pub(crate) fn accept(
        metric: &str,
        params: &'a MetricParams,
        accepted: &[&str],
    ) -> Result<Self, MetricError> {
        if let Some(unknown) = params.keys().find(|k| !accepted.contains(&k.as_str())) {
            return Err(MetricError::UnexpectedParam {
                metric: metric.to_string(),
                param: unknown.clone(),
            });
        }
        Ok(Self { params })
    }

    pub(crate) fn value(&self, name: &str) -> Option<&'a Value> {
        self.params.get(name).filter(|v| !v.is_null())
    }

    pub(crate) fn bool_or(&self, name: &str, default: bool) -> Result<bool, MetricError> {
        match self.value(name) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(invalid(name, format!("expected a boolean, got {other}"))),
        }
    }

    pub(crate) fn f64_opt(&self, name: &str) -> Result<Option<f64>, MetricError> {
        self.value(name)
            .map(|v| numeric(v).map_err(|_| invalid(name, format!("expected a number, got {v}"))))
            .transpose()
    }

    pub(crate) fn str_or(&self, name: &str, default: &'a str) -> Result<&'a str, MetricError> {
        match self.value(name) {
            None => Ok(default),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(invalid(name, format!("expected a string, got {other}"))),
        }
    }
}

pub(crate) fn invalid(param: &str, reason: impl Into<String>) -> MetricError {
    MetricError::InvalidParam {
        param: param.to_string(),
        reason: reason.into(),
    }
}
