//! Regression metrics with scikit-learn semantics.

use serde_json::Value;

use super::input::{parse_numeric, Params};
use crate::domain::config::MetricParams;
use crate::domain::error::MetricError;
use crate::stats;

fn residuals(
    metric: &str,
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<Vec<f64>, MetricError> {
    Params::accept(metric, params, &[])?;
    let (truth, pred) = parse_numeric(y_true, y_pred)?;
    Ok(truth.iter().zip(&pred).map(|(t, p)| t - p).collect())
}

pub fn mean_absolute_error(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    let errors = residuals("mean_absolute_error", y_true, y_pred, params)?;
    Ok(stats::mean(&errors.iter().map(|e| e.abs()).collect::<Vec<_>>()))
}

pub fn mean_squared_error(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    let errors = residuals("mean_squared_error", y_true, y_pred, params)?;
    Ok(stats::mean(&errors.iter().map(|e| e * e).collect::<Vec<_>>()))
}

pub fn root_mean_squared_error(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    let errors = residuals("root_mean_squared_error", y_true, y_pred, params)?;
    Ok(stats::mean(&errors.iter().map(|e| e * e).collect::<Vec<_>>()).sqrt())
}

pub fn median_absolute_error(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    let errors = residuals("median_absolute_error", y_true, y_pred, params)?;
    let absolute: Vec<f64> = errors.iter().map(|e| e.abs()).collect();
    stats::percentile(&absolute, 50.0).ok_or(MetricError::EmptyInput)
}

pub fn max_error(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    let errors = residuals("max_error", y_true, y_pred, params)?;
    Ok(errors.iter().fold(0.0, |acc: f64, e| acc.max(e.abs())))
}

/// Relative error `|t - p| / max(|t|, eps)`, averaged; not a percentage despite the name.
pub fn mean_absolute_percentage_error(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    Params::accept("mean_absolute_percentage_error", params, &[])?;
    let (truth, pred) = parse_numeric(y_true, y_pred)?;
    let ratios: Vec<f64> = truth
        .iter()
        .zip(&pred)
        .map(|(t, p)| (t - p).abs() / t.abs().max(f64::EPSILON))
        .collect();
    Ok(stats::mean(&ratios))
}
