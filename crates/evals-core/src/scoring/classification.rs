//! Classification metrics with scikit-learn semantics.

use serde_json::Value;

use super::input::{invalid, parse_labels, unique_labels, Label, Params};
use crate::domain::config::MetricParams;
use crate::domain::error::MetricError;

fn correct_count(truth: &[Label<'_>], pred: &[Label<'_>]) -> usize {
    truth.iter().zip(pred).filter(|(t, p)| t.matches(p)).count()
}

pub fn accuracy_score(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    let params = Params::accept("accuracy_score", params, &["normalize"])?;
    let normalize = params.bool_or("normalize", true)?;
    let (truth, pred) = parse_labels(y_true, y_pred)?;

    let correct = correct_count(&truth, &pred) as f64;
    Ok(if normalize {
        correct / truth.len() as f64
    } else {
        correct
    })
}

pub fn zero_one_loss(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    let params = Params::accept("zero_one_loss", params, &["normalize"])?;
    let normalize = params.bool_or("normalize", true)?;
    let (truth, pred) = parse_labels(y_true, y_pred)?;

    let wrong = (truth.len() - correct_count(&truth, &pred)) as f64;
    Ok(if normalize {
        wrong / truth.len() as f64
    } else {
        wrong
    })
}

pub fn hamming_loss(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    Params::accept("hamming_loss", params, &[])?;
    let (truth, pred) = parse_labels(y_true, y_pred)?;
    Ok(1.0 - correct_count(&truth, &pred) as f64 / truth.len() as f64)
}

/// Mean per-class recall over the classes present in `y_true`.
pub fn balanced_accuracy_score(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    Params::accept("balanced_accuracy_score", params, &[])?;
    let (truth, pred) = parse_labels(y_true, y_pred)?;

    let classes = unique_labels(truth.iter().copied());
    let recalls: Vec<f64> = classes
        .iter()
        .map(|class| {
            let (support, hits) = truth.iter().zip(&pred).filter(|(t, _)| t.matches(class)).fold(
                (0usize, 0usize),
                |(support, hits), (_, p)| (support + 1, hits + usize::from(p.matches(class))),
            );
            hits as f64 / support as f64
        })
        .collect();
    Ok(recalls.iter().sum::<f64>() / recalls.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Average {
    Binary,
    Micro,
    Macro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Measure {
    Precision,
    Recall,
    FBeta,
}

/// Per-class confusion counts.
#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl Counts {
    fn for_class(truth: &[Label<'_>], pred: &[Label<'_>], class: &Label<'_>) -> Self {
        truth
            .iter()
            .zip(pred)
            .fold(Counts::default(), |mut c, (t, p)| {
                match (t.matches(class), p.matches(class)) {
                    (true, true) => c.tp += 1,
                    (false, true) => c.fp += 1,
                    (true, false) => c.fn_ += 1,
                    (false, false) => {}
                }
                c
            })
    }

    fn add(self, other: Counts) -> Self {
        Counts {
            tp: self.tp + other.tp,
            fp: self.fp + other.fp,
            fn_: self.fn_ + other.fn_,
        }
    }

    fn score(&self, measure: Measure, beta: f64, zero_division: f64) -> f64 {
        let (tp, fp, fn_) = (self.tp as f64, self.fp as f64, self.fn_ as f64);
        let (numerator, denominator) = match measure {
            Measure::Precision => (tp, tp + fp),
            Measure::Recall => (tp, tp + fn_),
            Measure::FBeta => {
                let b2 = beta * beta;
                ((1.0 + b2) * tp, (1.0 + b2) * tp + b2 * fn_ + fp)
            }
        };
        if denominator == 0.0 {
            zero_division
        } else {
            numerator / denominator
        }
    }
}

fn parse_average(params: &Params<'_>) -> Result<Average, MetricError> {
    match params.str_or("average", "binary")? {
        "binary" => Ok(Average::Binary),
        "micro" => Ok(Average::Micro),
        "macro" => Ok(Average::Macro),
        other => Err(invalid(
            "average",
            format!("expected one of binary, micro, macro; got {other}"),
        )),
    }
}

fn parse_zero_division(params: &Params<'_>) -> Result<f64, MetricError> {
    match params.value("zero_division") {
        None => Ok(0.0),
        Some(Value::String(s)) if s == "warn" => Ok(0.0),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v == 0.0 || v == 1.0 => Ok(v),
            _ => Err(invalid("zero_division", format!("expected 0, 1 or \"warn\", got {n}"))),
        },
        Some(other) => Err(invalid(
            "zero_division",
            format!("expected 0, 1 or \"warn\", got {other}"),
        )),
    }
}

fn precision_recall_fscore(
    metric: &str,
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
    measure: Measure,
) -> Result<f64, MetricError> {
    let takes_beta = metric == "fbeta_score";
    let accepted: &[&str] = if takes_beta {
        &["beta", "pos_label", "average", "zero_division"]
    } else {
        &["pos_label", "average", "zero_division"]
    };
    let params = Params::accept(metric, params, accepted)?;

    let beta = if takes_beta {
        let beta = params
            .f64_opt("beta")?
            .ok_or_else(|| invalid("beta", "fbeta_score requires beta"))?;
        if beta < 0.0 {
            return Err(invalid("beta", "beta should be >= 0"));
        }
        beta
    } else {
        1.0
    };
    let average = parse_average(&params)?;
    let zero_division = parse_zero_division(&params)?;
    let (truth, pred) = parse_labels(y_true, y_pred)?;
    let labels = unique_labels(truth.iter().chain(&pred).copied());

    match average {
        Average::Binary => {
            if labels.len() > 2 {
                return Err(invalid(
                    "average",
                    "target is multiclass but average='binary'",
                ));
            }
            let default_pos = Value::from(1);
            let pos_value = params.value("pos_label").unwrap_or(&default_pos);
            let pos_label = Label::parse(pos_value)?;
            if labels.len() == 2 && !labels.iter().any(|l| l.matches(&pos_label)) {
                return Err(invalid(
                    "pos_label",
                    format!("pos_label={pos_value} is not a valid label"),
                ));
            }
            Ok(Counts::for_class(&truth, &pred, &pos_label).score(measure, beta, zero_division))
        }
        Average::Micro => {
            let total = labels
                .iter()
                .map(|class| Counts::for_class(&truth, &pred, class))
                .fold(Counts::default(), Counts::add);
            Ok(total.score(measure, beta, zero_division))
        }
        Average::Macro => {
            let scores: Vec<f64> = labels
                .iter()
                .map(|class| {
                    Counts::for_class(&truth, &pred, class).score(measure, beta, zero_division)
                })
                .collect();
            Ok(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }
}

pub fn precision_score(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    precision_recall_fscore("precision_score", y_true, y_pred, params, Measure::Precision)
}

pub fn recall_score(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    precision_recall_fscore("recall_score", y_true, y_pred, params, Measure::Recall)
}

pub fn f1_score(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    precision_recall_fscore("f1_score", y_true, y_pred, params, Measure::FBeta)
}

pub fn fbeta_score(
    y_true: &[Value],
    y_pred: &[Value],
    params: &MetricParams,
) -> Result<f64, MetricError> {
    precision_recall_fscore("fbeta_score", y_true, y_pred, params, Measure::FBeta)
}
