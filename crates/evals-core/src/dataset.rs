//! Raw evaluation samples and ground-truth dataset items.
//!
//! Samples are stored one JSON object per line:
//!
//! ```text
//! {"ground_truth": {"value": 1}, "predictions": [{"role": "assistant", "content": "1"}]}
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::config::DatasetInputConfig;
use crate::domain::error::{EvalError, Result};
use crate::evaluator::Evaluator;
use crate::extract::extract_value;

/// One raw sample: a ground-truth record and the prediction candidates
/// produced for it, usually a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub ground_truth: Value,
    pub predictions: Value,
}

/// Read samples from a JSON-lines file. Blank lines are skipped.
pub fn load_samples(path: &Path) -> Result<Vec<Sample>> {
    let reader = BufReader::new(File::open(path)?);
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let sample = serde_json::from_str(&line).map_err(|source| EvalError::InvalidSample {
            line: index + 1,
            source,
        })?;
        samples.push(sample);
    }
    tracing::debug!(path = %path.display(), samples = samples.len(), "samples loaded");
    Ok(samples)
}

/// Extract `(y_true, y_pred)` lists from `samples` with the evaluator's
/// configured paths. The first failing sample aborts the whole call.
pub fn extract_pairs(
    evaluator: &dyn Evaluator,
    samples: &[Sample],
) -> Result<(Vec<Value>, Vec<Value>)> {
    let mut y_true = Vec::with_capacity(samples.len());
    let mut y_pred = Vec::with_capacity(samples.len());
    for sample in samples {
        let (t, p) = evaluator.extract_values(&sample.ground_truth, &sample.predictions)?;
        y_true.push(t);
        y_pred.push(p);
    }
    Ok((y_true, y_pred))
}

/// A labelled item of a ground-truth dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    /// Inputs used to reconstruct the agent request.
    pub input_data: Map<String, Value>,
    #[serde(default)]
    pub ground_truth_label: Option<Value>,
}

impl DatasetInputConfig {
    /// Resolve every configured input against `item.input_data`.
    ///
    /// A path that resolves to nothing is a [`EvalError::FieldExtraction`].
    pub fn resolve_inputs(&self, item: &GroundTruthItem) -> Result<BTreeMap<String, Value>> {
        let input = Value::Object(item.input_data.clone());
        self.input_fields
            .iter()
            .map(|(name, path)| -> Result<(String, Value)> {
                let value = extract_value(&input, path)?
                    .ok_or_else(|| EvalError::FieldExtraction { path: path.clone() })?;
                Ok((name.clone(), value))
            })
            .collect()
    }

    /// The expected label of `item`, read through `label_field`.
    pub fn label(&self, item: &GroundTruthItem) -> Result<Value> {
        let missing = || EvalError::FieldExtraction {
            path: self.label_field.clone(),
        };
        let label = item.ground_truth_label.as_ref().ok_or_else(missing)?;
        extract_value(label, &self.label_field)?.ok_or_else(missing)
    }
}
