//! Memoization support for costly evaluator variants.
//!
//! Entries are keyed by `(evaluator_config_hash, input_hash)`, both canonical
//! SHA-256 digests, so any change to the configuration invalidates earlier
//! results. The statistical evaluator never touches a cache; variants that do
//! wire an [`EvaluationCache`] into their `check_cache` / `store_cache` hooks.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::config::EvaluatorConfig;
use crate::domain::digest::compute_digest;
use crate::domain::error::Result;
use crate::domain::result::EvaluationResult;

/// Identity of one cached evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub evaluator_config_hash: String,
    pub input_hash: String,
}

impl CacheKey {
    pub fn compute(config: &EvaluatorConfig, y_true: &Value, y_pred: &Value) -> Result<Self> {
        Ok(Self {
            evaluator_config_hash: config.digest()?,
            input_hash: compute_digest(&Value::Array(vec![y_true.clone(), y_pred.clone()]))?,
        })
    }
}

/// Storage for previously computed results.
pub trait EvaluationCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<EvaluationResult>;

    fn put(&self, key: CacheKey, result: EvaluationResult);
}

/// Process-local cache backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryEvaluationCache {
    entries: Mutex<HashMap<CacheKey, EvaluationResult>>,
}

impl InMemoryEvaluationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EvaluationCache for InMemoryEvaluationCache {
    fn get(&self, key: &CacheKey) -> Option<EvaluationResult> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: CacheKey, result: EvaluationResult) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, result);
    }
}
