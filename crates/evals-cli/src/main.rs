//! Evals - metric evaluation CLI
//!
//! The `evals` command scores predictions against ground truth with an
//! evaluator described by a JSON config file.
//!
//! ## Commands
//!
//! - `evaluate`: score a single ground-truth / prediction pair
//! - `batch`: score a JSON-lines sample file and report a confidence interval
//! - `compare`: paired comparison of two sample files
//! - `sample-size`: samples needed for a target margin of error
//! - `metrics`: list the built-in metrics

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use evals_core::metrics::METRICS;
use evals_core::obs::EvalSpan;
use evals_core::telemetry::{init_tracing, LogFormat};
use evals_core::{
    build_evaluator, extract_pairs, load_samples, BatchEvaluationResult, ComparisonResult,
    EvaluationResult, Evaluator, EvaluatorConfig, MetricRegistry,
};

#[derive(Parser)]
#[command(name = "evals")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Score model and agent predictions against ground truth", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Evaluator config file (JSON)
    #[arg(short, long, global = true, env = "EVALS_CONFIG")]
    config: Option<PathBuf>,

    /// Write the result as an artifact to this path instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single sample
    Evaluate {
        /// Ground-truth value (JSON; bare words are taken as strings)
        #[arg(long)]
        ground_truth: String,

        /// Predicted value (JSON; bare words are taken as strings)
        #[arg(long)]
        prediction: String,
    },

    /// Score every sample of a JSON-lines file
    Batch {
        /// Samples file, one `{"ground_truth": .., "predictions": [..]}` per line
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Compare a candidate against a baseline (difference = candidate - baseline)
    Compare {
        /// Baseline samples; its ground truth is used for both sides
        #[arg(long)]
        baseline: PathBuf,

        /// Candidate samples, line-aligned with the baseline
        #[arg(long)]
        candidate: PathBuf,
    },

    /// Estimate the number of samples needed for a margin of error
    SampleSize {
        /// Pilot samples used to observe score variance
        #[arg(short, long)]
        data: PathBuf,

        /// Two-sided confidence level
        #[arg(long, default_value = "0.95")]
        confidence: f64,

        /// Target half-width of the confidence interval
        #[arg(long, default_value = "0.05")]
        margin: f64,
    },

    /// List registered metrics
    Metrics,
}

/// Result document written by `--output`.
#[derive(Serialize)]
struct Artifact<'a, T: Serialize> {
    run_id: String,
    generated_at: String,
    engine_version: &'a str,
    evaluator: &'a str,
    config_digest: String,
    result: &'a T,
}

#[derive(Debug, Serialize)]
struct SampleSizeEstimate {
    required_sample_size: usize,
    observed_sample_size: usize,
    confidence: f64,
    margin_of_error: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_tracing(format, level);

    let output = cli.output.as_deref();
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Metrics => {
            for name in cmd_metrics() {
                println!("{name}");
            }
        }
        Commands::Evaluate {
            ground_truth,
            prediction,
        } => {
            let job = Job::start(config)?;
            let result = cmd_evaluate(job.evaluator.as_ref(), &ground_truth, &prediction)?;
            job.emit(output, &result)?;
        }
        Commands::Batch { data } => {
            let job = Job::start(config)?;
            let result = cmd_batch(job.evaluator.as_ref(), &data)?;
            job.emit(output, &result)?;
        }
        Commands::Compare {
            baseline,
            candidate,
        } => {
            let job = Job::start(config)?;
            let result = cmd_compare(job.evaluator.as_ref(), &baseline, &candidate)?;
            job.emit(output, &result)?;
        }
        Commands::SampleSize {
            data,
            confidence,
            margin,
        } => {
            let job = Job::start(config)?;
            let result = cmd_sample_size(job.evaluator.as_ref(), &data, confidence, margin)?;
            job.emit(output, &result)?;
        }
    }

    METRICS.flush();
    Ok(())
}

/// One evaluator invocation: the loaded config, the evaluator built from it,
/// and the span every event of the run is recorded under.
struct Job {
    run_id: String,
    config: EvaluatorConfig,
    evaluator: Box<dyn Evaluator>,
    _span: EvalSpan,
}

impl Job {
    fn start(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path.context("--config (or EVALS_CONFIG) is required for this command")?;
        let config = load_config(path)?;
        let evaluator = build_evaluator(config.clone())
            .with_context(|| format!("Failed to build evaluator '{}'", config.name))?;

        let run_id = uuid::Uuid::new_v4().to_string();
        let span = EvalSpan::enter(&config.name, &config.metric.name);
        info!(run_id = %run_id, provider = %config.provider, "evaluation started");

        Ok(Self {
            run_id,
            config,
            evaluator,
            _span: span,
        })
    }

    fn emit<T: Serialize>(&self, output: Option<&Path>, result: &T) -> Result<()> {
        emit(&self.run_id, &self.config, output, result)
    }
}

fn load_config(path: &Path) -> Result<EvaluatorConfig> {
    EvaluatorConfig::from_path(path)
        .with_context(|| format!("Failed to load evaluator config: {:?}", path))
}

/// Parse a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn load_pairs(evaluator: &dyn Evaluator, path: &Path) -> Result<(Vec<Value>, Vec<Value>)> {
    let samples =
        load_samples(path).with_context(|| format!("Failed to read samples: {:?}", path))?;
    extract_pairs(evaluator, &samples)
        .with_context(|| format!("Failed to extract values from {:?}", path))
}

fn cmd_metrics() -> Vec<String> {
    MetricRegistry::builtin()
        .identifiers()
        .map(|(namespace, name)| format!("{namespace}.{name}"))
        .collect()
}

fn cmd_evaluate(
    evaluator: &dyn Evaluator,
    ground_truth: &str,
    prediction: &str,
) -> Result<EvaluationResult> {
    let result = evaluator
        .evaluate_cached(&parse_value(ground_truth), &parse_value(prediction))
        .context("Evaluation failed")?;
    Ok(result)
}

fn cmd_batch(evaluator: &dyn Evaluator, data: &Path) -> Result<BatchEvaluationResult> {
    let (y_true, y_pred) = load_pairs(evaluator, data)?;
    let result = evaluator
        .evaluate_batch(&y_true, &y_pred)
        .context("Batch evaluation failed")?;
    Ok(result)
}

fn cmd_compare(
    evaluator: &dyn Evaluator,
    baseline: &Path,
    candidate: &Path,
) -> Result<ComparisonResult> {
    let (y_true, baseline_pred) = load_pairs(evaluator, baseline)?;
    let (candidate_true, candidate_pred) = load_pairs(evaluator, candidate)?;
    if baseline_pred.len() != candidate_pred.len() {
        bail!(
            "Baseline has {} samples but candidate has {}",
            baseline_pred.len(),
            candidate_pred.len()
        );
    }
    // Rows are paired by position, so both files must list the same items in order.
    if let Some(row) = y_true.iter().zip(&candidate_true).position(|(a, b)| a != b) {
        bail!(
            "Sample {} has ground truth {} in candidate but {} in baseline",
            row + 1,
            candidate_true[row],
            y_true[row]
        );
    }
    let result = evaluator
        .compare(&y_true, &candidate_pred, &baseline_pred)
        .context("Comparison failed")?;
    Ok(result)
}

fn cmd_sample_size(
    evaluator: &dyn Evaluator,
    data: &Path,
    confidence: f64,
    margin: f64,
) -> Result<SampleSizeEstimate> {
    let (y_true, y_pred) = load_pairs(evaluator, data)?;
    let required = evaluator
        .estimate_sample_size(&y_true, &y_pred, confidence, margin)
        .context("Sample size estimation failed")?;
    Ok(SampleSizeEstimate {
        required_sample_size: required,
        observed_sample_size: y_true.len(),
        confidence,
        margin_of_error: margin,
    })
}

/// Print `result` as pretty JSON, or write it as an artifact when `output` is set.
fn emit<T: Serialize>(
    run_id: &str,
    config: &EvaluatorConfig,
    output: Option<&Path>,
    result: &T,
) -> Result<()> {
    let Some(path) = output else {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    };

    let artifact = Artifact {
        run_id: run_id.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        engine_version: evals_core::VERSION,
        evaluator: &config.name,
        config_digest: config.digest().context("Failed to digest evaluator config")?,
        result,
    };
    let body = serde_json::to_string_pretty(&artifact)?;
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write artifact to {:?}", path))?;
    info!(path = %path.display(), "artifact written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const CONFIG: &str = r#"{
        "name": "exact_answer",
        "description": "",
        "provider": "sklearn",
        "extraction": {"ground_truth_field": "answer", "prediction_field": "-1.content"},
        "metric": {"namespace": "sklearn.metrics", "name": "accuracy_score", "bootstrap_seed": 3}
    }"#;

    fn evaluator() -> Box<dyn Evaluator> {
        build_evaluator(EvaluatorConfig::from_json_str(CONFIG).unwrap()).unwrap()
    }

    fn samples(dir: &Path, name: &str, answers: &[(&str, &str)]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for (truth, pred) in answers {
            let line = json!({
                "ground_truth": {"answer": truth},
                "predictions": [{"role": "assistant", "content": pred}],
            });
            writeln!(file, "{line}").unwrap();
        }
        path
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "evals", "--config", "c.json", "sample-size", "--data", "d.jsonl", "--margin", "0.1",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        match cli.command {
            Commands::SampleSize {
                confidence, margin, ..
            } => {
                assert_eq!(confidence, 0.95);
                assert_eq!(margin, 0.1);
            }
            _ => panic!("expected sample-size"),
        }
    }

    #[test]
    fn test_parse_value_falls_back_to_string() {
        assert_eq!(parse_value("1"), json!(1));
        assert_eq!(parse_value(r#"{"a": 1}"#), json!({"a": 1}));
        assert_eq!(parse_value("yes"), json!("yes"));
    }

    #[test]
    fn test_cmd_metrics_lists_builtins() {
        let names = cmd_metrics();
        assert!(names.contains(&"sklearn.metrics.accuracy_score".to_string()));
        assert!(names.contains(&"sklearn.metrics.mean_absolute_error".to_string()));
    }

    #[test]
    fn test_cmd_evaluate() {
        let result = cmd_evaluate(evaluator().as_ref(), "yes", "yes").unwrap();
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_cmd_batch_and_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let data = samples(dir.path(), "s.jsonl", &[("a", "a"), ("b", "c"), ("d", "d"), ("e", "e")]);
        let result = cmd_batch(evaluator().as_ref(), &data).unwrap();
        assert!((result.mean - 0.75).abs() < 1e-9);

        let config = EvaluatorConfig::from_json_str(CONFIG).unwrap();
        let out = dir.path().join("artifact.json");
        emit("run-1", &config, Some(&out), &result).unwrap();

        let artifact: Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(artifact["run_id"], json!("run-1"));
        assert_eq!(artifact["evaluator"], json!("exact_answer"));
        assert_eq!(artifact["config_digest"], json!(config.digest().unwrap()));
        assert_eq!(artifact["result"]["sample_size"], json!(4));
    }

    #[test]
    fn test_cmd_compare_candidate_minus_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = samples(dir.path(), "b.jsonl", &[("a", "x"), ("b", "b"), ("c", "x")]);
        let candidate = samples(dir.path(), "c.jsonl", &[("a", "a"), ("b", "b"), ("c", "c")]);

        let result = cmd_compare(evaluator().as_ref(), &baseline, &candidate).unwrap();
        assert!((result.difference - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.sample_size, Some(3));
    }

    #[test]
    fn test_cmd_compare_rejects_unaligned_files() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = samples(dir.path(), "b.jsonl", &[("a", "a"), ("b", "b")]);
        let candidate = samples(dir.path(), "c.jsonl", &[("a", "a")]);
        assert!(cmd_compare(evaluator().as_ref(), &baseline, &candidate).is_err());
    }

    #[test]
    fn test_cmd_compare_rejects_reordered_rows() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = samples(dir.path(), "b.jsonl", &[("a", "a"), ("b", "x")]);
        let candidate = samples(dir.path(), "c.jsonl", &[("b", "b"), ("a", "x")]);

        let err = cmd_compare(evaluator().as_ref(), &baseline, &candidate).unwrap_err();
        assert!(err.to_string().starts_with("Sample 1 has ground truth"));
    }

    #[test]
    fn test_cmd_sample_size() {
        let dir = tempfile::tempdir().unwrap();
        let data = samples(dir.path(), "s.jsonl", &[("a", "a"), ("b", "b")]);
        let estimate = cmd_sample_size(evaluator().as_ref(), &data, 0.95, 0.05).unwrap();
        assert_eq!(estimate.required_sample_size, 2);
        assert_eq!(estimate.observed_sample_size, 2);
    }
}
