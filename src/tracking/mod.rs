//! Experiment tracking
//!
//! Local-first run tracking with parameter logging, stepped metric
//! recording, and artifact storage. Backed by pluggable storage via the
//! [`TrackingBackend`](storage::TrackingBackend) trait.
//!
//! # Architecture
//!
//! - **`ExperimentTracker`**: top-level handle that manages runs for a named experiment
//! - **`Run`**: a single training run with parameters, metrics, and artifacts
//! - **`RunScope`**: explicit run context handed to the trainer and model logger
//! - **`TrackingBackend`**: pluggable persistence (JSON files, in-memory)
//!
//! Exactly one run wraps a whole training execution. The run handle is
//! never ambient state; stages that record to the run receive a
//! [`RunScope`] value.
//!
//! # Example
//!
//! ```
//! use tasador::tracking::{ExperimentTracker, RunStatus};
//! use tasador::tracking::storage::InMemoryBackend;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let mut tracker = ExperimentTracker::new("housing-prices", InMemoryBackend::new());
//! tracker.add_tag("team", "pricing");
//!
//! let run_id = tracker.start_run(Some("baseline"))?;
//! tracker.log_param(&run_id, "cv_folds", "3")?;
//! tracker.log_metric(&run_id, "mean_cv_r2", 0.82, 0)?;
//! tracker.end_run(&run_id, RunStatus::Completed)?;
//!
//! let run = tracker.get_run(&run_id)?;
//! assert_eq!(run.params.get("cv_folds").map(String::as_str), Some("3"));
//! # Ok(())
//! # }
//! ```

pub mod storage;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storage::{TrackingBackend, TrackingStorageError};

/// Status of a tracking run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is actively recording
    Active,
    /// Run completed successfully
    Completed,
    /// Run failed
    Failed,
}

/// A single metric observation at a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub value: f64,
    pub step: u64,
}

impl MetricPoint {
    #[must_use]
    pub fn new(value: f64, step: u64) -> Self {
        Self { value, step }
    }
}

/// A single experiment run
///
/// Tracks parameters, stepped metrics, artifact URIs, and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Unique identifier for the run
    pub run_id: String,
    /// Optional human-readable name
    pub run_name: Option<String>,
    /// Parent experiment name
    pub experiment_name: String,
    /// Current status
    pub status: RunStatus,
    /// Parameters: key -> string-encoded value
    pub params: HashMap<String, String>,
    /// Metrics: key -> observations
    pub metrics: HashMap<String, Vec<MetricPoint>>,
    /// Artifact URIs
    pub artifacts: Vec<String>,
    /// Tags: key -> value
    pub tags: HashMap<String, String>,
    /// Unix timestamp (ms) when the run started
    pub start_time_ms: Option<u64>,
    /// Unix timestamp (ms) when the run ended
    pub end_time_ms: Option<u64>,
}

impl Run {
    fn new(run_id: String, run_name: Option<String>, experiment_name: String) -> Self {
        Self {
            run_id,
            run_name,
            experiment_name,
            status: RunStatus::Active,
            params: HashMap::new(),
            metrics: HashMap::new(),
            artifacts: Vec::new(),
            tags: HashMap::new(),
            start_time_ms: Some(now_ms()),
            end_time_ms: None,
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Errors from experiment tracking operations
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("run not found: {0}")]
    RunNotFound(String),

    #[error("run is not active: {0}")]
    RunNotActive(String),

    #[error("storage error: {0}")]
    Storage(#[from] TrackingStorageError),
}

/// Result alias for tracking operations
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Experiment tracker
///
/// Manages runs under a single experiment name. Persists run data through
/// a pluggable [`TrackingBackend`].
#[derive(Debug)]
pub struct ExperimentTracker<B: TrackingBackend> {
    experiment_name: String,
    tags: HashMap<String, String>,
    backend: B,
    /// Active runs held in memory for fast mutation
    active_runs: HashMap<String, Run>,
    next_run_id: u64,
}

impl<B: TrackingBackend> ExperimentTracker<B> {
    /// Create a new tracker for the given experiment name
    pub fn new(experiment_name: impl Into<String>, backend: B) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            tags: HashMap::new(),
            backend,
            active_runs: HashMap::new(),
            next_run_id: 1,
        }
    }

    /// Add an experiment-level tag, inherited by runs started afterwards
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// The storage backend, for read-side inspection.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Start a new run, optionally with a human-readable name.
    ///
    /// Returns the run ID.
    pub fn start_run(&mut self, run_name: Option<&str>) -> Result<String> {
        let run_id = format!("run-{}", self.next_run_id);
        self.next_run_id += 1;

        let mut run = Run::new(
            run_id.clone(),
            run_name.map(String::from),
            self.experiment_name.clone(),
        );
        for (k, v) in &self.tags {
            run.tags.insert(k.clone(), v.clone());
        }

        self.active_runs.insert(run_id.clone(), run);
        Ok(run_id)
    }

    /// End a run with the given status, persisting it to the backend
    pub fn end_run(&mut self, run_id: &str, status: RunStatus) -> Result<()> {
        let mut run = self
            .active_runs
            .remove(run_id)
            .ok_or_else(|| TrackingError::RunNotFound(run_id.to_string()))?;

        run.status = status;
        run.end_time_ms = Some(now_ms());

        self.backend.save_run(&run)?;
        Ok(())
    }

    /// Log a single parameter
    pub fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()> {
        let run = self.active_run_mut(run_id)?;
        run.params.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Log multiple parameters at once
    pub fn log_params(&mut self, run_id: &str, params: &HashMap<String, String>) -> Result<()> {
        let run = self.active_run_mut(run_id)?;
        for (k, v) in params {
            run.params.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    /// Log a metric value at a given step
    pub fn log_metric(&mut self, run_id: &str, key: &str, value: f64, step: u64) -> Result<()> {
        let run = self.active_run_mut(run_id)?;
        run.metrics
            .entry(key.to_string())
            .or_default()
            .push(MetricPoint::new(value, step));
        Ok(())
    }

    /// Store an artifact payload for the run, recording its URI
    pub fn log_artifact(&mut self, run_id: &str, path: &str, data: &[u8]) -> Result<String> {
        if !self.active_runs.contains_key(run_id) {
            return Err(TrackingError::RunNotActive(run_id.to_string()));
        }
        let uri = self.backend.store_artifact(run_id, path, data)?;
        if let Some(run) = self.active_runs.get_mut(run_id) {
            run.artifacts.push(uri.clone());
        }
        Ok(uri)
    }

    /// Retrieve a run by ID
    ///
    /// Checks active (in-memory) runs first, then falls back to the backend.
    pub fn get_run(&self, run_id: &str) -> Result<Run> {
        if let Some(run) = self.active_runs.get(run_id) {
            return Ok(run.clone());
        }
        self.backend
            .load_run(run_id)
            .map_err(|e| TrackingError::RunNotFound(format!("{run_id}: {e}")))
    }

    /// List all runs (active + persisted)
    pub fn list_runs(&self) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self.active_runs.values().cloned().collect();
        for persisted in self.backend.list_runs()? {
            if !self.active_runs.contains_key(&persisted.run_id) {
                runs.push(persisted);
            }
        }
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }

    fn active_run_mut(&mut self, run_id: &str) -> Result<&mut Run> {
        self.active_runs
            .get_mut(run_id)
            .ok_or_else(|| TrackingError::RunNotActive(run_id.to_string()))
    }
}

/// Explicit run context threaded through the pipeline stages.
///
/// Borrows the tracker for the duration of one run and carries the run id
/// plus the autolog switch. With autolog on, the trainer records every
/// grid candidate's parameters and scores as it fits.
#[derive(Debug)]
pub struct RunScope<'a, B: TrackingBackend> {
    tracker: &'a mut ExperimentTracker<B>,
    run_id: String,
    autolog: bool,
}

impl<'a, B: TrackingBackend> RunScope<'a, B> {
    pub fn new(tracker: &'a mut ExperimentTracker<B>, run_id: impl Into<String>) -> Self {
        Self {
            tracker,
            run_id: run_id.into(),
            autolog: true,
        }
    }

    /// Toggle candidate-level auto-logging (on by default).
    #[must_use]
    pub fn with_autolog(mut self, autolog: bool) -> Self {
        self.autolog = autolog;
        self
    }

    #[must_use]
    pub fn autolog(&self) -> bool {
        self.autolog
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn log_param(&mut self, key: &str, value: &str) -> Result<()> {
        self.tracker.log_param(&self.run_id, key, value)
    }

    pub fn log_metric(&mut self, key: &str, value: f64, step: u64) -> Result<()> {
        self.tracker.log_metric(&self.run_id, key, value, step)
    }

    pub fn log_artifact(&mut self, path: &str, data: &[u8]) -> Result<String> {
        self.tracker.log_artifact(&self.run_id, path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::storage::InMemoryBackend;
    use super::*;

    fn tracker() -> ExperimentTracker<InMemoryBackend> {
        ExperimentTracker::new("test-exp", InMemoryBackend::new())
    }

    #[test]
    fn test_full_run_lifecycle() {
        let mut tracker = tracker();
        tracker.add_tag("team", "pricing");

        let run_id = tracker.start_run(Some("baseline")).expect("start run");
        tracker.log_param(&run_id, "cv_folds", "3").expect("log param");
        tracker.log_metric(&run_id, "r2", 0.5, 0).expect("log metric");
        tracker.log_metric(&run_id, "r2", 0.7, 1).expect("log metric");
        let uri = tracker
            .log_artifact(&run_id, "model.json", b"{}")
            .expect("log artifact");
        tracker
            .end_run(&run_id, RunStatus::Completed)
            .expect("end run");

        let run = tracker.get_run(&run_id).expect("persisted run");
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.params.get("cv_folds").map(String::as_str), Some("3"));
        assert_eq!(run.metrics.get("r2").map(Vec::len), Some(2));
        assert_eq!(run.artifacts, vec![uri]);
        assert_eq!(run.tags.get("team").map(String::as_str), Some("pricing"));
        assert!(run.start_time_ms.is_some());
        assert!(run.end_time_ms.is_some());
    }

    #[test]
    fn test_log_against_unknown_run_fails() {
        let mut tracker = tracker();
        let err = tracker.log_param("run-99", "k", "v").unwrap_err();
        assert!(matches!(err, TrackingError::RunNotActive(_)));
        let err = tracker.log_metric("run-99", "k", 1.0, 0).unwrap_err();
        assert!(matches!(err, TrackingError::RunNotActive(_)));
        let err = tracker.log_artifact("run-99", "a", b"x").unwrap_err();
        assert!(matches!(err, TrackingError::RunNotActive(_)));
    }

    #[test]
    fn test_end_run_twice_fails() {
        let mut tracker = tracker();
        let run_id = tracker.start_run(None).expect("start run");
        tracker
            .end_run(&run_id, RunStatus::Completed)
            .expect("first end");
        let err = tracker.end_run(&run_id, RunStatus::Completed).unwrap_err();
        assert!(matches!(err, TrackingError::RunNotFound(_)));
    }

    #[test]
    fn test_ended_run_no_longer_accepts_logs() {
        let mut tracker = tracker();
        let run_id = tracker.start_run(None).expect("start run");
        tracker.end_run(&run_id, RunStatus::Failed).expect("end run");
        let err = tracker.log_metric(&run_id, "r2", 0.1, 0).unwrap_err();
        assert!(matches!(err, TrackingError::RunNotActive(_)));
    }

    #[test]
    fn test_list_runs_merges_active_and_persisted() {
        let mut tracker = tracker();
        let first = tracker.start_run(None).expect("start run");
        tracker
            .end_run(&first, RunStatus::Completed)
            .expect("end run");
        let _second = tracker.start_run(None).expect("start run");

        let runs = tracker.list_runs().expect("list");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].run_id, "run-1");
        assert_eq!(runs[1].run_id, "run-2");
    }

    #[test]
    fn test_run_scope_delegates_to_tracker() {
        let mut tracker = tracker();
        let run_id = tracker.start_run(None).expect("start run");
        {
            let mut scope = RunScope::new(&mut tracker, run_id.as_str());
            assert!(scope.autolog());
            scope.log_param("alpha", "100").expect("log param");
            scope.log_metric("r2", 0.9, 0).expect("log metric");
            scope.log_artifact("m.json", b"{}").expect("log artifact");
        }
        let run = tracker.get_run(&run_id).expect("active run");
        assert_eq!(run.params.get("alpha").map(String::as_str), Some("100"));
        assert_eq!(run.metrics.get("r2").map(Vec::len), Some(1));
        assert_eq!(run.artifacts.len(), 1);
    }

    #[test]
    fn test_run_scope_autolog_toggle() {
        let mut tracker = tracker();
        let run_id = tracker.start_run(None).expect("start run");
        let scope = RunScope::new(&mut tracker, run_id).with_autolog(false);
        assert!(!scope.autolog());
    }
}
