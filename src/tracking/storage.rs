//! Tracking storage backends
//!
//! Provides the `TrackingBackend` trait, a JSON file-based implementation
//! for persisting experiment runs to disk, and an in-memory implementation
//! for tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::Run;

/// Errors from tracking storage operations
#[derive(Debug, Error)]
pub enum TrackingStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("run not found: {0}")]
    RunNotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result alias for tracking storage operations
pub type Result<T> = std::result::Result<T, TrackingStorageError>;

/// Trait for tracking storage backends
///
/// Implementations persist and retrieve experiment runs and their artifact
/// payloads.
pub trait TrackingBackend {
    /// Save a run to the backend
    fn save_run(&mut self, run: &Run) -> Result<()>;

    /// Load a run by its ID
    fn load_run(&self, run_id: &str) -> Result<Run>;

    /// List all stored runs
    fn list_runs(&self) -> Result<Vec<Run>>;

    /// Persist an artifact payload for a run, returning its URI
    fn store_artifact(&mut self, run_id: &str, path: &str, data: &[u8]) -> Result<String>;
}

/// JSON file-based tracking backend
///
/// Stores each run as `{run_id}.json` in a directory; artifact payloads go
/// under `artifacts/{run_id}/`.
#[derive(Debug)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    /// Create a new JSON file backend rooted at `dir`. The directory is
    /// created lazily on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("{run_id}.json"))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

impl TrackingBackend for JsonFileBackend {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(run)?;
        fs::write(self.run_path(&run.run_id), json)?;
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        let path = self.run_path(run_id);
        if !path.exists() {
            return Err(TrackingStorageError::RunNotFound(run_id.to_string()));
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn list_runs(&self) -> Result<Vec<Run>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                let json = fs::read_to_string(&path)?;
                runs.push(serde_json::from_str(&json)?);
            }
        }
        runs.sort_by(|a: &Run, b: &Run| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }

    fn store_artifact(&mut self, run_id: &str, path: &str, data: &[u8]) -> Result<String> {
        let file = self.dir.join("artifacts").join(run_id).join(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, data)?;
        Ok(file.to_string_lossy().into_owned())
    }
}

/// In-memory tracking backend for testing
///
/// Stores runs and artifact payloads in maps. No persistence.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    runs: HashMap<String, Run>,
    artifacts: HashMap<String, Vec<u8>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored artifact payload, if any.
    #[must_use]
    pub fn artifact(&self, run_id: &str, path: &str) -> Option<&[u8]> {
        self.artifacts
            .get(&format!("{run_id}/{path}"))
            .map(Vec::as_slice)
    }
}

impl TrackingBackend for InMemoryBackend {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        self.runs.insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        self.runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| TrackingStorageError::RunNotFound(run_id.to_string()))
    }

    fn list_runs(&self) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self.runs.values().cloned().collect();
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }

    fn store_artifact(&mut self, run_id: &str, path: &str, data: &[u8]) -> Result<String> {
        self.artifacts
            .insert(format!("{run_id}/{path}"), data.to_vec());
        Ok(format!("mem://{run_id}/{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{RunStatus, TrackingError};
    use super::*;
    use crate::tracking::ExperimentTracker;
    use tempfile::TempDir;

    #[test]
    fn test_json_backend_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let mut tracker =
            ExperimentTracker::new("persisted", JsonFileBackend::new(dir.path()));

        let run_id = tracker.start_run(Some("roundtrip")).expect("start run");
        tracker.log_param(&run_id, "alpha", "125").expect("log param");
        tracker.log_metric(&run_id, "r2", 0.8, 3).expect("log metric");
        tracker
            .end_run(&run_id, RunStatus::Completed)
            .expect("end run");

        let backend = JsonFileBackend::new(dir.path());
        let run = backend.load_run(&run_id).expect("load persisted run");
        assert_eq!(run.run_name.as_deref(), Some("roundtrip"));
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.params.get("alpha").map(String::as_str), Some("125"));
        let points = run.metrics.get("r2").expect("metric series");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].step, 3);
    }

    #[test]
    fn test_json_backend_artifact_file() {
        let dir = TempDir::new().expect("tempdir");
        let mut backend = JsonFileBackend::new(dir.path());
        let uri = backend
            .store_artifact("run-1", "model/model.json", b"{\"ok\":true}")
            .expect("store artifact");

        let on_disk = std::fs::read(&uri).expect("artifact readable at URI");
        assert_eq!(on_disk, b"{\"ok\":true}");
    }

    #[test]
    fn test_json_backend_missing_run() {
        let dir = TempDir::new().expect("tempdir");
        let backend = JsonFileBackend::new(dir.path());
        let err = backend.load_run("run-404").unwrap_err();
        assert!(matches!(err, TrackingStorageError::RunNotFound(_)));
    }

    #[test]
    fn test_json_backend_list_skips_artifacts_dir() {
        let dir = TempDir::new().expect("tempdir");
        let mut tracker =
            ExperimentTracker::new("listing", JsonFileBackend::new(dir.path()));
        let run_id = tracker.start_run(None).expect("start run");
        tracker
            .log_artifact(&run_id, "model.json", b"{}")
            .expect("artifact");
        tracker
            .end_run(&run_id, RunStatus::Completed)
            .expect("end run");

        let backend = JsonFileBackend::new(dir.path());
        let runs = backend.list_runs().expect("list");
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn test_in_memory_backend_artifacts() {
        let mut backend = InMemoryBackend::new();
        let uri = backend
            .store_artifact("run-1", "model.json", b"payload")
            .expect("store");
        assert_eq!(uri, "mem://run-1/model.json");
        assert_eq!(backend.artifact("run-1", "model.json"), Some(&b"payload"[..]));
        assert_eq!(backend.artifact("run-2", "model.json"), None);
    }

    #[test]
    fn test_tracker_surfaces_storage_errors() {
        // Rooting the backend under a plain file makes every write fail.
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let mut tracker = ExperimentTracker::new(
            "bad",
            JsonFileBackend::new(file.path().join("not-a-dir")),
        );
        let run_id = tracker.start_run(None).expect("start run");
        let err = tracker.end_run(&run_id, RunStatus::Completed).unwrap_err();
        assert!(matches!(err, TrackingError::Storage(_)));
    }
}
