//! Training pipeline for a housing-price regression model.
//!
//! Pulls a labeled dataset from a relational store, splits it into
//! train/test partitions, fits a regularized linear model inside a
//! standardization pipeline via grid-search cross-validation, and records
//! the fitted model and its metrics in a local experiment tracker and
//! model registry.
//!
//! # Architecture
//!
//! - [`data`]: dataset loading (`DB_URI`, SQLite), canonical schema
//!   enforcement, deterministic train/test split
//! - [`pipeline`]: `standard_scaler` + `lasso` two-stage pipeline
//! - [`train`]: grid search with k-fold cross-validation scored by R²
//! - [`tracking`]: run-scoped experiment tracking behind pluggable storage
//! - [`registry`]: versioned model registry and best-effort model logging
//!
//! Control flow is strictly linear: load → preprocess → build → train →
//! log, wrapped in a single tracked run.
//!
//! # Example
//!
//! ```
//! use ndarray::{array, Array2};
//! use tasador::data::FeatureMatrix;
//! use tasador::pipeline::ALPHA_PARAM;
//! use tasador::registry::InMemoryRegistry;
//! use tasador::tracking::storage::InMemoryBackend;
//! use tasador::tracking::{ExperimentTracker, RunScope, RunStatus};
//! use tasador::train::{train_and_log_model, ParamGrid};
//!
//! # fn main() -> tasador::Result<()> {
//! let x = FeatureMatrix::new(
//!     vec!["size".into(), "rooms".into()],
//!     Array2::from_shape_vec(
//!         (6, 2),
//!         vec![1.0, 1.0, 2.0, 1.0, 3.0, 2.0, 4.0, 2.0, 5.0, 3.0, 6.0, 3.0],
//!     )
//!     .expect("literal shape"),
//! );
//! let y = array![10.0, 14.0, 22.0, 26.0, 34.0, 38.0];
//!
//! let mut tracker = ExperimentTracker::new("demo", InMemoryBackend::new());
//! let mut registry = InMemoryRegistry::new();
//! let run_id = tracker.start_run(None)?;
//! let model = {
//!     let mut run = RunScope::new(&mut tracker, run_id.as_str());
//!     train_and_log_model(
//!         &tasador::pipeline::build_pipeline(),
//!         &x,
//!         &y,
//!         &ParamGrid::new().with(ALPHA_PARAM, [0.1, 1.0]),
//!         2,
//!         "demo-model",
//!         "demo-LR",
//!         &mut run,
//!         &mut registry,
//!     )?
//! };
//! tracker.end_run(&run_id, RunStatus::Completed)?;
//! assert!(model.best_score() <= 1.0);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod data;
mod error;
pub mod pipeline;
pub mod registry;
pub mod tracking;
pub mod train;

pub use error::{Error, Result};
