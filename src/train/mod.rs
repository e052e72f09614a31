//! Grid-search training with k-fold cross-validation.
//!
//! [`train`] evaluates every configuration in a [`ParamGrid`] by k-fold
//! cross-validation scored with R², selects the best mean score, and refits
//! the winning configuration on the entire training partition. The caller's
//! pipeline is never mutated; candidates fit on clones.
//!
//! Argument validation happens before any fitting, and with autolog enabled
//! on the surrounding [`RunScope`] every candidate's parameters and scores
//! are recorded to the tracker as a side effect of the search.

mod grid;
mod metrics;

pub use grid::ParamGrid;
pub use metrics::{mae, r_squared, rmse, Metric, R2Score, MAE, RMSE};

use std::collections::BTreeMap;

use ndarray::{Array1, Axis};
use thiserror::Error;

use crate::data::FeatureMatrix;
use crate::pipeline::{Pipeline, PipelineError};
use crate::registry::{log_model, ModelRegistry};
use crate::tracking::{RunScope, TrackingError};
use crate::tracking::storage::TrackingBackend;

/// Default number of cross-validation folds.
pub const DEFAULT_CV: usize = 3;

/// Errors from training operations
#[derive(Debug, Error)]
pub enum TrainError {
    /// Malformed caller-supplied arguments; raised before any fitting.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Numerical or fitting failure inside the search; fatal, no retry.
    #[error("model training failed: {0}")]
    Training(String),

    #[error(transparent)]
    Tracking(#[from] TrackingError),
}

impl From<PipelineError> for TrainError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::UnknownParameter(p) => {
                TrainError::InvalidArgument(format!("unknown grid parameter: {p}"))
            }
            other => TrainError::Training(other.to_string()),
        }
    }
}

/// Result alias for training operations
pub type Result<T> = std::result::Result<T, TrainError>;

/// Cross-validation outcome for a single grid candidate.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CandidateResult {
    pub params: BTreeMap<String, f64>,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

/// Result of a grid search: the winning pipeline refit on the full
/// training partition, plus the per-candidate cross-validation record.
///
/// Created by [`train`]; consumed read-only by the model logger.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pipeline: Pipeline,
    best_params: BTreeMap<String, f64>,
    best_score: f64,
    cv_results: Vec<CandidateResult>,
}

impl FittedModel {
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Winning hyperparameter configuration.
    #[must_use]
    pub fn best_params(&self) -> &BTreeMap<String, f64> {
        &self.best_params
    }

    /// Mean cross-validation R² of the winning configuration.
    #[must_use]
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// Per-candidate cross-validation record, in grid order.
    #[must_use]
    pub fn cv_results(&self) -> &[CandidateResult] {
        &self.cv_results
    }

    /// Predict targets through the refit pipeline.
    pub fn predict(&self, x: &FeatureMatrix) -> std::result::Result<Array1<f64>, PipelineError> {
        self.pipeline.predict(x.values())
    }
}

/// Grid search over `param_grid` with `cv`-fold cross-validation.
///
/// Scores candidates by mean out-of-fold R², breaking ties toward the
/// earlier candidate in grid order, then refits the winner on all of
/// `x_train`/`y_train`.
pub fn train<B: TrackingBackend>(
    pipeline: &Pipeline,
    x_train: &FeatureMatrix,
    y_train: &Array1<f64>,
    param_grid: &ParamGrid,
    cv: usize,
    run: &mut RunScope<'_, B>,
) -> Result<FittedModel> {
    validate_args(pipeline, x_train, y_train, param_grid, cv)?;

    let candidates = param_grid.candidates();
    let folds = k_fold_indices(x_train.len(), cv);
    let mut cv_results = Vec::with_capacity(candidates.len());

    for (step, params) in candidates.iter().enumerate() {
        let mut fold_scores = Vec::with_capacity(cv);
        for (fit_idx, val_idx) in &folds {
            fold_scores.push(fit_and_score(
                pipeline, params, x_train, y_train, fit_idx, val_idx,
            )?);
        }
        let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
        log::debug!("candidate {step} {params:?}: mean R² {mean_score:.6}");

        if run.autolog() {
            for (name, value) in params {
                run.log_metric(&format!("param.{name}"), *value, step as u64)?;
            }
            run.log_metric("mean_cv_r2", mean_score, step as u64)?;
        }

        cv_results.push(CandidateResult {
            params: params.clone(),
            fold_scores,
            mean_score,
        });
    }

    let mut best_idx = 0;
    for (i, candidate) in cv_results.iter().enumerate().skip(1) {
        if candidate.mean_score > cv_results[best_idx].mean_score {
            best_idx = i;
        }
    }
    let best_params = cv_results[best_idx].params.clone();
    let best_score = cv_results[best_idx].mean_score;

    // Refit the winning configuration on the entire training partition.
    let mut best_pipeline = pipeline.clone();
    for (name, value) in &best_params {
        best_pipeline.set_param(name, *value)?;
    }
    best_pipeline
        .fit(x_train.values(), y_train.view())
        .map_err(|e| TrainError::Training(e.to_string()))?;

    if run.autolog() {
        for (name, value) in &best_params {
            run.log_param(&format!("best.{name}"), &value.to_string())?;
        }
        run.log_param("cv_folds", &cv.to_string())?;
        run.log_metric("best_cv_r2", best_score, 0)?;
    }
    log::info!("grid search selected {best_params:?} with mean R² {best_score:.6}");

    Ok(FittedModel {
        pipeline: best_pipeline,
        best_params,
        best_score,
        cv_results,
    })
}

/// Unified train-then-log entry point.
///
/// Runs [`train`], registers the result through
/// [`log_model`](crate::registry::log_model), and returns the fitted model.
/// Model-logging failures past argument validation never abort the run.
#[allow(clippy::too_many_arguments)]
pub fn train_and_log_model<B: TrackingBackend, R: ModelRegistry>(
    pipeline: &Pipeline,
    x_train: &FeatureMatrix,
    y_train: &Array1<f64>,
    param_grid: &ParamGrid,
    cv: usize,
    artifact_path: &str,
    registered_model_name: &str,
    run: &mut RunScope<'_, B>,
    registry: &mut R,
) -> crate::Result<FittedModel> {
    let model = train(pipeline, x_train, y_train, param_grid, cv, run)?;
    log_model(
        &model,
        x_train,
        artifact_path,
        registered_model_name,
        run,
        registry,
    )?;
    Ok(model)
}

fn validate_args(
    pipeline: &Pipeline,
    x_train: &FeatureMatrix,
    y_train: &Array1<f64>,
    param_grid: &ParamGrid,
    cv: usize,
) -> Result<()> {
    if x_train.len() != y_train.len() {
        return Err(TrainError::InvalidArgument(format!(
            "features and target are misaligned: {} rows vs {} targets",
            x_train.len(),
            y_train.len()
        )));
    }
    if param_grid.is_empty() {
        return Err(TrainError::InvalidArgument(
            "param_grid must map at least one parameter to a candidate list".to_string(),
        ));
    }
    for name in param_grid.names() {
        let values = param_grid.get(name).unwrap_or_default();
        if values.is_empty() {
            return Err(TrainError::InvalidArgument(format!(
                "no candidates for parameter '{name}'"
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(TrainError::InvalidArgument(format!(
                "non-finite candidate for parameter '{name}'"
            )));
        }
        // Reject unknown names against a clone before any fitting.
        let mut probe = pipeline.clone();
        probe.set_param(name, values[0])?;
    }
    if cv < 2 {
        return Err(TrainError::InvalidArgument(format!(
            "cv must be at least 2, got {cv}"
        )));
    }
    if x_train.len() < cv {
        return Err(TrainError::InvalidArgument(format!(
            "cv={cv} exceeds the {} training rows",
            x_train.len()
        )));
    }
    Ok(())
}

/// Contiguous k-fold partition; the first `n mod k` folds take one extra
/// row.
fn k_fold_indices(n: usize, k: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let stop = start + base + usize::from(fold < extra);
        let val: Vec<usize> = (start..stop).collect();
        let fit: Vec<usize> = (0..start).chain(stop..n).collect();
        folds.push((fit, val));
        start = stop;
    }
    folds
}

fn fit_and_score(
    base: &Pipeline,
    params: &BTreeMap<String, f64>,
    x: &FeatureMatrix,
    y: &Array1<f64>,
    fit_idx: &[usize],
    val_idx: &[usize],
) -> Result<f64> {
    let mut candidate = base.clone();
    for (name, value) in params {
        candidate.set_param(name, *value)?;
    }

    let x_fit = x.take_rows(fit_idx);
    let y_fit = y.select(Axis(0), fit_idx);
    let x_val = x.take_rows(val_idx);
    let y_val = y.select(Axis(0), val_idx);

    candidate
        .fit(x_fit.values(), y_fit.view())
        .map_err(|e| TrainError::Training(e.to_string()))?;
    let predictions = candidate
        .predict(x_val.values())
        .map_err(|e| TrainError::Training(e.to_string()))?;
    Ok(r_squared(predictions.view(), y_val.view()))
}
