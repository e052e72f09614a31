//! Best-effort model logging.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::data::FeatureMatrix;
use crate::pipeline::Pipeline;
use crate::tracking::storage::TrackingBackend;
use crate::tracking::RunScope;
use crate::train::FittedModel;

use super::{infer_signature, ModelRegistry, ModelSignature};

/// Errors from model-logging argument validation
#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Serialized artifact payload: the fitted pipeline plus its schema.
#[derive(Debug, Serialize)]
pub struct ModelArtifact<'a> {
    pub pipeline: &'a Pipeline,
    pub signature: &'a ModelSignature,
    pub best_params: &'a BTreeMap<String, f64>,
    pub best_cv_r2: f64,
}

/// Register the fitted model, its inferred signature, and the artifact
/// path/name with the tracking service.
///
/// Argument validation failures propagate. Everything past validation is
/// best-effort: prediction, serialization, tracking, and registry failures
/// are reported as a warning and swallowed, so a successful training run is
/// never aborted by its bookkeeping. That swallowing is deliberate and
/// confined to this boundary.
pub fn log_model<B: TrackingBackend, R: ModelRegistry>(
    model: &FittedModel,
    x_train: &FeatureMatrix,
    artifact_path: &str,
    registered_model_name: &str,
    run: &mut RunScope<'_, B>,
    registry: &mut R,
) -> Result<(), LogError> {
    if artifact_path.is_empty() || registered_model_name.is_empty() {
        return Err(LogError::InvalidArgument(
            "artifact_path and registered_model_name must not be empty".to_string(),
        ));
    }

    if let Err(e) = try_log_model(
        model,
        x_train,
        artifact_path,
        registered_model_name,
        run,
        registry,
    ) {
        log::warn!("model logging failed: {e}");
    }
    Ok(())
}

fn try_log_model<B: TrackingBackend, R: ModelRegistry>(
    model: &FittedModel,
    x_train: &FeatureMatrix,
    artifact_path: &str,
    registered_model_name: &str,
    run: &mut RunScope<'_, B>,
    registry: &mut R,
) -> Result<(), Box<dyn std::error::Error>> {
    let predictions = model.predict(x_train)?;
    let signature = infer_signature(x_train, predictions.view());

    let artifact = ModelArtifact {
        pipeline: model.pipeline(),
        signature: &signature,
        best_params: model.best_params(),
        best_cv_r2: model.best_score(),
    };
    let payload = serde_json::to_vec_pretty(&artifact)?;

    let uri = run.log_artifact(&format!("{artifact_path}/model.json"), &payload)?;
    let version = registry.register_model(registered_model_name, &uri)?;
    log::info!(
        "registered model '{}' version {} at {}",
        version.name,
        version.version,
        version.artifact_uri
    );
    Ok(())
}
