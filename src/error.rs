//! Crate-level error type aggregating the per-module errors.

use thiserror::Error;

use crate::data::{DataError, SchemaError};
use crate::pipeline::PipelineError;
use crate::registry::{LogError, RegistryError};
use crate::tracking::TrackingError;
use crate::train::TrainError;

/// Top-level pipeline error.
///
/// Every stage fails fast on its own precondition violations; the variants
/// below carry the stage-specific causes up to the process boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Train(#[from] TrainError),

    #[error(transparent)]
    Tracking(#[from] TrackingError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Log(#[from] LogError),
}

/// Result alias for top-level pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
