//! Two-stage modelling pipeline: feature standardization followed by a
//! regularized linear regressor.
//!
//! [`build_pipeline`] is pure construction; the stages stay unfitted until
//! [`Pipeline::fit`]. Hyperparameters are addressed as `stage__param`, the
//! only tunable one being [`ALPHA_PARAM`].

mod lasso;
mod scaler;

pub use lasso::Lasso;
pub use scaler::StandardScaler;

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from pipeline configuration and fitting
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown pipeline parameter: {0}")]
    UnknownParameter(String),

    #[error("pipeline stage '{0}' is not fitted")]
    NotFitted(&'static str),

    #[error("fit failed: {0}")]
    Fit(String),
}

/// Result alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Names of the two pipeline stages, in application order.
pub const STEP_NAMES: [&str; 2] = ["standard_scaler", "lasso"];

/// Regularization strength of the regressor stage, `stage__param` style.
pub const ALPHA_PARAM: &str = "lasso__alpha";

/// Standardization then Lasso regression.
///
/// Scaler statistics are fit only on the data passed at fit time; predict
/// applies the fitted statistics to whatever data it is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pipeline {
    scaler: StandardScaler,
    lasso: Lasso,
}

/// Assemble the standard two-stage pipeline with default hyperparameters.
/// No side effects.
#[must_use]
pub fn build_pipeline() -> Pipeline {
    Pipeline::new()
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scaler: StandardScaler::new(),
            lasso: Lasso::default(),
        }
    }

    /// Stage names in application order.
    #[must_use]
    pub fn step_names(&self) -> &'static [&'static str] {
        &STEP_NAMES
    }

    #[must_use]
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    #[must_use]
    pub fn lasso(&self) -> &Lasso {
        &self.lasso
    }

    /// Set a hyperparameter addressed as `stage__param`.
    pub fn set_param(&mut self, key: &str, value: f64) -> Result<()> {
        match key {
            ALPHA_PARAM => {
                self.lasso.set_alpha(value);
                Ok(())
            }
            other => Err(PipelineError::UnknownParameter(other.to_string())),
        }
    }

    /// Current value of a `stage__param` hyperparameter.
    #[must_use]
    pub fn get_param(&self, key: &str) -> Option<f64> {
        match key {
            ALPHA_PARAM => Some(self.lasso.alpha()),
            _ => None,
        }
    }

    /// Fit the scaler on `x`, then the regressor on the scaled features.
    pub fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()> {
        if x.nrows() == 0 || x.nrows() != y.len() {
            return Err(PipelineError::Fit(format!(
                "input shape mismatch: {} rows, {} targets",
                x.nrows(),
                y.len()
            )));
        }
        self.scaler.fit(x);
        let scaled = self.scaler.transform(x)?;
        self.lasso.fit(scaled.view(), y)
    }

    /// Predict targets for `x` through both fitted stages.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let scaled = self.scaler.transform(x)?;
        self.lasso.predict(scaled.view())
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.scaler.is_fitted() && self.lasso.is_fitted()
    }
}
