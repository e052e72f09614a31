//! L1-regularized linear regression fit by cyclic coordinate descent.

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::{PipelineError, Result};

const DEFAULT_ALPHA: f64 = 1.0;
const MAX_ITER: usize = 1000;
const TOL: f64 = 1e-5;

/// Lasso regressor.
///
/// Minimizes `1/(2n)·‖y − b − Xw‖² + alpha·‖w‖₁` by cyclic coordinate
/// descent with soft thresholding. `alpha` is the sole hyperparameter;
/// larger values drive more coefficients to exactly zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lasso {
    alpha: f64,
    max_iter: usize,
    tol: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
    n_iter: usize,
}

impl Default for Lasso {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl Lasso {
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            max_iter: MAX_ITER,
            tol: TOL,
            coefficients: None,
            intercept: 0.0,
            n_iter: 0,
        }
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Fitted coefficients, one per feature column.
    #[must_use]
    pub fn coefficients(&self) -> Option<ArrayView1<'_, f64>> {
        self.coefficients.as_ref().map(Array1::view)
    }

    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coordinate-descent sweeps used by the last fit.
    #[must_use]
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Fit coefficients and intercept on `x`/`y`.
    pub fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()> {
        let n = x.nrows();
        let p = x.ncols();
        if n == 0 || n != y.len() {
            return Err(PipelineError::Fit(format!(
                "input shape mismatch: {n} rows, {} targets",
                y.len()
            )));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(PipelineError::Fit(format!(
                "alpha must be finite and non-negative, got {}",
                self.alpha
            )));
        }
        if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::Fit(
                "non-finite value in training data".to_string(),
            ));
        }

        let nf = n as f64;
        // Per-column second moments, constant across sweeps.
        let col_sq: Vec<f64> = (0..p).map(|j| x.column(j).dot(&x.column(j)) / nf).collect();

        let mut w = Array1::<f64>::zeros(p);
        let mut intercept = y.mean().unwrap_or(0.0);
        // r = y - b - X·w, maintained incrementally.
        let mut residual = y.mapv(|v| v - intercept);

        let mut iterations = self.max_iter;
        for sweep in 0..self.max_iter {
            let mut max_delta = 0.0_f64;
            let mut max_weight = 0.0_f64;

            for j in 0..p {
                if col_sq[j] == 0.0 {
                    continue;
                }
                let w_j = w[j];
                let rho = x.column(j).dot(&residual) / nf + col_sq[j] * w_j;
                let w_new = soft_threshold(rho, self.alpha) / col_sq[j];
                if w_new != w_j {
                    residual.scaled_add(w_j - w_new, &x.column(j));
                    w[j] = w_new;
                    max_delta = max_delta.max((w_new - w_j).abs());
                }
                max_weight = max_weight.max(w[j].abs());
            }

            // Re-center the intercept against the current residual.
            let shift = residual.mean().unwrap_or(0.0);
            if shift != 0.0 {
                intercept += shift;
                residual -= shift;
                max_delta = max_delta.max(shift.abs());
            }

            if !intercept.is_finite() || w.iter().any(|v| !v.is_finite()) {
                return Err(PipelineError::Fit(
                    "coordinate descent diverged".to_string(),
                ));
            }
            if max_delta <= self.tol * max_weight.max(intercept.abs()).max(1e-12) {
                iterations = sweep + 1;
                break;
            }
        }

        self.coefficients = Some(w);
        self.intercept = intercept;
        self.n_iter = iterations;
        Ok(())
    }

    /// Predict targets for `x`.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(PipelineError::NotFitted("lasso"))?;
        Ok(x.dot(coefficients) + self.intercept)
    }
}

fn soft_threshold(z: f64, gamma: f64) -> f64 {
    if z > gamma {
        z - gamma
    } else if z < -gamma {
        z + gamma
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_soft_threshold() {
        assert_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_eq!(soft_threshold(0.5, 1.0), 0.0);
        assert_eq!(soft_threshold(-0.5, 1.0), 0.0);
        assert_eq!(soft_threshold(2.0, 0.0), 2.0);
    }

    #[test]
    fn test_fit_without_penalty_recovers_least_squares() {
        // y = 1 + 2x on centered-ish data; alpha 0 reduces to OLS.
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let y = array![1.0, 3.0, 5.0, 7.0, 9.0];

        let mut lasso = Lasso::new(0.0);
        lasso.fit(x.view(), y.view()).expect("fit succeeds");
        let coefficients = lasso.coefficients().expect("fitted");
        assert_abs_diff_eq!(coefficients[0], 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(lasso.intercept(), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_heavy_penalty_zeroes_coefficients() {
        let x = array![[-1.0], [0.0], [1.0]];
        let y = array![0.0, 1.0, 2.0];

        let mut lasso = Lasso::new(1e6);
        lasso.fit(x.view(), y.view()).expect("fit succeeds");
        let coefficients = lasso.coefficients().expect("fitted");
        assert_eq!(coefficients[0], 0.0);
        // With all coefficients zero the intercept is the target mean.
        assert_abs_diff_eq!(lasso.intercept(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_larger_alpha_shrinks_more() {
        let x = array![[-2.0], [-1.0], [0.0], [1.0], [2.0]];
        let y = array![-4.0, -2.0, 0.0, 2.0, 4.0];

        let mut light = Lasso::new(0.01);
        light.fit(x.view(), y.view()).expect("fit succeeds");
        let mut heavy = Lasso::new(1.0);
        heavy.fit(x.view(), y.view()).expect("fit succeeds");

        let light_coef = light.coefficients().expect("fitted")[0].abs();
        let heavy_coef = heavy.coefficients().expect("fitted")[0].abs();
        assert!(heavy_coef < light_coef);
        assert!(heavy_coef > 0.0);
    }

    #[test]
    fn test_constant_column_gets_zero_coefficient() {
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = array![0.0, 1.0, 2.0, 3.0];

        let mut lasso = Lasso::new(1e-8);
        lasso.fit(x.view(), y.view()).expect("fit succeeds");
        // Column 0 carries no signal beyond the intercept, which is
        // unpenalized and absorbs it.
        let coefficients = lasso.coefficients().expect("fitted");
        assert!(coefficients[0].abs() < 1e-6);
        assert_abs_diff_eq!(coefficients[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_all_zero_column_is_skipped() {
        let x = array![[0.0, 1.0], [0.0, 2.0], [0.0, 3.0]];
        let y = array![1.0, 2.0, 3.0];

        let mut lasso = Lasso::new(1e-8);
        lasso.fit(x.view(), y.view()).expect("fit succeeds");
        let coefficients = lasso.coefficients().expect("fitted");
        assert_eq!(coefficients[0], 0.0);
        assert!(coefficients.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let x = array![[1.0], [f64::NAN]];
        let y = array![1.0, 2.0];
        let mut lasso = Lasso::new(0.1);
        let err = lasso.fit(x.view(), y.view()).unwrap_err();
        assert!(matches!(err, PipelineError::Fit(_)));
    }

    #[test]
    fn test_negative_alpha_is_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        let mut lasso = Lasso::new(-1.0);
        let err = lasso.fit(x.view(), y.view()).unwrap_err();
        assert!(matches!(err, PipelineError::Fit(_)));
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0];
        let mut lasso = Lasso::new(0.1);
        let err = lasso.fit(x.view(), y.view()).unwrap_err();
        assert!(matches!(err, PipelineError::Fit(_)));
    }

    #[test]
    fn test_predict_before_fit_is_rejected() {
        let lasso = Lasso::default();
        let err = lasso.predict(array![[1.0]].view()).unwrap_err();
        assert!(matches!(err, PipelineError::NotFitted("lasso")));
    }
}
