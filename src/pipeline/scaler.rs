//! Feature standardization stage.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::{PipelineError, Result};

/// Standardizes each feature column to zero mean and unit variance.
///
/// Statistics are estimated only from the data passed to [`fit`]; applying
/// the transform to unseen data reuses them unchanged.
///
/// [`fit`]: StandardScaler::fit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    /// Column means from the last fit.
    #[must_use]
    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    /// Column scales from the last fit.
    #[must_use]
    pub fn scale(&self) -> Option<&Array1<f64>> {
        self.scale.as_ref()
    }

    /// Estimate per-column mean and standard deviation.
    pub fn fit(&mut self, x: ArrayView2<'_, f64>) {
        let mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(x.ncols()));
        let mut scale = x.std_axis(Axis(0), 0.0);
        // Constant columns scale by 1 so the transform stays finite.
        scale.mapv_inplace(|s| if s == 0.0 { 1.0 } else { s });
        self.mean = Some(mean);
        self.scale = Some(scale);
    }

    /// Apply the fitted statistics to `x`.
    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(mean), Some(scale)) => (mean, scale),
            _ => return Err(PipelineError::NotFitted("standard_scaler")),
        };
        Ok((&x - mean) / scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_fit_transform_standardizes_columns() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(x.view());
        let out = scaler.transform(x.view()).expect("fitted");

        for j in 0..2 {
            let col = out.column(j);
            assert_abs_diff_eq!(col.mean().unwrap(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(col.std(0.0), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_statistics_come_from_fit_data_only() {
        let train = array![[0.0], [2.0]];
        let test = array![[4.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(train.view());
        let out = scaler.transform(test.view()).expect("fitted");
        // mean 1, std 1, so 4 maps to 3.
        assert_abs_diff_eq!(out[[0, 0]], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_scales_by_one() {
        let x = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(x.view());
        let out = scaler.transform(x.view()).expect("fitted");
        assert!(out.column(0).iter().all(|&v| v == 0.0));
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_transform_before_fit_is_rejected() {
        let scaler = StandardScaler::new();
        let err = scaler.transform(array![[1.0]].view()).unwrap_err();
        assert!(matches!(err, PipelineError::NotFitted("standard_scaler")));
    }
}
