//! Evaluation metrics for regression.

use ndarray::ArrayView1;

/// Trait for evaluation metrics
pub trait Metric {
    /// Compute the metric given predictions and targets
    fn compute(&self, predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64;

    /// Name of the metric
    fn name(&self) -> &'static str;

    /// Whether higher values are better (true) or lower (false)
    fn higher_is_better(&self) -> bool {
        true
    }
}

/// R² (coefficient of determination).
///
/// R² = 1 - SS_res / SS_tot
///
/// Where:
/// - SS_res = sum((y - y_pred)²)
/// - SS_tot = sum((y - y_mean)²)
///
/// R² = 1.0 is perfect prediction, 0.0 means predicting the mean. For
/// constant targets (SS_tot = 0) the score is 1.0 when the prediction is
/// also exact and 0.0 otherwise.
pub fn r_squared(predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
    assert_eq!(predictions.len(), targets.len());
    if targets.is_empty() {
        return 0.0;
    }

    let mean = targets.mean().unwrap_or(0.0);
    let ss_res: f64 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(&p, &t)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = targets.iter().map(|&t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Mean absolute error.
pub fn mae(predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
    assert_eq!(predictions.len(), targets.len());
    if targets.is_empty() {
        return 0.0;
    }
    predictions
        .iter()
        .zip(targets.iter())
        .map(|(&p, &t)| (t - p).abs())
        .sum::<f64>()
        / targets.len() as f64
}

/// Root mean squared error.
pub fn rmse(predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
    assert_eq!(predictions.len(), targets.len());
    if targets.is_empty() {
        return 0.0;
    }
    let mse = predictions
        .iter()
        .zip(targets.iter())
        .map(|(&p, &t)| (t - p).powi(2))
        .sum::<f64>()
        / targets.len() as f64;
    mse.sqrt()
}

/// R² metric for grid-search scoring
#[derive(Debug, Clone, Copy, Default)]
pub struct R2Score;

impl Metric for R2Score {
    fn compute(&self, predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
        r_squared(predictions, targets)
    }

    fn name(&self) -> &'static str {
        "R²"
    }
}

/// Mean absolute error metric
#[derive(Debug, Clone, Copy, Default)]
pub struct MAE;

impl Metric for MAE {
    fn compute(&self, predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
        mae(predictions, targets)
    }

    fn name(&self) -> &'static str {
        "MAE"
    }

    fn higher_is_better(&self) -> bool {
        false
    }
}

/// Root mean squared error metric
#[derive(Debug, Clone, Copy, Default)]
pub struct RMSE;

impl Metric for RMSE {
    fn compute(&self, predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
        rmse(predictions, targets)
    }

    fn name(&self) -> &'static str {
        "RMSE"
    }

    fn higher_is_better(&self) -> bool {
        false
    }
}
