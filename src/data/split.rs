//! Deterministic train/test partitioning.

use ndarray::{Array1, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::FeatureMatrix;

/// Fraction of rows held out for the test partition.
pub const TEST_FRACTION: f64 = 0.2;

/// Fixed shuffle seed; the partition is byte-identical across runs on the
/// same input.
pub const SPLIT_SEED: u64 = 3;

/// Shuffled row indices partitioned into (train, test).
///
/// The test partition takes the integer nearest to `test_fraction * n`.
pub(crate) fn split_indices(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_fraction).round() as usize;
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    (train, test)
}

/// Split features and target into train/test subsets with the fixed seed
/// and ratio. The same permutation is applied to matrix and vector, so rows
/// never reorder independently.
#[must_use]
pub fn train_test_split(
    x: &FeatureMatrix,
    y: &Array1<f64>,
) -> (FeatureMatrix, FeatureMatrix, Array1<f64>, Array1<f64>) {
    debug_assert_eq!(x.len(), y.len(), "features and target must be row-aligned");
    let (train_idx, test_idx) = split_indices(x.len(), TEST_FRACTION, SPLIT_SEED);
    (
        x.take_rows(&train_idx),
        x.take_rows(&test_idx),
        y.select(Axis(0), &train_idx),
        y.select(Axis(0), &test_idx),
    )
}
