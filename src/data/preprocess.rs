//! Feature/target separation and canonical renaming.

use ndarray::{Array1, Axis};
use thiserror::Error;

use super::{train_test_split, Dataset, FeatureMatrix};

/// Name of the target column in the source relation.
pub const TARGET_COLUMN: &str = "price";

/// Canonical feature schema, applied positionally after the target column
/// is dropped. The count is validated first so a source-schema drift fails
/// loudly instead of mislabeling columns.
pub const CANONICAL_FEATURES: [&str; 10] = [
    "square_feet",
    "num_bedrooms",
    "num_bathrooms",
    "num_floors",
    "year_built",
    "has_garden",
    "has_pool",
    "garage_size",
    "location_score",
    "distance_to_center",
];

/// Errors from schema enforcement
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("target column '{0}' not found in dataset")]
    MissingTarget(String),

    #[error("expected {expected} feature columns, found {actual}")]
    ColumnCount { expected: usize, actual: usize },
}

/// Train/test partitions produced by [`preprocess`].
#[derive(Debug, Clone)]
pub struct SplitSets {
    pub x_train: FeatureMatrix,
    pub x_test: FeatureMatrix,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Separate features from the target, rename to the canonical schema, and
/// partition into the fixed 80/20 train/test split.
pub fn preprocess(dataset: &Dataset) -> Result<SplitSets, SchemaError> {
    let target_idx = dataset
        .column_index(TARGET_COLUMN)
        .ok_or_else(|| SchemaError::MissingTarget(TARGET_COLUMN.to_string()))?;

    let n_features = dataset.columns().len() - 1;
    if n_features != CANONICAL_FEATURES.len() {
        return Err(SchemaError::ColumnCount {
            expected: CANONICAL_FEATURES.len(),
            actual: n_features,
        });
    }

    let feature_idx: Vec<usize> = (0..dataset.columns().len())
        .filter(|&i| i != target_idx)
        .collect();
    let x = FeatureMatrix::new(
        CANONICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
        dataset.data().select(Axis(1), &feature_idx),
    );
    let y = dataset.data().column(target_idx).to_owned();

    let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y);
    Ok(SplitSets {
        x_train,
        x_test,
        y_train,
        y_test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn housing_dataset(n: usize) -> Dataset {
        let mut columns: Vec<String> = (1..=10).map(|i| format!("c{i}")).collect();
        columns.push(TARGET_COLUMN.to_string());
        let data = Array2::from_shape_fn((n, 11), |(i, j)| (i * 11 + j) as f64);
        Dataset::new((0..n as i64).collect(), columns, data)
    }

    #[test]
    fn test_preprocess_missing_target_is_schema_error() {
        let ds = Dataset::new(
            vec![0, 1],
            (1..=11).map(|i| format!("c{i}")).collect(),
            Array2::zeros((2, 11)),
        );
        let err = preprocess(&ds).unwrap_err();
        assert!(matches!(err, SchemaError::MissingTarget(_)));
    }

    #[test]
    fn test_preprocess_wrong_feature_count() {
        let ds = Dataset::new(
            vec![0, 1],
            vec!["a".into(), "b".into(), TARGET_COLUMN.into()],
            Array2::zeros((2, 3)),
        );
        let err = preprocess(&ds).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::ColumnCount {
                expected: 10,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_preprocess_renames_positionally() {
        let split = preprocess(&housing_dataset(20)).expect("schema is valid");
        let expected: Vec<String> = CANONICAL_FEATURES.iter().map(|s| s.to_string()).collect();
        assert_eq!(split.x_train.columns(), expected.as_slice());
        assert_eq!(split.x_test.columns(), expected.as_slice());
    }

    #[test]
    fn test_preprocess_partition_sizes() {
        let n = 100;
        let split = preprocess(&housing_dataset(n)).expect("schema is valid");
        assert_eq!(split.x_train.len() + split.x_test.len(), n);
        assert_eq!(split.x_train.len(), split.y_train.len());
        assert_eq!(split.x_test.len(), split.y_test.len());
        assert_eq!(split.x_test.len(), 20);
    }

    #[test]
    fn test_preprocess_rows_stay_aligned() {
        // Row i has features i*11 + 0..=9 and target i*11 + 10, so every
        // feature row determines its target.
        let split = preprocess(&housing_dataset(25)).expect("schema is valid");
        for (row, &target) in split
            .x_train
            .values()
            .rows()
            .into_iter()
            .zip(split.y_train.iter())
        {
            assert_eq!(row[0] + 10.0, target);
        }
        for (row, &target) in split
            .x_test
            .values()
            .rows()
            .into_iter()
            .zip(split.y_test.iter())
        {
            assert_eq!(row[0] + 10.0, target);
        }
    }

    #[test]
    fn test_preprocess_is_deterministic() {
        let ds = housing_dataset(40);
        let a = preprocess(&ds).expect("schema is valid");
        let b = preprocess(&ds).expect("schema is valid");
        assert_eq!(a.x_train.values(), b.x_train.values());
        assert_eq!(a.y_test, b.y_test);
    }

    #[test]
    fn test_preprocess_target_position_does_not_matter() {
        // Target first instead of last; remaining columns still rename in
        // positional order.
        let mut columns = vec![TARGET_COLUMN.to_string()];
        columns.extend((1..=10).map(|i| format!("c{i}")));
        let data = Array2::from_shape_fn((10, 11), |(i, j)| (i * 11 + j) as f64);
        let ds = Dataset::new((0..10).collect(), columns, data);

        let split = preprocess(&ds).expect("schema is valid");
        assert_eq!(split.x_train.columns()[0], "square_feet");
        // Feature rows now start one column after the target.
        for (row, &target) in split
            .x_train
            .values()
            .rows()
            .into_iter()
            .zip(split.y_train.iter())
        {
            assert_eq!(row[0] - 1.0, target);
        }
    }
}
