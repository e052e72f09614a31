//! Housing dataset: loading, schema enforcement, and partitioning.
//!
//! The source relation is `housing_prices`: a primary key column `id` plus
//! ten numeric/boolean feature fields and the numeric target `price`.
//! [`load_data`] materializes it into a [`Dataset`]; [`preprocess`] separates
//! features from the target, applies the canonical feature schema, and
//! produces the fixed deterministic train/test partitions.

mod loader;
mod preprocess;
mod split;

pub use loader::{load_data, load_data_from, DataError, DB_URI_VAR};
pub use preprocess::{preprocess, SchemaError, SplitSets, CANONICAL_FEATURES, TARGET_COLUMN};
pub use split::{train_test_split, SPLIT_SEED, TEST_FRACTION};

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// A labeled table of housing records, one row per property, indexed by the
/// source relation's primary key.
#[derive(Debug, Clone)]
pub struct Dataset {
    ids: Vec<i64>,
    columns: Vec<String>,
    data: Array2<f64>,
}

impl Dataset {
    /// Build a dataset from its parts.
    ///
    /// # Panics
    ///
    /// Panics if `ids` does not match the row count or `columns` does not
    /// match the column count of `data`.
    pub fn new(ids: Vec<i64>, columns: Vec<String>, data: Array2<f64>) -> Self {
        assert_eq!(ids.len(), data.nrows(), "one id per row");
        assert_eq!(columns.len(), data.ncols(), "one name per column");
        Self { ids, columns, data }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Data column names in source order (the index column is not part of
    /// the data).
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Primary key values, row-aligned with the data.
    #[must_use]
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    #[must_use]
    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Position of a named column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// View of a named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name).map(|i| self.data.column(i))
    }
}

/// A feature matrix with named columns.
///
/// Rows stay aligned with the target vector through every transformation;
/// subsetting goes through [`FeatureMatrix::take_rows`] so a row permutation
/// can never be applied to the matrix alone.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// # Panics
    ///
    /// Panics if `columns` does not match the column count of `values`.
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Self {
        assert_eq!(columns.len(), values.ncols(), "one name per column");
        Self { columns, values }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// New matrix holding the given rows, in the given order.
    #[must_use]
    pub fn take_rows(&self, indices: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), indices),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_dataset_accessors() {
        let ds = Dataset::new(
            vec![1, 2],
            vec!["a".into(), "price".into()],
            array![[1.0, 10.0], [2.0, 20.0]],
        );
        assert_eq!(ds.len(), 2);
        assert!(!ds.is_empty());
        assert_eq!(ds.column_index("price"), Some(1));
        assert_eq!(ds.column_index("missing"), None);
        assert_eq!(ds.column("a").map(|c| c.to_vec()), Some(vec![1.0, 2.0]));
        assert_eq!(ds.ids(), &[1, 2]);
    }

    #[test]
    #[should_panic(expected = "one id per row")]
    fn test_dataset_shape_mismatch_panics() {
        Dataset::new(vec![1], vec!["a".into()], array![[1.0], [2.0]]);
    }

    #[test]
    fn test_feature_matrix_take_rows() {
        let fm = FeatureMatrix::new(
            vec!["a".into(), "b".into()],
            array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
        );
        let sub = fm.take_rows(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.values(), array![[5.0, 6.0], [1.0, 2.0]].view());
        assert_eq!(sub.columns(), fm.columns());
    }
}
