//! Model input/output schema inference.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::data::FeatureMatrix;

/// A single named column in a signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub dtype: String,
}

/// Input/output schema registered alongside a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSignature {
    pub inputs: Vec<ColumnSpec>,
    pub outputs: Vec<ColumnSpec>,
}

/// Infer a signature from the training features and their predictions.
///
/// Inputs are one double column per feature; the output is the single
/// prediction column.
#[must_use]
pub fn infer_signature(x: &FeatureMatrix, predictions: ArrayView1<'_, f64>) -> ModelSignature {
    debug_assert_eq!(x.len(), predictions.len(), "one prediction per row");
    ModelSignature {
        inputs: x
            .columns()
            .iter()
            .map(|name| ColumnSpec {
                name: name.clone(),
                dtype: "double".to_string(),
            })
            .collect(),
        outputs: vec![ColumnSpec {
            name: "prediction".to_string(),
            dtype: "double".to_string(),
        }],
    }
}
