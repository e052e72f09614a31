//! Hyperparameter grid definition and enumeration.

use std::collections::BTreeMap;

/// Explicit mapping from hyperparameter name to candidate values.
///
/// Enumeration order is stable: parameter names iterate lexicographically
/// and candidates keep their insertion order, so repeated searches walk the
/// grid identically.
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    params: BTreeMap<String, Vec<f64>>,
}

impl ParamGrid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter with its candidate values.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        self.params.insert(name.into(), values.into_iter().collect());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of parameters in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Parameter names in iteration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Candidate values for a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.params.get(name).map(Vec::as_slice)
    }

    /// All grid configurations, the cartesian product of the candidate
    /// lists in stable order.
    #[must_use]
    pub fn candidates(&self) -> Vec<BTreeMap<String, f64>> {
        let entries: Vec<(&str, &[f64])> = self
            .params
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
            .collect();
        cartesian(&entries)
    }
}

fn cartesian(entries: &[(&str, &[f64])]) -> Vec<BTreeMap<String, f64>> {
    let Some((&(name, values), rest)) = entries.split_first() else {
        return vec![BTreeMap::new()];
    };
    let rest_configs = cartesian(rest);

    let mut configs = Vec::with_capacity(values.len() * rest_configs.len());
    for &value in values {
        for config in &rest_configs {
            let mut config = config.clone();
            config.insert(name.to_string(), value);
            configs.push(config);
        }
    }
    configs
}
