//! Classification strategies behind a single fitted-model surface.
//!
//! The preprocessing pipeline is strategy-agnostic: every strategy consumes
//! the same fixed-order feature matrix, and every fitted form scores
//! natively from its own serialized parameters.

mod forest;
mod kernel;
mod logistic;

pub use forest::{ForestModel, ForestParams};
pub use kernel::{KernelModel, KernelParams};
pub use logistic::{LogisticModel, LogisticParams};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which strategy the trainer fits, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[serde(alias = "random_forest")]
    Forest,
    #[serde(alias = "logistic_regression")]
    Logistic,
    #[serde(alias = "kernel")]
    Svm,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Forest => "forest",
            ModelKind::Logistic => "logistic",
            ModelKind::Svm => "svm",
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model fitting failed: {0}")]
    Fit(String),
    #[error("training set must contain both classes")]
    SingleClass,
}

/// A fitted classifier: maps one feature vector to a probability in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedModel {
    Forest(ForestModel),
    Logistic(LogisticModel),
    Svm(KernelModel),
}

impl FittedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            FittedModel::Forest(_) => ModelKind::Forest,
            FittedModel::Logistic(_) => ModelKind::Logistic,
            FittedModel::Svm(_) => ModelKind::Svm,
        }
    }

    /// Probability of the positive class for one feature vector.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        match self {
            FittedModel::Forest(m) => m.predict_proba(features),
            FittedModel::Logistic(m) => m.predict_proba(features),
            FittedModel::Svm(m) => m.predict_proba(features),
        }
    }

    /// Per-feature importance where the strategy exposes one, normalized to
    /// sum to 1. Kernel models have no per-feature decomposition.
    pub fn feature_importance(&self) -> Option<Vec<f64>> {
        match self {
            FittedModel::Forest(m) => Some(m.feature_importance().to_vec()),
            FittedModel::Logistic(m) => Some(m.feature_importance()),
            FittedModel::Svm(_) => None,
        }
    }
}

/// Fit the configured strategy against a training matrix and 0/1 labels.
pub fn fit(
    kind: ModelKind,
    forest: &ForestParams,
    logistic: &LogisticParams,
    svm: &KernelParams,
    x: &Array2<f64>,
    y: &[u8],
) -> Result<FittedModel, ModelError> {
    let positives = y.iter().filter(|&&l| l == 1).count();
    if positives == 0 || positives == y.len() {
        return Err(ModelError::SingleClass);
    }
    match kind {
        ModelKind::Forest => Ok(FittedModel::Forest(ForestModel::fit(forest, x, y))),
        ModelKind::Logistic => Ok(FittedModel::Logistic(LogisticModel::fit(logistic, x, y)?)),
        ModelKind::Svm => Ok(FittedModel::Svm(KernelModel::fit(svm, x, y))),
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_deserializes_original_config_names() {
        let k: ModelKind = serde_json::from_str("\"random_forest\"").unwrap();
        assert_eq!(k, ModelKind::Forest);
        let k: ModelKind = serde_json::from_str("\"logistic_regression\"").unwrap();
        assert_eq!(k, ModelKind::Logistic);
        let k: ModelKind = serde_json::from_str("\"svm\"").unwrap();
        assert_eq!(k, ModelKind::Svm);
    }

    #[test]
    fn single_class_training_is_rejected() {
        let x = Array2::zeros((4, 2));
        let y = vec![0u8; 4];
        let err = fit(
            ModelKind::Forest,
            &ForestParams::default(),
            &LogisticParams::default(),
            &KernelParams::default(),
            &x,
            &y,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::SingleClass));
    }
}
