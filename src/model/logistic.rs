//! Logistic regression: fitted with `linfa-logistic`, persisted as raw
//! coefficients, scored with a native sigmoid so serving carries no
//! training machinery.

use super::{sigmoid, ModelError};
use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticParams {
    pub max_iterations: u64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    weights: Vec<f64>,
    intercept: f64,
}

impl LogisticModel {
    pub fn fit(params: &LogisticParams, x: &Array2<f64>, y: &[u8]) -> Result<Self, ModelError> {
        let targets: Array1<i32> = y.iter().map(|&l| l as i32).collect();
        let dataset = Dataset::new(x.clone(), targets);
        let fitted = LogisticRegression::default()
            .max_iterations(params.max_iterations)
            .fit(&dataset)
            .map_err(|e| ModelError::Fit(e.to_string()))?;

        let mut model = Self {
            weights: fitted.params().to_vec(),
            intercept: fitted.intercept(),
        };

        // Orient the decision function so sigmoid output is P(label = 1).
        let mut pos_sum = 0.0;
        let mut neg_sum = 0.0;
        let (mut pos_n, mut neg_n) = (0.0, 0.0);
        for (row, &label) in x.rows().into_iter().zip(y.iter()) {
            let z = model.decision(row.as_slice().unwrap_or(&[]));
            if label == 1 {
                pos_sum += z;
                pos_n += 1.0;
            } else {
                neg_sum += z;
                neg_n += 1.0;
            }
        }
        if pos_n > 0.0 && neg_n > 0.0 && pos_sum / pos_n < neg_sum / neg_n {
            for w in model.weights.iter_mut() {
                *w = -*w;
            }
            model.intercept = -model.intercept;
        }
        Ok(model)
    }

    fn decision(&self, features: &[f64]) -> f64 {
        let dot: f64 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(w, v)| w * v)
            .sum();
        self.intercept + dot
    }

    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.decision(features))
    }

    /// |coefficient| normalized to sum to 1.
    pub fn feature_importance(&self) -> Vec<f64> {
        let total: f64 = self.weights.iter().map(|w| w.abs()).sum();
        if total == 0.0 {
            return vec![0.0; self.weights.len()];
        }
        self.weights.iter().map(|w| w.abs() / total).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_separates_classes() {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..60 {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            rows.extend_from_slice(&[sign * (0.5 + (i % 7) as f64 * 0.3), 0.1 * (i % 3) as f64]);
            labels.push((sign > 0.0) as u8);
        }
        let x = Array2::from_shape_vec((60, 2), rows).unwrap();
        let model = LogisticModel::fit(&LogisticParams::default(), &x, &labels).unwrap();
        assert!(model.predict_proba(&[2.0, 0.0]) > 0.5);
        assert!(model.predict_proba(&[-2.0, 0.0]) < 0.5);
    }

    #[test]
    fn probabilities_stay_in_range() {
        let model = LogisticModel {
            weights: vec![10.0, -3.0],
            intercept: 1.0,
        };
        for v in [-100.0, -1.0, 0.0, 1.0, 100.0] {
            let p = model.predict_proba(&[v, v]);
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
