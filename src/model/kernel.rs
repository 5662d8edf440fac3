//! Kernel-based strategy: an RBF-kernel scorer over a bounded anchor set,
//! trained on logistic loss by full-batch gradient descent. Probabilities
//! come straight from the calibrated decision function.

use super::sigmoid;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelParams {
    /// RBF width; `None` derives 1 / (n_features * var(X)) at fit time.
    pub gamma: Option<f64>,
    pub l2: f64,
    pub epochs: usize,
    pub learning_rate: f64,
    /// Upper bound on the anchor set, which also bounds the artifact size.
    pub max_anchors: usize,
    pub seed: u64,
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            gamma: None,
            l2: 1e-3,
            epochs: 300,
            learning_rate: 0.5,
            max_anchors: 256,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelModel {
    anchors: Vec<Vec<f64>>,
    coefficients: Vec<f64>,
    intercept: f64,
    gamma: f64,
}

fn rbf(gamma: f64, a: &[f64], b: &[f64]) -> f64 {
    let sq: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    (-gamma * sq).exp()
}

impl KernelModel {
    pub fn fit(params: &KernelParams, x: &Array2<f64>, y: &[u8]) -> Self {
        let n = x.nrows();
        let d = x.ncols();

        let gamma = params.gamma.unwrap_or_else(|| {
            let mean = x.sum() / (n * d) as f64;
            let var = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n * d) as f64;
            if var > 0.0 {
                1.0 / (d as f64 * var)
            } else {
                1.0 / d as f64
            }
        });

        let mut idx: Vec<usize> = (0..n).collect();
        if n > params.max_anchors {
            let mut rng = StdRng::seed_from_u64(params.seed);
            idx.shuffle(&mut rng);
            idx.truncate(params.max_anchors);
            idx.sort_unstable();
        }
        let anchors: Vec<Vec<f64>> = idx.iter().map(|&i| x.row(i).to_vec()).collect();
        let m = anchors.len();

        // kernel matrix: every training row against every anchor
        let mut k = Array2::<f64>::zeros((n, m));
        for i in 0..n {
            let row = x.row(i);
            let row = row.as_slice().unwrap_or(&[]);
            for (j, anchor) in anchors.iter().enumerate() {
                k[[i, j]] = rbf(gamma, row, anchor);
            }
        }

        let targets: Array1<f64> = y.iter().map(|&l| l as f64).collect();
        let mut coef = Array1::<f64>::zeros(m);
        let mut intercept = 0.0f64;
        for _ in 0..params.epochs {
            let z = k.dot(&coef) + intercept;
            let p = z.mapv(sigmoid);
            let residual = &p - &targets;
            let grad = k.t().dot(&residual) / n as f64 + params.l2 * &coef;
            let grad_b = residual.sum() / n as f64;
            coef = coef - params.learning_rate * &grad;
            intercept -= params.learning_rate * grad_b;
        }

        Self {
            anchors,
            coefficients: coef.to_vec(),
            intercept,
            gamma,
        }
    }

    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        let z: f64 = self
            .anchors
            .iter()
            .zip(self.coefficients.iter())
            .map(|(anchor, c)| c * rbf(self.gamma, features, anchor))
            .sum::<f64>()
            + self.intercept;
        sigmoid(z)
    }
}
