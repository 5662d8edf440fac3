//! Bagged CART decision trees with Gini splits. Trees are grown on
//! bootstrap samples with a random feature subset per split; the ensemble
//! probability is the mean positive fraction over the reached leaves.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    trees: Vec<Tree>,
    importance: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
enum Node {
    Leaf {
        p: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

impl ForestModel {
    pub fn fit(params: &ForestParams, x: &Array2<f64>, y: &[u8]) -> Self {
        let n = x.nrows();
        let d = x.ncols();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut importance = vec![0.0; d];
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let mut builder = TreeBuilder {
                x,
                y,
                params,
                rng: &mut rng,
                nodes: Vec::new(),
                importance: &mut importance,
                n_root: sample.len() as f64,
            };
            builder.grow(sample, 0);
            trees.push(Tree {
                nodes: builder.nodes,
            });
        }

        let total: f64 = importance.iter().sum();
        if total > 0.0 {
            for v in importance.iter_mut() {
                *v /= total;
            }
        }
        Self { trees, importance }
    }

    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        sum / self.trees.len() as f64
    }

    pub fn feature_importance(&self) -> &[f64] {
        &self.importance
    }
}

impl Tree {
    fn predict(&self, features: &[f64]) -> f64 {
        let mut at = 0usize;
        loop {
            match &self.nodes[at] {
                Node::Leaf { p } => return *p,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = features.get(*feature).copied().unwrap_or(0.0);
                    at = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a [u8],
    params: &'a ForestParams,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
    importance: &'a mut Vec<f64>,
    n_root: f64,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    decrease: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

fn gini(pos: f64, n: f64) -> f64 {
    if n == 0.0 {
        return 0.0;
    }
    let p = pos / n;
    2.0 * p * (1.0 - p)
}

impl TreeBuilder<'_> {
    /// Grow a subtree over `indices`, returning its node id.
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let n = indices.len();
        let pos = indices.iter().filter(|&&i| self.y[i] == 1).count();
        let p = pos as f64 / n as f64;

        let done = depth >= self.params.max_depth
            || n < self.params.min_samples_split
            || pos == 0
            || pos == n;
        let split = if done { None } else { self.best_split(&indices, pos) };

        match split {
            None => {
                self.nodes.push(Node::Leaf { p });
                self.nodes.len() - 1
            }
            Some(best) => {
                self.importance[best.feature] += (n as f64 / self.n_root) * best.decrease;
                let id = self.nodes.len();
                // placeholder; children ids are patched in after recursion
                self.nodes.push(Node::Leaf { p });
                let left = self.grow(best.left, depth + 1);
                let right = self.grow(best.right, depth + 1);
                self.nodes[id] = Node::Split {
                    feature: best.feature,
                    threshold: best.threshold,
                    left,
                    right,
                };
                id
            }
        }
    }

    fn best_split(&mut self, indices: &[usize], pos: usize) -> Option<BestSplit> {
        let n = indices.len() as f64;
        let parent = gini(pos as f64, n);
        let d = self.x.ncols();
        let k = ((d as f64).sqrt().round() as usize).max(1);
        let features: Vec<usize> = (0..d).collect();
        let subset: Vec<usize> = features
            .choose_multiple(self.rng, k.min(d))
            .copied()
            .collect();

        let min_leaf = self.params.min_samples_leaf;
        let mut best: Option<BestSplit> = None;

        for feature in subset {
            let mut cells: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (self.x[[i, feature]], i))
                .collect();
            cells.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left_pos = 0usize;
            for cut in 0..cells.len() - 1 {
                if self.y[cells[cut].1] == 1 {
                    left_pos += 1;
                }
                if cells[cut].0 == cells[cut + 1].0 {
                    continue;
                }
                let nl = cut + 1;
                let nr = cells.len() - nl;
                if nl < min_leaf || nr < min_leaf {
                    continue;
                }
                let right_pos = pos - left_pos;
                let decrease = parent
                    - (nl as f64 * gini(left_pos as f64, nl as f64)
                        + nr as f64 * gini(right_pos as f64, nr as f64))
                        / n;
                if decrease <= 1e-12 {
                    continue;
                }
                if best.as_ref().map_or(true, |b| decrease > b.decrease) {
                    let threshold = (cells[cut].0 + cells[cut + 1].0) / 2.0;
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        decrease,
                        left: cells[..nl].iter().map(|c| c.1).collect(),
                        right: cells[nl..].iter().map(|c| c.1).collect(),
                    });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Array2<f64>, Vec<u8>) {
        // feature 0 separates the classes; feature 1 is noise
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            rows.extend_from_slice(&[sign * (1.0 + (i % 5) as f64), (i % 3) as f64]);
            labels.push((sign > 0.0) as u8);
        }
        (Array2::from_shape_vec((40, 2), rows).unwrap(), labels)
    }

    fn small_params() -> ForestParams {
        ForestParams {
            n_trees: 25,
            max_depth: 5,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }

    #[test]
    fn forest_separates_classes() {
        let (x, y) = separable();
        let model = ForestModel::fit(&small_params(), &x, &y);
        assert!(model.predict_proba(&[3.0, 1.0]) > 0.8);
        assert!(model.predict_proba(&[-3.0, 1.0]) < 0.2);
    }

    #[test]
    fn fitting_is_deterministic_for_a_seed() {
        let (x, y) = separable();
        let a = ForestModel::fit(&small_params(), &x, &y);
        let b = ForestModel::fit(&small_params(), &x, &y);
        assert_eq!(a.predict_proba(&[0.7, 2.0]), b.predict_proba(&[0.7, 2.0]));
        assert_eq!(a.feature_importance(), b.feature_importance());
    }

    #[test]
    fn importance_ranks_the_signal_feature_first() {
        let (x, y) = separable();
        let model = ForestModel::fit(&small_params(), &x, &y);
        let imp = model.feature_importance();
        assert!(imp[0] > imp[1]);
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
