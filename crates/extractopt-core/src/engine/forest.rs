//! Bagged regression trees.
//!
//! Each tree is a CART regressor grown on a bootstrap resample of the training
//! table with the squared-error criterion. Every feature is considered at every
//! split, in column order, and a candidate only replaces the current best split
//! when it is strictly better, so ties resolve to the lowest feature index and
//! the lowest threshold. Thresholds are midpoints between adjacent distinct
//! values. The ensemble predicts the mean of its trees.

use super::config::ForestParams;
use super::error::EngineError;
use super::features::{FeatureTable, FeatureVector, N_FEATURES};
use super::progress::{Progress, ProgressReporter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

/// Anything that maps a feature vector to a predicted yield.
pub trait YieldModel {
    fn predict(&self, features: &FeatureVector) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct TreeLimits {
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

impl From<&ForestParams> for TreeLimits {
    fn from(params: &ForestParams) -> Self {
        Self {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// Sum over both children of `sum^2 / n`; maximizing it minimizes squared error.
    score: f64,
    /// Number of sorted samples that go left.
    left_len: usize,
}

/// A single regression tree stored as a node arena; index 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grows a tree on the rows listed in `sample`. Repeated indices weight a row
    /// by its multiplicity.
    fn fit(x: &[FeatureVector], y: &[f64], sample: Vec<usize>, limits: TreeLimits) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, sample, 0, limits);
        tree
    }

    fn grow(
        &mut self,
        x: &[FeatureVector],
        y: &[f64],
        mut sample: Vec<usize>,
        depth: usize,
        limits: TreeLimits,
    ) -> usize {
        let id = self.nodes.len();
        let value = mean(sample.iter().map(|&i| y[i]));
        self.nodes.push(Node::Leaf { value });

        let pure = sample.windows(2).all(|w| y[w[0]] == y[w[1]]);
        let depth_reached = limits.max_depth.is_some_and(|max| depth >= max);
        if pure || depth_reached || sample.len() < limits.min_samples_split {
            return id;
        }

        let Some(split) = best_split(x, y, &mut sample, limits.min_samples_leaf) else {
            return id;
        };

        sample.sort_by(|&a, &b| x[a].get(split.feature).total_cmp(&x[b].get(split.feature)));
        let right_sample = sample.split_off(split.left_len);
        let left = self.grow(x, y, sample, depth + 1, limits);
        let right = self.grow(x, y, right_sample, depth + 1, limits);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features.get(feature) <= threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Scans every feature for the threshold that minimizes the children's squared
/// error. `sample` is reordered in place.
fn best_split(
    x: &[FeatureVector],
    y: &[f64],
    sample: &mut [usize],
    min_samples_leaf: usize,
) -> Option<SplitCandidate> {
    let n = sample.len();
    let total: f64 = sample.iter().map(|&i| y[i]).sum();
    let mut best: Option<SplitCandidate> = None;

    for feature in 0..N_FEATURES {
        sample.sort_by(|&a, &b| x[a].get(feature).total_cmp(&x[b].get(feature)));

        let mut left_sum = 0.0;
        for pos in 1..n {
            left_sum += y[sample[pos - 1]];
            let lo = x[sample[pos - 1]].get(feature);
            let hi = x[sample[pos]].get(feature);
            if lo == hi || pos < min_samples_leaf || n - pos < min_samples_leaf {
                continue;
            }

            let right_sum = total - left_sum;
            let score = left_sum * left_sum / pos as f64 + right_sum * right_sum / (n - pos) as f64;
            if best.is_none_or(|b| score > b.score) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    score,
                    left_len: pos,
                });
            }
        }
    }
    best
}

/// Averaging ensemble of regression trees trained on bootstrap resamples.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    training_rows: usize,
}

impl RandomForest {
    /// Trains the ensemble once. Identical inputs and parameters always produce
    /// identical trees.
    #[instrument(skip_all, name = "forest_fit", fields(trees = params.n_estimators, rows = table.len()))]
    pub fn fit(
        table: &FeatureTable,
        params: &ForestParams,
        reporter: &ProgressReporter,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        if table.is_empty() {
            return Err(EngineError::EmptyTrainingSet {
                total: 0,
                dropped: 0,
            });
        }

        let x = table.features();
        let y = table.targets();
        let n = x.len();
        let limits = TreeLimits::from(params);
        let mut rng = StdRng::seed_from_u64(params.seed);

        reporter.report(Progress::TaskStart {
            total_steps: params.n_estimators as u64,
        });
        let mut trees = Vec::with_capacity(params.n_estimators);
        for _ in 0..params.n_estimators {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            trees.push(RegressionTree::fit(&x, &y, sample, limits));
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);

        let forest = Self {
            trees,
            training_rows: n,
        };
        debug!(
            mean_leaves = forest.trees.iter().map(|t| t.leaf_count()).sum::<usize>() as f64
                / forest.trees.len() as f64,
            "Ensemble grown."
        );
        info!(trees = forest.trees.len(), rows = n, "Yield model trained.");
        Ok(forest)
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn training_rows(&self) -> usize {
        self.training_rows
    }
}

impl YieldModel for RandomForest {
    fn predict(&self, features: &FeatureVector) -> f64 {
        mean(self.trees.iter().map(|t| t.predict(features)))
    }
}
