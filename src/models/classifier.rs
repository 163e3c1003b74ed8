//! Binary click classifiers evaluated natively from the artifact bundle.
//!
//! Feature indices refer to positions in the bundle's `feature_columns`.

use serde::{Deserialize, Serialize};

/// A node of a flattened decision tree.
///
/// Split nodes send a row left when `x[feature] <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Decision tree stored as a node array; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Leaf value reached by `features`.
    ///
    /// Assumes the tree passed [`DecisionTree::validate`]: children always
    /// point forward, so the walk terminates.
    pub fn leaf_value(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("node {} has a non-finite leaf value", idx));
                    }
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} but only {} columns exist",
                            idx, feature, n_features
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", idx));
                    }
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!(
                                "node {} has out-of-order child {}",
                                idx, child
                            ));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn leaves(&self) -> impl Iterator<Item = f64> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            TreeNode::Leaf { value } => Some(*value),
            TreeNode::Split { .. } => None,
        })
    }
}

/// Fitted classifier, tagged by `kind` in the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    /// Leaves hold the positive-class probability; trees are averaged.
    RandomForest { trees: Vec<DecisionTree> },
    /// Leaves hold raw scores added to `init_score` in log-odds space.
    GradientBoosting {
        trees: Vec<DecisionTree>,
        learning_rate: f64,
        #[serde(default)]
        init_score: f64,
    },
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier {
    /// Short name used in logs and the model endpoint.
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::LogisticRegression { .. } => "logistic_regression",
            Classifier::RandomForest { .. } => "random_forest",
            Classifier::GradientBoosting { .. } => "gradient_boosting",
        }
    }

    /// Check the classifier against the number of feature columns.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        match self {
            Classifier::LogisticRegression {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != n_features {
                    return Err(format!(
                        "expected {} coefficients, found {}",
                        n_features,
                        coefficients.len()
                    ));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err("non-finite coefficient".to_string());
                }
            }
            Classifier::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err("random forest has no trees".to_string());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(n_features)
                        .map_err(|e| format!("tree {}: {}", i, e))?;
                    if tree.leaves().any(|v| !(0.0..=1.0).contains(&v)) {
                        return Err(format!("tree {}: leaf probability outside [0, 1]", i));
                    }
                }
            }
            Classifier::GradientBoosting {
                trees,
                learning_rate,
                init_score,
            } => {
                if trees.is_empty() {
                    return Err("gradient boosting has no trees".to_string());
                }
                if !learning_rate.is_finite() || !init_score.is_finite() {
                    return Err("non-finite learning_rate or init_score".to_string());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(n_features)
                        .map_err(|e| format!("tree {}: {}", i, e))?;
                }
            }
        }
        Ok(())
    }

    /// Positive-class probability for one row.
    pub fn positive_probability(&self, features: &[f64]) -> f64 {
        match self {
            Classifier::LogisticRegression {
                coefficients,
                intercept,
            } => {
                let z = coefficients
                    .iter()
                    .zip(features)
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
                    + intercept;
                sigmoid(z)
            }
            Classifier::RandomForest { trees } => {
                let total: f64 = trees.iter().map(|t| t.leaf_value(features)).sum();
                total / trees.len() as f64
            }
            Classifier::GradientBoosting {
                trees,
                learning_rate,
                init_score,
            } => {
                let raw: f64 = trees.iter().map(|t| t.leaf_value(features)).sum();
                sigmoid(init_score + learning_rate * raw)
            }
        }
    }
}
