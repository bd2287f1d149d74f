use serde::{Deserialize, Serialize};

use super::{check_threshold, default_threshold, verdict_for, Classifier, ModelError, Verdict};
use crate::scoring::features::FeatureVector;

/// Node of a flattened decision tree. Node 0 is the root; children always sit
/// at higher indices than their parent.
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn validate(&self, tree: usize, width: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Invalid(format!("tree {tree} has no nodes")));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= width {
                        return Err(ModelError::Invalid(format!(
                            "tree {tree} node {index} splits on feature {feature} of {width}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::Invalid(format!(
                            "tree {tree} node {index} has a non-finite threshold"
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(ModelError::Invalid(format!(
                                "tree {tree} node {index} points at invalid child {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !(0.0..=1.0).contains(value) {
                        return Err(ModelError::Invalid(format!(
                            "tree {tree} leaf {index} probability {value} outside [0, 1]"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Positive-class probability at the leaf reached by `features`. The walk
    /// only moves to higher node indices, so it terminates on any node list.
    pub fn leaf_value(&self, features: &[f64]) -> Result<f64, ModelError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                None => {
                    return Err(ModelError::Invalid(format!(
                        "tree walk reached missing node {index}"
                    )))
                }
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).ok_or_else(|| {
                        ModelError::Invalid(format!(
                            "node {index} splits on feature {feature} of {}",
                            features.len()
                        ))
                    })?;
                    let next = if *value <= *threshold { *left } else { *right };
                    if next <= index {
                        return Err(ModelError::Invalid(format!(
                            "node {index} points back at node {next}"
                        )));
                    }
                    index = next;
                }
            }
        }
    }
}

/// Bagged trees whose leaf probabilities are averaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub trees: Vec<DecisionTree>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl TreeEnsemble {
    pub fn validate(&self, width: usize) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("ensemble has no trees".to_string()));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(index, width)?;
        }
        check_threshold(self.threshold)
    }

    pub fn probability(&self, features: &[f64]) -> Result<f64, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("ensemble has no trees".to_string()));
        }
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.leaf_value(features)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}

impl Classifier for TreeEnsemble {
    fn kind(&self) -> &'static str {
        "tree_ensemble"
    }

    fn predict(&self, features: &FeatureVector) -> Result<Verdict, ModelError> {
        verdict_for(self.probability(features.as_slice())?, self.threshold)
    }
}
