//! Weighted criteria tree and score propagation.

use std::collections::HashMap;

use super::AhpError;

/// One node in the criteria hierarchy.
///
/// Internal nodes carry the priority weight their parent's criterion
/// matrix assigned them; leaves additionally name a comparison matrix
/// that scores the alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaNode {
    /// Criterion name; for leaves, also the comparison-matrix key.
    pub name: String,
    /// Weight relative to siblings, in `(0, 1]`. The root carries 1.
    pub weight: f64,
    /// Sub-criteria; empty for leaves.
    pub children: Vec<CriteriaNode>,
}

impl CriteriaNode {
    /// Build a leaf node.
    pub fn leaf(name: &str, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            weight,
            children: Vec::new(),
        }
    }

    /// Whether this node has no sub-criteria.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Roll alternative scores up through this subtree.
    ///
    /// Leaves fetch their per-alternative weights through `lookup`;
    /// internal nodes sum their children's propagated maps per
    /// alternative. Either way the result is scaled by this node's own
    /// weight, so the root (weight 1) yields scores that sum to 1 when
    /// every leaf's weights do.
    pub fn propagate<F>(&self, lookup: &F) -> Result<HashMap<String, f64>, AhpError>
    where
        F: Fn(&str) -> Result<HashMap<String, f64>, AhpError>,
    {
        let mut scores = if self.is_leaf() {
            lookup(&self.name)?
        } else {
            let mut merged: HashMap<String, f64> = HashMap::new();
            for child in &self.children {
                for (alternative, score) in child.propagate(lookup)? {
                    *merged.entry(alternative).or_insert(0.0) += score;
                }
            }
            merged
        };
        for score in scores.values_mut() {
            *score *= self.weight;
        }
        Ok(scores)
    }
}
