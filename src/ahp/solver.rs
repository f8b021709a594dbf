//! Ranking solver: builds the criteria tree and propagates priorities.

use tracing::{info, warn};

use crate::comparison::ComparisonEngine;
use crate::types::MetricType;

use super::cache::MatrixCache;
use super::matrix::{Matrix, RatioMap};
use super::tree::CriteriaNode;
use super::AhpError;

/// Consistency ratio above which judgments are conventionally considered
/// too contradictory.
const CONSISTENCY_THRESHOLD: f64 = 0.1;

/// Ranks benchmark targets over a criteria hierarchy.
///
/// Criteria matrices come in through the [`MatrixCache`] (typically from
/// CSV judgment files); comparison matrices for the leaves are derived
/// from a [`ComparisonEngine`]'s measured speedups via the `load_*`
/// methods.
#[derive(Debug, Default)]
pub struct AhpSolver {
    cache: MatrixCache,
}

impl AhpSolver {
    /// Create a solver around a pre-filled matrix cache.
    pub fn new(cache: MatrixCache) -> Self {
        Self { cache }
    }

    /// The underlying matrix cache.
    pub fn cache(&self) -> &MatrixCache {
        &self.cache
    }

    /// Mutable access to the underlying matrix cache.
    pub fn cache_mut(&mut self) -> &mut MatrixCache {
        &mut self.cache
    }

    /// Derive one comparison matrix per `(criterion, scenario)` pair from
    /// measured query-time speedups.
    ///
    /// Cells are raw geometric-mean speedups, not clamped to the 1-9
    /// judgment scale: a measured 20x advantage should outweigh a 2x one.
    ///
    /// A pair with no measured ratio in either direction (one side never
    /// produced a valid summary) fails with
    /// [`AhpError::MissingComparison`] rather than producing a matrix
    /// with silent gaps.
    pub fn load_benchmark_comparisons(
        &mut self,
        engine: &ComparisonEngine,
        mappings: &[(&str, &str)],
        targets: &[String],
    ) -> Result<(), AhpError> {
        for &(criterion, scenario) in mappings {
            let mut ratios = RatioMap::new();
            for base in targets {
                for compared in targets {
                    if base == compared {
                        continue;
                    }
                    if let Some(ratio) = engine.scenario_speedup(base, compared, scenario) {
                        ratios.insert((base.clone(), compared.clone()), ratio);
                    }
                }
            }
            let matrix = Matrix::from_ratio_map(&ratios, targets)?;
            info!(criterion, scenario, "derived benchmark comparison matrix");
            self.cache.put_comparison(criterion, matrix);
        }
        Ok(())
    }

    /// Derive one comparison matrix per `(criterion, resource metric)`
    /// pair from combined efficiency scores.
    ///
    /// Efficiency ratios are inverted: a target that needs more resources
    /// per unit of work must score lower.
    pub fn load_efficiency_comparisons(
        &mut self,
        engine: &ComparisonEngine,
        mappings: &[(&str, MetricType)],
        targets: &[String],
    ) -> Result<(), AhpError> {
        for &(criterion, metric) in mappings {
            let mut ratios = RatioMap::new();
            for base in targets {
                for combined in engine.combine(base, metric) {
                    if targets.contains(&combined.target) && combined.target != *base {
                        ratios.insert(
                            (base.clone(), combined.target),
                            1.0 / combined.speed_up,
                        );
                    }
                }
            }
            let matrix = Matrix::from_ratio_map(&ratios, targets)?;
            info!(criterion, metric = %metric, "derived efficiency comparison matrix");
            self.cache.put_comparison(criterion, matrix);
        }
        Ok(())
    }

    /// Build the criteria tree rooted at `root_criterion`.
    ///
    /// A name with a registered criterion matrix becomes an internal node
    /// whose children get their weights from that matrix; any other name
    /// is a leaf scored by its comparison matrix at solve time.
    pub fn build_tree(&self, root_label: &str, root_criterion: &str) -> Result<CriteriaNode, AhpError> {
        Ok(CriteriaNode {
            name: root_label.to_string(),
            weight: 1.0,
            children: self.find_children(root_criterion)?,
        })
    }

    /// Rank all alternatives under the criteria tree rooted at
    /// `root_criterion`, best first.
    pub fn solve(&self, root_label: &str, root_criterion: &str) -> Result<Vec<(String, f64)>, AhpError> {
        let tree = self.build_tree(root_label, root_criterion)?;
        let scores = tree.propagate(&|leaf| {
            let matrix = self.cache.get_comparison(leaf)?;
            Self::check_consistency(leaf, matrix);
            matrix.priority_weights()
        })?;

        let mut ranked: Vec<(String, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked)
    }

    fn find_children(&self, parent: &str) -> Result<Vec<CriteriaNode>, AhpError> {
        if !self.cache.contains_criterion(parent) {
            return Ok(Vec::new());
        }
        let matrix = self.cache.get_criterion(parent)?;
        Self::check_consistency(parent, matrix);
        let sub_criteria = self.cache.children(parent)?;

        let mut weights: Vec<(String, f64)> = matrix.priority_weights()?.into_iter().collect();
        weights.sort_by(|a, b| a.0.cmp(&b.0));

        let mut children = Vec::with_capacity(weights.len());
        for (name, weight) in weights {
            children.push(CriteriaNode {
                children: if sub_criteria.contains(&name) {
                    self.find_children(&name)?
                } else {
                    Vec::new()
                },
                name,
                weight,
            });
        }
        Ok(children)
    }

    fn check_consistency(name: &str, matrix: &Matrix) {
        let ratio = matrix.consistency_ratio();
        if ratio > CONSISTENCY_THRESHOLD {
            warn!(
                matrix = %name,
                consistency_ratio = ratio,
                "pairwise judgments exceed the consistency threshold"
            );
        }
    }
}
