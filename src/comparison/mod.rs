//! Pairwise speedups between targets and their cross-scenario combination.
//!
//! Comparisons are derived data: every evaluation run throws all previous
//! records away and regenerates them from the current summaries, so updated
//! measurements can never leave stale cross-products behind. Cross-scenario
//! combination uses the geometric aggregate, since independent per-scenario
//! speedups are independent multiplicative performance factors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::statistics::{geometric_aggregate, ratio_quadrature};
use crate::store::{SummaryFilter, SummaryStore};
use crate::types::{ComparisonRecord, MetricType, SummaryStatistic};

/// Speedup of one target against a baseline, combined across scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedComparison {
    /// Compared target.
    pub target: String,
    /// Geometric mean speedup across scenarios.
    pub speed_up: f64,
    /// Propagated standard deviation of the combined speedup.
    pub std_dev: f64,
    /// Propagated standard error of the combined speedup.
    pub standard_error: f64,
}

/// Combined efficiency score of one target for one resource metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyComparison {
    /// Compared target.
    pub target: String,
    /// Resource metric the score is for.
    pub metric: MetricType,
    /// Combined query-time × resource speedup across scenarios.
    pub speed_up: f64,
    /// Propagated standard deviation.
    pub std_dev: f64,
    /// Propagated standard error.
    pub standard_error: f64,
}

/// Derives and combines pairwise speedup ratios from stored summaries.
#[derive(Debug, Default)]
pub struct ComparisonEngine {
    records: Vec<ComparisonRecord>,
}

impl ComparisonEngine {
    /// Create an engine with no derived records yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current derived records.
    pub fn records(&self) -> &[ComparisonRecord] {
        &self.records
    }

    /// Delete all derived records and regenerate them from the store.
    ///
    /// Joins summaries pairwise on (scenario, param, metric); rows from
    /// failed runs (error sentinels, single samples) never participate.
    pub fn rebuild(&mut self, store: &dyn SummaryStore) {
        self.records.clear();

        let rows = store.query(&SummaryFilter::any());
        for base in rows.iter().filter(|r| r.stat.is_valid()) {
            for other in rows.iter().filter(|r| r.stat.is_valid()) {
                if base.scenario() != other.scenario()
                    || base.param != other.param
                    || base.metric != other.metric
                {
                    continue;
                }
                let (speed_up, speed_up_std, speed_up_se) =
                    Self::pairwise_speedup(&base.stat, &other.stat);
                self.records.push(ComparisonRecord {
                    base_target: base.target.clone(),
                    compared_target: other.target.clone(),
                    scenario: base.scenario().to_string(),
                    metric: base.metric,
                    param: base.param.clone(),
                    speed_up,
                    speed_up_std,
                    speed_up_se,
                });
            }
        }
        debug!(records = self.records.len(), "rebuilt comparison records");
    }

    /// Speedup of `other` relative to `base` with propagated uncertainty.
    ///
    /// `ratio = base.avg / other.avg`; the ratio's standard deviation and
    /// standard error follow from relative-error quadrature of the two
    /// means' uncertainties.
    pub fn pairwise_speedup(base: &SummaryStatistic, other: &SummaryStatistic) -> (f64, f64, f64) {
        let ratio = base.avg / other.avg;
        let std = ratio_quadrature(ratio, base.avg, base.std, other.avg, other.std);
        let se = ratio_quadrature(
            ratio,
            base.avg,
            base.standard_error(),
            other.avg,
            other.standard_error(),
        );
        (ratio, std, se)
    }

    /// Combine all speedups of every target against `baseline` for one
    /// metric, ranked best first.
    ///
    /// Aggregation is two-level: parameters are combined geometrically
    /// within each scenario, then scenarios are combined geometrically per
    /// target, propagating both the standard deviation and the standard
    /// error at each level.
    pub fn combine(&self, baseline: &str, metric: MetricType) -> Vec<CombinedComparison> {
        // (target, scenario) -> per-param (speedup, std, se)
        let mut groups: BTreeMap<(String, String), Vec<(f64, f64, f64)>> = BTreeMap::new();
        for r in self
            .records
            .iter()
            .filter(|r| r.base_target == baseline && r.metric == metric)
        {
            groups
                .entry((r.compared_target.clone(), r.scenario.clone()))
                .or_default()
                .push((r.speed_up, r.speed_up_std, r.speed_up_se));
        }

        let mut per_target: BTreeMap<String, Vec<(f64, f64, f64)>> = BTreeMap::new();
        for ((target, _scenario), points) in groups {
            per_target
                .entry(target)
                .or_default()
                .push(Self::aggregate_level(&points));
        }

        let mut combined: Vec<CombinedComparison> = per_target
            .into_iter()
            .map(|(target, points)| {
                let (speed_up, std_dev, standard_error) = Self::aggregate_level(&points);
                CombinedComparison {
                    target,
                    speed_up,
                    std_dev,
                    standard_error,
                }
            })
            .collect();
        combined.sort_by(|a, b| b.speed_up.total_cmp(&a.speed_up));
        combined
    }

    /// Geometric mean of query-time speedups of `other` vs `baseline` for
    /// one scenario, across its parameters.
    ///
    /// Returns `None` when no valid record joined for the triple (for
    /// example when one side only ever persisted error sentinels), so
    /// callers can tell "no data" apart from a measured ratio. Feeds
    /// benchmark-derived pairwise judgment matrices.
    pub fn scenario_speedup(&self, baseline: &str, other: &str, scenario: &str) -> Option<f64> {
        let points: Vec<(f64, f64)> = self
            .records
            .iter()
            .filter(|r| {
                r.base_target == baseline
                    && r.compared_target == other
                    && r.scenario == scenario
                    && r.metric == MetricType::QueryTime
            })
            .map(|r| (r.speed_up, r.speed_up_std))
            .collect();
        if points.is_empty() {
            return None;
        }
        Some(geometric_aggregate(&points).0)
    }

    /// Combined efficiency of each target against `baseline`, per resource
    /// metric.
    ///
    /// For every (scenario, param) the query-time speedup is multiplied
    /// with the matching resource ratio, the relative errors of both
    /// factors combined in quadrature, and the products aggregated with the
    /// same two-level geometric scheme as [`combine`](Self::combine).
    pub fn compute_efficiency(&self, baseline: &str) -> Vec<EfficiencyComparison> {
        // (target, metric, scenario) -> per-param combined factors
        let mut groups: BTreeMap<(String, MetricType, String), Vec<(f64, f64, f64)>> =
            BTreeMap::new();

        for c in self
            .records
            .iter()
            .filter(|r| r.base_target == baseline && r.metric == MetricType::QueryTime)
        {
            for m in self.records.iter().filter(|m| {
                m.metric.is_resource()
                    && m.base_target == c.base_target
                    && m.compared_target == c.compared_target
                    && m.scenario == c.scenario
                    && m.param == c.param
            }) {
                let product = c.speed_up * m.speed_up;
                let std = ratio_quadrature(product, c.speed_up, c.speed_up_std, m.speed_up, m.speed_up_std);
                let se = ratio_quadrature(product, c.speed_up, c.speed_up_se, m.speed_up, m.speed_up_se);
                groups
                    .entry((c.compared_target.clone(), m.metric, c.scenario.clone()))
                    .or_default()
                    .push((product, std, se));
            }
        }

        let mut per_metric: BTreeMap<(String, MetricType), Vec<(f64, f64, f64)>> = BTreeMap::new();
        for ((target, metric, _scenario), points) in groups {
            per_metric
                .entry((target, metric))
                .or_default()
                .push(Self::aggregate_level(&points));
        }

        let mut combined: Vec<EfficiencyComparison> = per_metric
            .into_iter()
            .map(|((target, metric), points)| {
                let (speed_up, std_dev, standard_error) = Self::aggregate_level(&points);
                EfficiencyComparison {
                    target,
                    metric,
                    speed_up,
                    std_dev,
                    standard_error,
                }
            })
            .collect();
        combined.sort_by(|a, b| b.speed_up.total_cmp(&a.speed_up));
        combined
    }

    /// One geometric aggregation level over (value, std, se) triples.
    fn aggregate_level(points: &[(f64, f64, f64)]) -> (f64, f64, f64) {
        let with_std: Vec<(f64, f64)> = points.iter().map(|&(v, s, _)| (v, s)).collect();
        let with_se: Vec<(f64, f64)> = points.iter().map(|&(v, _, e)| (v, e)).collect();
        let (mean, std) = geometric_aggregate(&with_std);
        let (_, se) = geometric_aggregate(&with_se);
        (mean, std, se)
    }
}
