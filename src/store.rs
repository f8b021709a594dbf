//! Persistence seam for measurement summaries.
//!
//! The engine never talks to a concrete database; it goes through
//! [`SummaryStore`], which any persistence backend can implement.
//! [`MemoryStore`] is the in-memory reference implementation used by tests
//! and small evaluations.

use tracing::debug;

use crate::types::{MetricType, SummaryRow};

/// Filter over persisted summaries. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct SummaryFilter {
    /// Match a specific target.
    pub target: Option<String>,
    /// Match a specific scenario name.
    pub scenario: Option<String>,
    /// Match a specific parameter.
    pub param: Option<String>,
    /// Match a specific metric.
    pub metric: Option<MetricType>,
}

impl SummaryFilter {
    /// Filter matching every row.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to one target.
    pub fn target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    /// Restrict to one scenario.
    pub fn scenario(mut self, scenario: &str) -> Self {
        self.scenario = Some(scenario.to_string());
        self
    }

    /// Restrict to one parameter.
    pub fn param(mut self, param: &str) -> Self {
        self.param = Some(param.to_string());
        self
    }

    /// Restrict to one metric.
    pub fn metric(mut self, metric: MetricType) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Whether a row satisfies this filter.
    pub fn matches(&self, row: &SummaryRow) -> bool {
        self.target.as_deref().map_or(true, |t| t == row.target)
            && self.scenario.as_deref().map_or(true, |s| s == row.scenario())
            && self.param.as_deref().map_or(true, |p| p == row.param)
            && self.metric.map_or(true, |m| m == row.metric)
    }
}

/// Storage collaborator for measurement summaries.
///
/// Implementations must keep `save` idempotent on the
/// (target, scenario, param, metric) key so resumed or partial runs never
/// duplicate or overwrite completed measurements.
pub trait SummaryStore {
    /// Whether any summary exists for this (target, scenario, param)
    /// combination, regardless of metric.
    fn exists(&self, target: &str, scenario: &str, param: &str) -> bool;

    /// Persist a summary. Returns `false` when an entry with the same key
    /// already exists and the row was skipped.
    fn save(&mut self, row: SummaryRow) -> bool;

    /// All rows matching the filter.
    fn query(&self, filter: &SummaryFilter) -> Vec<SummaryRow>;

    /// Delete all rows matching the filter; returns how many were removed.
    fn delete(&mut self, filter: &SummaryFilter) -> usize;

    /// Distinct target names, sorted.
    fn targets(&self) -> Vec<String>;

    /// Distinct scenario names, sorted.
    fn scenarios(&self) -> Vec<String>;
}

/// In-memory [`SummaryStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<SummaryRow>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl SummaryStore for MemoryStore {
    fn exists(&self, target: &str, scenario: &str, param: &str) -> bool {
        self.rows
            .iter()
            .any(|r| r.target == target && r.scenario() == scenario && r.param == param)
    }

    fn save(&mut self, row: SummaryRow) -> bool {
        let duplicate = self.rows.iter().any(|r| {
            r.target == row.target
                && r.scenario() == row.scenario()
                && r.param == row.param
                && r.metric == row.metric
        });
        if duplicate {
            debug!(
                target_name = %row.target,
                scenario = %row.scenario(),
                param = %row.param,
                metric = %row.metric,
                "skipping save, summary already exists"
            );
            return false;
        }
        self.rows.push(row);
        true
    }

    fn query(&self, filter: &SummaryFilter) -> Vec<SummaryRow> {
        self.rows.iter().filter(|r| filter.matches(r)).cloned().collect()
    }

    fn delete(&mut self, filter: &SummaryFilter) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !filter.matches(r));
        before - self.rows.len()
    }

    fn targets(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rows.iter().map(|r| r.target.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    fn scenarios(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rows.iter().map(|r| r.scenario().to_string()).collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::summarize;

    fn row(target: &str, scenario: &str, param: &str, metric: MetricType) -> SummaryRow {
        SummaryRow {
            target: target.to_string(),
            param: param.to_string(),
            metric,
            stat: summarize(&[1.0, 2.0, 3.0], scenario, "ms"),
        }
    }

    #[test]
    fn save_is_idempotent_per_key() {
        let mut store = MemoryStore::new();
        assert!(store.save(row("a", "s", "10", MetricType::QueryTime)));
        assert!(!store.save(row("a", "s", "10", MetricType::QueryTime)));
        assert_eq!(store.len(), 1);

        // Same combination but a different metric is a distinct key.
        assert!(store.save(row("a", "s", "10", MetricType::CpuUsage)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn exists_ignores_metric() {
        let mut store = MemoryStore::new();
        store.save(row("a", "s", "10", MetricType::CpuUsage));
        assert!(store.exists("a", "s", "10"));
        assert!(!store.exists("a", "s", "20"));
        assert!(!store.exists("b", "s", "10"));
    }

    #[test]
    fn query_and_delete_by_filter() {
        let mut store = MemoryStore::new();
        store.save(row("a", "s1", "1", MetricType::QueryTime));
        store.save(row("a", "s2", "1", MetricType::QueryTime));
        store.save(row("b", "s1", "1", MetricType::QueryTime));

        let only_a = store.query(&SummaryFilter::any().target("a"));
        assert_eq!(only_a.len(), 2);

        let s1 = store.query(&SummaryFilter::any().scenario("s1"));
        assert_eq!(s1.len(), 2);

        assert_eq!(store.delete(&SummaryFilter::any().target("a")), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn distinct_enumerations_are_sorted() {
        let mut store = MemoryStore::new();
        store.save(row("b", "s2", "1", MetricType::QueryTime));
        store.save(row("a", "s1", "1", MetricType::QueryTime));
        store.save(row("a", "s1", "2", MetricType::QueryTime));

        assert_eq!(store.targets(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.scenarios(), vec!["s1".to_string(), "s2".to_string()]);
    }
}
