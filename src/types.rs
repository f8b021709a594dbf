//! Core data model: summary statistics, metric kinds, and derived comparisons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit string marking a summary that came from a failed measurement run.
pub const ERROR_UNIT: &str = "error";

/// Aggregated statistics for one measurement run.
///
/// Produced once per (target, scenario, parameter) combination when the
/// sampling loop finishes, and immutable afterwards. `first` keeps the very
/// first observed sample so cold-start behaviour stays visible next to the
/// steady-state average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistic {
    /// Scenario name this summary belongs to.
    pub name: String,
    /// Unit of the measured values (e.g. "ms", "bytes", "%").
    pub unit: String,
    /// Arithmetic mean of all samples.
    pub avg: f64,
    /// First observed sample (cold-start indicator).
    pub first: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Sample standard deviation (n - 1 denominator). NaN when fewer than
    /// two samples were recorded.
    pub std: f64,
    /// Number of samples folded into this summary.
    pub sample_count: u64,
}

impl SummaryStatistic {
    /// Sentinel summary persisted when a measurement run fails.
    ///
    /// Carries `unit = "error"`, NaN aggregates, and a zero sample count so
    /// downstream consumers can filter it out without special-casing.
    pub fn error_sentinel(name: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: ERROR_UNIT.to_string(),
            avg: f64::NAN,
            first: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            std: f64::NAN,
            sample_count: 0,
        }
    }

    /// Standard error of the mean: `std / sqrt(sample_count)`.
    pub fn standard_error(&self) -> f64 {
        self.std / (self.sample_count as f64).sqrt()
    }

    /// Variance (`std^2`).
    pub fn variance(&self) -> f64 {
        self.std * self.std
    }

    /// Coefficient of variation: `std / avg`.
    pub fn coefficient_of_variation(&self) -> f64 {
        self.std / self.avg
    }

    /// Degrees of freedom for the sample standard deviation.
    pub fn degrees_of_freedom(&self) -> u64 {
        self.sample_count.saturating_sub(1)
    }

    /// Whether this summary can participate in derived comparisons.
    ///
    /// Error sentinels, single-sample runs, and NaN deviations are excluded.
    pub fn is_valid(&self) -> bool {
        self.unit != ERROR_UNIT && self.sample_count > 1 && !self.std.is_nan()
    }
}

/// Kind of measurement a summary or comparison refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricType {
    /// Wall-clock time of one workload iteration.
    #[serde(rename = "Query Time")]
    QueryTime,
    /// CPU utilisation while the workload ran.
    #[serde(rename = "CPU usage")]
    CpuUsage,
    /// Resident memory while the workload ran.
    #[serde(rename = "Memory usage")]
    MemoryUsage,
    /// On-disk footprint after the workload ran.
    #[serde(rename = "Disk Usage")]
    DiskUsage,
}

impl MetricType {
    /// The three resource metrics that feed efficiency comparisons.
    pub const RESOURCE_METRICS: [MetricType; 3] =
        [MetricType::CpuUsage, MetricType::MemoryUsage, MetricType::DiskUsage];

    /// Stable string form used as the persistence key.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::QueryTime => "Query Time",
            MetricType::CpuUsage => "CPU usage",
            MetricType::MemoryUsage => "Memory usage",
            MetricType::DiskUsage => "Disk Usage",
        }
    }

    /// Whether this metric measures resource consumption rather than speed.
    pub fn is_resource(&self) -> bool {
        !matches!(self, MetricType::QueryTime)
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted summary, keyed by (target, scenario, param, metric).
///
/// The scenario name lives in `stat.name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Benchmarked target (e.g. a database product) this row belongs to.
    pub target: String,
    /// Scenario parameter the run used, empty for parameterless scenarios.
    pub param: String,
    /// What was measured.
    pub metric: MetricType,
    /// The aggregated measurements.
    pub stat: SummaryStatistic,
}

impl SummaryRow {
    /// Scenario name, taken from the embedded summary.
    pub fn scenario(&self) -> &str {
        &self.stat.name
    }
}

/// Derived pairwise speedup between two targets on the same workload.
///
/// Regenerated wholesale from current summaries on every evaluation run;
/// never patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    /// Target the ratio is relative to.
    pub base_target: String,
    /// Target being compared against the base.
    pub compared_target: String,
    /// Scenario both summaries came from.
    pub scenario: String,
    /// Metric both summaries measured.
    pub metric: MetricType,
    /// Scenario parameter both summaries used.
    pub param: String,
    /// `base.avg / other.avg`; > 1 means the compared target did better.
    pub speed_up: f64,
    /// Standard deviation of the ratio (relative-error quadrature).
    pub speed_up_std: f64,
    /// Standard error of the ratio (same quadrature over standard errors).
    pub speed_up_se: f64,
}

/// Closed interval, typically a confidence interval around a mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Interval {
    /// Create an interval from its bounds.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether zero lies strictly inside the interval.
    pub fn contains_zero(&self) -> bool {
        self.min < 0.0 && self.max > 0.0
    }

    /// Half the interval width.
    pub fn half_width(&self) -> f64 {
        (self.max - self.min) / 2.0
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2} ; {:.2}]", self.min, self.max)
    }
}
