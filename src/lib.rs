//! Adaptive benchmark evaluation and ranking.
//!
//! `benchrank` measures competing backend targets until their timing
//! statistics are trustworthy, derives pairwise speedups with propagated
//! uncertainty, and ranks the targets over a weighted criteria hierarchy
//! using the Analytic Hierarchy Process.
//!
//! The pipeline has three stages:
//!
//! 1. **Sampling** ([`SamplingController`]): per (target, scenario,
//!    parameter) combination, warm up, estimate how many samples a
//!    confidence interval of the requested width needs, then measure
//!    until that count and a wall-clock floor are both met, all under a
//!    hard time budget. Summaries land in a [`SummaryStore`].
//! 2. **Comparison** ([`ComparisonEngine`]): regenerate every pairwise
//!    speedup ratio from the stored summaries and combine them across
//!    parameters and scenarios with geometric aggregation and error
//!    propagation.
//! 3. **Ranking** ([`AhpSolver`]): turn measured speedups into pairwise
//!    comparison matrices, weigh them with hand-authored criteria
//!    judgments, and propagate priorities down the criteria tree into one
//!    ranked score per target.
//!
//! # Example
//!
//! ```
//! use benchrank::{summarize, confidence_interval};
//!
//! let samples = [9.8, 10.1, 10.0, 9.9, 10.2];
//! let stat = summarize(&samples, "point queries", "ms");
//! let interval = confidence_interval(stat.avg, stat.standard_error(), 0.95).unwrap();
//! assert!(interval.min < stat.avg && stat.avg < interval.max);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ahp;
pub mod comparison;
pub mod config;
pub mod sampling;
pub mod statistics;
pub mod store;
pub mod types;

pub use ahp::{AhpError, AhpSolver, CriteriaNode, Matrix, MatrixCache};
pub use comparison::{CombinedComparison, ComparisonEngine, EfficiencyComparison};
pub use config::EvalConfig;
pub use sampling::{BenchmarkTarget, Phase, RunOutcome, SamplingController, TargetError};
pub use statistics::{
    confidence_interval, geometric_aggregate, harmonic_aggregate, required_sample_count,
    summarize, z_score, StatsError,
};
pub use store::{MemoryStore, SummaryFilter, SummaryStore};
pub use types::{
    ComparisonRecord, Interval, MetricType, SummaryRow, SummaryStatistic, ERROR_UNIT,
};
