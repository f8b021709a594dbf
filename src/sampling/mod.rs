//! Adaptive sampling: iterate a benchmark target until the result is
//! statistically trustworthy or the time budget runs out.
//!
//! The controller drives a strictly sequential per-combination loop:
//! a fixed warm-up, a sample-count estimate from the warm-up statistics,
//! then measurement until both the estimated count and a wall-clock floor
//! are satisfied. Failures are isolated per parameter and persisted as
//! error sentinels so a sweep never aborts wholesale.

mod controller;

pub use controller::{Phase, RunOutcome, SamplingController};

/// Error produced by a benchmark target iteration.
///
/// Targets are external collaborators (database drivers, containers, …);
/// whatever they fail with is carried opaquely.
pub type TargetError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A backend being benchmarked.
///
/// The controller only ever calls [`iterate`](BenchmarkTarget::iterate) and
/// treats it as a black box that may block on I/O. Any error fails the
/// current (target, scenario, param) combination, not the whole sweep.
pub trait BenchmarkTarget {
    /// Stable name used as the persistence key.
    fn name(&self) -> &str;

    /// Run one workload iteration for the given parameter and report how
    /// long it took.
    fn iterate(&mut self, param: &str) -> Result<std::time::Duration, TargetError>;
}
