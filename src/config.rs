//! Run configuration for the sampling controller.
//!
//! All knobs live in one immutable struct threaded through every entry
//! point; nothing is read from ambient global state.

use std::time::Duration;

/// Configuration for an evaluation run.
///
/// The two presets mirror the two modes the benchmark harness runs in:
/// [`EvalConfig::full`] for overnight sweeps and [`EvalConfig::fast`] for
/// iteration during development.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Fixed number of warm-up iterations run before estimating the
    /// required sample count. Warm-up samples are kept, not discarded.
    pub warmup: u64,

    /// Confidence level used when sizing the sample count. Must be one of
    /// the levels in the fixed z-score table. Default: 0.90.
    pub confidence_level: f64,

    /// Target confidence-interval half-width as a fraction of the mean.
    /// Default: 0.10 (±10% of the mean).
    pub relative_interval_width: f64,

    /// Time budget per (target, scenario, param) combination. The budget
    /// always wins over the statistical sample-count target.
    pub time_budget: Duration,

    /// Minimum wall-clock time the measurement phase must cover, even when
    /// the sample-count target is already satisfied. Guards against very
    /// fast iterations meeting the count with too little scheduling
    /// diversity.
    pub measure_floor: Duration,

    /// Hard cap on total iterations per combination. Bounds the loop when
    /// reported iteration durations are degenerate (e.g. all zero).
    pub max_iterations: u64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl EvalConfig {
    /// Full-fidelity preset: 100 warm-up iterations, 5 minute budget,
    /// 60 second measurement floor.
    pub fn full() -> Self {
        Self {
            warmup: 100,
            confidence_level: 0.90,
            relative_interval_width: 0.10,
            time_budget: Duration::from_secs(5 * 60),
            measure_floor: Duration::from_secs(60),
            max_iterations: 1_000_000,
        }
    }

    /// Fast preset for development: 30 warm-up iterations, 2 minute budget,
    /// 30 second measurement floor.
    pub fn fast() -> Self {
        Self {
            warmup: 30,
            time_budget: Duration::from_secs(2 * 60),
            measure_floor: Duration::from_secs(30),
            ..Self::full()
        }
    }

    /// Set the warm-up iteration count.
    pub fn warmup(mut self, iterations: u64) -> Self {
        assert!(iterations > 0, "warmup must be positive");
        self.warmup = iterations;
        self
    }

    /// Set the confidence level used for sample-count estimation.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Set the target relative interval width.
    pub fn relative_interval_width(mut self, width: f64) -> Self {
        assert!(width > 0.0 && width < 1.0, "relative_interval_width must be in (0, 1)");
        self.relative_interval_width = width;
        self
    }

    /// Set the per-combination time budget.
    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Set the measurement-phase floor.
    pub fn measure_floor(mut self, floor: Duration) -> Self {
        self.measure_floor = floor;
        self
    }

    /// Set the hard iteration cap.
    pub fn max_iterations(mut self, cap: u64) -> Self {
        assert!(cap > 0, "max_iterations must be positive");
        self.max_iterations = cap;
        self
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.warmup == 0 {
            return Err("warmup must be positive".to_string());
        }
        if crate::statistics::z_score(self.confidence_level).is_err() {
            return Err(format!(
                "confidence_level {} is not in the supported table",
                self.confidence_level
            ));
        }
        if self.relative_interval_width <= 0.0 || self.relative_interval_width >= 1.0 {
            return Err("relative_interval_width must be in (0, 1)".to_string());
        }
        if self.max_iterations < self.warmup {
            return Err("max_iterations must cover at least the warm-up phase".to_string());
        }
        Ok(())
    }
}
