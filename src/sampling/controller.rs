//! The iterate-until-confident sampling loop.

use std::fmt;

use tracing::{debug, info, warn};

use crate::config::EvalConfig;
use crate::statistics::{required_sample_count, summarize};
use crate::store::SummaryStore;
use crate::types::{MetricType, SummaryRow, SummaryStatistic};

use super::BenchmarkTarget;

/// Phase of the per-combination sampling state machine.
///
/// `Warmup → Estimate → Measure → Done`, with `Failed` reachable from any
/// phase when an iteration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fixed number of initial iterations; samples are kept.
    Warmup,
    /// Sample-count estimation from warm-up statistics.
    Estimate,
    /// Measurement until count target and time floor are both satisfied.
    Measure,
    /// Summary finalised and persisted.
    Done,
    /// An iteration failed; error sentinel persisted.
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Warmup => "warmup",
            Phase::Estimate => "estimate",
            Phase::Measure => "measure",
            Phase::Done => "done",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of sampling one (target, scenario, param) combination.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Measurement finished; the finalised summary was persisted.
    Completed(SummaryStatistic),
    /// A summary already existed for this combination; nothing was run.
    Skipped,
    /// An iteration failed; an error sentinel was persisted instead.
    Failed {
        /// Phase the failure happened in.
        phase: Phase,
        /// Stringified target error.
        message: String,
    },
}

/// Drives the adaptive sampling loop for benchmark targets.
///
/// Strictly sequential: combinations run one at a time so no two
/// measurements contend for the same resources. The elapsed time the
/// controller reasons about is the sum of reported iteration durations,
/// which makes a run a pure function of the target's duration sequence.
#[derive(Debug)]
pub struct SamplingController<'a> {
    config: &'a EvalConfig,
}

impl<'a> SamplingController<'a> {
    /// Create a controller borrowing the given configuration.
    pub fn new(config: &'a EvalConfig) -> Self {
        Self { config }
    }

    /// Run a whole parameter sweep for one scenario.
    ///
    /// Parameters are measured in order; a failure on one parameter is
    /// recorded and the sweep continues with the next.
    pub fn run_sweep<T>(
        &self,
        target: &mut T,
        scenario: &str,
        params: &[String],
        store: &mut dyn SummaryStore,
    ) -> Vec<(String, RunOutcome)>
    where
        T: BenchmarkTarget + ?Sized,
    {
        info!(scenario, target_name = target.name(), "starting scenario sweep");
        params
            .iter()
            .map(|param| {
                let outcome = self.run_param(target, scenario, param, store);
                (param.clone(), outcome)
            })
            .collect()
    }

    /// Sample one (target, scenario, param) combination.
    ///
    /// Skips immediately when the store already holds a summary for the
    /// combination, so partial sweeps can be resumed without re-measuring.
    pub fn run_param<T>(
        &self,
        target: &mut T,
        scenario: &str,
        param: &str,
        store: &mut dyn SummaryStore,
    ) -> RunOutcome
    where
        T: BenchmarkTarget + ?Sized,
    {
        let target_name = target.name().to_string();
        if store.exists(&target_name, scenario, param) {
            info!(
                %target_name,
                scenario, param, "skipping combination, statistics already exist"
            );
            return RunOutcome::Skipped;
        }

        let mut phase = Phase::Warmup;
        let mut samples: Vec<f64> = Vec::new();

        // Warm-up: fixed iteration count, samples retained.
        debug!(%target_name, scenario, param, %phase, "entering phase");
        for _ in 0..self.config.warmup {
            match target.iterate(param) {
                Ok(elapsed) => samples.push(elapsed.as_secs_f64() * 1e3),
                Err(e) => return self.fail(&target_name, scenario, param, phase, e, store),
            }
        }
        let warmup_elapsed_ms: f64 = samples.iter().sum();

        // Estimate: size the run from the warm-up statistics, then clamp to
        // the time budget. The budget always wins over precision.
        phase = Phase::Estimate;
        debug!(%target_name, scenario, param, %phase, "entering phase");
        let warmup_stat = summarize(&samples, scenario, "ms");
        let mut target_count = match required_sample_count(
            warmup_stat.avg,
            warmup_stat.std,
            self.config.confidence_level,
            self.config.relative_interval_width,
        ) {
            Ok(n) => n,
            Err(e) => return self.fail(&target_name, scenario, param, phase, Box::new(e), store),
        };
        let ms_per_iteration = warmup_elapsed_ms / self.config.warmup as f64;
        let budget_ms = self.config.time_budget.as_secs_f64() * 1e3;
        if ms_per_iteration > 0.0 {
            let budget_iterations = (budget_ms / ms_per_iteration) as u64;
            if budget_iterations < target_count {
                warn!(
                    %target_name,
                    scenario,
                    param,
                    wanted = target_count,
                    clamped = budget_iterations,
                    "reducing sample count to fit the time budget, trading precision for time"
                );
                target_count = budget_iterations;
            } else {
                info!(
                    %target_name,
                    scenario,
                    param,
                    sample_count = target_count,
                    estimated_ms = ms_per_iteration * target_count as f64,
                    "sample count estimated"
                );
            }
        }

        // Measure: iterate until the count target is met AND the wall-clock
        // floor is covered. Cancellation is cooperative: the budget is only
        // checked between iterations, never mid-call.
        phase = Phase::Measure;
        debug!(%target_name, scenario, param, %phase, "entering phase");
        let floor_ms = self.config.measure_floor.as_secs_f64() * 1e3;
        let mut measured_ms = 0.0;
        while (samples.len() as u64) < target_count || measured_ms < floor_ms {
            if samples.len() as u64 >= self.config.max_iterations {
                warn!(
                    %target_name,
                    scenario, param, "iteration cap reached before the measurement floor"
                );
                break;
            }
            if warmup_elapsed_ms + measured_ms > budget_ms {
                warn!(%target_name, scenario, param, "time budget exhausted, stopping measurement");
                break;
            }
            match target.iterate(param) {
                Ok(elapsed) => {
                    let ms = elapsed.as_secs_f64() * 1e3;
                    measured_ms += ms;
                    samples.push(ms);
                }
                Err(e) => return self.fail(&target_name, scenario, param, phase, e, store),
            }
        }

        phase = Phase::Done;
        let stat = summarize(&samples, scenario, "ms");
        info!(
            %target_name,
            scenario,
            param,
            %phase,
            sample_count = stat.sample_count,
            avg_ms = stat.avg,
            "measurement finished"
        );
        store.save(SummaryRow {
            target: target_name,
            param: param.to_string(),
            metric: MetricType::QueryTime,
            stat: stat.clone(),
        });
        RunOutcome::Completed(stat)
    }

    fn fail(
        &self,
        target_name: &str,
        scenario: &str,
        param: &str,
        phase: Phase,
        error: super::TargetError,
        store: &mut dyn SummaryStore,
    ) -> RunOutcome {
        warn!(
            target_name,
            scenario,
            param,
            %phase,
            error = %error,
            "combination failed, persisting error sentinel"
        );
        store.save(SummaryRow {
            target: target_name.to_string(),
            param: param.to_string(),
            metric: MetricType::QueryTime,
            stat: SummaryStatistic::error_sentinel(scenario),
        });
        RunOutcome::Failed {
            phase,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SummaryFilter};
    use std::time::Duration;

    /// Target that replays a scripted duration sequence, cycling when
    /// exhausted, and optionally fails at a given call index.
    struct ScriptedTarget {
        name: String,
        durations_ms: Vec<f64>,
        calls: usize,
        fail_at: Option<usize>,
    }

    impl ScriptedTarget {
        fn steady(name: &str, ms: f64) -> Self {
            Self {
                name: name.to_string(),
                durations_ms: vec![ms],
                calls: 0,
                fail_at: None,
            }
        }
    }

    impl BenchmarkTarget for ScriptedTarget {
        fn name(&self) -> &str {
            &self.name
        }

        fn iterate(&mut self, _param: &str) -> Result<Duration, super::super::TargetError> {
            let call = self.calls;
            self.calls += 1;
            if Some(call) == self.fail_at {
                return Err("injected iteration failure".into());
            }
            let ms = self.durations_ms[call % self.durations_ms.len()];
            Ok(Duration::from_secs_f64(ms / 1e3))
        }
    }

    fn test_config() -> EvalConfig {
        EvalConfig::fast()
            .time_budget(Duration::from_secs(60))
            .measure_floor(Duration::from_secs(1))
    }

    #[test]
    fn steady_target_reaches_done_deterministically() {
        let config = test_config();
        let controller = SamplingController::new(&config);
        let mut store = MemoryStore::new();
        let mut target = ScriptedTarget::steady("db-a", 10.0);

        let outcome = controller.run_param(&mut target, "reads", "100", &mut store);
        let stat = match outcome {
            RunOutcome::Completed(stat) => stat,
            other => panic!("expected completion, got {other:?}"),
        };

        // Zero variance: the estimated count is 0, so the floor decides.
        // 30 warm-up samples plus 1000ms floor at 10ms each.
        assert!(stat.sample_count >= config.warmup);
        assert_eq!(stat.sample_count, 130);
        assert!((stat.avg - 10.0).abs() < 1e-9);

        // Re-running is a no-op thanks to skip-if-exists.
        let mut target2 = ScriptedTarget::steady("db-a", 10.0);
        assert_eq!(
            controller.run_param(&mut target2, "reads", "100", &mut store),
            RunOutcome::Skipped
        );
        assert_eq!(target2.calls, 0);
    }

    #[test]
    fn run_is_reproducible_for_a_fixed_sequence() {
        let config = test_config();
        let controller = SamplingController::new(&config);

        let mut counts = Vec::new();
        for _ in 0..2 {
            let mut store = MemoryStore::new();
            let mut target = ScriptedTarget {
                name: "db-a".into(),
                durations_ms: vec![9.0, 11.0, 10.0, 12.0, 8.0],
                calls: 0,
                fail_at: None,
            };
            match controller.run_param(&mut target, "reads", "", &mut store) {
                RunOutcome::Completed(stat) => counts.push(stat.sample_count),
                other => panic!("expected completion, got {other:?}"),
            }
        }
        assert_eq!(counts[0], counts[1]);
    }

    #[test]
    fn failure_persists_error_sentinel_and_isolates_parameter() {
        let config = test_config();
        let controller = SamplingController::new(&config);
        let mut store = MemoryStore::new();
        let mut target = ScriptedTarget {
            name: "db-a".into(),
            durations_ms: vec![10.0],
            calls: 0,
            fail_at: Some(5),
        };

        let params: Vec<String> = vec!["1".into(), "2".into()];
        let results = controller.run_sweep(&mut target, "reads", &params, &mut store);

        assert!(matches!(
            results[0].1,
            RunOutcome::Failed {
                phase: Phase::Warmup,
                ..
            }
        ));
        // The sweep went on to the second parameter.
        assert!(matches!(results[1].1, RunOutcome::Completed(_)));

        let rows = store.query(&SummaryFilter::any().param("1"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stat.unit, crate::types::ERROR_UNIT);
        assert_eq!(rows[0].stat.sample_count, 0);
    }

    #[test]
    fn budget_clamps_sample_count() {
        // High variance forces a huge estimated count; a tiny budget must
        // clamp it. Warm-up alone nearly exhausts the 400ms budget, so the
        // measure phase stops almost immediately.
        let config = EvalConfig::fast()
            .time_budget(Duration::from_millis(400))
            .measure_floor(Duration::from_secs(30));
        let controller = SamplingController::new(&config);
        let mut store = MemoryStore::new();
        let mut target = ScriptedTarget {
            name: "db-a".into(),
            durations_ms: vec![1.0, 25.0, 3.0, 19.0, 2.0, 30.0],
            calls: 0,
            fail_at: None,
        };

        match controller.run_param(&mut target, "reads", "", &mut store) {
            RunOutcome::Completed(stat) => {
                // Budget (400ms) divided by mean iteration cost bounds the
                // total far below what the variance would demand.
                assert!(stat.sample_count < 100, "count {} not clamped", stat.sample_count);
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn zero_duration_iterations_hit_the_cap() {
        let config = test_config().max_iterations(500);
        let controller = SamplingController::new(&config);
        let mut store = MemoryStore::new();
        let mut target = ScriptedTarget::steady("db-a", 0.0);

        match controller.run_param(&mut target, "reads", "", &mut store) {
            RunOutcome::Completed(stat) => assert_eq!(stat.sample_count, 500),
            other => panic!("expected completion, got {other:?}"),
        }
    }
}
