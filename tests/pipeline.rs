//! End-to-end pipeline: sample scripted targets, derive comparisons, and
//! rank them over a criteria hierarchy.

use std::time::Duration;

use benchrank::ahp::parse_matrix_csv;
use benchrank::{
    AhpSolver, BenchmarkTarget, ComparisonEngine, EvalConfig, MemoryStore, MetricType, RunOutcome,
    SamplingController, SummaryRow, SummaryStore, TargetError,
};

/// Deterministic target replaying a fixed per-scenario duration.
struct ScriptedTarget {
    name: String,
    duration: Duration,
}

impl ScriptedTarget {
    fn new(name: &str, ms: f64) -> Self {
        Self {
            name: name.to_string(),
            duration: Duration::from_secs_f64(ms / 1e3),
        }
    }
}

impl BenchmarkTarget for ScriptedTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn iterate(&mut self, _param: &str) -> Result<Duration, TargetError> {
        Ok(self.duration)
    }
}

fn test_config() -> EvalConfig {
    EvalConfig::fast()
        .time_budget(Duration::from_secs(60))
        .measure_floor(Duration::from_millis(200))
}

fn save_resource(store: &mut MemoryStore, target: &str, scenario: &str, param: &str, avg: f64) {
    store.save(SummaryRow {
        target: target.to_string(),
        param: param.to_string(),
        metric: MetricType::MemoryUsage,
        stat: benchrank::summarize(&[avg - 1.0, avg, avg + 1.0], scenario, "MB"),
    });
}

/// Measure both targets on both scenarios with the sampling controller.
fn measured_store() -> MemoryStore {
    let config = test_config();
    let controller = SamplingController::new(&config);
    let mut store = MemoryStore::new();
    let params: Vec<String> = vec!["1000".to_string(), "10000".to_string()];

    // sqlite is twice as fast on point reads, four times on range reads.
    for (scenario, postgres_ms, sqlite_ms) in
        [("point reads", 10.0, 5.0), ("range reads", 20.0, 5.0)]
    {
        let mut postgres = ScriptedTarget::new("postgres", postgres_ms);
        let mut sqlite = ScriptedTarget::new("sqlite", sqlite_ms);
        for (_, outcome) in controller
            .run_sweep(&mut postgres, scenario, &params, &mut store)
            .into_iter()
            .chain(controller.run_sweep(&mut sqlite, scenario, &params, &mut store))
        {
            assert!(matches!(outcome, RunOutcome::Completed(_)));
        }
    }

    // sqlite also uses half the memory everywhere.
    for scenario in ["point reads", "range reads"] {
        for param in ["1000", "10000"] {
            save_resource(&mut store, "postgres", scenario, param, 100.0);
            save_resource(&mut store, "sqlite", scenario, param, 50.0);
        }
    }
    store
}

#[test]
fn measurements_flow_into_ranked_scores() {
    let store = measured_store();
    assert_eq!(store.targets(), vec!["postgres".to_string(), "sqlite".to_string()]);

    let mut engine = ComparisonEngine::new();
    engine.rebuild(&store);

    // Combined query-time speedup of sqlite over postgres:
    // geometric mean of 2 and 4 across scenarios.
    let combined = engine.combine("postgres", MetricType::QueryTime);
    assert_eq!(combined[0].target, "sqlite");
    assert!((combined[0].speed_up - 8.0f64.sqrt()).abs() < 0.05);

    // Efficiency folds the memory ratio in on top of the speedup.
    let efficiency = engine.compute_efficiency("postgres");
    let sqlite_memory = efficiency
        .iter()
        .find(|e| e.target == "sqlite" && e.metric == MetricType::MemoryUsage)
        .expect("sqlite memory efficiency");
    assert!(sqlite_memory.speed_up > combined[0].speed_up);

    // Rank over a two-criteria tree weighing both scenarios equally.
    let targets = store.targets();
    let mut solver = AhpSolver::default();
    solver.cache_mut().put_criterion(
        "goal",
        parse_matrix_csv("criteria,point reads,range reads\npoint reads,,\nrange reads,1,\n")
            .unwrap(),
    );
    solver
        .load_benchmark_comparisons(
            &engine,
            &[("point reads", "point reads"), ("range reads", "range reads")],
            &targets,
        )
        .unwrap();

    let ranked = solver.solve("goal", "goal").unwrap();
    assert_eq!(ranked[0].0, "sqlite");
    assert!(ranked[0].1 > ranked[1].1);
    let total: f64 = ranked.iter().map(|(_, score)| score).sum();
    assert!((total - 1.0).abs() < 1e-4);
}

#[test]
fn failed_target_is_excluded_from_comparisons_but_not_the_sweep() {
    struct FailingTarget;
    impl BenchmarkTarget for FailingTarget {
        fn name(&self) -> &str {
            "broken"
        }
        fn iterate(&mut self, _param: &str) -> Result<Duration, TargetError> {
            Err("connection refused".into())
        }
    }

    let config = test_config();
    let controller = SamplingController::new(&config);
    let mut store = MemoryStore::new();
    let params: Vec<String> = vec!["1000".to_string()];

    let mut healthy = ScriptedTarget::new("healthy", 10.0);
    controller.run_sweep(&mut healthy, "point reads", &params, &mut store);
    let results = controller.run_sweep(&mut FailingTarget, "point reads", &params, &mut store);
    assert!(matches!(results[0].1, RunOutcome::Failed { .. }));

    // The sentinel is persisted but never joins a comparison.
    assert_eq!(store.targets().len(), 2);
    let mut engine = ComparisonEngine::new();
    engine.rebuild(&store);
    assert!(engine
        .records()
        .iter()
        .all(|r| r.base_target == "healthy" && r.compared_target == "healthy"));
}

#[test]
fn noisier_targets_need_more_samples() {
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    struct NoisyTarget {
        name: String,
        rng: Xoshiro256PlusPlus,
        low_ms: f64,
        high_ms: f64,
    }

    impl BenchmarkTarget for NoisyTarget {
        fn name(&self) -> &str {
            &self.name
        }
        fn iterate(&mut self, _param: &str) -> Result<Duration, TargetError> {
            let ms = self.rng.gen_range(self.low_ms..self.high_ms);
            Ok(Duration::from_secs_f64(ms / 1e3))
        }
    }

    // Tiny floor so the variance-driven estimate decides the count.
    let config = EvalConfig::fast()
        .time_budget(Duration::from_secs(60))
        .measure_floor(Duration::from_millis(1));
    let controller = SamplingController::new(&config);

    let mut counts = Vec::new();
    for (name, low, high) in [("steady", 9.9, 10.1), ("noisy", 2.0, 18.0)] {
        let mut store = MemoryStore::new();
        let mut target = NoisyTarget {
            name: name.to_string(),
            rng: Xoshiro256PlusPlus::seed_from_u64(7),
            low_ms: low,
            high_ms: high,
        };
        match controller.run_param(&mut target, "point reads", "", &mut store) {
            RunOutcome::Completed(stat) => counts.push(stat.sample_count),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    assert!(
        counts[1] > counts[0],
        "noisy target took {} samples, steady {}",
        counts[1],
        counts[0]
    );
}

#[test]
fn resumed_sweep_skips_completed_combinations() {
    let config = test_config();
    let controller = SamplingController::new(&config);
    let mut store = MemoryStore::new();
    let params: Vec<String> = vec!["1000".to_string(), "10000".to_string()];

    let mut target = ScriptedTarget::new("postgres", 10.0);
    controller.run_sweep(&mut target, "point reads", &params, &mut store);

    let mut resumed = ScriptedTarget::new("postgres", 10.0);
    let results = controller.run_sweep(&mut resumed, "point reads", &params, &mut store);
    assert!(results
        .iter()
        .all(|(_, outcome)| *outcome == RunOutcome::Skipped));
}
