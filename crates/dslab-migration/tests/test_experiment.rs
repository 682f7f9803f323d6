mod common;

use std::fs;

use dslab_migration::core::config::SimulationConfig;
use dslab_migration::core::strategy::StrategyKind;
use dslab_migration::experiment::Experiment;
use dslab_migration::simulation;

use common::init_logger;

#[test]
// Every strategy runs in its own folder, parallel runs give the same results as sequential ones.
fn test_compare_strategies() {
    init_logger();
    let log_dir = std::env::temp_dir().join(format!("dslab-migration-experiment-{}", std::process::id()));
    let log_dir = log_dir.to_string_lossy().into_owned();
    let mut base = SimulationConfig::small();
    base.steps = 60;
    base.normalization_period = 10;

    let experiment = Experiment::compare_strategies(&base, &log_dir);
    assert_eq!(experiment.runs().len(), StrategyKind::ALL.len());
    let results = experiment.run(3).unwrap();
    assert_eq!(results.len(), StrategyKind::ALL.len());

    for (config, summary) in experiment.runs().iter().zip(&results) {
        let summary = summary.as_ref().unwrap();
        assert_eq!(summary.strategy.name(), config.strategy);
        assert_eq!(summary.steps, 60);
        let loads = fs::read_to_string(format!("{}/PMloads.csv", config.outdir)).unwrap();
        assert_eq!(loads.lines().count(), 60);

        let mut sequential = config.clone();
        sequential.outdir = format!("{}-sequential", config.outdir);
        let expected = simulation::run(&sequential).unwrap();
        assert_eq!(*summary, expected);
        fs::remove_dir_all(&sequential.outdir).unwrap();
    }

    let results_json = fs::read_to_string(format!("{}/results.json", log_dir)).unwrap();
    assert!(results_json.contains("\"migration_likelihood_woi\""));
    fs::remove_dir_all(&log_dir).unwrap();
}

#[test]
// A broken run is reported without stopping the others.
fn test_failed_run_is_reported() {
    init_logger();
    let log_dir = std::env::temp_dir().join(format!("dslab-migration-failed-{}", std::process::id()));
    let log_dir = log_dir.to_string_lossy().into_owned();
    let mut good = SimulationConfig::small();
    good.steps = 5;
    let mut bad = good.clone();
    bad.hosts.clear();

    let results = Experiment::new(vec![good, bad], &log_dir).run(2).unwrap();
    assert!(results[0].is_some());
    assert!(results[1].is_none());
    let results_json = fs::read_to_string(format!("{}/results.json", log_dir)).unwrap();
    assert!(results_json.contains("define at least one physical machine"));
    fs::remove_dir_all(&log_dir).unwrap();
}
