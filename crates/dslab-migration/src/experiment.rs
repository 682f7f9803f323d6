//! Tools for running experiments with multiple simulation runs.

use std::fs;
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};

use log::{error, info};
use serde::Serialize;
use threadpool::ThreadPool;

use crate::core::config::SimulationConfig;
use crate::core::error::SimulationError;
use crate::core::strategy::StrategyKind;
use crate::simulation::{run, RunSummary};

#[derive(Serialize)]
struct RunEntry {
    id: usize,
    outdir: String,
    results: Option<RunSummary>,
    error: Option<String>,
}

/// Stores the entry even if another run panicked while holding the lock, so every run keeps its slot.
fn push_entry(results: &Mutex<Vec<RunEntry>>, entry: RunEntry) {
    results.lock().unwrap_or_else(|e| e.into_inner()).push(entry);
}

/// Executes independent simulation runs in parallel.
///
/// Every run builds its own fleet, random source and logs from its config, so runs share no state.
pub struct Experiment {
    runs: Vec<SimulationConfig>,
    log_dir: String,
}

impl Experiment {
    /// Creates experiment, the output directory of every run is placed into `log_dir`.
    pub fn new(runs: Vec<SimulationConfig>, log_dir: &str) -> Self {
        let runs = runs
            .into_iter()
            .enumerate()
            .map(|(i, mut config)| {
                let name = format!("run_{}_{}", i + 1, config.strategy);
                config.outdir = Path::new(log_dir).join(name).to_string_lossy().into_owned();
                config
            })
            .collect();
        Self {
            runs,
            log_dir: log_dir.to_string(),
        }
    }

    /// Creates experiment comparing all strategies on the same fleet and seed.
    pub fn compare_strategies(base: &SimulationConfig, log_dir: &str) -> Self {
        let runs = StrategyKind::ALL
            .iter()
            .map(|kind| SimulationConfig {
                strategy: kind.name().to_string(),
                ..base.clone()
            })
            .collect();
        Self::new(runs, log_dir)
    }

    pub fn runs(&self) -> &[SimulationConfig] {
        &self.runs
    }

    /// Runs the experiment using the specified number of threads, writes `results.json` into the log directory.
    ///
    /// A failed run does not stop the others, its error is reported in the results.
    pub fn run(&self, num_threads: usize) -> Result<Vec<Option<RunSummary>>, SimulationError> {
        fs::create_dir_all(&self.log_dir)?;
        let results = Arc::new(Mutex::new(Vec::new()));
        let pool = ThreadPool::new(num_threads.max(1));

        for (i, config) in self.runs.iter().enumerate() {
            let config = config.clone();
            let results = results.clone();
            pool.execute(move || {
                info!("RUN {}: strategy {}, seed {}", i + 1, config.strategy, config.seed);
                let entry = match run(&config) {
                    Ok(summary) => RunEntry {
                        id: i + 1,
                        outdir: config.outdir.clone(),
                        results: Some(summary),
                        error: None,
                    },
                    Err(e) => {
                        error!("run {} failed: {}", i + 1, e);
                        RunEntry {
                            id: i + 1,
                            outdir: config.outdir.clone(),
                            results: None,
                            error: Some(e.to_string()),
                        }
                    }
                };
                push_entry(&results, entry);
            });
        }

        pool.join();
        let mut entries: Vec<RunEntry> = std::mem::take(&mut *results.lock().unwrap_or_else(|e| e.into_inner()));
        entries.sort_by_key(|entry| entry.id);

        let mut file = File::create(Path::new(&self.log_dir).join("results.json"))?;
        serde_json::to_writer_pretty(&mut file, &entries)?;
        Ok(entries.into_iter().map(|entry| entry.results).collect())
    }
}
