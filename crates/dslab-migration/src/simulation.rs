//! Driver of a single simulation run.

use std::fs;

use log::info;
use serde::Serialize;
use sugars::boxed;

use crate::core::common::MigrationEvent;
use crate::core::config::SimulationConfig;
use crate::core::error::SimulationError;
use crate::core::logger::{CsvSeriesLogger, SeriesLogger};
use crate::core::migration_manager::MigrationManager;
use crate::core::random::PcgRandomSource;
use crate::core::strategy::StrategyKind;

/// Results of a finished run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub strategy: StrategyKind,
    pub seed: u64,
    pub steps: u64,
    pub total_migrations: u64,
    pub vm_migrations: Vec<u32>,
}

/// Advances VM loads and the migration manager step by step.
pub struct MigrationSimulation {
    manager: MigrationManager,
    seed: u64,
    step: u64,
}

impl MigrationSimulation {
    /// Builds the fleet from config, creates the output directory and the CSV logs in it.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        fs::create_dir_all(&config.outdir)?;
        let logger = CsvSeriesLogger::new(&config.outdir)?;
        Self::with_logger(config, boxed!(logger))
    }

    /// Builds the fleet from config, series are written to `logger`.
    pub fn with_logger(config: &SimulationConfig, logger: Box<dyn SeriesLogger>) -> Result<Self, SimulationError> {
        let manager_config = config.manager_config()?;
        let (pms, vms) = config.build_fleet()?;
        let rand = boxed!(PcgRandomSource::new(config.seed));
        let manager = MigrationManager::new(manager_config, pms, vms, rand, logger)?;
        Ok(Self::from_manager(manager, config.seed))
    }

    /// Wraps already constructed manager, `seed` is only reported in the summary.
    pub fn from_manager(manager: MigrationManager, seed: u64) -> Self {
        Self { manager, seed, step: 0 }
    }

    /// Performs one step and returns the migration made on it.
    pub fn step(&mut self) -> Result<Option<MigrationEvent>, SimulationError> {
        self.manager.refresh_vm_loads();
        let event = self.manager.execute(self.step)?;
        self.step += 1;
        Ok(event)
    }

    /// Performs `step_count` steps, returns the number of migrations made.
    pub fn steps(&mut self, step_count: u64) -> Result<u64, SimulationError> {
        let mut migrations = 0;
        for _ in 0..step_count {
            if self.step()?.is_some() {
                migrations += 1;
            }
        }
        Ok(migrations)
    }

    /// Number of performed steps.
    pub fn current_step(&self) -> u64 {
        self.step
    }

    pub fn manager(&self) -> &MigrationManager {
        &self.manager
    }

    /// Flushes the logs and returns the run summary.
    pub fn finish(mut self) -> Result<RunSummary, SimulationError> {
        self.manager.flush()?;
        let summary = RunSummary {
            strategy: self.manager.config().strategy,
            seed: self.seed,
            steps: self.step,
            total_migrations: self.manager.total_migrations(),
            vm_migrations: self.manager.vms().iter().map(|vm| vm.migration_count()).collect(),
        };
        info!(
            "{} finished after {} steps with {} migrations",
            summary.strategy, summary.steps, summary.total_migrations
        );
        Ok(summary)
    }
}

/// Runs the whole simulation described by config.
pub fn run(config: &SimulationConfig) -> Result<RunSummary, SimulationError> {
    let mut sim = MigrationSimulation::new(config)?;
    sim.steps(config.steps)?;
    sim.finish()
}
