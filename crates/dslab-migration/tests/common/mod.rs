#![allow(dead_code)]

use std::collections::VecDeque;

use dslab_migration::core::logger::MemorySeriesLogger;
use dslab_migration::core::migration_manager::{ManagerConfig, MigrationManager};
use dslab_migration::core::physical_machine::PhysicalMachine;
use dslab_migration::core::plan::Plan;
use dslab_migration::core::random::RandomSource;
use dslab_migration::core::vm::VirtualMachine;

/// Random source with predefined choices. VM loads are always exactly 75% of the nominal load.
pub struct ScriptedRandom {
    picks: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(picks: &[usize]) -> Self {
        Self {
            picks: picks.iter().copied().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform(&mut self) -> f64 {
        0.
    }

    fn gaussian(&mut self, mean: f64, _std_dev: f64) -> f64 {
        mean
    }

    fn choose_index(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % len
    }
}

/// Prints strategy and manager log records in test output, configured by `RUST_LOG`.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Three 8-core PMs and eight VMs on the first one.
pub fn small_fleet() -> (Vec<PhysicalMachine>, Vec<VirtualMachine>) {
    let pms: Vec<PhysicalMachine> = (0..3).map(|_| PhysicalMachine::with_cores(8.).unwrap()).collect();
    let specs = [
        (Plan::Gold, 2.),
        (Plan::Gold, 2.),
        (Plan::Silver, 2.),
        (Plan::Silver, 4.),
        (Plan::Silver, 4.),
        (Plan::Basic, 4.),
        (Plan::Basic, 4.),
        (Plan::Basic, 4.),
    ];
    let vms = specs
        .iter()
        .map(|(plan, load)| VirtualMachine::new(0, &pms[0], *plan, *load, 1.).unwrap())
        .collect();
    (pms, vms)
}

/// Manager driven by [`ScriptedRandom`] with the given choices.
pub fn scripted_manager(
    config: ManagerConfig,
    pms: Vec<PhysicalMachine>,
    vms: Vec<VirtualMachine>,
    picks: &[usize],
) -> (MigrationManager, MemorySeriesLogger) {
    init_logger();
    let logger = MemorySeriesLogger::new();
    let manager = MigrationManager::new(
        config,
        pms,
        vms,
        Box::new(ScriptedRandom::new(picks)),
        Box::new(logger.clone()),
    )
    .unwrap();
    (manager, logger)
}

/// Manager whose relocation thresholds are zero, so any PM loaded over its set point is a migration source.
pub fn forced_overload_manager(
    config: ManagerConfig,
    pms: Vec<PhysicalMachine>,
    vms: Vec<VirtualMachine>,
    picks: &[usize],
) -> (MigrationManager, MemorySeriesLogger) {
    let config = ManagerConfig {
        target_relocation: 0.,
        ..config
    };
    scripted_manager(config, pms, vms, picks)
}

pub fn step(manager: &mut MigrationManager, step: u64) -> Option<dslab_migration::core::common::MigrationEvent> {
    manager.refresh_vm_loads();
    manager.execute(step).unwrap()
}
