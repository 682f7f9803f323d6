//! Migration manager, the per-step control loop.

use log::{info, trace};

use crate::core::assignment::Assignment;
use crate::core::common::{MigrationEvent, MigrationPlan};
use crate::core::error::SimulationError;
use crate::core::logger::{format_row, Series, SeriesLogger};
use crate::core::overload::{OverloadIndices, DEFAULT_WINDOW_SIZE};
use crate::core::physical_machine::PhysicalMachine;
use crate::core::random::RandomSource;
use crate::core::strategies::sandpiper::SandpiperParams;
use crate::core::strategy::{strategy_resolver, ClusterState, MigrationStrategy, StrategyKind};
use crate::core::vm::VirtualMachine;

const NORMALIZATION_PADDING: f64 = 1.1;

/// Parameters of the migration manager.
#[derive(Clone, Debug, PartialEq)]
pub struct ManagerConfig {
    /// Migration strategy.
    pub strategy: StrategyKind,
    /// Period in steps of set point renormalization, 0 disables it.
    pub normalization_period: u64,
    /// Initial set point as a fraction of PM cores.
    pub target_utilization: f64,
    /// Relocation threshold as a fraction of PM cores.
    pub target_relocation: f64,
    /// Length of the windowed overload index in steps.
    pub window_size: usize,
    pub sandpiper: SandpiperParams,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            normalization_period: 0,
            target_utilization: 0.75,
            target_relocation: 1.1,
            window_size: DEFAULT_WINDOW_SIZE,
            sandpiper: SandpiperParams::default(),
        }
    }
}

impl ManagerConfig {
    pub fn with_strategy(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if !(self.target_utilization.is_finite() && self.target_utilization >= 0.) {
            return Err(SimulationError::invalid(format!(
                "target utilization must be non-negative, got {}",
                self.target_utilization
            )));
        }
        if !(self.target_relocation.is_finite() && self.target_relocation >= 0.) {
            return Err(SimulationError::invalid(format!(
                "target relocation must be non-negative, got {}",
                self.target_relocation
            )));
        }
        if self.window_size == 0 {
            return Err(SimulationError::invalid("overload window can't be empty"));
        }
        if self.sandpiper.n == 0 || self.sandpiper.k > self.sandpiper.n {
            return Err(SimulationError::invalid(format!(
                "sandpiper needs 0 < k <= n, got k = {}, n = {}",
                self.sandpiper.k, self.sandpiper.n
            )));
        }
        Ok(())
    }
}

/// Owns the fleet and the VM to PM assignment, tracks overload of PMs and performs migrations chosen by the
/// configured strategy.
///
/// On every step the caller first refreshes VM loads with [`MigrationManager::refresh_vm_loads`] and then calls
/// [`MigrationManager::execute`].
pub struct MigrationManager {
    config: ManagerConfig,
    pms: Vec<PhysicalMachine>,
    vms: Vec<VirtualMachine>,
    assignment: Assignment,
    strategy: Box<dyn MigrationStrategy>,
    rand: Box<dyn RandomSource>,
    logger: Box<dyn SeriesLogger>,
    vm_loads: Vec<f64>,
    vm_volumes: Vec<f64>,
    physical_load: Vec<f64>,
    physical_volume: Vec<f64>,
    set_points: Vec<f64>,
    relocation_thresholds: Vec<f64>,
    overload: OverloadIndices,
    total_migrations: u64,
    step: u64,
}

impl MigrationManager {
    /// Creates manager for the fleet. VMs keep the hosts they were created on.
    pub fn new(
        config: ManagerConfig,
        pms: Vec<PhysicalMachine>,
        vms: Vec<VirtualMachine>,
        rand: Box<dyn RandomSource>,
        logger: Box<dyn SeriesLogger>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        if pms.is_empty() {
            return Err(SimulationError::invalid("define at least one physical machine"));
        }
        for (i, vm) in vms.iter().enumerate() {
            if vm.current_pm() >= pms.len() {
                return Err(SimulationError::invalid(format!(
                    "vm {} is placed on pm {}, but there are only {} pms",
                    i,
                    vm.current_pm(),
                    pms.len()
                )));
            }
        }

        let num_pms = pms.len();
        let num_vms = vms.len();
        let assignment = Assignment::new(vms.iter().map(|vm| vm.current_pm()).collect(), num_pms);
        let set_points = pms.iter().map(|pm| pm.cores() * config.target_utilization).collect();
        let relocation_thresholds = pms.iter().map(|pm| pm.cores() * config.target_relocation).collect();
        let strategy = strategy_resolver(config.strategy, num_pms, config.sandpiper);
        let overload = OverloadIndices::new(num_pms, config.window_size);

        info!(
            "migration manager: {} pms, {} vms, strategy {}, normalization period {}",
            num_pms, num_vms, config.strategy, config.normalization_period
        );

        Ok(Self {
            config,
            pms,
            vms,
            assignment,
            strategy,
            rand,
            logger,
            vm_loads: vec![0.; num_vms],
            vm_volumes: vec![0.; num_vms],
            physical_load: vec![0.; num_pms],
            physical_volume: vec![0.; num_pms],
            set_points,
            relocation_thresholds,
            overload,
            total_migrations: 0,
            step: 0,
        })
    }

    /// Draws actual loads of all VMs for the next step.
    pub fn refresh_vm_loads(&mut self) {
        for vm in self.vms.iter_mut() {
            vm.step_load(self.rand.as_mut());
        }
    }

    /// Runs one control step: aggregates loads, updates overload indices, performs at most one migration, logs the
    /// series and renormalizes set points when the period elapses. Returns the migration performed on this step.
    pub fn execute(&mut self, step: u64) -> Result<Option<MigrationEvent>, SimulationError> {
        self.step = step;
        trace!("step {}", step);

        self.aggregate();
        self.overload.update(&self.physical_load, &self.set_points);

        let state = ClusterState {
            step,
            pms: &self.pms,
            vms: &self.vms,
            assignment: &self.assignment,
            physical_load: &self.physical_load,
            physical_volume: &self.physical_volume,
            set_points: &self.set_points,
            relocation_thresholds: &self.relocation_thresholds,
            integrated_overload: self.overload.integrated(),
            window_overload: self.overload.windowed(),
        };
        let plan = self.strategy.decide(&state, self.rand.as_mut());
        let event = match plan {
            Some(plan) => Some(self.migrate(plan)?),
            None => None,
        };

        self.log_step()?;

        if self.config.normalization_period != 0 && step % self.config.normalization_period == 0 {
            self.normalize_set_points();
        }
        Ok(event)
    }

    /// Collects actual VM loads and volumes and sums them by host.
    pub fn aggregate(&mut self) {
        self.vm_loads = self.vms.iter().map(|vm| vm.load_actual()).collect();
        self.vm_volumes = self.vms.iter().map(|vm| vm.volume_actual()).collect();
        self.physical_load = self.assignment.project(&self.vm_loads);
        self.physical_volume = self.assignment.project(&self.vm_volumes);
    }

    fn migrate(&mut self, plan: MigrationPlan) -> Result<MigrationEvent, SimulationError> {
        let MigrationPlan { vm, source, destination } = plan;
        debug_assert!(self.assignment.is_on(vm, source));
        debug_assert_ne!(source, destination);

        self.total_migrations += 1;
        self.assignment.move_vm(vm, destination);
        self.vms[vm].on_migrated(&self.pms[destination]);
        self.vms[vm].place_on(destination);

        let event = MigrationEvent {
            seq: self.total_migrations,
            step: self.step,
            vm,
            source,
            destination,
        };
        self.logger.log_row(Series::Migrations, &event.to_record())?;
        self.overload.reset_integrated(source);

        info!(
            "[{:04} at step {:04}] vm {} (migrated {} times) from pm {} to pm {}",
            event.seq,
            event.step,
            vm,
            self.vms[vm].migration_count(),
            source,
            destination
        );
        Ok(event)
    }

    fn log_step(&mut self) -> Result<(), SimulationError> {
        let migrations: Vec<u32> = self.vms.iter().map(|vm| vm.migration_count()).collect();
        self.logger.log_row(Series::PmLoads, &format_row(&self.physical_load))?;
        self.logger.log_row(Series::PmSetPoints, &format_row(&self.set_points))?;
        self.logger
            .log_row(Series::PmRelocationThresholds, &format_row(&self.relocation_thresholds))?;
        self.logger
            .log_row(Series::PmIntegratedOverload, &format_row(self.overload.integrated()))?;
        self.logger
            .log_row(Series::PmWindowOverload, &format_row(self.overload.windowed()))?;
        self.logger.log_row(Series::VmLoads, &format_row(&self.vm_loads))?;
        self.logger.log_row(Series::VmMigrations, &format_row(&migrations))
    }

    /// Spreads the padded total load over PMs proportionally to their cores, clamped to `[1, cores]`.
    fn normalize_set_points(&mut self) {
        let total_cores: f64 = self.pms.iter().map(|pm| pm.cores()).sum();
        let total_load: f64 = self.physical_load.iter().sum();
        self.set_points = self
            .pms
            .iter()
            .map(|pm| {
                let share = total_load * NORMALIZATION_PADDING * (pm.cores() / total_cores);
                share.min(pm.cores()).max(1.)
            })
            .collect();
        trace!("set points renormalized to {:?}", self.set_points);
    }

    /// Flushes buffered log rows.
    pub fn flush(&mut self) -> Result<(), SimulationError> {
        self.logger.flush()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn pms(&self) -> &[PhysicalMachine] {
        &self.pms
    }

    pub fn vms(&self) -> &[VirtualMachine] {
        &self.vms
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn vm_loads(&self) -> &[f64] {
        &self.vm_loads
    }

    pub fn physical_load(&self) -> &[f64] {
        &self.physical_load
    }

    pub fn physical_volume(&self) -> &[f64] {
        &self.physical_volume
    }

    pub fn set_points(&self) -> &[f64] {
        &self.set_points
    }

    pub fn relocation_thresholds(&self) -> &[f64] {
        &self.relocation_thresholds
    }

    pub fn integrated_overload(&self) -> &[f64] {
        self.overload.integrated()
    }

    pub fn window_overload(&self) -> &[f64] {
        self.overload.windowed()
    }

    pub fn total_migrations(&self) -> u64 {
        self.total_migrations
    }
}
