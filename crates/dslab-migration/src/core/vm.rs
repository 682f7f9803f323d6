//! Representation of virtual machine.

use serde::Serialize;

use crate::core::error::SimulationError;
use crate::core::physical_machine::PhysicalMachine;
use crate::core::plan::Plan;
use crate::core::random::RandomSource;

pub const DEFAULT_VM_LOAD: f64 = 4.0;
pub const DEFAULT_VM_MEMORY: f64 = 1.0;

const SATURATION_EPSILON: f64 = 0.001;
const MIN_ACTUAL_LOAD: f64 = 0.01;
const LOAD_MEAN_FACTOR: f64 = 0.75;
const LOAD_VARIANCE: f64 = 0.25;

/// Represents virtual machine (VM).
///
// VM is characterized by its plan, nominal load and memory. The actual load is redrawn on every simulation step
// around 75% of the nominal load. Host assignment and migration count are changed only by the migration manager.
#[derive(Clone, Debug, Serialize)]
pub struct VirtualMachine {
    plan: Plan,
    load_nominal: f64,
    memory_nominal: f64,
    load_actual: f64,
    memory_actual: f64,
    volume_actual: f64,
    volume_nominal_sandpiper: f64,
    migration_count: u32,
    current_pm: usize,
}

impl VirtualMachine {
    /// Creates VM placed on the physical machine `pm` with index `pm_index`.
    pub fn new(
        pm_index: usize,
        pm: &PhysicalMachine,
        plan: Plan,
        load_nominal: f64,
        memory_nominal: f64,
    ) -> Result<Self, SimulationError> {
        if !(load_nominal > 0.) {
            return Err(SimulationError::invalid(format!(
                "virtual machine needs to have a positive nominal load, got {}",
                load_nominal
            )));
        }
        if !(memory_nominal >= 0.) {
            return Err(SimulationError::invalid(format!(
                "virtual machine can't have negative nominal memory, got {}",
                memory_nominal
            )));
        }
        let mut vm = Self {
            plan,
            load_nominal,
            memory_nominal,
            load_actual: 0.,
            memory_actual: 0.,
            volume_actual: 0.,
            volume_nominal_sandpiper: 0.,
            migration_count: 0,
            current_pm: pm_index,
        };
        vm.compute_volume_sandpiper(pm);
        Ok(vm)
    }

    fn compute_volume_sandpiper(&mut self, pm: &PhysicalMachine) {
        let cpu_diff = (pm.cores() - self.load_nominal).max(SATURATION_EPSILON);
        let memory_diff = (pm.memory() - self.memory_nominal).max(SATURATION_EPSILON);
        self.volume_nominal_sandpiper = pm.cores() / cpu_diff * pm.memory() / memory_diff;
    }

    /// Draws the actual load for the next simulation step.
    pub fn step_load(&mut self, rand: &mut dyn RandomSource) {
        let sample = rand.gaussian(LOAD_MEAN_FACTOR * self.load_nominal, LOAD_VARIANCE.sqrt());
        self.load_actual = sample.max(MIN_ACTUAL_LOAD);
        self.memory_actual = self.memory_nominal;
        self.volume_actual = self.load_actual * self.memory_actual;
    }

    /// Updates VM state after it was migrated to `pm`. Does not change the host index, see [`Self::place_on`].
    pub fn on_migrated(&mut self, pm: &PhysicalMachine) {
        self.compute_volume_sandpiper(pm);
        self.migration_count += 1;
    }

    /// Sets the index of the host.
    pub fn place_on(&mut self, pm_index: usize) {
        self.current_pm = pm_index;
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn load_nominal(&self) -> f64 {
        self.load_nominal
    }

    pub fn memory_nominal(&self) -> f64 {
        self.memory_nominal
    }

    pub fn load_actual(&self) -> f64 {
        self.load_actual
    }

    pub fn memory_actual(&self) -> f64 {
        self.memory_actual
    }

    pub fn volume_actual(&self) -> f64 {
        self.volume_actual
    }

    pub fn volume_nominal(&self) -> f64 {
        self.load_nominal * self.memory_nominal
    }

    /// Nominal volume scaled by how close the VM brings its host to saturation.
    pub fn volume_nominal_sandpiper(&self) -> f64 {
        self.volume_nominal_sandpiper
    }

    pub fn migration_count(&self) -> u32 {
        self.migration_count
    }

    pub fn current_pm(&self) -> usize {
        self.current_pm
    }

    /// Sandpiper volume per unit of memory. Infinite for VMs without memory.
    pub fn volume_to_size_ratio(&self) -> f64 {
        self.volume_nominal_sandpiper / self.memory_nominal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::PcgRandomSource;

    fn pm(cores: f64) -> PhysicalMachine {
        PhysicalMachine::with_cores(cores).unwrap()
    }

    #[test]
    fn sandpiper_volume() {
        let vm = VirtualMachine::new(0, &pm(8.), Plan::Gold, 2., 1.).unwrap();
        // 8 / 6 * 100 / 99
        assert!((vm.volume_nominal_sandpiper() - 8. / 6. * 100. / 99.).abs() < 1e-12);
        assert_eq!(vm.volume_to_size_ratio(), vm.volume_nominal_sandpiper());
        assert_eq!(vm.volume_nominal(), 2.);
    }

    #[test]
    fn sandpiper_volume_saturated_host() {
        let vm = VirtualMachine::new(0, &pm(4.), Plan::Basic, 4., 1.).unwrap();
        assert!((vm.volume_nominal_sandpiper() - 4. / 0.001 * 100. / 99.).abs() < 1e-6);
    }

    #[test]
    fn invalid_load() {
        assert!(VirtualMachine::new(0, &pm(8.), Plan::Basic, 0., 1.).is_err());
        assert!(VirtualMachine::new(0, &pm(8.), Plan::Basic, -2., 1.).is_err());
        assert!(VirtualMachine::new(0, &pm(8.), Plan::Basic, 2., -1.).is_err());
    }

    #[test]
    fn step_load_lower_bound() {
        let mut rand = PcgRandomSource::new(7);
        let mut vm = VirtualMachine::new(0, &pm(8.), Plan::Basic, 0.001, 2.).unwrap();
        for _ in 0..50 {
            vm.step_load(&mut rand);
            assert!(vm.load_actual() >= 0.01);
            assert_eq!(vm.memory_actual(), 2.);
            assert_eq!(vm.volume_actual(), vm.load_actual() * 2.);
        }
    }

    #[test]
    fn migration_updates_counter_only() {
        let mut vm = VirtualMachine::new(0, &pm(8.), Plan::Silver, 4., 1.).unwrap();
        let before = vm.volume_nominal_sandpiper();
        vm.on_migrated(&pm(16.));
        assert_eq!(vm.migration_count(), 1);
        assert_eq!(vm.current_pm(), 0);
        assert!(vm.volume_nominal_sandpiper() < before);
        vm.place_on(2);
        assert_eq!(vm.current_pm(), 2);
    }
}
