//! Physical machine.

use serde::Serialize;

use crate::core::error::SimulationError;

pub const DEFAULT_PM_MEMORY: f64 = 100.;

/// Fixed-capacity host. Its identity is the index in the fleet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhysicalMachine {
    cores: f64,
    memory: f64,
}

impl PhysicalMachine {
    /// Creates physical machine, both capacities must be positive.
    pub fn new(cores: f64, memory: f64) -> Result<Self, SimulationError> {
        if !(cores > 0.) {
            return Err(SimulationError::invalid(format!(
                "physical machine needs to have some cores, got {}",
                cores
            )));
        }
        if !(memory > 0.) {
            return Err(SimulationError::invalid(format!(
                "physical machine needs to have some memory, got {}",
                memory
            )));
        }
        Ok(Self { cores, memory })
    }

    /// Creates physical machine with the default amount of memory.
    pub fn with_cores(cores: f64) -> Result<Self, SimulationError> {
        Self::new(cores, DEFAULT_PM_MEMORY)
    }

    pub fn cores(&self) -> f64 {
        self.cores
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    /// Composite capacity, cores times memory.
    pub fn volume(&self) -> f64 {
        self.cores * self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume() {
        let pm = PhysicalMachine::new(8., 100.).unwrap();
        assert_eq!(pm.volume(), 800.);
        assert_eq!(PhysicalMachine::with_cores(16.).unwrap().memory(), 100.);
    }

    #[test]
    fn non_positive_capacity() {
        assert!(PhysicalMachine::new(0., 100.).is_err());
        assert!(PhysicalMachine::new(8., -1.).is_err());
        assert!(PhysicalMachine::new(f64::NAN, 1.).is_err());
    }
}
