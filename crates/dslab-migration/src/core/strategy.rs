//! Migration strategies.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;
use sugars::boxed;

use crate::core::assignment::Assignment;
use crate::core::common::MigrationPlan;
use crate::core::error::SimulationError;
use crate::core::physical_machine::PhysicalMachine;
use crate::core::random::RandomSource;
use crate::core::strategies::load_aware::LoadAware;
use crate::core::strategies::migration_likelihood::MigrationLikelihood;
use crate::core::strategies::random::RandomMigration;
use crate::core::strategies::sandpiper::{Sandpiper, SandpiperParams};
use crate::core::vm::VirtualMachine;

/// Read-only view of the cluster passed to strategies on every step.
pub struct ClusterState<'a> {
    pub step: u64,
    pub pms: &'a [PhysicalMachine],
    pub vms: &'a [VirtualMachine],
    pub assignment: &'a Assignment,
    pub physical_load: &'a [f64],
    pub physical_volume: &'a [f64],
    pub set_points: &'a [f64],
    pub relocation_thresholds: &'a [f64],
    pub integrated_overload: &'a [f64],
    pub window_overload: &'a [f64],
}

/// Overload index used to detect migration sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverloadSignal {
    Integrated,
    Windowed,
}

impl<'a> ClusterState<'a> {
    /// Returns PMs whose overload index exceeds the relocation threshold.
    pub fn overloaded_pms(&self, signal: OverloadSignal) -> Vec<usize> {
        let index = match signal {
            OverloadSignal::Integrated => self.integrated_overload,
            OverloadSignal::Windowed => self.window_overload,
        };
        (0..self.pms.len())
            .filter(|pm| index[*pm] > self.relocation_thresholds[*pm])
            .collect()
    }

    /// Returns PM volume not consumed by the actual volume of hosted VMs.
    pub fn available_volume(&self) -> Vec<f64> {
        self.pms
            .iter()
            .zip(self.physical_volume)
            .map(|(pm, used)| pm.volume() - used)
            .collect()
    }
}

/// Trait for implementation of migration strategies.
///
/// The strategy inspects the cluster state and returns at most one migration, which is then performed by the
/// manager. Returning `None` means no migration on this step, which is also the outcome of degenerate situations
/// like the absence of a suitable destination.
pub trait MigrationStrategy {
    fn decide(&mut self, state: &ClusterState, rand: &mut dyn RandomSource) -> Option<MigrationPlan>;
}

/// Names of available strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Random,
    LoadAware,
    LoadAwareWoi,
    MigrationLikelihood,
    MigrationLikelihoodWoi,
    Sandpiper,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Random,
        StrategyKind::LoadAware,
        StrategyKind::LoadAwareWoi,
        StrategyKind::MigrationLikelihood,
        StrategyKind::MigrationLikelihoodWoi,
        StrategyKind::Sandpiper,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Random => "random",
            StrategyKind::LoadAware => "load_aware",
            StrategyKind::LoadAwareWoi => "load_aware_woi",
            StrategyKind::MigrationLikelihood => "migration_likelihood",
            StrategyKind::MigrationLikelihoodWoi => "migration_likelihood_woi",
            StrategyKind::Sandpiper => "sandpiper",
        }
    }
}

impl Default for StrategyKind {
    fn default() -> Self {
        StrategyKind::Random
    }
}

impl FromStr for StrategyKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .iter()
            .find(|kind| kind.name() == s)
            .copied()
            .ok_or_else(|| SimulationError::invalid(format!("unsupported migration algorithm {}", s)))
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Creates strategy instance for a cluster of `num_pms` physical machines.
pub fn strategy_resolver(kind: StrategyKind, num_pms: usize, sandpiper: SandpiperParams) -> Box<dyn MigrationStrategy> {
    match kind {
        StrategyKind::Random => boxed!(RandomMigration::new()),
        StrategyKind::LoadAware => boxed!(LoadAware::new()),
        StrategyKind::LoadAwareWoi => boxed!(LoadAware::windowed()),
        StrategyKind::MigrationLikelihood => boxed!(MigrationLikelihood::new()),
        StrategyKind::MigrationLikelihoodWoi => boxed!(MigrationLikelihood::windowed()),
        StrategyKind::Sandpiper => boxed!(Sandpiper::new(num_pms, sandpiper)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
        }
        assert!(matches!(
            "round_robin".parse::<StrategyKind>(),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }
}
