//! Migration likelihood.

use log::debug;

use crate::core::common::{argmax, argmin, MigrationPlan};
use crate::core::random::RandomSource;
use crate::core::strategy::{ClusterState, MigrationStrategy, OverloadSignal};

/// Selects the VM with the lowest migration cost among all VMs on overloaded PMs.
///
/// The cost of VM with plan coefficient `c` is `-(volume + available volume of its host) / c + w * c * migrations`,
/// so cheap plans on crowded hosts move first, while VMs migrated many times are penalized. The destination is the
/// other PM with the most available volume.
pub struct MigrationLikelihood {
    signal: OverloadSignal,
    migration_weight: f64,
}

impl MigrationLikelihood {
    /// Integrated index trigger, migration count weighted by 10.
    pub fn new() -> Self {
        Self {
            signal: OverloadSignal::Integrated,
            migration_weight: 10.,
        }
    }

    /// Windowed index trigger, unweighted migration count.
    pub fn windowed() -> Self {
        Self {
            signal: OverloadSignal::Windowed,
            migration_weight: 1.,
        }
    }
}

impl Default for MigrationLikelihood {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationStrategy for MigrationLikelihood {
    fn decide(&mut self, state: &ClusterState, _rand: &mut dyn RandomSource) -> Option<MigrationPlan> {
        let sources = state.overloaded_pms(self.signal);
        if sources.is_empty() {
            return None;
        }
        let mut candidates: Vec<usize> = sources.iter().flat_map(|pm| state.assignment.vms_on(*pm)).collect();
        candidates.sort_unstable();
        let available = state.available_volume();

        let costs = candidates.iter().map(|vm| {
            let vm = &state.vms[*vm];
            let c = vm.plan().coefficient();
            let host_available = available[vm.current_pm()];
            Some(-1. / c * (vm.volume_actual() + host_available) + c * self.migration_weight * vm.migration_count() as f64)
        });
        let vm = match argmin(costs) {
            Some(i) => candidates[i],
            None => {
                debug!("overloaded pms {:?} host no vms", sources);
                return None;
            }
        };

        let source = state.assignment.host_of(vm);
        let free = available
            .iter()
            .enumerate()
            .map(|(pm, free)| (pm != source).then(|| *free));
        match argmax(free) {
            Some(destination) => Some(MigrationPlan { vm, source, destination }),
            None => {
                debug!("no destination to migrate vm {} from pm {}", vm, source);
                None
            }
        }
    }
}
