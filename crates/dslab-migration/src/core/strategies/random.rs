//! Random migration.

use log::debug;

use crate::core::common::{argmin, MigrationPlan};
use crate::core::random::RandomSource;
use crate::core::strategy::{ClusterState, MigrationStrategy, OverloadSignal};

/// Moves a random VM from a random overloaded PM to the least loaded other PM.
#[derive(Default)]
pub struct RandomMigration;

impl RandomMigration {
    pub fn new() -> Self {
        Self {}
    }
}

impl MigrationStrategy for RandomMigration {
    fn decide(&mut self, state: &ClusterState, rand: &mut dyn RandomSource) -> Option<MigrationPlan> {
        let sources = state.overloaded_pms(OverloadSignal::Integrated);
        if sources.is_empty() {
            return None;
        }
        let source = sources[rand.choose_index(sources.len())];
        let vms = state.assignment.vms_on(source);
        if vms.is_empty() {
            debug!("overloaded pm {} hosts no vms", source);
            return None;
        }
        let vm = vms[rand.choose_index(vms.len())];

        let loads = state
            .physical_load
            .iter()
            .enumerate()
            .map(|(pm, load)| (pm != source).then(|| *load));
        match argmin(loads) {
            Some(destination) => Some(MigrationPlan { vm, source, destination }),
            None => {
                debug!("no destination to migrate vm {} from pm {}", vm, source);
                None
            }
        }
    }
}
