//! Load aware migration.

use log::debug;

use crate::core::common::MigrationPlan;
use crate::core::random::RandomSource;
use crate::core::strategy::{ClusterState, MigrationStrategy, OverloadSignal};

/// Picks a random overloaded PM, then jointly selects the hosted VM and the destination which leave the most
/// volume available on the destination after the move. Destinations without room for the VM are not eligible.
pub struct LoadAware {
    signal: OverloadSignal,
}

impl LoadAware {
    /// Detects overload by the integrated index.
    pub fn new() -> Self {
        Self {
            signal: OverloadSignal::Integrated,
        }
    }

    /// Detects overload by the windowed index.
    pub fn windowed() -> Self {
        Self {
            signal: OverloadSignal::Windowed,
        }
    }
}

impl Default for LoadAware {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationStrategy for LoadAware {
    fn decide(&mut self, state: &ClusterState, rand: &mut dyn RandomSource) -> Option<MigrationPlan> {
        let sources = state.overloaded_pms(self.signal);
        if sources.is_empty() {
            return None;
        }
        let source = sources[rand.choose_index(sources.len())];
        let available = state.available_volume();

        // (remaining volume, vm, destination)
        let mut best: Option<(f64, usize, usize)> = None;
        for vm in state.assignment.vms_on(source) {
            let volume = state.vms[vm].volume_actual();
            for (destination, free) in available.iter().enumerate() {
                if destination == source {
                    continue;
                }
                let remaining = free - volume;
                if remaining.is_nan() || remaining < 0. {
                    continue;
                }
                if best.map_or(true, |(value, _, _)| remaining > value) {
                    best = Some((remaining, vm, destination));
                }
            }
        }

        match best {
            Some((_, vm, destination)) => Some(MigrationPlan { vm, source, destination }),
            None => {
                debug!("no pm has enough volume to accept a vm from pm {}", source);
                None
            }
        }
    }
}
