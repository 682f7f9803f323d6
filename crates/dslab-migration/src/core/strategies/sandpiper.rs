//! Sandpiper.

use std::collections::VecDeque;

use log::debug;

use crate::core::common::{argmax, argmin, MigrationPlan};
use crate::core::random::RandomSource;
use crate::core::strategy::{ClusterState, MigrationStrategy};

const SATURATION_EPSILON: f64 = 0.001;

/// Hotspot detection parameters: migrate when at least `k` of the last `n` steps were overloaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SandpiperParams {
    pub n: usize,
    pub k: usize,
}

impl Default for SandpiperParams {
    fn default() -> Self {
        Self { n: 5, k: 3 }
    }
}

/// Online mean and variance based predictor of PM load.
#[derive(Clone, Debug)]
pub struct LoadPredictor {
    mu: Vec<f64>,
    sigma: Vec<f64>,
    sum: Vec<f64>,
    sum_squares: Vec<f64>,
}

impl LoadPredictor {
    pub fn new(num_pms: usize) -> Self {
        Self {
            mu: vec![0.; num_pms],
            sigma: vec![0.; num_pms],
            sum: vec![0.; num_pms],
            sum_squares: vec![0.; num_pms],
        }
    }

    /// Accounts loads observed on `step` and returns the predicted loads.
    pub fn update(&mut self, step: u64, load: &[f64]) -> Vec<f64> {
        let t = step as f64;
        let mut predicted = Vec::with_capacity(load.len());
        for pm in 0..load.len() {
            self.mu[pm] = (self.mu[pm] * t + load[pm]) / (t + 1.);
            self.sum[pm] += load[pm];
            self.sum_squares[pm] += load[pm] * load[pm];
            if step > 1 {
                self.sigma[pm] = (self.sum_squares[pm] - self.sum[pm] * self.sum[pm] / t) / (t - 1.);
            }
            predicted.push(self.mu[pm] + self.sigma[pm] * (load[pm] - self.mu[pm]));
        }
        predicted
    }

    pub fn mu(&self) -> &[f64] {
        &self.mu
    }

    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }
}

/// Sandpiper hotspot mitigation.
///
/// A PM is a hotspot when the nominal load of its VMs exceeds the set point. Migration is attempted when hotspots
/// persisted for at least `k` of the last `n` steps and the predicted load exceeds the set point somewhere. The VM
/// with the highest volume to size ratio moves from a random hotspot to the least saturated other PM.
pub struct Sandpiper {
    params: SandpiperParams,
    predictor: LoadPredictor,
    history: VecDeque<bool>,
}

impl Sandpiper {
    pub fn new(num_pms: usize, params: SandpiperParams) -> Self {
        Self {
            params,
            predictor: LoadPredictor::new(num_pms),
            history: VecDeque::from(vec![false; params.n]),
        }
    }

    /// Returns the number of overloaded steps in the history window.
    pub fn overloaded_steps(&self) -> usize {
        self.history.iter().filter(|overloaded| **overloaded).count()
    }

    pub fn predictor(&self) -> &LoadPredictor {
        &self.predictor
    }

    fn record(&mut self, overloaded: bool) {
        if self.history.is_empty() {
            return;
        }
        self.history.pop_back();
        self.history.push_front(overloaded);
    }
}

impl MigrationStrategy for Sandpiper {
    fn decide(&mut self, state: &ClusterState, rand: &mut dyn RandomSource) -> Option<MigrationPlan> {
        let predicted = self.predictor.update(state.step, state.physical_load);

        let nominal_loads: Vec<f64> = state.vms.iter().map(|vm| vm.load_nominal()).collect();
        let nominal_load = state.assignment.project(&nominal_loads);
        let hotspots: Vec<usize> = (0..state.pms.len())
            .filter(|pm| nominal_load[*pm] > state.set_points[*pm])
            .collect();
        self.record(!hotspots.is_empty());

        let predicted_overload = predicted.iter().zip(state.set_points).any(|(y, set_point)| y > set_point);
        if self.overloaded_steps() < self.params.k || !predicted_overload {
            return None;
        }
        if hotspots.is_empty() {
            debug!("hotspot history is full but no pm is a hotspot now");
            return None;
        }

        let source = hotspots[rand.choose_index(hotspots.len())];
        let vms = state.assignment.vms_on(source);
        let vm = vms[argmax(vms.iter().map(|vm| Some(state.vms[*vm].volume_to_size_ratio())))?];

        let nominal_memories: Vec<f64> = state.vms.iter().map(|vm| vm.memory_nominal()).collect();
        let nominal_memory = state.assignment.project(&nominal_memories);
        let saturation = state.pms.iter().enumerate().map(|(pm, machine)| {
            if pm == source {
                return None;
            }
            let core_comp = machine.cores() / (machine.cores() - nominal_load[pm]).max(SATURATION_EPSILON);
            let memory_comp = machine.memory() / (machine.memory() - nominal_memory[pm]).max(SATURATION_EPSILON);
            Some(core_comp * memory_comp)
        });
        let destination = match argmin(saturation) {
            Some(destination) => destination,
            None => {
                debug!("no destination to migrate vm {} from pm {}", vm, source);
                return None;
            }
        };

        self.history.iter_mut().for_each(|overloaded| *overloaded = false);
        Some(MigrationPlan { vm, source, destination })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predictor_mean_and_variance() {
        let mut predictor = LoadPredictor::new(1);
        assert_eq!(predictor.update(0, &[2.]), vec![2.]);
        predictor.update(1, &[4.]);
        assert_eq!(predictor.mu(), &[3.]);
        assert_eq!(predictor.sigma(), &[0.]);
        predictor.update(2, &[6.]);
        assert_eq!(predictor.mu(), &[4.]);
        // (4 + 16 + 36 - 144 / 2) / 1
        assert_eq!(predictor.sigma(), &[-16.]);
    }
}
