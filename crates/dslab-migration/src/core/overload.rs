//! Per-PM overload indices.

use std::collections::VecDeque;

pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Tracks integrated and windowed overload indices of physical machines.
#[derive(Clone, Debug)]
pub struct OverloadIndices {
    integrated: Vec<f64>,
    window: Vec<VecDeque<f64>>,
    windowed: Vec<f64>,
}

impl OverloadIndices {
    pub fn new(num_pms: usize, window_size: usize) -> Self {
        Self {
            integrated: vec![0.; num_pms],
            window: vec![VecDeque::from(vec![0.; window_size]); num_pms],
            windowed: vec![0.; num_pms],
        }
    }

    /// Accounts the load of the current step.
    ///
    /// The integrated index grows by the positive part of the load error normalized by the load itself, PMs
    /// without load contribute zero. The windowed index is the sum of raw load errors over the last steps.
    pub fn update(&mut self, load: &[f64], set_points: &[f64]) {
        for pm in 0..self.integrated.len() {
            let error = load[pm] - set_points[pm];
            let normalized = if load[pm] != 0. { error / load[pm] } else { 0. };
            if normalized > 0. {
                self.integrated[pm] += normalized;
            }

            let window = &mut self.window[pm];
            window.pop_back();
            window.push_front(error);
            self.windowed[pm] = window.iter().sum();
        }
    }

    /// Resets the integrated index of PM which was just selected as a migration source.
    pub fn reset_integrated(&mut self, pm: usize) {
        self.integrated[pm] = 0.;
    }

    pub fn integrated(&self) -> &[f64] {
        &self.integrated
    }

    pub fn windowed(&self) -> &[f64] {
        &self.windowed
    }
}
