//! Placement of VMs on physical machines.

/// VM to PM assignment.
///
/// Conceptually a boolean VM×PM matrix with exactly one set bit per VM row. It is stored as the host index of every
/// VM, so a VM can never be placed on zero or several hosts.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    hosts: Vec<usize>,
    num_pms: usize,
}

impl Assignment {
    /// Creates assignment from host indices, all of them must be less than `num_pms`.
    pub fn new(hosts: Vec<usize>, num_pms: usize) -> Self {
        debug_assert!(hosts.iter().all(|pm| *pm < num_pms));
        Self { hosts, num_pms }
    }

    pub fn num_vms(&self) -> usize {
        self.hosts.len()
    }

    pub fn num_pms(&self) -> usize {
        self.num_pms
    }

    /// Returns the host of VM.
    pub fn host_of(&self, vm: usize) -> usize {
        self.hosts[vm]
    }

    pub fn is_on(&self, vm: usize, pm: usize) -> bool {
        self.hosts[vm] == pm
    }

    /// Returns VMs hosted on `pm` in ascending order.
    pub fn vms_on(&self, pm: usize) -> Vec<usize> {
        self.hosts
            .iter()
            .enumerate()
            .filter(|(_, host)| **host == pm)
            .map(|(vm, _)| vm)
            .collect()
    }

    /// Returns the matrix row of VM.
    pub fn row(&self, vm: usize) -> Vec<bool> {
        (0..self.num_pms).map(|pm| self.is_on(vm, pm)).collect()
    }

    /// Sums per-VM values by host.
    pub fn project(&self, values: &[f64]) -> Vec<f64> {
        let mut result = vec![0.; self.num_pms];
        for (vm, pm) in self.hosts.iter().enumerate() {
            result[*pm] += values[vm];
        }
        result
    }

    pub(crate) fn move_vm(&mut self, vm: usize, destination: usize) {
        self.hosts[vm] = destination;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_projection() {
        let mut assignment = Assignment::new(vec![0, 0, 2], 3);
        assert_eq!(assignment.row(2), vec![false, false, true]);
        assert_eq!(assignment.vms_on(0), vec![0, 1]);
        assert_eq!(assignment.project(&[1., 2., 4.]), vec![3., 0., 4.]);

        assignment.move_vm(1, 1);
        assert_eq!(assignment.host_of(1), 1);
        assert_eq!(assignment.project(&[1., 2., 4.]), vec![1., 2., 4.]);
        for vm in 0..assignment.num_vms() {
            assert_eq!(assignment.row(vm).iter().filter(|bit| **bit).count(), 1);
        }
    }
}
