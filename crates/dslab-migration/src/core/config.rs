//! Simulation configuration.

use serde::{Deserialize, Serialize};

use crate::core::error::SimulationError;
use crate::core::migration_manager::ManagerConfig;
use crate::core::overload::DEFAULT_WINDOW_SIZE;
use crate::core::physical_machine::{PhysicalMachine, DEFAULT_PM_MEMORY};
use crate::core::plan::Plan;
use crate::core::random::DEFAULT_SEED;
use crate::core::strategies::sandpiper::SandpiperParams;
use crate::core::vm::{VirtualMachine, DEFAULT_VM_LOAD, DEFAULT_VM_MEMORY};

/// Holds raw simulation config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawSimulationConfig {
    pub strategy: Option<String>,
    pub normalization_period: Option<u64>,
    pub outdir: Option<String>,
    pub steps: Option<u64>,
    pub seed: Option<u64>,
    pub target_utilization: Option<f64>,
    pub target_relocation: Option<f64>,
    pub window_size: Option<usize>,
    pub sandpiper_n: Option<usize>,
    pub sandpiper_k: Option<usize>,
    pub hosts: Option<Vec<HostConfig>>,
    pub vms: Option<Vec<VmConfig>>,
}

/// Holds configuration of a single physical machine or a set of identical machines.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct HostConfig {
    /// Number of cores.
    pub cores: f64,
    /// Memory capacity.
    #[serde(default = "default_pm_memory")]
    pub memory: f64,
    /// Number of such machines.
    pub count: Option<u32>,
}

/// Holds configuration of a single virtual machine or a set of identical machines.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct VmConfig {
    /// Plan name.
    #[serde(default = "default_plan")]
    pub plan: String,
    /// Nominal load in cores.
    #[serde(default = "default_vm_load")]
    pub load: f64,
    /// Nominal memory.
    #[serde(default = "default_vm_memory")]
    pub memory: f64,
    /// Index of initial host.
    #[serde(default)]
    pub host: usize,
    /// Number of such machines.
    pub count: Option<u32>,
}

fn default_pm_memory() -> f64 {
    DEFAULT_PM_MEMORY
}

fn default_plan() -> String {
    Plan::default().to_string()
}

fn default_vm_load() -> f64 {
    DEFAULT_VM_LOAD
}

fn default_vm_memory() -> f64 {
    DEFAULT_VM_MEMORY
}

impl HostConfig {
    pub fn new(cores: f64, count: u32) -> Self {
        Self {
            cores,
            memory: DEFAULT_PM_MEMORY,
            count: Some(count),
        }
    }
}

impl VmConfig {
    pub fn new(plan: Plan, load: f64, count: u32) -> Self {
        Self {
            plan: plan.to_string(),
            load,
            memory: DEFAULT_VM_MEMORY,
            host: 0,
            count: Some(count),
        }
    }
}

/// Represents simulation configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Migration strategy name.
    pub strategy: String,
    /// Period in steps of set point renormalization, 0 if inactive.
    pub normalization_period: u64,
    /// Destination folder for logs.
    pub outdir: String,
    /// Number of simulation steps.
    pub steps: u64,
    /// Seed of the random source.
    pub seed: u64,
    /// Initial set point as a fraction of PM cores.
    pub target_utilization: f64,
    /// Relocation threshold as a fraction of PM cores.
    pub target_relocation: f64,
    /// Length of the windowed overload index.
    pub window_size: usize,
    /// Length of sandpiper hotspot history.
    pub sandpiper_n: usize,
    /// Number of overloaded steps in sandpiper history which trigger migration.
    pub sandpiper_k: usize,
    /// Configurations of physical machines.
    pub hosts: Vec<HostConfig>,
    /// Configurations of virtual machines.
    pub vms: Vec<VmConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::from_raw(RawSimulationConfig {
            strategy: None,
            normalization_period: None,
            outdir: None,
            steps: None,
            seed: None,
            target_utilization: None,
            target_relocation: None,
            window_size: None,
            sandpiper_n: None,
            sandpiper_k: None,
            hosts: None,
            vms: None,
        })
    }
}

impl SimulationConfig {
    /// Creates simulation config by reading parameter values from YAML file
    /// (uses default values if some parameters are absent).
    pub fn from_file(file_name: &str) -> Result<Self, SimulationError> {
        Self::from_str(&std::fs::read_to_string(file_name)?)
    }

    /// Creates simulation config from YAML string.
    pub fn from_str(yaml: &str) -> Result<Self, SimulationError> {
        let raw: RawSimulationConfig = serde_yaml::from_str(yaml)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawSimulationConfig) -> Self {
        let sandpiper = SandpiperParams::default();
        Self {
            strategy: raw.strategy.unwrap_or_else(|| "random".to_string()),
            normalization_period: raw.normalization_period.unwrap_or(0),
            outdir: raw.outdir.unwrap_or_else(|| "results".to_string()),
            steps: raw.steps.unwrap_or(500),
            seed: raw.seed.unwrap_or(DEFAULT_SEED),
            target_utilization: raw.target_utilization.unwrap_or(0.75),
            target_relocation: raw.target_relocation.unwrap_or(1.1),
            window_size: raw.window_size.unwrap_or(DEFAULT_WINDOW_SIZE),
            sandpiper_n: raw.sandpiper_n.unwrap_or(sandpiper.n),
            sandpiper_k: raw.sandpiper_k.unwrap_or(sandpiper.k),
            hosts: raw.hosts.unwrap_or_default(),
            vms: raw.vms.unwrap_or_default(),
        }
    }

    /// Three 8-core machines and eight VMs, all starting on the first machine.
    pub fn small() -> Self {
        Self {
            hosts: vec![HostConfig::new(8., 3)],
            vms: vec![
                VmConfig::new(Plan::Gold, 2., 2),
                VmConfig::new(Plan::Silver, 2., 1),
                VmConfig::new(Plan::Silver, 4., 2),
                VmConfig::new(Plan::Basic, 4., 3),
            ],
            ..Default::default()
        }
    }

    /// 250 16-core machines and 1000 VMs, all starting on the first machine.
    pub fn large() -> Self {
        Self {
            hosts: vec![HostConfig::new(16., 250)],
            vms: vec![
                VmConfig::new(Plan::Gold, 4., 30),
                VmConfig::new(Plan::Silver, 4., 70),
                VmConfig::new(Plan::Bronze, 4., 100),
                VmConfig::new(Plan::Basic, 4., 800),
            ],
            ..Default::default()
        }
    }

    /// Returns the migration manager parameters.
    pub fn manager_config(&self) -> Result<ManagerConfig, SimulationError> {
        Ok(ManagerConfig {
            strategy: self.strategy.parse()?,
            normalization_period: self.normalization_period,
            target_utilization: self.target_utilization,
            target_relocation: self.target_relocation,
            window_size: self.window_size,
            sandpiper: SandpiperParams {
                n: self.sandpiper_n,
                k: self.sandpiper_k,
            },
        })
    }

    /// Builds physical and virtual machines described by the config.
    pub fn build_fleet(&self) -> Result<(Vec<PhysicalMachine>, Vec<VirtualMachine>), SimulationError> {
        let mut pms = Vec::new();
        for host in &self.hosts {
            for _ in 0..host.count.unwrap_or(1) {
                pms.push(PhysicalMachine::new(host.cores, host.memory)?);
            }
        }
        if pms.is_empty() {
            return Err(SimulationError::invalid("define at least one physical machine"));
        }

        let mut vms = Vec::new();
        for vm in &self.vms {
            let plan: Plan = vm.plan.parse()?;
            let pm = pms.get(vm.host).ok_or_else(|| {
                SimulationError::invalid(format!("vm host {} is out of {} pms", vm.host, pms.len()))
            })?;
            for _ in 0..vm.count.unwrap_or(1) {
                vms.push(VirtualMachine::new(vm.host, pm, plan, vm.load, vm.memory)?);
            }
        }
        Ok((pms, vms))
    }
}
