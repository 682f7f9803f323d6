//! Service plans of virtual machines.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::core::error::SimulationError;

/// Quality-of-service tier of a VM, affects the migration cost weighting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Gold,
    Silver,
    Bronze,
    #[default]
    Basic,
}

impl Plan {
    /// Returns the plan coefficient used by migration strategies.
    pub fn coefficient(&self) -> f64 {
        match self {
            Plan::Gold => 2.0,
            Plan::Silver => 1.5,
            Plan::Bronze => 1.2,
            Plan::Basic => 1.0,
        }
    }
}

impl FromStr for Plan {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gold" => Ok(Plan::Gold),
            "silver" => Ok(Plan::Silver),
            "bronze" => Ok(Plan::Bronze),
            "basic" => Ok(Plan::Basic),
            _ => Err(SimulationError::invalid(format!("plan {} is unavailable", s))),
        }
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Plan::Gold => write!(f, "gold"),
            Plan::Silver => write!(f, "silver"),
            Plan::Bronze => write!(f, "bronze"),
            Plan::Basic => write!(f, "basic"),
        }
    }
}
