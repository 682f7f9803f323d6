//! Simulation model and migration decision engine.

pub mod assignment;
pub mod common;
pub mod config;
pub mod error;
pub mod logger;
pub mod migration_manager;
pub mod overload;
pub mod physical_machine;
pub mod plan;
pub mod random;
pub mod strategies;
pub mod strategy;
pub mod vm;
