//! Implementations of migration strategies.

pub mod load_aware;
pub mod migration_likelihood;
pub mod random;
pub mod sandpiper;
