//! Scenario descriptions

pub mod scenario;

pub use scenario::{Population, RegionAssignment, Scenario};
