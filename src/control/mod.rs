//! Scenario-level driver around the simulator

pub mod controller;

pub use controller::Controller;
