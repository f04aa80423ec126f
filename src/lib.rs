//! Ecosim - grid-based predator/prey ecosystem simulation

pub mod control;
pub mod core;
pub mod entity;
pub mod factory;
pub mod simulation;
pub mod spatial;
pub mod world;
