pub mod animal;
pub mod selection;
pub mod sheep;
pub mod store;
pub mod wolf;

#[cfg(test)]
pub(crate) mod testing;

pub use animal::{Animal, AnimalInfo, AnimalState, Species, SpeciesKind, UpdateContext};
pub use selection::{SelectionStrategy, StrategyHandle};
pub use store::AnimalStore;
