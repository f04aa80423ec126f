//! Minimal world for exercising single animals in unit tests

use rand::SeedableRng;

use crate::core::config::SimulationConfig;
use crate::core::types::{AnimalId, SimRng};
use crate::entity::animal::{Animal, UpdateContext};
use crate::entity::store::AnimalStore;
use crate::spatial::region_manager::RegionManager;

pub(crate) struct World {
    pub regions: RegionManager,
    pub animals: AnimalStore,
    pub rng: SimRng,
    pub config: SimulationConfig,
}

impl World {
    pub fn new() -> Self {
        Self {
            regions: RegionManager::new(800, 600, 20, 15).unwrap(),
            animals: AnimalStore::new(),
            rng: SimRng::seed_from_u64(11),
            config: SimulationConfig::default(),
        }
    }

    pub fn add(&mut self, animal: Animal) -> AnimalId {
        let id = self.animals.insert(animal);
        if let Some(a) = self.animals.get_mut(id) {
            self.regions.register_animal(a, &mut self.rng);
        }
        id
    }

    /// Update one animal the way the simulator does
    pub fn step(&mut self, id: AnimalId, dt: f64) {
        let Some(mut animal) = self.animals.take(id) else {
            return;
        };
        let mut ctx = UpdateContext {
            regions: &mut self.regions,
            animals: &mut self.animals,
            rng: &mut self.rng,
            config: &self.config,
        };
        animal.update(dt, &mut ctx);
        self.regions.update_animal_region(&animal);
        self.animals.restore(animal);
    }
}
