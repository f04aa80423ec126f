//! The simulation driver
//!
//! Each `advance(dt)`:
//!   1. Moves the clock forward
//!   2. Sweeps animals that died during the previous tick
//!   3. Updates every live animal in insertion order and re-indexes it
//!   4. Updates every region once
//!   5. Adds the offspring delivered during the tick
//!   6. Notifies observers

use rand::SeedableRng;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{AnimalId, SimRng};
use crate::entity::animal::{Animal, AnimalInfo, UpdateContext};
use crate::entity::store::AnimalStore;
use crate::factory::{EntitySpec, Factories};
use crate::simulation::events::{MapInfo, ObserverId, SimEvent, SimObserver};
use crate::simulation::snapshot::WorldSnapshot;
use crate::spatial::region::Region;
use crate::spatial::region_manager::{RegionManager, WorldDims};

pub struct Simulator {
    time: f64,
    config: SimulationConfig,
    regions: RegionManager,
    animals: AnimalStore,
    rng: SimRng,
    factories: Factories,
    observers: Vec<(ObserverId, Box<dyn SimObserver>)>,
    next_observer: u64,
}

impl Simulator {
    pub fn new(world: WorldDims, config: SimulationConfig, factories: Factories) -> Result<Self> {
        config.validate()?;
        let regions = RegionManager::from_dims(world, config.food)?;
        let rng = SimRng::seed_from_u64(config.seed);
        Ok(Self {
            time: 0.0,
            config,
            regions,
            animals: AnimalStore::new(),
            rng,
            factories,
            observers: Vec::new(),
            next_observer: 0,
        })
    }

    /// Default tuning and the built-in factories
    pub fn with_defaults(world: WorldDims) -> Result<Self> {
        Self::new(world, SimulationConfig::default(), Factories::standard())
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn factories(&self) -> &Factories {
        &self.factories
    }

    pub fn region_manager(&self) -> &RegionManager {
        &self.regions
    }

    pub fn map_info(&self) -> MapInfo {
        self.regions.map_info()
    }

    /// Animals in insertion order
    pub fn animals(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.animals.iter()
    }

    pub fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.animals.get(id)
    }

    pub fn animal_count(&self) -> usize {
        self.animals.len()
    }

    pub fn animal_infos(&self) -> Vec<AnimalInfo> {
        self.animals.iter().map(Animal::info).collect()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self.time, &self.regions, &self.animals)
    }

    /// Register `animal` and place it on the grid
    pub fn add_animal(&mut self, animal: Animal) -> AnimalId {
        let id = self.insert_animal(animal);
        if let Some(added) = self.animals.get(id).map(Animal::info) {
            self.notify(|time, map, animals| SimEvent::AnimalAdded { time, map, animals, added });
        }
        id
    }

    /// Build an animal through the animal factory and add it
    pub fn spawn_animal(&mut self, spec: &EntitySpec) -> Result<AnimalId> {
        let animal = self.factories.create_animal(spec, &mut self.rng, &self.config)?;
        Ok(self.add_animal(animal))
    }

    pub fn set_region(&mut self, row: usize, col: usize, region: Region) -> Result<()> {
        let label = region.label().to_string();
        self.regions.set_region(row, col, region)?;
        self.notify(|time, map, animals| SimEvent::RegionSet { time, map, animals, row, col, label });
        Ok(())
    }

    /// Build a region through the region factory without installing it
    pub fn build_region(&mut self, spec: &EntitySpec) -> Result<Region> {
        self.factories.create_region(spec, &mut self.rng, &self.config)
    }

    /// Build a region through the region factory and install it
    pub fn set_region_from_spec(&mut self, row: usize, col: usize, spec: &EntitySpec) -> Result<()> {
        let region = self.build_region(spec)?;
        self.set_region(row, col, region)
    }

    /// Empty world of the given size; the clock restarts at 0
    pub fn reset(&mut self, world: WorldDims) -> Result<()> {
        self.regions = RegionManager::from_dims(world, self.config.food)?;
        self.animals.clear();
        self.time = 0.0;
        tracing::debug!(
            width = world.width,
            height = world.height,
            cols = world.cols,
            rows = world.rows,
            "simulator reset"
        );
        self.notify(|time, map, animals| SimEvent::Reset { time, map, animals });
        Ok(())
    }

    /// One tick of `dt` seconds; a non-positive or non-finite step is ignored
    pub fn advance(&mut self, dt: f64) {
        if !(dt > 0.0) || !dt.is_finite() {
            tracing::warn!(dt, "ignoring non-positive or non-finite time step");
            return;
        }
        self.time += dt;

        for id in self.animals.sweep_dead() {
            self.regions.unregister_animal(id);
        }

        let mut newborns = Vec::new();
        for id in self.animals.ids() {
            let Some(mut animal) = self.animals.take(id) else {
                continue;
            };
            if !animal.is_dead() {
                let mut ctx = UpdateContext {
                    regions: &mut self.regions,
                    animals: &mut self.animals,
                    rng: &mut self.rng,
                    config: &self.config,
                };
                animal.update(dt, &mut ctx);
                self.regions.update_animal_region(&animal);
                if let Some(baby) = animal.deliver_baby() {
                    newborns.push(baby);
                }
            }
            self.animals.restore(animal);
        }

        self.regions.update_all_regions(dt, &mut self.rng);

        for baby in newborns {
            let id = self.insert_animal(baby);
            tracing::debug!(%id, time = self.time, "animal born");
            if let Some(added) = self.animals.get(id).map(Animal::info) {
                self.notify(|time, map, animals| SimEvent::AnimalAdded { time, map, animals, added });
            }
        }

        self.notify(|time, map, animals| SimEvent::Advanced { time, map, animals, dt });
    }

    /// Add an observer; it immediately receives `Registered`
    pub fn add_observer<O: SimObserver + 'static>(&mut self, mut observer: O) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        observer.notify(&SimEvent::Registered {
            time: self.time,
            map: self.map_info(),
            animals: self.animal_infos(),
        });
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if no observer had that id
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Check that the grid index agrees with the agent table
    pub fn check_consistency(&self) -> bool {
        self.regions.check_consistency()
            && self.regions.animal_count() == self.animals.len()
            && self.animals.iter().all(|a| self.regions.is_registered(a.id()))
    }

    fn insert_animal(&mut self, animal: Animal) -> AnimalId {
        let id = self.animals.insert(animal);
        if let Some(animal) = self.animals.get_mut(id) {
            self.regions.register_animal(animal, &mut self.rng);
        }
        id
    }

    fn notify<F>(&mut self, make: F)
    where
        F: FnOnce(f64, MapInfo, Vec<AnimalInfo>) -> SimEvent,
    {
        if self.observers.is_empty() {
            return;
        }
        let event = make(self.time, self.map_info(), self.animal_infos());
        for (_, observer) in &mut self.observers {
            observer.notify(&event);
        }
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("time", &self.time)
            .field("animals", &self.animals.len())
            .field("map", &self.map_info())
            .field("observers", &self.observers.len())
            .finish()
    }
}
