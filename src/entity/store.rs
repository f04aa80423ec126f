//! Agent table owned by the simulator

use ahash::AHashMap;

use crate::core::types::AnimalId;
use crate::entity::animal::Animal;

/// `AnimalId -> Animal` with stable insertion order
///
/// An animal can be taken out while it updates and restored afterwards; it
/// keeps its slot in the order in the meantime.
#[derive(Debug, Default)]
pub struct AnimalStore {
    animals: AHashMap<AnimalId, Animal>,
    order: Vec<AnimalId>,
    next_id: u64,
}

impl AnimalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an animal under a fresh id and return it
    pub fn insert(&mut self, mut animal: Animal) -> AnimalId {
        let id = AnimalId(self.next_id);
        self.next_id += 1;
        animal.id = id;
        self.animals.insert(id, animal);
        self.order.push(id);
        id
    }

    pub fn remove(&mut self, id: AnimalId) -> Option<Animal> {
        let animal = self.animals.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(animal)
    }

    /// Temporarily take an animal out; see [`AnimalStore::restore`]
    pub fn take(&mut self, id: AnimalId) -> Option<Animal> {
        self.animals.remove(&id)
    }

    /// Put back an animal obtained from [`AnimalStore::take`]
    pub fn restore(&mut self, animal: Animal) {
        self.animals.insert(animal.id, animal);
    }

    pub fn get(&self, id: AnimalId) -> Option<&Animal> {
        self.animals.get(&id)
    }

    pub fn get_mut(&mut self, id: AnimalId) -> Option<&mut Animal> {
        self.animals.get_mut(&id)
    }

    pub fn contains(&self, id: AnimalId) -> bool {
        self.animals.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.animals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    /// Ids in insertion order
    pub fn ids(&self) -> Vec<AnimalId> {
        self.order.clone()
    }

    /// Animals in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.order.iter().filter_map(|id| self.animals.get(id))
    }

    /// Drop every animal. Ids keep counting up.
    pub fn clear(&mut self) {
        self.animals.clear();
        self.order.clear();
    }

    /// Remove dead animals, returning their ids in insertion order
    pub fn sweep_dead(&mut self) -> Vec<AnimalId> {
        let dead: Vec<AnimalId> = self
            .iter()
            .filter(|a| a.is_dead())
            .map(|a| a.id)
            .collect();
        if dead.is_empty() {
            return dead;
        }
        for id in &dead {
            self.animals.remove(id);
        }
        let animals = &self.animals;
        self.order.retain(|id| animals.contains_key(id));
        dead
    }
}
