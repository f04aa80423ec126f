//! Grid cells and the food they supply
//!
//! A [`Region`] tracks which animals are inside its cell and delegates food
//! to a [`FoodSupply`]. Carnivores never get food from a region; herbivores
//! get less the more crowded the cell is.

use std::fmt;

use rand::Rng;

use crate::core::config::{DynamicRegionConfig, FoodConfig};
use crate::core::types::{AnimalId, Diet, SimRng};

/// Food formula of a region type
pub trait FoodSupply: fmt::Debug + Send {
    /// Food granted to one animal for `dt` seconds
    fn food(&mut self, diet: Diet, herbivores: usize, dt: f64) -> f64;

    /// Called once per tick for every region
    fn update(&mut self, _dt: f64, _rng: &mut SimRng) {}

    /// Human-readable name used in snapshots
    fn label(&self) -> &str;
}

/// `yield * exp(-max(0, n - threshold) * crowding) * dt` for herbivores, 0 otherwise
pub fn herbivore_food(config: &FoodConfig, diet: Diet, herbivores: usize, dt: f64) -> f64 {
    match diet {
        Diet::Carnivore => 0.0,
        Diet::Herbivore => {
            let crowd = (herbivores as f64 - config.crowding_threshold).max(0.0);
            config.yield_factor * (-crowd * config.crowding_factor).exp() * dt
        }
    }
}

/// Unlimited food
#[derive(Debug, Clone)]
pub struct DefaultRegion {
    config: FoodConfig,
}

impl DefaultRegion {
    pub fn new(config: FoodConfig) -> Self {
        Self { config }
    }
}

impl Default for DefaultRegion {
    fn default() -> Self {
        Self::new(FoodConfig::default())
    }
}

impl FoodSupply for DefaultRegion {
    fn food(&mut self, diet: Diet, herbivores: usize, dt: f64) -> f64 {
        herbivore_food(&self.config, diet, herbivores, dt)
    }

    fn label(&self) -> &str {
        "Default Region"
    }
}

/// Finite stock that is eaten down and randomly regrows
#[derive(Debug, Clone)]
pub struct DynamicSupplyRegion {
    config: FoodConfig,
    stock: f64,
    growth_rate: f64,
    regrowth_chance: f64,
}

impl DynamicSupplyRegion {
    pub fn new(config: FoodConfig, initial_food: f64, growth_rate: f64) -> Self {
        Self {
            config,
            stock: initial_food.max(0.0),
            growth_rate,
            regrowth_chance: DynamicRegionConfig::default().regrowth_chance,
        }
    }

    pub fn with_regrowth_chance(mut self, chance: f64) -> Self {
        self.regrowth_chance = chance.clamp(0.0, 1.0);
        self
    }

    pub fn stock(&self) -> f64 {
        self.stock
    }

    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }
}

impl FoodSupply for DynamicSupplyRegion {
    /// Returns the amount actually taken from the stock
    fn food(&mut self, diet: Diet, herbivores: usize, dt: f64) -> f64 {
        let wanted = herbivore_food(&self.config, diet, herbivores, dt);
        let granted = wanted.min(self.stock).max(0.0);
        self.stock -= granted;
        granted
    }

    fn update(&mut self, dt: f64, rng: &mut SimRng) {
        if rng.gen::<f64>() < self.regrowth_chance {
            self.stock = (self.stock + self.growth_rate * dt).max(0.0);
        }
    }

    fn label(&self) -> &str {
        "Dynamic Supply Region"
    }
}

/// One grid cell: its members and its food supply
#[derive(Debug)]
pub struct Region {
    members: Vec<(AnimalId, Diet)>,
    herbivores: usize,
    supply: Box<dyn FoodSupply>,
}

impl Region {
    pub fn new(supply: Box<dyn FoodSupply>) -> Self {
        Self {
            members: Vec::new(),
            herbivores: 0,
            supply,
        }
    }

    pub fn from_supply<S: FoodSupply + 'static>(supply: S) -> Self {
        Self::new(Box::new(supply))
    }

    pub fn label(&self) -> &str {
        self.supply.label()
    }

    pub fn supply(&self) -> &dyn FoodSupply {
        self.supply.as_ref()
    }

    /// Member ids in the order they entered
    pub fn members(&self) -> impl Iterator<Item = AnimalId> + '_ {
        self.members.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn herbivore_count(&self) -> usize {
        self.herbivores
    }

    pub fn contains(&self, id: AnimalId) -> bool {
        self.members.iter().any(|(m, _)| *m == id)
    }

    pub fn food(&mut self, diet: Diet, dt: f64) -> f64 {
        self.supply.food(diet, self.herbivores, dt)
    }

    pub fn update(&mut self, dt: f64, rng: &mut SimRng) {
        self.supply.update(dt, rng);
    }

    pub(crate) fn add(&mut self, id: AnimalId, diet: Diet) {
        if self.contains(id) {
            return;
        }
        self.members.push((id, diet));
        if diet == Diet::Herbivore {
            self.herbivores += 1;
        }
    }

    pub(crate) fn remove(&mut self, id: AnimalId) -> bool {
        let Some(index) = self.members.iter().position(|(m, _)| *m == id) else {
            return false;
        };
        let (_, diet) = self.members.remove(index);
        if diet == Diet::Herbivore {
            self.herbivores -= 1;
        }
        true
    }

    /// Move every member into `other`, leaving this region empty
    pub(crate) fn transfer_members(&mut self, other: &mut Region) {
        for (id, diet) in self.members.drain(..) {
            other.add(id, diet);
        }
        self.herbivores = 0;
    }

    /// Herbivore counter agrees with the member list
    pub fn is_consistent(&self) -> bool {
        let herbivores = self
            .members
            .iter()
            .filter(|(_, diet)| *diet == Diet::Herbivore)
            .count();
        herbivores == self.herbivores
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::from_supply(DefaultRegion::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_default_region_food_formula() {
        let mut region = DefaultRegion::default();
        assert_eq!(region.food(Diet::Carnivore, 0, 1.0), 0.0);
        assert!((region.food(Diet::Herbivore, 5, 1.0) - 60.0).abs() < 1e-9);
        assert!((region.food(Diet::Herbivore, 0, 0.5) - 30.0).abs() < 1e-9);
        // one over the crowding threshold: 60 * e^-2
        let crowded = region.food(Diet::Herbivore, 6, 1.0);
        assert!((crowded - 60.0 * (-2.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_dynamic_region_depletes_without_going_negative() {
        let mut region = DynamicSupplyRegion::new(FoodConfig::default(), 10.0, 0.0);
        let first = region.food(Diet::Herbivore, 1, 0.1);
        assert!((first - 6.0).abs() < 1e-9);
        let second = region.food(Diet::Herbivore, 1, 0.1);
        assert!((second - 4.0).abs() < 1e-9);
        assert_eq!(region.food(Diet::Herbivore, 1, 0.1), 0.0);
        assert_eq!(region.stock(), 0.0);
        assert_eq!(region.food(Diet::Carnivore, 1, 0.1), 0.0);
    }

    #[test]
    fn test_dynamic_region_regrowth() {
        let mut rng = SimRng::seed_from_u64(9);
        let mut always = DynamicSupplyRegion::new(FoodConfig::default(), 0.0, 2.0).with_regrowth_chance(1.0);
        always.update(0.5, &mut rng);
        assert!((always.stock() - 1.0).abs() < 1e-9);

        let mut never = DynamicSupplyRegion::new(FoodConfig::default(), 5.0, 2.0).with_regrowth_chance(0.0);
        for _ in 0..50 {
            never.update(1.0, &mut rng);
        }
        assert_eq!(never.stock(), 5.0);
    }

    #[test]
    fn test_region_membership_tracks_herbivores() {
        let mut region = Region::default();
        region.add(AnimalId(1), Diet::Herbivore);
        region.add(AnimalId(2), Diet::Carnivore);
        region.add(AnimalId(1), Diet::Herbivore);
        assert_eq!(region.len(), 2);
        assert_eq!(region.herbivore_count(), 1);

        assert!(region.remove(AnimalId(1)));
        assert!(!region.remove(AnimalId(1)));
        assert_eq!(region.herbivore_count(), 0);
        assert!(region.is_consistent());
        assert_eq!(region.label(), "Default Region");
    }

    #[test]
    fn test_transfer_moves_members() {
        let mut old = Region::default();
        old.add(AnimalId(3), Diet::Herbivore);
        old.add(AnimalId(4), Diet::Carnivore);
        let mut new = Region::from_supply(DynamicSupplyRegion::new(FoodConfig::default(), 100.0, 1.0));

        old.transfer_members(&mut new);
        assert!(old.is_empty());
        assert_eq!(new.members().collect::<Vec<_>>(), vec![AnimalId(3), AnimalId(4)]);
        assert_eq!(new.herbivore_count(), 1);
        assert_eq!(new.label(), "Dynamic Supply Region");
    }
}
