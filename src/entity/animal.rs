//! Animals and the shared state-machine driver
//!
//! Every animal carries the same metabolic fields; what differs per species
//! lives in [`Species`]. `Animal::update` runs the species routine for the
//! current state and then applies the rules every species obeys: toroidal
//! wrap, death by starvation or age, and feeding from the current region.
//!
//! Targets (mate, threat, prey) are [`AnimalId`] handles into the
//! simulator's table and are re-resolved every tick, so a target that died
//! or was swept simply stops resolving.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{SimulationConfig, SpeciesConfig};
use crate::core::error::{EcoError, Result};
use crate::core::types::{AnimalId, Diet, SimRng, Vec2};
use crate::entity::selection::StrategyHandle;
use crate::entity::store::AnimalStore;
use crate::spatial::region_manager::RegionManager;

/// Lifecycle state of an animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimalState {
    Normal,
    Mate,
    Hunger,
    Danger,
    Dead,
}

/// Species tag without the per-species data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesKind {
    Sheep,
    Wolf,
}

/// Species-specific data
#[derive(Debug, Clone)]
pub enum Species {
    Sheep(SheepTraits),
    Wolf(WolfTraits),
}

#[derive(Debug, Clone)]
pub struct SheepTraits {
    pub danger_strategy: StrategyHandle,
    pub danger_source: Option<AnimalId>,
}

#[derive(Debug, Clone)]
pub struct WolfTraits {
    pub hunting_strategy: StrategyHandle,
    pub hunt_target: Option<AnimalId>,
}

impl Species {
    pub fn kind(&self) -> SpeciesKind {
        match self {
            Species::Sheep(_) => SpeciesKind::Sheep,
            Species::Wolf(_) => SpeciesKind::Wolf,
        }
    }

    pub fn genetic_code(&self) -> &'static str {
        match self {
            Species::Sheep(_) => "Sheep",
            Species::Wolf(_) => "Wolf",
        }
    }

    pub fn diet(&self) -> Diet {
        match self {
            Species::Sheep(_) => Diet::Herbivore,
            Species::Wolf(_) => Diet::Carnivore,
        }
    }

    /// Tuning section for this species
    pub fn config<'c>(&self, config: &'c SimulationConfig) -> &'c SpeciesConfig {
        match self {
            Species::Sheep(_) => &config.sheep,
            Species::Wolf(_) => &config.wolf,
        }
    }

    /// Same strategies, no targets
    fn offspring(&self) -> Self {
        match self {
            Species::Sheep(t) => Species::Sheep(SheepTraits {
                danger_strategy: t.danger_strategy.clone(),
                danger_source: None,
            }),
            Species::Wolf(t) => Species::Wolf(WolfTraits {
                hunting_strategy: t.hunting_strategy.clone(),
                hunt_target: None,
            }),
        }
    }
}

/// Everything an animal may touch while it updates
///
/// The animal being updated is taken out of `animals` for the duration of
/// its update, so range queries never return it.
pub struct UpdateContext<'a> {
    pub regions: &'a mut RegionManager,
    pub animals: &'a mut AnimalStore,
    pub rng: &'a mut SimRng,
    pub config: &'a SimulationConfig,
}

/// Result of reaching (or not) the current mate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatingOutcome {
    NoContact,
    Mated,
    Conceived,
}

/// Read-only view of an animal handed to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalInfo {
    pub id: AnimalId,
    pub genetic_code: String,
    pub diet: Diet,
    pub state: AnimalState,
    pub position: Vec2,
    pub energy: f64,
    pub desire: f64,
    pub age: f64,
    pub speed: f64,
    pub sight_range: f64,
    pub pregnant: bool,
}

#[derive(Debug, Clone)]
pub struct Animal {
    pub(crate) id: AnimalId,
    pub(crate) species: Species,
    pub(crate) state: AnimalState,
    pub(crate) pos: Vec2,
    pub(crate) dest: Vec2,
    /// Set when no starting position was given; the region manager places it
    pub(crate) needs_placement: bool,
    pub(crate) energy: f64,
    pub(crate) desire: f64,
    pub(crate) age: f64,
    pub(crate) speed: f64,
    pub(crate) sight_range: f64,
    pub(crate) mate_strategy: StrategyHandle,
    pub(crate) mate_target: Option<AnimalId>,
    pub(crate) baby: Option<Box<Animal>>,
    max_energy: f64,
    max_desire: f64,
}

impl Animal {
    pub fn sheep(
        mate_strategy: StrategyHandle,
        danger_strategy: StrategyHandle,
        pos: Option<Vec2>,
        config: &SimulationConfig,
        rng: &mut SimRng,
    ) -> Result<Self> {
        let species = Species::Sheep(SheepTraits {
            danger_strategy,
            danger_source: None,
        });
        Self::with_species(species, mate_strategy, pos, config, rng)
    }

    pub fn wolf(
        mate_strategy: StrategyHandle,
        hunting_strategy: StrategyHandle,
        pos: Option<Vec2>,
        config: &SimulationConfig,
        rng: &mut SimRng,
    ) -> Result<Self> {
        let species = Species::Wolf(WolfTraits {
            hunting_strategy,
            hunt_target: None,
        });
        Self::with_species(species, mate_strategy, pos, config, rng)
    }

    /// Build a fresh animal using the species' base speed and sight range
    pub fn with_species(
        species: Species,
        mate_strategy: StrategyHandle,
        pos: Option<Vec2>,
        config: &SimulationConfig,
        rng: &mut SimRng,
    ) -> Result<Self> {
        let base = species.config(config);
        let speed = randomized(base.speed, config.lifecycle.speed_tolerance, rng);
        Self::build(species, base.sight_range, speed, mate_strategy, pos, config)
    }

    fn build(
        species: Species,
        sight_range: f64,
        speed: f64,
        mate_strategy: StrategyHandle,
        pos: Option<Vec2>,
        config: &SimulationConfig,
    ) -> Result<Self> {
        if !(sight_range > 0.0) {
            return Err(EcoError::invalid(format!(
                "{}: sight range must be positive, got {sight_range}",
                species.genetic_code()
            )));
        }
        if !(speed > 0.0) {
            return Err(EcoError::invalid(format!(
                "{}: speed must be positive, got {speed}",
                species.genetic_code()
            )));
        }
        if let Some(p) = pos {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(EcoError::invalid(format!("position {p} is not finite")));
            }
        }

        let life = &config.lifecycle;
        let start = pos.unwrap_or_default();
        Ok(Self {
            id: AnimalId::UNASSIGNED,
            species,
            state: AnimalState::Normal,
            pos: start,
            dest: start,
            needs_placement: pos.is_none(),
            energy: life.max_energy,
            desire: 0.0,
            age: 0.0,
            speed,
            sight_range,
            mate_strategy,
            mate_target: None,
            baby: None,
            max_energy: life.max_energy,
            max_desire: life.max_desire,
        })
    }

    /// Offspring of `p1` and `p2`: species and diet of `p1`, averaged traits
    /// with jitter, mate strategy of `p2`, born next to `p1`
    pub fn from_parents(p1: &Animal, p2: &Animal, config: &SimulationConfig, rng: &mut SimRng) -> Self {
        let life = &config.lifecycle;
        let spread = life.offspring_scatter * (standard_normal(rng) + 1.0);
        let pos = p1.pos + Vec2::random(rng, -1.0, 1.0) * spread;
        let speed = randomized((p1.speed + p2.speed) / 2.0, life.inherit_tolerance, rng);
        let sight_range = randomized(
            (p1.sight_range + p2.sight_range) / 2.0,
            life.inherit_tolerance,
            rng,
        );

        Self {
            id: AnimalId::UNASSIGNED,
            species: p1.species.offspring(),
            state: AnimalState::Normal,
            pos,
            dest: pos,
            needs_placement: false,
            energy: ((p1.energy + p2.energy) / 2.0).clamp(0.0, life.max_energy),
            desire: 0.0,
            age: 0.0,
            speed,
            sight_range,
            mate_strategy: p2.mate_strategy.clone(),
            mate_target: None,
            baby: None,
            max_energy: life.max_energy,
            max_desire: life.max_desire,
        }
    }

    pub fn with_state(mut self, state: AnimalState) -> Self {
        self.state = state;
        self
    }

    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = energy.clamp(0.0, self.max_energy);
        self
    }

    pub fn with_desire(mut self, desire: f64) -> Self {
        self.desire = desire.clamp(0.0, self.max_desire);
        self
    }

    /// Explicit position; the grid index is not touched
    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self.needs_placement = false;
        self
    }

    pub fn with_age(mut self, age: f64) -> Self {
        self.age = age.max(0.0);
        self
    }

    pub fn id(&self) -> AnimalId {
        self.id
    }

    pub fn species(&self) -> &Species {
        &self.species
    }

    pub fn genetic_code(&self) -> &'static str {
        self.species.genetic_code()
    }

    pub fn diet(&self) -> Diet {
        self.species.diet()
    }

    pub fn state(&self) -> AnimalState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state == AnimalState::Dead
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn destination(&self) -> Vec2 {
        self.dest
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn desire(&self) -> f64 {
        self.desire
    }

    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn sight_range(&self) -> f64 {
        self.sight_range
    }

    pub fn is_pregnant(&self) -> bool {
        self.baby.is_some()
    }

    pub fn mate_target(&self) -> Option<AnimalId> {
        self.mate_target
    }

    pub fn mate_strategy(&self) -> &StrategyHandle {
        &self.mate_strategy
    }

    /// Threat a sheep is fleeing from
    pub fn danger_source(&self) -> Option<AnimalId> {
        match &self.species {
            Species::Sheep(t) => t.danger_source,
            Species::Wolf(_) => None,
        }
    }

    /// Prey a wolf is chasing
    pub fn hunt_target(&self) -> Option<AnimalId> {
        match &self.species {
            Species::Wolf(t) => t.hunt_target,
            Species::Sheep(_) => None,
        }
    }

    /// Hand over the pending offspring, if any
    pub fn deliver_baby(&mut self) -> Option<Animal> {
        self.baby.take().map(|b| *b)
    }

    pub fn info(&self) -> AnimalInfo {
        AnimalInfo {
            id: self.id,
            genetic_code: self.genetic_code().to_string(),
            diet: self.diet(),
            state: self.state,
            position: self.pos,
            energy: self.energy,
            desire: self.desire,
            age: self.age,
            speed: self.speed,
            sight_range: self.sight_range,
            pregnant: self.is_pregnant(),
        }
    }

    /// Advance this animal by `dt`
    pub fn update(&mut self, dt: f64, ctx: &mut UpdateContext<'_>) {
        let before = self.state;
        match (self.species.kind(), self.state) {
            (_, AnimalState::Dead) => return,
            (SpeciesKind::Sheep, AnimalState::Danger) => self.sheep_danger(dt, ctx),
            (SpeciesKind::Sheep, AnimalState::Mate) => self.sheep_mate(dt, ctx),
            (SpeciesKind::Sheep, AnimalState::Normal | AnimalState::Hunger) => {
                self.sheep_normal(dt, ctx)
            }
            (SpeciesKind::Wolf, AnimalState::Hunger) => self.wolf_hunger(dt, ctx),
            (SpeciesKind::Wolf, AnimalState::Mate) => self.wolf_mate(dt, ctx),
            (SpeciesKind::Wolf, AnimalState::Normal | AnimalState::Danger) => {
                self.wolf_normal(dt, ctx)
            }
        }

        let (width, height) = (ctx.regions.width() as f64, ctx.regions.height() as f64);
        if is_out_of_bounds(self.pos, width, height) {
            self.pos = wrap_position(self.pos, width, height);
            self.state = AnimalState::Normal;
        }

        let age_limit = self.species.config(ctx.config).age_limit;
        if self.energy <= 0.0 || self.age > age_limit {
            self.state = AnimalState::Dead;
            tracing::debug!(
                id = %self.id,
                species = self.genetic_code(),
                energy = self.energy,
                age = self.age,
                "animal died"
            );
        }

        if self.state != AnimalState::Dead {
            self.energy += ctx.regions.get_food(self, dt);
            self.clamp_energy();
        }

        if self.state != before {
            tracing::trace!(id = %self.id, from = ?before, to = ?self.state, "state change");
        }
    }

    // === shared behaviour used by the species routines ===

    /// Speed multiplier that slows animals down as they starve
    pub(crate) fn energy_factor(&self, config: &SimulationConfig) -> f64 {
        ((self.energy - self.max_energy) * config.lifecycle.move_factor).exp()
    }

    /// Step toward the destination by `distance`
    pub(crate) fn move_toward_dest(&mut self, distance: f64) {
        self.pos = self.pos + (self.dest - self.pos).direction() * distance;
    }

    pub(crate) fn clamp_energy(&mut self) {
        self.energy = self.energy.clamp(0.0, self.max_energy);
    }

    pub(crate) fn clamp_desire(&mut self) {
        self.desire = self.desire.clamp(0.0, self.max_desire);
    }

    /// Age and pay metabolism for `dt`, with `cost` scaling the energy drain
    fn metabolize(&mut self, dt: f64, species: &SpeciesConfig, cost: f64) {
        self.age += dt;
        self.energy -= species.energy_drain * cost * dt;
        self.clamp_energy();
        self.desire += species.desire_gain * dt;
        self.clamp_desire();
    }

    /// Baseline movement: head for a random destination, pick a new one on arrival
    pub(crate) fn wander(&mut self, dt: f64, ctx: &mut UpdateContext<'_>) {
        let config = ctx.config;
        if self.pos.distance(&self.dest) < config.lifecycle.arrival_distance {
            self.dest = random_destination(ctx.regions, ctx.rng);
        }
        let distance = self.speed * dt * self.energy_factor(config);
        self.move_toward_dest(distance);
        let species = self.species.config(config).clone();
        self.metabolize(dt, &species, 1.0);
    }

    /// Chase (or flee toward) `target` at sprint speed, paying sprint costs
    pub(crate) fn sprint_toward(&mut self, target: Vec2, dt: f64, config: &SimulationConfig) {
        let species = self.species.config(config).clone();
        self.dest = target;
        let distance = species.sprint_factor * self.speed * dt * self.energy_factor(config);
        self.move_toward_dest(distance);
        self.metabolize(dt, &species, config.lifecycle.sprint_cost);
    }

    /// Position of `target` if it still exists, is alive and is within sight
    pub(crate) fn visible_target(&self, target: Option<AnimalId>, animals: &AnimalStore) -> Option<Vec2> {
        let other = animals.get(target?)?;
        if other.is_dead() || self.pos.distance(&other.pos) > self.sight_range {
            return None;
        }
        Some(other.pos)
    }

    /// Run `strategy` over the animals in sight that satisfy `filter`
    pub(crate) fn search<F>(
        &self,
        ctx: &UpdateContext<'_>,
        strategy: &StrategyHandle,
        filter: F,
    ) -> Option<AnimalId>
    where
        F: Fn(&Animal) -> bool,
    {
        let candidates = ctx.regions.get_animals_in_range(self, ctx.animals, filter);
        strategy.select(self, &candidates).map(|a| a.id)
    }

    /// Closest-match partner: same species, in the mood, not already expecting
    pub(crate) fn search_mate(&self, ctx: &UpdateContext<'_>) -> Option<AnimalId> {
        let code = self.genetic_code();
        let me = self.id;
        self.search(ctx, &self.mate_strategy, |a| {
            a.id != me
                && a.genetic_code() == code
                && !a.is_pregnant()
                && a.state == AnimalState::Mate
        })
    }

    /// Mate with `mate_id` if it is within arrival distance
    ///
    /// On contact both desires reset and the mate target is released; a
    /// non-pregnant animal conceives with the configured probability.
    pub(crate) fn try_mate(&mut self, mate_id: AnimalId, ctx: &mut UpdateContext<'_>) -> MatingOutcome {
        let config = ctx.config;
        let Some(mate_pos) = ctx.animals.get(mate_id).map(|m| m.pos) else {
            return MatingOutcome::NoContact;
        };
        if self.pos.distance(&mate_pos) >= config.lifecycle.arrival_distance {
            return MatingOutcome::NoContact;
        }

        self.desire = 0.0;
        if let Some(mate) = ctx.animals.get_mut(mate_id) {
            mate.desire = 0.0;
        }
        self.mate_target = None;

        if self.is_pregnant() || ctx.rng.gen::<f64>() >= config.lifecycle.birth_probability {
            return MatingOutcome::Mated;
        }
        let Some(mate) = ctx.animals.get(mate_id) else {
            return MatingOutcome::Mated;
        };
        let baby = Animal::from_parents(self, mate, config, ctx.rng);
        tracing::debug!(parent = %self.id, mate = %mate_id, species = self.genetic_code(), "conceived");
        self.baby = Some(Box::new(baby));
        MatingOutcome::Conceived
    }
}

/// Outside `[0, width) x [0, height)`
pub fn is_out_of_bounds(pos: Vec2, width: f64, height: f64) -> bool {
    pos.x < 0.0 || pos.x >= width || pos.y < 0.0 || pos.y >= height
}

/// Toroidal wrap into `[0, width) x [0, height)`
pub fn wrap_position(pos: Vec2, width: f64, height: f64) -> Vec2 {
    Vec2::new(wrap_axis(pos.x, width), wrap_axis(pos.y, height))
}

fn wrap_axis(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

pub(crate) fn random_destination(regions: &RegionManager, rng: &mut SimRng) -> Vec2 {
    Vec2::random_in(
        rng,
        (0.0, regions.width() as f64),
        (0.0, regions.height() as f64),
    )
}

/// `value` scaled by a uniform factor in `[1 - tolerance, 1 + tolerance]`
fn randomized(value: f64, tolerance: f64, rng: &mut SimRng) -> f64 {
    if tolerance <= 0.0 {
        return value;
    }
    value * (1.0 + rng.gen_range(-tolerance..=tolerance))
}

/// Box-Muller sample of N(0, 1)
fn standard_normal(rng: &mut SimRng) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
