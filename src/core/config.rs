//! Simulation tuning with documented constants
//!
//! All magic numbers of the ecosystem are collected here. Defaults reproduce
//! the classic sheep/wolf balance; a TOML file can override any subset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{EcoError, Result};

/// Tuning for the whole simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the simulator's random source
    pub seed: u64,
    pub lifecycle: LifecycleConfig,
    pub sheep: SpeciesConfig,
    pub wolf: SpeciesConfig,
    pub predation: PredationConfig,
    pub food: FoodConfig,
    pub dynamic_region: DynamicRegionConfig,
}

/// Rules shared by every species
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Upper bound for energy; animals are born with this much
    pub max_energy: f64,
    /// Upper bound for desire; animals are born with zero
    pub max_desire: f64,
    /// Exponent scale for the low-energy slowdown `exp((energy - max) * factor)`
    pub move_factor: f64,
    /// Distance under which a destination or a target counts as reached
    pub arrival_distance: f64,
    /// Desire above which an animal starts looking for a mate
    pub desire_threshold: f64,
    /// Chance that a successful mating produces an offspring
    pub birth_probability: f64,
    /// Extra energy/desire cost multiplier while chasing or fleeing
    pub sprint_cost: f64,
    /// Scale of the random offset between a newborn and its parent
    pub offspring_scatter: f64,
    /// Relative jitter applied to inherited speed and sight range
    pub inherit_tolerance: f64,
    /// Relative jitter applied to the base speed of a new animal
    pub speed_tolerance: f64,
}

/// Per-species movement and metabolism
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesConfig {
    pub speed: f64,
    pub sight_range: f64,
    /// Age (in simulated seconds) after which the animal dies
    pub age_limit: f64,
    /// Energy lost per second while wandering
    pub energy_drain: f64,
    /// Desire gained per second
    pub desire_gain: f64,
    /// Speed multiplier while chasing or fleeing
    pub sprint_factor: f64,
}

/// Wolf hunting and mating economics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredationConfig {
    /// Energy below which a wolf goes hunting
    pub hunger_threshold: f64,
    /// Energy gained from a kill
    pub kill_reward: f64,
    /// Energy a wolf pays when it conceives
    pub mating_cost: f64,
}

/// Herbivore food formula `yield * exp(-max(0, n - threshold) * crowding) * dt`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    pub yield_factor: f64,
    pub crowding_threshold: f64,
    pub crowding_factor: f64,
}

/// Defaults for regions with a finite food stock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicRegionConfig {
    pub growth_rate: f64,
    pub initial_food: f64,
    /// Chance per tick that the stock regrows
    pub regrowth_chance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 2_147_483_647,
            lifecycle: LifecycleConfig::default(),
            sheep: SpeciesConfig::sheep(),
            wolf: SpeciesConfig::wolf(),
            predation: PredationConfig::default(),
            food: FoodConfig::default(),
            dynamic_region: DynamicRegionConfig::default(),
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_energy: 100.0,
            max_desire: 100.0,
            move_factor: 0.007,
            arrival_distance: 8.0,
            desire_threshold: 65.0,
            birth_probability: 0.9,
            sprint_cost: 1.2,
            offspring_scatter: 60.0,
            inherit_tolerance: 0.2,
            speed_tolerance: 0.1,
        }
    }
}

impl SpeciesConfig {
    pub fn sheep() -> Self {
        Self {
            speed: 35.0,
            sight_range: 40.0,
            age_limit: 8.0,
            energy_drain: 20.0,
            desire_gain: 40.0,
            sprint_factor: 2.0,
        }
    }

    pub fn wolf() -> Self {
        Self {
            speed: 60.0,
            sight_range: 50.0,
            age_limit: 14.0,
            energy_drain: 18.0,
            desire_gain: 30.0,
            sprint_factor: 3.0,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        positive(&format!("{name}.speed"), self.speed)?;
        positive(&format!("{name}.sight_range"), self.sight_range)?;
        positive(&format!("{name}.age_limit"), self.age_limit)?;
        non_negative(&format!("{name}.energy_drain"), self.energy_drain)?;
        non_negative(&format!("{name}.desire_gain"), self.desire_gain)?;
        positive(&format!("{name}.sprint_factor"), self.sprint_factor)?;
        Ok(())
    }
}

impl Default for PredationConfig {
    fn default() -> Self {
        Self {
            hunger_threshold: 50.0,
            kill_reward: 50.0,
            mating_cost: 10.0,
        }
    }
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            yield_factor: 60.0,
            crowding_threshold: 5.0,
            crowding_factor: 2.0,
        }
    }
}

impl Default for DynamicRegionConfig {
    fn default() -> Self {
        Self {
            growth_rate: 2.0,
            initial_food: 1000.0,
            regrowth_chance: 0.5,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    ///
    /// Every comparison is written so that NaN fails it.
    pub fn validate(&self) -> Result<()> {
        let life = &self.lifecycle;
        positive("max_energy", life.max_energy)?;
        positive("max_desire", life.max_desire)?;
        positive("arrival_distance", life.arrival_distance)?;
        non_negative("move_factor", life.move_factor)?;
        positive("sprint_cost", life.sprint_cost)?;
        non_negative("offspring_scatter", life.offspring_scatter)?;
        probability("birth_probability", life.birth_probability)?;
        non_negative("desire_threshold", life.desire_threshold)?;
        if !(life.desire_threshold <= life.max_desire) {
            return Err(EcoError::InvalidConfig(format!(
                "desire_threshold ({}) exceeds max_desire ({})",
                life.desire_threshold, life.max_desire
            )));
        }
        for (name, tol) in [
            ("inherit_tolerance", life.inherit_tolerance),
            ("speed_tolerance", life.speed_tolerance),
        ] {
            if !(0.0..1.0).contains(&tol) {
                return Err(EcoError::InvalidConfig(format!(
                    "{name} ({tol}) must be within [0, 1)"
                )));
            }
        }
        self.sheep.validate("sheep")?;
        self.wolf.validate("wolf")?;

        let predation = &self.predation;
        non_negative("hunger_threshold", predation.hunger_threshold)?;
        non_negative("kill_reward", predation.kill_reward)?;
        non_negative("mating_cost", predation.mating_cost)?;
        if !(predation.hunger_threshold <= life.max_energy) {
            return Err(EcoError::InvalidConfig(format!(
                "hunger_threshold ({}) exceeds max_energy ({})",
                predation.hunger_threshold, life.max_energy
            )));
        }

        non_negative("food.yield_factor", self.food.yield_factor)?;
        non_negative("food.crowding_threshold", self.food.crowding_threshold)?;
        non_negative("food.crowding_factor", self.food.crowding_factor)?;

        let dynamic = &self.dynamic_region;
        if !dynamic.growth_rate.is_finite() {
            return Err(EcoError::InvalidConfig(format!(
                "dynamic_region.growth_rate ({}) must be finite",
                dynamic.growth_rate
            )));
        }
        non_negative("dynamic_region.initial_food", dynamic.initial_food)?;
        probability("dynamic_region.regrowth_chance", dynamic.regrowth_chance)?;
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(EcoError::InvalidConfig(format!(
            "{name} ({value}) must be a positive number"
        )));
    }
    Ok(())
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(EcoError::InvalidConfig(format!(
            "{name} ({value}) must be a non-negative number"
        )));
    }
    Ok(())
}

fn probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(EcoError::InvalidConfig(format!(
            "{name} ({value}) must be within [0, 1]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sheep.sight_range, 40.0);
        assert_eq!(config.wolf.age_limit, 14.0);
        assert_eq!(config.food.crowding_threshold, 5.0);
    }

    #[test]
    fn test_partial_toml_overrides_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            seed = 42

            [lifecycle]
            birth_probability = 1.0

            [wolf]
            speed = 80.0
            sight_range = 70.0
            age_limit = 20.0
            energy_drain = 10.0
            desire_gain = 30.0
            sprint_factor = 3.0
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.lifecycle.birth_probability, 1.0);
        assert_eq!(config.lifecycle.arrival_distance, 8.0);
        assert_eq!(config.wolf.speed, 80.0);
        assert_eq!(config.sheep.speed, 35.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SimulationConfig::default();
        config.lifecycle.birth_probability = 1.5;
        assert!(matches!(config.validate(), Err(EcoError::InvalidConfig(_))));

        let mut config = SimulationConfig::default();
        config.sheep.speed = 0.0;
        assert!(config.validate().is_err());

        let err = SimulationConfig::from_toml_str("[lifecycle]\narrival_distance = -1.0\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_nan_values_are_rejected() {
        for toml in [
            "[lifecycle]\nmax_energy = nan\n",
            "[lifecycle]\narrival_distance = nan\n",
            "[lifecycle]\nmove_factor = nan\n",
            "[predation]\nhunger_threshold = nan\n",
            "[food]\nyield_factor = nan\n",
            "[food]\ncrowding_factor = nan\n",
            "[dynamic_region]\ngrowth_rate = nan\n",
        ] {
            assert!(
                matches!(SimulationConfig::from_toml_str(toml), Err(EcoError::InvalidConfig(_))),
                "accepted {toml:?}"
            );
        }

        let mut config = SimulationConfig::default();
        config.wolf.age_limit = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.sheep.speed = f64::INFINITY;
        assert!(config.validate().is_err());
    }
}
