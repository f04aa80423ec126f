//! Built-in builders: selection strategies, region types and species

use serde::Deserialize;

use crate::core::config::SimulationConfig;
use crate::core::error::{EcoError, Result};
use crate::core::types::{SimRng, Vec2};
use crate::entity::animal::Animal;
use crate::entity::selection::{self, StrategyHandle};
use crate::factory::registry::{parse_data, BuildContext, Builder, EntitySpec, Factory};
use crate::spatial::region::{DefaultRegion, DynamicSupplyRegion, Region};

/// Strategy, region and animal factories used by a simulator
#[derive(Debug)]
pub struct Factories {
    pub strategies: Factory<StrategyHandle>,
    pub regions: Factory<Region>,
    pub animals: Factory<Animal>,
}

impl Factories {
    /// Factories without any builder
    pub fn empty() -> Self {
        Self {
            strategies: Factory::new("strategy"),
            regions: Factory::new("region"),
            animals: Factory::new("animal"),
        }
    }

    /// Factories with every built-in type registered
    pub fn standard() -> Self {
        let mut factories = Self::empty();
        let mut errors = register_all(&mut factories.strategies, strategy_builders());
        errors.extend(register_all(&mut factories.regions, region_builders()));
        errors.extend(register_all(&mut factories.animals, animal_builders()));
        for err in errors {
            tracing::warn!(%err, "skipping built-in builder");
        }
        factories
    }

    pub fn create_strategy(&self, spec: &EntitySpec, rng: &mut SimRng, config: &SimulationConfig) -> Result<StrategyHandle> {
        let mut ctx = BuildContext {
            strategies: &self.strategies,
            rng,
            config,
        };
        self.strategies.create(spec, &mut ctx)
    }

    pub fn create_region(&self, spec: &EntitySpec, rng: &mut SimRng, config: &SimulationConfig) -> Result<Region> {
        let mut ctx = BuildContext {
            strategies: &self.strategies,
            rng,
            config,
        };
        self.regions.create(spec, &mut ctx)
    }

    pub fn create_animal(&self, spec: &EntitySpec, rng: &mut SimRng, config: &SimulationConfig) -> Result<Animal> {
        let mut ctx = BuildContext {
            strategies: &self.strategies,
            rng,
            config,
        };
        self.animals.create(spec, &mut ctx)
    }
}

impl Default for Factories {
    fn default() -> Self {
        Self::standard()
    }
}

/// Register every builder, collecting the ones that failed to build or register
fn register_all<T>(factory: &mut Factory<T>, builders: Vec<Result<Builder<T>>>) -> Vec<EcoError> {
    let mut errors = Vec::new();
    for builder in builders {
        if let Err(err) = builder.and_then(|b| factory.register(b)) {
            errors.push(err);
        }
    }
    errors
}

fn strategy_builders() -> Vec<Result<Builder<StrategyHandle>>> {
    let entries: [(&str, &str, fn() -> StrategyHandle); 3] = [
        ("first", "Selects the first animal in the candidate list", selection::first),
        ("closest", "Selects the animal closest to the searcher", selection::closest),
        ("youngest", "Selects the youngest candidate", selection::youngest),
    ];
    entries
        .into_iter()
        .map(|(tag, desc, make)| Builder::new(tag, desc, move |_, _| Ok(make())))
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DynamicData {
    factor: Option<f64>,
    food: Option<f64>,
}

fn region_builders() -> Vec<Result<Builder<Region>>> {
    let default = Builder::new("default", "Infinite food supply", |_, ctx| {
        Ok(Region::from_supply(DefaultRegion::new(ctx.config.food)))
    });

    let dynamic = Builder::new("dynamic", "Dynamic food supply", |data, ctx| {
        let data: DynamicData = parse_data(data)?;
        let defaults = &ctx.config.dynamic_region;
        let factor = data.factor.unwrap_or(defaults.growth_rate);
        let food = data.food.unwrap_or(defaults.initial_food);
        if !factor.is_finite() {
            return Err(EcoError::invalid(format!("dynamic region: factor must be finite, got {factor}")));
        }
        if !(food >= 0.0) || !food.is_finite() {
            return Err(EcoError::invalid(format!(
                "dynamic region: food must be a non-negative number, got {food}"
            )));
        }
        let supply = DynamicSupplyRegion::new(ctx.config.food, food, factor)
            .with_regrowth_chance(defaults.regrowth_chance);
        Ok(Region::from_supply(supply))
    })
    .map(|b| {
        b.field("factor", "food increase factor (optional, default 2.0)")
            .field("food", "initial amount of food (optional, default 1000.0)")
    });

    vec![default, dynamic]
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PosData {
    x_range: Option<[f64; 2]>,
    y_range: Option<[f64; 2]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SheepData {
    pos: Option<PosData>,
    mate_strategy: Option<EntitySpec>,
    danger_strategy: Option<EntitySpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct WolfData {
    pos: Option<PosData>,
    mate_strategy: Option<EntitySpec>,
    #[serde(alias = "danger_strategy")]
    hunt_strategy: Option<EntitySpec>,
}

fn animal_builders() -> Vec<Result<Builder<Animal>>> {
    let sheep = Builder::new("sheep", "Creates a Sheep instance", |data, ctx| {
        let data: SheepData = parse_data(data)?;
        let pos = random_position(data.pos.as_ref(), "sheep", ctx.rng)?;
        let mate = strategy_or_first(data.mate_strategy.as_ref(), ctx)?;
        let danger = strategy_or_first(data.danger_strategy.as_ref(), ctx)?;
        Animal::sheep(mate, danger, pos, ctx.config, ctx.rng)
    })
    .map(|b| {
        b.field("pos", "x_range and y_range of the starting position (optional, random)")
            .field("mate_strategy", "strategy spec for choosing a mate (optional, first)")
            .field("danger_strategy", "strategy spec for choosing a threat (optional, first)")
    });

    let wolf = Builder::new("wolf", "Creates a Wolf instance", |data, ctx| {
        let data: WolfData = parse_data(data)?;
        let pos = random_position(data.pos.as_ref(), "wolf", ctx.rng)?;
        let mate = strategy_or_first(data.mate_strategy.as_ref(), ctx)?;
        let hunt = strategy_or_first(data.hunt_strategy.as_ref(), ctx)?;
        Animal::wolf(mate, hunt, pos, ctx.config, ctx.rng)
    })
    .map(|b| {
        b.field("pos", "x_range and y_range of the starting position (optional, random)")
            .field("mate_strategy", "strategy spec for choosing a mate (optional, first)")
            .field("hunt_strategy", "strategy spec for choosing prey (optional, first)")
    });

    vec![sheep, wolf]
}

fn strategy_or_first(spec: Option<&EntitySpec>, ctx: &mut BuildContext<'_>) -> Result<StrategyHandle> {
    match spec {
        Some(spec) => {
            let strategies = ctx.strategies;
            strategies.create(spec, ctx)
        }
        None => Ok(selection::first()),
    }
}

/// Uniform position inside the given ranges, or `None` to let the grid place it
fn random_position(pos: Option<&PosData>, context: &str, rng: &mut SimRng) -> Result<Option<Vec2>> {
    let Some(pos) = pos else {
        return Ok(None);
    };
    let missing = |field: &str| EcoError::MissingField {
        field: field.to_string(),
        context: format!("{context} pos"),
    };
    let x = pos.x_range.ok_or_else(|| missing("x_range"))?;
    let y = pos.y_range.ok_or_else(|| missing("y_range"))?;
    for (name, [lo, hi]) in [("x_range", x), ("y_range", y)] {
        if !lo.is_finite() || !hi.is_finite() || lo > hi || !(hi - lo).is_finite() {
            return Err(EcoError::invalid(format!("{context} pos: invalid {name} [{lo}, {hi}]")));
        }
    }
    Ok(Some(Vec2::random_in(rng, (x[0], x[1]), (y[0], y[1]))))
}
