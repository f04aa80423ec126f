//! Population counts by species, state and region

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::Diet;
use crate::entity::animal::{AnimalInfo, AnimalState};
use crate::simulation::events::{MapInfo, SimEvent, SimObserver};

/// Animals of one species per lifecycle state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub normal: usize,
    pub mate: usize,
    pub hunger: usize,
    pub danger: usize,
    pub dead: usize,
}

impl StateCounts {
    fn record(&mut self, state: AnimalState) {
        match state {
            AnimalState::Normal => self.normal += 1,
            AnimalState::Mate => self.mate += 1,
            AnimalState::Hunger => self.hunger += 1,
            AnimalState::Danger => self.danger += 1,
            AnimalState::Dead => self.dead += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.normal + self.mate + self.hunger + self.danger + self.dead
    }

    pub fn alive(&self) -> usize {
        self.total() - self.dead
    }
}

/// Herbivores and carnivores inside one cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCensus {
    pub row: usize,
    pub col: usize,
    pub herbivores: usize,
    pub carnivores: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Census {
    pub time: f64,
    /// Keyed by genetic code
    pub species: BTreeMap<String, StateCounts>,
    /// Occupied cells only, row-major
    pub regions: Vec<RegionCensus>,
}

impl Census {
    pub fn from_animals(time: f64, map: &MapInfo, animals: &[AnimalInfo]) -> Self {
        let mut species: BTreeMap<String, StateCounts> = BTreeMap::new();
        let mut cells: BTreeMap<(usize, usize), (usize, usize)> = BTreeMap::new();

        for animal in animals {
            species
                .entry(animal.genetic_code.clone())
                .or_default()
                .record(animal.state);

            let cell = cells.entry(map.cell_of(animal.position)).or_default();
            match animal.diet {
                Diet::Herbivore => cell.0 += 1,
                Diet::Carnivore => cell.1 += 1,
            }
        }

        let regions = cells
            .into_iter()
            .map(|((row, col), (herbivores, carnivores))| RegionCensus {
                row,
                col,
                herbivores,
                carnivores,
            })
            .collect();

        Self { time, species, regions }
    }

    pub fn from_event(event: &SimEvent) -> Self {
        Self::from_animals(event.time(), event.map(), event.animals())
    }

    pub fn total(&self) -> usize {
        self.species.values().map(StateCounts::total).sum()
    }

    pub fn count(&self, genetic_code: &str) -> StateCounts {
        self.species.get(genetic_code).copied().unwrap_or_default()
    }
}

impl fmt::Display for Census {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Census at t={:.3}: {} animals", self.time, self.total())?;
        for (code, c) in &self.species {
            writeln!(
                f,
                "  {code:<8} normal {:>4}  mate {:>4}  hunger {:>4}  danger {:>4}  dead {:>4}",
                c.normal, c.mate, c.hunger, c.danger, c.dead
            )?;
        }
        for r in &self.regions {
            writeln!(
                f,
                "  region ({:>2}, {:>2})  herbivores {:>4}  carnivores {:>4}",
                r.row, r.col, r.herbivores, r.carnivores
            )?;
        }
        Ok(())
    }
}

/// Observer that keeps the most recent census and the population over time
#[derive(Debug, Default)]
pub struct CensusRecorder {
    latest: Option<Census>,
    history: Vec<(f64, usize)>,
}

impl CensusRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&Census> {
        self.latest.as_ref()
    }

    /// `(time, animals)` after every advance
    pub fn history(&self) -> &[(f64, usize)] {
        &self.history
    }

    pub fn peak(&self) -> usize {
        self.history.iter().map(|(_, n)| *n).max().unwrap_or(0)
    }
}

impl SimObserver for CensusRecorder {
    fn notify(&mut self, event: &SimEvent) {
        let census = Census::from_event(event);
        match event {
            SimEvent::Advanced { .. } => self.history.push((census.time, census.total())),
            SimEvent::Reset { .. } => self.history.clear(),
            _ => {}
        }
        self.latest = Some(census);
    }
}
