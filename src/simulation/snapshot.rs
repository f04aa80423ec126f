//! Serializable world state
//!
//! A [`WorldSnapshot`] lists every region of the grid, row-major, with the
//! animals inside it. [`RunOutput`] pairs the snapshot taken before a run
//! with the one taken after it.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{Diet, Vec2};
use crate::entity::animal::AnimalState;
use crate::entity::store::AnimalStore;
use crate::spatial::region_manager::RegionManager;

/// One animal as written to the output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimalRecord {
    pub pos: Vec2,
    pub gcode: String,
    pub diet: Diet,
    pub state: AnimalState,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub row: usize,
    pub col: usize,
    pub label: String,
    pub animals: Vec<AnimalRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: f64,
    pub regions: Vec<RegionSnapshot>,
}

/// Occupancy of one cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCount {
    pub row: usize,
    pub col: usize,
    pub animals: usize,
}

/// Agent count and per-region membership of a snapshot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub animals: usize,
    /// Non-empty regions only, row-major
    pub regions: Vec<RegionCount>,
}

/// World before and after a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    #[serde(rename = "in")]
    pub before: WorldSnapshot,
    #[serde(rename = "out")]
    pub after: WorldSnapshot,
}

impl WorldSnapshot {
    /// Capture the grid; members missing from `animals` are left out
    pub fn capture(time: f64, regions: &RegionManager, animals: &AnimalStore) -> Self {
        let regions = regions
            .regions()
            .map(|data| RegionSnapshot {
                row: data.row,
                col: data.col,
                label: data.region.label().to_string(),
                animals: data
                    .region
                    .members()
                    .filter_map(|id| animals.get(id))
                    .map(|a| AnimalRecord {
                        pos: a.position(),
                        gcode: a.genetic_code().to_string(),
                        diet: a.diet(),
                        state: a.state(),
                    })
                    .collect(),
            })
            .collect();
        Self { time, regions }
    }

    pub fn animal_count(&self) -> usize {
        self.regions.iter().map(|r| r.animals.len()).sum()
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            animals: self.animal_count(),
            regions: self
                .regions
                .iter()
                .filter(|r| !r.animals.is_empty())
                .map(|r| RegionCount {
                    row: r.row,
                    col: r.col,
                    animals: r.animals.len(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl SnapshotSummary {
    /// Summary of the live grid, for comparison with a captured snapshot
    pub fn of(regions: &RegionManager) -> Self {
        SnapshotSummary {
            animals: regions.animal_count(),
            regions: regions
                .regions()
                .filter(|d| !d.region.is_empty())
                .map(|d| RegionCount {
                    row: d.row,
                    col: d.col,
                    animals: d.region.len(),
                })
                .collect(),
        }
    }
}

impl RunOutput {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn summary(&self) -> String {
        format!(
            "t={:.3}: {} animals -> t={:.3}: {} animals",
            self.before.time,
            self.before.animal_count(),
            self.after.time,
            self.after.animal_count(),
        )
    }
}
