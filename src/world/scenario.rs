//! Scenario files: world size, region layout and starting populations
//!
//! ```json
//! {
//!   "width": 800, "height": 600, "cols": 20, "rows": 15,
//!   "regions": [ { "row": [0, 4], "col": [0, 19], "spec": { "type": "dynamic" } } ],
//!   "animals": [ { "amount": 20, "spec": { "type": "sheep" } } ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{EcoError, Result};
use crate::factory::EntitySpec;
use crate::spatial::region_manager::WorldDims;

/// Region spec applied to an inclusive block of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAssignment {
    /// First and last row, both inclusive
    pub row: [usize; 2],
    /// First and last column, both inclusive
    pub col: [usize; 2],
    pub spec: EntitySpec,
}

impl RegionAssignment {
    /// Cells covered, row-major
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let [c0, c1] = self.col;
        (self.row[0]..=self.row[1]).flat_map(move |r| (c0..=c1).map(move |c| (r, c)))
    }

    /// Ascending ranges that fit a `rows` x `cols` grid
    pub fn check_within(&self, rows: usize, cols: usize) -> Result<()> {
        if self.row[0] > self.row[1] || self.col[0] > self.col[1] {
            return Err(EcoError::invalid(format!(
                "region block rows {:?} cols {:?} must be ascending",
                self.row, self.col
            )));
        }
        if self.row[1] >= rows || self.col[1] >= cols {
            return Err(EcoError::OutOfBounds {
                row: self.row[1],
                col: self.col[1],
                rows,
                cols,
            });
        }
        Ok(())
    }
}

/// `amount` animals built from the same spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub amount: usize,
    pub spec: EntitySpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(flatten)]
    pub world: WorldDims,
    #[serde(default)]
    pub regions: Vec<RegionAssignment>,
    #[serde(default)]
    pub animals: Vec<Population>,
}

impl Scenario {
    pub fn new(world: WorldDims) -> Self {
        Self {
            world,
            regions: Vec::new(),
            animals: Vec::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.world;
        if w.width == 0 || w.height == 0 || w.cols == 0 || w.rows == 0 {
            return Err(EcoError::invalid("scenario world dimensions must be positive"));
        }
        for block in &self.regions {
            block.check_within(w.rows, w.cols)?;
        }
        Ok(())
    }

    /// Total number of animals the scenario starts with
    pub fn population(&self) -> usize {
        self.animals.iter().map(|p| p.amount).sum()
    }
}
