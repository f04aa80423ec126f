//! Grid of regions over the world and the animal -> cell index
//!
//! The world `[0, width) x [0, height)` is cut into `rows x cols` cells of
//! `width / cols` by `height / rows` units (integer division). Each animal
//! registered with the manager belongs to exactly one cell at a time.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::FoodConfig;
use crate::core::error::{EcoError, Result};
use crate::core::types::{AnimalId, SimRng, Vec2};
use crate::entity::animal::{is_out_of_bounds, random_destination, wrap_position, Animal};
use crate::entity::store::AnimalStore;
use crate::spatial::region::{DefaultRegion, Region};

/// World dimensions as seen by observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    pub width: usize,
    pub height: usize,
    pub cols: usize,
    pub rows: usize,
    pub region_width: usize,
    pub region_height: usize,
}

impl MapInfo {
    /// Convert a world position to `(row, col)`, clamped to the grid
    pub fn cell_of(&self, pos: Vec2) -> (usize, usize) {
        let row = (pos.y / self.region_height as f64).floor() as i64;
        let col = (pos.x / self.region_width as f64).floor() as i64;
        (
            row.max(0).min(self.rows as i64 - 1) as usize,
            col.max(0).min(self.cols as i64 - 1) as usize,
        )
    }
}

/// World size and grid resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldDims {
    pub width: usize,
    pub height: usize,
    pub cols: usize,
    pub rows: usize,
}

impl WorldDims {
    pub fn new(width: usize, height: usize, cols: usize, rows: usize) -> Self {
        Self { width, height, cols, rows }
    }
}

/// One cell during iteration
#[derive(Debug, Clone, Copy)]
pub struct RegionData<'a> {
    pub row: usize,
    pub col: usize,
    pub region: &'a Region,
}

#[derive(Debug)]
pub struct RegionManager {
    width: usize,
    height: usize,
    cols: usize,
    rows: usize,
    region_width: usize,
    region_height: usize,
    /// Row-major, `rows * cols` cells
    cells: Vec<Region>,
    /// Cell each registered animal currently belongs to
    lookup: AHashMap<AnimalId, (usize, usize)>,
}

impl RegionManager {
    /// Grid of default regions with the stock food formula
    pub fn new(width: usize, height: usize, cols: usize, rows: usize) -> Result<Self> {
        Self::with_food(width, height, cols, rows, FoodConfig::default())
    }

    pub fn from_dims(dims: WorldDims, food: FoodConfig) -> Result<Self> {
        Self::with_food(dims.width, dims.height, dims.cols, dims.rows, food)
    }

    /// Grid of default regions using `food` for their formula
    pub fn with_food(width: usize, height: usize, cols: usize, rows: usize, food: FoodConfig) -> Result<Self> {
        if width == 0 || height == 0 || cols == 0 || rows == 0 {
            return Err(EcoError::invalid(format!(
                "world dimensions must be positive, got {width}x{height} with {cols} cols and {rows} rows"
            )));
        }
        if cols > width || rows > height {
            return Err(EcoError::invalid(format!(
                "{cols}x{rows} cells do not fit a {width}x{height} world"
            )));
        }

        let cells = (0..rows * cols)
            .map(|_| Region::from_supply(DefaultRegion::new(food)))
            .collect();

        Ok(Self {
            width,
            height,
            cols,
            rows,
            region_width: width / cols,
            region_height: height / rows,
            cells,
            lookup: AHashMap::new(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn region_width(&self) -> usize {
        self.region_width
    }

    pub fn region_height(&self) -> usize {
        self.region_height
    }

    pub fn dims(&self) -> WorldDims {
        WorldDims::new(self.width, self.height, self.cols, self.rows)
    }

    pub fn map_info(&self) -> MapInfo {
        MapInfo {
            width: self.width,
            height: self.height,
            cols: self.cols,
            rows: self.rows,
            region_width: self.region_width,
            region_height: self.region_height,
        }
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn region(&self, row: usize, col: usize) -> Option<&Region> {
        if row < self.rows && col < self.cols {
            Some(&self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// Cell `(row, col)` an animal is registered in
    pub fn region_of(&self, id: AnimalId) -> Option<(usize, usize)> {
        self.lookup.get(&id).copied()
    }

    pub fn is_registered(&self, id: AnimalId) -> bool {
        self.lookup.contains_key(&id)
    }

    /// Number of registered animals
    pub fn animal_count(&self) -> usize {
        self.lookup.len()
    }

    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> (usize, usize) {
        self.map_info().cell_of(pos)
    }

    /// Replace the region at `(row, col)`, moving its members into `region`
    pub fn set_region(&mut self, row: usize, col: usize, mut region: Region) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(EcoError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let idx = self.index(row, col);
        self.cells[idx].transfer_members(&mut region);
        tracing::debug!(row, col, label = region.label(), members = region.len(), "region replaced");
        self.cells[idx] = region;
        Ok(())
    }

    /// Place the animal in the world and index it by its position
    ///
    /// Animals without a starting position get a uniformly random one.
    /// Registering an animal twice re-homes it.
    pub fn register_animal(&mut self, animal: &mut Animal, rng: &mut SimRng) {
        let (width, height) = (self.width as f64, self.height as f64);
        if animal.needs_placement {
            animal.pos = Vec2::random_in(rng, (0.0, width), (0.0, height));
            animal.needs_placement = false;
        }
        if is_out_of_bounds(animal.pos, width, height) {
            animal.pos = wrap_position(animal.pos, width, height);
        }
        animal.dest = random_destination(self, rng);

        self.unregister_animal(animal.id);
        let (row, col) = self.cell_of(animal.pos);
        let idx = self.index(row, col);
        self.cells[idx].add(animal.id, animal.diet());
        self.lookup.insert(animal.id, (row, col));
    }

    pub fn unregister_animal(&mut self, id: AnimalId) {
        if let Some((row, col)) = self.lookup.remove(&id) {
            let idx = self.index(row, col);
            self.cells[idx].remove(id);
        }
    }

    /// Move the animal to the cell matching its position; returns whether it moved
    pub fn update_animal_region(&mut self, animal: &Animal) -> bool {
        let Some(current) = self.region_of(animal.id) else {
            return false;
        };
        let target = self.cell_of(animal.pos);
        if target == current {
            return false;
        }
        let old = self.index(current.0, current.1);
        let new = self.index(target.0, target.1);
        self.cells[old].remove(animal.id);
        self.cells[new].add(animal.id, animal.diet());
        self.lookup.insert(animal.id, target);
        true
    }

    /// Food the animal's current region grants it for `dt`
    pub fn get_food(&mut self, animal: &Animal, dt: f64) -> f64 {
        let Some((row, col)) = self.region_of(animal.id) else {
            return 0.0;
        };
        let idx = self.index(row, col);
        self.cells[idx].food(animal.diet(), dt)
    }

    /// Animals in the cells overlapping the square of side `2 * sight_range`
    /// around `animal`, in row-major cell order, that satisfy `filter`
    pub fn get_animals_in_range<'a, F>(&self, animal: &Animal, animals: &'a AnimalStore, filter: F) -> Vec<&'a Animal>
    where
        F: Fn(&Animal) -> bool,
    {
        let pos = animal.pos;
        let sight = animal.sight_range;
        let (rw, rh) = (self.region_width as f64, self.region_height as f64);

        let col_max = (((pos.x + sight).max(0.0) / rw) as usize).min(self.cols - 1);
        let col_min = (((pos.x - sight).max(0.0) / rw) as usize).min(self.cols - 1);
        let row_max = (((pos.y + sight).max(0.0) / rh) as usize).min(self.rows - 1);
        let row_min = (((pos.y - sight).max(0.0) / rh) as usize).min(self.rows - 1);

        let mut found = Vec::new();
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                let region = &self.cells[self.index(row, col)];
                found.extend(
                    region
                        .members()
                        .filter_map(|id| animals.get(id))
                        .filter(|a| filter(a)),
                );
            }
        }
        found
    }

    pub fn update_all_regions(&mut self, dt: f64, rng: &mut SimRng) {
        for region in &mut self.cells {
            region.update(dt, rng);
        }
    }

    /// Cells in row-major order
    pub fn regions(&self) -> impl Iterator<Item = RegionData<'_>> + '_ {
        self.cells.iter().enumerate().map(move |(i, region)| RegionData {
            row: i / self.cols,
            col: i % self.cols,
            region,
        })
    }

    /// Every indexed animal sits in exactly the region the index names, and
    /// every region's herbivore counter matches its members
    pub fn check_consistency(&self) -> bool {
        let members: usize = self.cells.iter().map(Region::len).sum();
        if members != self.lookup.len() {
            return false;
        }
        let indexed = self.lookup.iter().all(|(id, &(row, col))| {
            self.region(row, col).is_some_and(|r| r.contains(*id))
        });
        indexed && self.cells.iter().all(Region::is_consistent)
    }
}
