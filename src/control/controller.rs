//! Loads scenarios into a simulator and runs it

use crate::core::error::{EcoError, Result};
use crate::simulation::events::{ObserverId, SimObserver};
use crate::simulation::simulator::Simulator;
use crate::simulation::snapshot::{RunOutput, WorldSnapshot};
use crate::spatial::region_manager::WorldDims;
use crate::world::scenario::{Population, RegionAssignment, Scenario};

#[derive(Debug)]
pub struct Controller {
    sim: Simulator,
}

impl Controller {
    pub fn new(sim: Simulator) -> Self {
        Self { sim }
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.sim
    }

    pub fn into_simulator(self) -> Simulator {
        self.sim
    }

    /// Apply the scenario's regions, then add its populations
    ///
    /// The world size of the scenario is not applied; call [`Controller::reset`]
    /// first if it differs from the simulator's.
    pub fn load_scenario(&mut self, scenario: &Scenario) -> Result<()> {
        self.set_regions(&scenario.regions)?;
        self.add_populations(&scenario.animals)?;
        tracing::debug!(
            regions = scenario.regions.len(),
            animals = self.sim.animal_count(),
            "scenario loaded"
        );
        Ok(())
    }

    pub fn add_populations(&mut self, populations: &[Population]) -> Result<()> {
        for population in populations {
            for _ in 0..population.amount {
                self.sim.spawn_animal(&population.spec)?;
            }
        }
        Ok(())
    }

    /// Install region specs over inclusive row/col blocks
    ///
    /// Every block is checked and every region built before the grid is
    /// touched, so a failing block leaves the grid as it was.
    pub fn set_regions(&mut self, assignments: &[RegionAssignment]) -> Result<()> {
        let (rows, cols) = {
            let grid = self.sim.region_manager();
            (grid.rows(), grid.cols())
        };
        for block in assignments {
            block.check_within(rows, cols)?;
        }

        let mut staged = Vec::new();
        for block in assignments {
            for (row, col) in block.cells() {
                staged.push((row, col, self.sim.build_region(&block.spec)?));
            }
        }
        for (row, col, region) in staged {
            self.sim.set_region(row, col, region)?;
        }
        Ok(())
    }

    /// Advance in steps of `dt` while the clock is below `t`
    pub fn run(&mut self, t: f64, dt: f64) -> Result<RunOutput> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(EcoError::invalid(format!("time step must be positive, got {dt}")));
        }
        if !t.is_finite() {
            return Err(EcoError::invalid(format!("run time must be finite, got {t}")));
        }

        let before: WorldSnapshot = self.sim.snapshot();
        let mut steps = 0u64;
        while self.sim.time() < t {
            self.sim.advance(dt);
            steps += 1;
        }
        tracing::debug!(steps, time = self.sim.time(), animals = self.sim.animal_count(), "run finished");

        Ok(RunOutput {
            before,
            after: self.sim.snapshot(),
        })
    }

    pub fn advance(&mut self, dt: f64) {
        self.sim.advance(dt);
    }

    pub fn reset(&mut self, world: WorldDims) -> Result<()> {
        self.sim.reset(world)
    }

    /// Distinct genetic codes of the current animals, in insertion order
    pub fn species(&self) -> Vec<String> {
        let mut species: Vec<String> = Vec::new();
        for animal in self.sim.animals() {
            if !species.iter().any(|s| s == animal.genetic_code()) {
                species.push(animal.genetic_code().to_string());
            }
        }
        species
    }

    pub fn add_observer<O: SimObserver + 'static>(&mut self, observer: O) -> ObserverId {
        self.sim.add_observer(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.sim.remove_observer(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Controller {
        Controller::new(Simulator::with_defaults(WorldDims::new(800, 600, 20, 15)).unwrap())
    }

    const SCENARIO: &str = r#"{
        "width": 800, "height": 600, "cols": 20, "rows": 15,
        "regions": [
            { "row": [0, 1], "col": [0, 2], "spec": { "type": "dynamic", "data": { "food": 500.0 } } }
        ],
        "animals": [
            { "amount": 4, "spec": { "type": "sheep" } },
            { "amount": 2, "spec": { "type": "wolf" } }
        ]
    }"#;

    #[test]
    fn test_load_scenario_applies_inclusive_blocks() {
        let mut ctl = controller();
        let scenario = Scenario::from_json_str(SCENARIO).unwrap();
        ctl.load_scenario(&scenario).unwrap();

        let regions = ctl.simulator().region_manager();
        let dynamic = regions
            .regions()
            .filter(|r| r.region.label() == "Dynamic Supply Region")
            .count();
        assert_eq!(dynamic, 6);
        assert_eq!(regions.region(1, 2).unwrap().label(), "Dynamic Supply Region");
        assert_eq!(regions.region(2, 0).unwrap().label(), "Default Region");
        assert_eq!(ctl.simulator().animal_count(), 6);
        assert_eq!(ctl.species(), vec!["Sheep".to_string(), "Wolf".to_string()]);
    }

    #[test]
    fn test_out_of_grid_block_fails() {
        let mut ctl = controller();
        let block = RegionAssignment {
            row: [14, 15],
            col: [0, 0],
            spec: crate::factory::EntitySpec::new("default"),
        };
        assert!(matches!(
            ctl.set_regions(&[block]),
            Err(EcoError::OutOfBounds { row: 15, .. })
        ));
    }

    #[test]
    fn test_failed_block_leaves_grid_untouched() {
        let mut ctl = controller();
        let inside = RegionAssignment {
            row: [0, 0],
            col: [0, 1],
            spec: crate::factory::EntitySpec::new("dynamic"),
        };
        let straddling = RegionAssignment {
            row: [14, 15],
            col: [0, 0],
            spec: crate::factory::EntitySpec::new("dynamic"),
        };
        assert!(ctl.set_regions(&[inside.clone(), straddling]).is_err());

        let regions = ctl.simulator().region_manager();
        assert_eq!(regions.region(14, 0).unwrap().label(), "Default Region");
        assert_eq!(regions.region(0, 0).unwrap().label(), "Default Region");

        // A block with an unknown region type fails before anything is installed
        let unknown = RegionAssignment {
            row: [2, 2],
            col: [0, 0],
            spec: crate::factory::EntitySpec::new("swamp"),
        };
        assert!(ctl.set_regions(&[inside, unknown]).is_err());
        assert_eq!(ctl.simulator().region_manager().region(0, 0).unwrap().label(), "Default Region");
    }

    #[test]
    fn test_run_snapshots_before_and_after() {
        let mut ctl = controller();
        ctl.load_scenario(&Scenario::from_json_str(SCENARIO).unwrap()).unwrap();

        let output = ctl.run(0.3, 0.03).unwrap();
        assert_eq!(output.before.time, 0.0);
        assert!(output.after.time >= 0.3 - 1e-9);
        assert_eq!(output.before.animal_count(), 6);
        assert_eq!(output.before.regions.len(), 300);

        assert!(ctl.run(1.0, 0.0).is_err());
        assert!(ctl.run(1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_reset_clears_population() {
        let mut ctl = controller();
        ctl.load_scenario(&Scenario::from_json_str(SCENARIO).unwrap()).unwrap();
        ctl.advance(0.1);
        ctl.reset(WorldDims::new(400, 400, 4, 4)).unwrap();

        assert_eq!(ctl.simulator().time(), 0.0);
        assert_eq!(ctl.simulator().animal_count(), 0);
        assert_eq!(ctl.simulator().map_info().region_width, 100);
        assert!(ctl.species().is_empty());
    }
}
