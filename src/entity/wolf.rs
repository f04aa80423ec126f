//! Wolf behaviour: roam, hunt herbivores when hungry, look for a mate

use crate::core::types::{AnimalId, Diet};
use crate::entity::animal::{Animal, AnimalState, MatingOutcome, Species, UpdateContext};
use crate::entity::selection::StrategyHandle;

impl Animal {
    pub(crate) fn wolf_normal(&mut self, dt: f64, ctx: &mut UpdateContext<'_>) {
        self.set_hunt_target(None);
        self.mate_target = None;
        self.wander(dt, ctx);

        if self.energy < ctx.config.predation.hunger_threshold {
            self.state = AnimalState::Hunger;
        } else if self.desire > ctx.config.lifecycle.desire_threshold {
            self.state = AnimalState::Mate;
        }
    }

    pub(crate) fn wolf_hunger(&mut self, dt: f64, ctx: &mut UpdateContext<'_>) {
        self.mate_target = None;

        let mut prey_pos = self.visible_target(self.hunt_target(), ctx.animals);
        if prey_pos.is_none() {
            let found = self.search_prey(ctx);
            self.set_hunt_target(found);
            prey_pos = found.and_then(|id| ctx.animals.get(id)).map(|prey| prey.position());
        }

        let (Some(prey), Some(target)) = (self.hunt_target(), prey_pos) else {
            self.wolf_normal(dt, ctx);
            return;
        };

        self.sprint_toward(target, dt, ctx.config);
        if self.pos.distance(&target) >= ctx.config.lifecycle.arrival_distance {
            return;
        }

        if let Some(victim) = ctx.animals.get_mut(prey) {
            victim.state = AnimalState::Dead;
        }
        tracing::debug!(wolf = %self.id, prey = %prey, "kill");
        self.set_hunt_target(None);
        self.energy += ctx.config.predation.kill_reward;
        self.clamp_energy();

        if self.energy > ctx.config.predation.hunger_threshold {
            self.state = if self.desire < ctx.config.lifecycle.desire_threshold {
                AnimalState::Normal
            } else {
                AnimalState::Mate
            };
        }
    }

    pub(crate) fn wolf_mate(&mut self, dt: f64, ctx: &mut UpdateContext<'_>) {
        self.set_hunt_target(None);

        let mut mate_pos = self.visible_target(self.mate_target, ctx.animals);
        if mate_pos.is_none() {
            self.mate_target = self.search_mate(ctx);
            mate_pos = self
                .mate_target
                .and_then(|id| ctx.animals.get(id))
                .map(|mate| mate.position());
        }

        match (self.mate_target, mate_pos) {
            (Some(mate), Some(target)) => {
                self.sprint_toward(target, dt, ctx.config);
                if self.try_mate(mate, ctx) == MatingOutcome::Conceived {
                    self.energy -= ctx.config.predation.mating_cost;
                    self.clamp_energy();
                }
            }
            _ => {
                self.mate_target = None;
                self.wolf_normal(dt, ctx);
            }
        }

        if self.energy < ctx.config.predation.hunger_threshold {
            self.state = AnimalState::Hunger;
        } else if self.desire < ctx.config.lifecycle.desire_threshold {
            self.state = AnimalState::Normal;
        }
    }

    fn search_prey(&self, ctx: &UpdateContext<'_>) -> Option<AnimalId> {
        let strategy = self.hunting_strategy()?;
        self.search(ctx, &strategy, |a| a.diet() == Diet::Herbivore && !a.is_dead())
    }

    fn hunting_strategy(&self) -> Option<StrategyHandle> {
        match &self.species {
            Species::Wolf(t) => Some(t.hunting_strategy.clone()),
            Species::Sheep(_) => None,
        }
    }

    fn set_hunt_target(&mut self, target: Option<AnimalId>) {
        if let Species::Wolf(t) = &mut self.species {
            t.hunt_target = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;
    use crate::entity::selection;
    use crate::entity::testing::World;

    fn wolf(world: &mut World, x: f64, y: f64) -> Animal {
        Animal::wolf(
            selection::first(),
            selection::closest(),
            Some(Vec2::new(x, y)),
            &world.config,
            &mut world.rng,
        )
        .unwrap()
    }

    fn sheep(world: &mut World, x: f64, y: f64) -> Animal {
        Animal::sheep(
            selection::first(),
            selection::first(),
            Some(Vec2::new(x, y)),
            &world.config,
            &mut world.rng,
        )
        .unwrap()
    }

    #[test]
    fn test_wolf_turns_hungry_below_threshold() {
        let mut world = World::new();
        let w = wolf(&mut world, 200.0, 200.0).with_energy(50.1);
        let wid = world.add(w);

        world.step(wid, 0.03);
        assert_eq!(world.animals.get(wid).unwrap().state(), AnimalState::Hunger);
    }

    #[test]
    fn test_hungry_wolf_kills_adjacent_prey() {
        let mut world = World::new();
        let w = wolf(&mut world, 300.0, 300.0)
            .with_state(AnimalState::Hunger)
            .with_energy(30.0);
        let wid = world.add(w);
        let s = sheep(&mut world, 303.0, 300.0);
        let sid = world.add(s);

        world.step(wid, 0.03);

        let prey = world.animals.get(sid).unwrap();
        assert_eq!(prey.state(), AnimalState::Dead);
        let hunter = world.animals.get(wid).unwrap();
        assert!(hunter.hunt_target().is_none());
        assert!(hunter.energy() > 70.0, "energy was {}", hunter.energy());
        assert_eq!(hunter.state(), AnimalState::Normal);
    }

    #[test]
    fn test_well_fed_hunter_with_high_desire_goes_courting() {
        let mut world = World::new();
        let w = wolf(&mut world, 300.0, 300.0)
            .with_state(AnimalState::Hunger)
            .with_energy(30.0)
            .with_desire(80.0);
        let wid = world.add(w);
        let s = sheep(&mut world, 303.0, 300.0);
        let sid = world.add(s);

        world.step(wid, 0.03);

        assert_eq!(world.animals.get(sid).unwrap().state(), AnimalState::Dead);
        let hunter = world.animals.get(wid).unwrap();
        assert!(hunter.energy() > 50.0);
        assert_eq!(hunter.state(), AnimalState::Mate);
    }

    #[test]
    fn test_hungry_wolf_chases_distant_prey() {
        let mut world = World::new();
        let w = wolf(&mut world, 300.0, 300.0)
            .with_state(AnimalState::Hunger)
            .with_energy(30.0);
        let wid = world.add(w);
        let s = sheep(&mut world, 340.0, 300.0);
        let sid = world.add(s);

        world.step(wid, 0.03);

        let hunter = world.animals.get(wid).unwrap();
        assert_eq!(hunter.hunt_target(), Some(sid));
        assert_eq!(hunter.state(), AnimalState::Hunger);
        assert!(hunter.position().x > 300.0);
        assert_eq!(world.animals.get(sid).unwrap().state(), AnimalState::Normal);
    }

    #[test]
    fn test_wolves_do_not_hunt_each_other() {
        let mut world = World::new();
        let w = wolf(&mut world, 300.0, 300.0)
            .with_state(AnimalState::Hunger)
            .with_energy(30.0);
        let wid = world.add(w);
        let other = wolf(&mut world, 302.0, 300.0);
        let oid = world.add(other);

        world.step(wid, 0.03);
        assert!(world.animals.get(wid).unwrap().hunt_target().is_none());
        assert_eq!(world.animals.get(oid).unwrap().state(), AnimalState::Normal);
    }

    #[test]
    fn test_courting_wolf_gives_up_when_starving() {
        let mut world = World::new();
        let w = wolf(&mut world, 300.0, 300.0)
            .with_state(AnimalState::Mate)
            .with_desire(90.0)
            .with_energy(50.3);
        let wid = world.add(w);
        let partner = wolf(&mut world, 330.0, 300.0)
            .with_state(AnimalState::Mate)
            .with_desire(90.0);
        let pid = world.add(partner);

        world.step(wid, 0.03);

        let w = world.animals.get(wid).unwrap();
        assert_eq!(w.mate_target(), Some(pid));
        assert!(w.energy() < 50.0, "energy was {}", w.energy());
        assert_eq!(w.state(), AnimalState::Hunger);
        assert!(!w.is_pregnant());
    }

    #[test]
    fn test_wolf_pays_for_conception() {
        let mut world = World::new();
        world.config.lifecycle.birth_probability = 1.0;
        let a = wolf(&mut world, 300.0, 300.0)
            .with_state(AnimalState::Mate)
            .with_desire(90.0);
        let aid = world.add(a);
        let b = wolf(&mut world, 302.0, 300.0)
            .with_state(AnimalState::Mate)
            .with_desire(90.0);
        let bid = world.add(b);

        world.step(aid, 0.03);

        let a = world.animals.get(aid).unwrap();
        assert!(a.is_pregnant());
        assert_eq!(a.desire(), 0.0);
        assert!(a.energy() < 100.0 - 10.0 + 1e-9);
        assert_eq!(a.state(), AnimalState::Normal);
        assert_eq!(world.animals.get(bid).unwrap().desire(), 0.0);
    }
}
