//! Sheep behaviour: graze, flee from carnivores, look for a mate

use crate::core::types::{AnimalId, Diet};
use crate::entity::animal::{Animal, AnimalState, Species, UpdateContext};
use crate::entity::selection::StrategyHandle;

impl Animal {
    pub(crate) fn sheep_normal(&mut self, dt: f64, ctx: &mut UpdateContext<'_>) {
        self.set_danger_source(None);
        self.mate_target = None;
        self.wander(dt, ctx);

        if let Some(threat) = self.search_danger(ctx) {
            self.set_danger_source(Some(threat));
            self.state = AnimalState::Danger;
        } else if self.desire > ctx.config.lifecycle.desire_threshold {
            self.state = AnimalState::Mate;
        }
    }

    pub(crate) fn sheep_danger(&mut self, dt: f64, ctx: &mut UpdateContext<'_>) {
        self.mate_target = None;

        let threat_pos = self
            .danger_source()
            .and_then(|id| ctx.animals.get(id))
            .filter(|threat| !threat.is_dead())
            .map(|threat| threat.position());

        match threat_pos {
            Some(threat) => {
                let away = self.pos + (self.pos - threat).direction();
                self.sprint_toward(away, dt, ctx.config);
            }
            None => self.set_danger_source(None),
        }

        let still_visible = threat_pos.is_some_and(|t| self.pos.distance(&t) <= self.sight_range);
        if !still_visible {
            let found = self.search_danger(ctx);
            self.set_danger_source(found);
            if found.is_none() {
                self.state = if self.desire < ctx.config.lifecycle.desire_threshold {
                    AnimalState::Normal
                } else {
                    AnimalState::Mate
                };
            }
        }
    }

    pub(crate) fn sheep_mate(&mut self, dt: f64, ctx: &mut UpdateContext<'_>) {
        self.set_danger_source(None);

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
                self.try_mate(mate, ctx);
            }
            _ => {
                self.mate_target = None;
                self.sheep_normal(dt, ctx);
            }
        }

        // danger preempts mating
        if self.danger_source().is_none() {
            if let Some(threat) = self.search_danger(ctx) {
                self.set_danger_source(Some(threat));
                self.state = AnimalState::Danger;
            } else if self.desire < ctx.config.lifecycle.desire_threshold {
                self.state = AnimalState::Normal;
            }
        }
    }

    fn search_danger(&self, ctx: &UpdateContext<'_>) -> Option<AnimalId> {
        let strategy = self.danger_strategy()?;
        self.search(ctx, &strategy, |a| a.diet() == Diet::Carnivore && !a.is_dead())
    }

    fn danger_strategy(&self) -> Option<StrategyHandle> {
        match &self.species {
            Species::Sheep(t) => Some(t.danger_strategy.clone()),
            Species::Wolf(_) => None,
        }
    }

    fn set_danger_source(&mut self, source: Option<AnimalId>) {
        if let Species::Sheep(t) = &mut self.species {
            t.danger_source = source;
        }
    }
}
