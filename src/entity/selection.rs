//! Target selection strategies
//!
//! A strategy picks one animal out of the candidates a range query produced.
//! Strategies are stateless and shared between an animal and its offspring
//! through a [`StrategyHandle`].

use std::fmt;
use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::entity::animal::Animal;

/// Picks one candidate relative to a reference animal
pub trait SelectionStrategy: fmt::Debug + Send + Sync {
    /// Tag the strategy is registered under
    fn tag(&self) -> &str;

    /// Choose a candidate, or `None` when there is nothing to choose from
    fn select<'a>(&self, reference: &Animal, candidates: &[&'a Animal]) -> Option<&'a Animal>;
}

/// Shared, immutable strategy reference
pub type StrategyHandle = Arc<dyn SelectionStrategy>;

/// Head of the candidate list
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectFirst;

/// Candidate nearest to the reference animal
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectClosest;

/// Candidate with the lowest age
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectYoungest;

impl SelectionStrategy for SelectFirst {
    fn tag(&self) -> &str {
        "first"
    }

    fn select<'a>(&self, _reference: &Animal, candidates: &[&'a Animal]) -> Option<&'a Animal> {
        candidates.first().copied()
    }
}

impl SelectionStrategy for SelectClosest {
    fn tag(&self) -> &str {
        "closest"
    }

    // min_by_key keeps the first of equal minima
    fn select<'a>(&self, reference: &Animal, candidates: &[&'a Animal]) -> Option<&'a Animal> {
        let origin = reference.position();
        candidates
            .iter()
            .copied()
            .min_by_key(|a| OrderedFloat(origin.distance(&a.position())))
    }
}

impl SelectionStrategy for SelectYoungest {
    fn tag(&self) -> &str {
        "youngest"
    }

    fn select<'a>(&self, _reference: &Animal, candidates: &[&'a Animal]) -> Option<&'a Animal> {
        candidates
            .iter()
            .copied()
            .min_by_key(|a| OrderedFloat(a.age()))
    }
}

pub fn first() -> StrategyHandle {
    Arc::new(SelectFirst)
}

pub fn closest() -> StrategyHandle {
    Arc::new(SelectClosest)
}

pub fn youngest() -> StrategyHandle {
    Arc::new(SelectYoungest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::{SimRng, Vec2};
    use rand::SeedableRng;

    fn sheep_at(x: f64, y: f64, age: f64, rng: &mut SimRng) -> Animal {
        let config = SimulationConfig::default();
        Animal::sheep(first(), first(), Some(Vec2::new(x, y)), &config, rng)
            .unwrap()
            .with_age(age)
    }

    #[test]
    fn test_empty_candidates_select_nothing() {
        let mut rng = SimRng::seed_from_u64(1);
        let me = sheep_at(0.0, 0.0, 0.0, &mut rng);
        assert!(SelectFirst.select(&me, &[]).is_none());
        assert!(SelectClosest.select(&me, &[]).is_none());
        assert!(SelectYoungest.select(&me, &[]).is_none());
    }

    #[test]
    fn test_first_returns_head() {
        let mut rng = SimRng::seed_from_u64(2);
        let me = sheep_at(0.0, 0.0, 0.0, &mut rng);
        let a = sheep_at(50.0, 0.0, 3.0, &mut rng);
        let b = sheep_at(1.0, 0.0, 1.0, &mut rng);
        let picked = SelectFirst.select(&me, &[&a, &b]).unwrap();
        assert!(std::ptr::eq(picked, &a));
    }

    #[test]
    fn test_closest_prefers_nearest_then_first_on_ties() {
        let mut rng = SimRng::seed_from_u64(3);
        let me = sheep_at(0.0, 0.0, 0.0, &mut rng);
        let far = sheep_at(30.0, 0.0, 0.0, &mut rng);
        let near_a = sheep_at(0.0, 5.0, 0.0, &mut rng);
        let near_b = sheep_at(5.0, 0.0, 0.0, &mut rng);

        let picked = SelectClosest.select(&me, &[&far, &near_a, &near_b]).unwrap();
        assert!(std::ptr::eq(picked, &near_a));
    }

    #[test]
    fn test_youngest_prefers_lowest_age_then_first_on_ties() {
        let mut rng = SimRng::seed_from_u64(4);
        let me = sheep_at(0.0, 0.0, 0.0, &mut rng);
        let old = sheep_at(1.0, 1.0, 4.0, &mut rng);
        let young_a = sheep_at(2.0, 2.0, 0.5, &mut rng);
        let young_b = sheep_at(3.0, 3.0, 0.5, &mut rng);

        let picked = SelectYoungest.select(&me, &[&old, &young_a, &young_b]).unwrap();
        assert!(std::ptr::eq(picked, &young_a));
    }
}
