//! Core type definitions used throughout the codebase

use std::fmt;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Random source shared by the whole simulation
pub type SimRng = ChaCha8Rng;

/// Handle to an animal in the simulator's agent table
///
/// Handles are never reused within one simulator, so a stale handle simply
/// fails to resolve instead of pointing at a different animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimalId(pub u64);

impl AnimalId {
    /// Id of an animal that has not been added to a simulator yet
    pub const UNASSIGNED: AnimalId = AnimalId(u64::MAX);
}

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an animal eats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Diet {
    Herbivore,
    Carnivore,
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diet::Herbivore => f.write_str("HERBIVORE"),
            Diet::Carnivore => f.write_str("CARNIVORE"),
        }
    }
}

/// 2D position or direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector pointing the same way, or zero for a (near) zero vector
    pub fn direction(&self) -> Self {
        let len = self.length();
        if len > 1e-9 {
            Self { x: self.x / len, y: self.y / len }
        } else {
            Self::default()
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        *self * factor
    }

    /// Uniform random vector with each component drawn from `[lo, hi)`
    pub fn random<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> Self {
        Self::random_in(rng, (lo, hi), (lo, hi))
    }

    /// Uniform random vector inside the given x and y ranges
    ///
    /// Degenerate ranges (`lo >= hi`) collapse to `lo`.
    pub fn random_in<R: Rng + ?Sized>(rng: &mut R, x: (f64, f64), y: (f64, f64)) -> Self {
        Self {
            x: sample(rng, x.0, x.1),
            y: sample(rng, y.0, y.1),
        }
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if lo < hi {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3},{:.3}]", self.x, self.y)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_vector_arithmetic_is_pure() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -1.0);
        assert_eq!(a + b, Vec2::new(4.0, 1.0));
        assert_eq!(a - b, Vec2::new(-2.0, 3.0));
        assert_eq!(a.scale(2.0), Vec2::new(2.0, 4.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
        // operands untouched
        assert_eq!(a, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_distance_and_direction() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);

        let dir = b.direction();
        assert!((dir.length() - 1.0).abs() < 1e-12);
        assert!((dir.x - 0.6).abs() < 1e-12);

        assert_eq!(Vec2::ZERO.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_random_vector_stays_in_range() {
        let mut rng = SimRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = Vec2::random_in(&mut rng, (10.0, 20.0), (-5.0, 5.0));
            assert!(v.x >= 10.0 && v.x < 20.0);
            assert!(v.y >= -5.0 && v.y < 5.0);
        }
        let fixed = Vec2::random_in(&mut rng, (3.0, 3.0), (4.0, 1.0));
        assert_eq!(fixed, Vec2::new(3.0, 4.0));
    }
}
