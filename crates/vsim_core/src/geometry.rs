//! Geometry on the political map.
//!
//! The map is the square `[-1,1]×[-1,1]` (economic axis × social axis).
//! Every position produced by this module is clipped back onto the map.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::rng::SimRng;

pub const MAP_MIN: f64 = -1.0;
pub const MAP_MAX: f64 = 1.0;

/// Clip `v` into `[lo, hi]`. NaN collapses to `lo`.
#[inline]
pub fn clip(v: f64, lo: f64, hi: f64) -> f64 {
    if v.is_nan() {
        return lo;
    }
    v.max(lo).min(hi)
}

/// Clip a probability-like parameter into `[0, 1]`.
#[inline]
pub fn clip_unit(v: f64) -> f64 {
    clip(v, 0.0, 1.0)
}

/// A point on the political map.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    /// Build a position, clipping both coordinates onto the map.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x: clip(x, MAP_MIN, MAP_MAX), y: clip(y, MAP_MIN, MAP_MAX) }
    }

    /// Build a position, rejecting coordinates outside the map instead of clipping.
    pub fn try_new(x: f64, y: f64) -> Result<Self, CoreError> {
        let p = Self { x, y };
        if p.is_on_map() { Ok(p) } else { Err(CoreError::DomainOutOfRange("position outside [-1,1]²")) }
    }

    #[inline]
    pub fn is_on_map(&self) -> bool {
        (MAP_MIN..=MAP_MAX).contains(&self.x) && (MAP_MIN..=MAP_MAX).contains(&self.y)
    }

    /// Euclidean distance.
    #[inline]
    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Move a `fraction` of the way toward `target` (clipped onto the map).
    pub fn step_toward(&self, target: &Position, fraction: f64) -> Position {
        let f = clip_unit(fraction);
        Position::new(self.x + (target.x - self.x) * f, self.y + (target.y - self.y) * f)
    }

    /// Uniform draw over the whole map.
    pub fn random_uniform(rng: &mut SimRng) -> Position {
        let span = MAP_MAX - MAP_MIN;
        Position::new(MAP_MIN + rng.next_f64() * span, MAP_MIN + rng.next_f64() * span)
    }

    /// Isotropic normal draw around `center`, clipped onto the map.
    pub fn random_normal(rng: &mut SimRng, center: &Position, std_dev: f64) -> Position {
        Position::new(rng.normal(center.x, std_dev), rng.normal(center.y, std_dev))
    }
}

/// Running sum of positions, used for the average elector position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionAccumulator {
    sum_x: f64,
    sum_y: f64,
    count: usize,
}

impl PositionAccumulator {
    pub fn add(&mut self, p: &Position) {
        self.sum_x += p.x;
        self.sum_y += p.y;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Average of everything added so far; `None` when nothing was added.
    pub fn average(&self) -> Option<Position> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(Position::new(self.sum_x / n, self.sum_y / n))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(0.3, 0.4);
        assert!((a.distance(&b) - 0.5).abs() < 1e-12);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn new_clips_and_try_new_rejects() {
        let p = Position::new(3.0, -7.5);
        assert_eq!(p, Position { x: 1.0, y: -1.0 });
        assert!(Position::try_new(1.0, -1.0).is_ok());
        assert!(matches!(
            Position::try_new(1.01, 0.0),
            Err(CoreError::DomainOutOfRange(_))
        ));
    }

    #[test]
    fn step_toward_moves_fraction_of_gap() {
        let p = Position::new(0.0, 0.0).step_toward(&Position::new(1.0, -1.0), 0.25);
        assert!((p.x - 0.25).abs() < 1e-12);
        assert!((p.y + 0.25).abs() < 1e-12);
    }

    #[test]
    fn accumulator_average_and_empty() {
        let mut acc = PositionAccumulator::default();
        assert_eq!(acc.average(), None);
        acc.add(&Position::new(0.5, 0.5));
        acc.add(&Position::new(-0.5, 0.1));
        let avg = acc.average().unwrap();
        assert!((avg.x - 0.0).abs() < 1e-12);
        assert!((avg.y - 0.3).abs() < 1e-12);
        acc.reset();
        assert_eq!(acc.count(), 0);
    }

    #[test]
    fn random_positions_stay_on_map() {
        let mut rng = SimRng::from_seed_u64(11);
        for _ in 0..200 {
            assert!(Position::random_uniform(&mut rng).is_on_map());
            assert!(Position::random_normal(&mut rng, &Position::new(0.9, -0.9), 0.8).is_on_map());
        }
    }

    #[test]
    fn clip_handles_nan() {
        assert_eq!(clip(f64::NAN, -1.0, 1.0), -1.0);
        assert_eq!(clip_unit(1.5), 1.0);
        assert_eq!(clip_unit(-0.2), 0.0);
    }
}
