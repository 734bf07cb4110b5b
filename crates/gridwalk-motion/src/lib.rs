#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for bounded linear motion between tile waypoints."]
#![doc = ""]
#![doc = "This crate provides world-space points, cardinal facings and a clamped"]
#![doc = "step function that moves an agent toward a waypoint without overshooting it."]

use core::f32::consts::{FRAC_PI_2, PI};
use core::fmt;
use libm::sqrtf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::MotionError;

/// A point in world space (units are whatever the embedding tilemap uses).
///
/// Equality is component-wise, so two points compare equal iff both
/// coordinates match exactly.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct WorldPoint {
    /// World-space x coordinate.
    pub x: f32,
    /// World-space y coordinate.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new `WorldPoint`.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        sqrtf(dx * dx + dy * dy)
    }

    /// Moves from `self` toward `target` by at most `max_delta`.
    ///
    /// The result never passes `target`: when the remaining distance is
    /// within `max_delta` the target itself is returned.
    #[must_use]
    pub fn move_towards(self, target: WorldPoint, max_delta: f32) -> WorldPoint {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let distance = sqrtf(dx * dx + dy * dy);

        if distance <= max_delta || distance == 0.0 {
            return target;
        }

        let scale = max_delta / distance;
        WorldPoint::new(self.x + dx * scale, self.y + dy * scale)
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Cardinal direction an agent faces.
///
/// North is +y and East is +x in grid space.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Toward increasing y.
    #[default]
    North,
    /// Toward increasing x.
    East,
    /// Toward decreasing y.
    South,
    /// Toward decreasing x.
    West,
}

impl Facing {
    /// Derives the facing for a single grid step `(dx, dy)`.
    ///
    /// The vertical component is compared first, so a step that changes both
    /// axes faces North or South. Returns `None` for a zero step, in which
    /// case the caller keeps its current facing.
    pub const fn from_step(dx: i64, dy: i64) -> Option<Self> {
        if dy > 0 {
            Some(Facing::North)
        } else if dy < 0 {
            Some(Facing::South)
        } else if dx > 0 {
            Some(Facing::East)
        } else if dx < 0 {
            Some(Facing::West)
        } else {
            None
        }
    }

    /// Heading in radians, counter-clockwise from +x, in `(-PI, PI]`.
    pub const fn heading(&self) -> f32 {
        match self {
            Facing::East => 0.0,
            Facing::North => FRAC_PI_2,
            Facing::West => PI,
            Facing::South => -FRAC_PI_2,
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Facing::North => "North",
            Facing::East => "East",
            Facing::South => "South",
            Facing::West => "West",
        };
        f.write_str(name)
    }
}

/// Advances `current` toward `target` at `speed` for `dt` seconds.
///
/// The step length is `speed * dt`, clamped so the result never overshoots
/// `target`.
///
/// # Errors
///
/// Returns `Err(MotionError::NegativeTimeDelta)` if `dt` is negative.
/// Returns `Err(MotionError::InvalidSpeed)` if `speed` is negative or not finite.
pub fn step_towards(
    current: WorldPoint,
    target: WorldPoint,
    speed: f32,
    dt: f32,
) -> Result<WorldPoint, MotionError> {
    if dt < 0.0 {
        return Err(MotionError::NegativeTimeDelta("must be non-negative"));
    }
    if !speed.is_finite() || speed < 0.0 {
        return Err(MotionError::InvalidSpeed("must be finite and non-negative"));
    }

    Ok(current.move_towards(target, speed * dt))
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_distance() {
        let a = WorldPoint::new(0.0, 0.0);
        let b = WorldPoint::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < EPSILON);
        assert!((b.distance(a) - 5.0).abs() < EPSILON);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn test_move_towards_partial_step() {
        let start = WorldPoint::new(0.0, 0.0);
        let target = WorldPoint::new(10.0, 0.0);
        let next = start.move_towards(target, 2.5);
        assert!((next.x - 2.5).abs() < EPSILON);
        assert!(next.y.abs() < EPSILON);
    }

    #[test]
    fn test_move_towards_never_overshoots() {
        let start = WorldPoint::new(1.0, 1.0);
        let target = WorldPoint::new(1.0, 2.0);
        // Step is much longer than the remaining distance
        assert_eq!(start.move_towards(target, 100.0), target);
        // Exactly the remaining distance lands on the target
        assert_eq!(start.move_towards(target, 1.0), target);
    }

    #[test]
    fn test_move_towards_zero_delta() {
        let start = WorldPoint::new(1.0, 1.0);
        let target = WorldPoint::new(4.0, 5.0);
        assert_eq!(start.move_towards(target, 0.0), start);
    }

    #[test]
    fn test_step_towards_diagonal() {
        let start = WorldPoint::new(0.0, 0.0);
        let target = WorldPoint::new(3.0, 4.0);
        // speed 2, dt 0.5 -> 1 unit along the (0.6, 0.8) direction
        let next = step_towards(start, target, 2.0, 0.5).unwrap();
        assert!((next.x - 0.6).abs() < EPSILON);
        assert!((next.y - 0.8).abs() < EPSILON);
    }

    #[test]
    fn test_step_towards_invalid_inputs() {
        let a = WorldPoint::new(0.0, 0.0);
        let b = WorldPoint::new(1.0, 0.0);
        assert!(matches!(
            step_towards(a, b, 1.0, -0.1),
            Err(MotionError::NegativeTimeDelta(_))
        ));
        assert!(matches!(
            step_towards(a, b, -1.0, 0.1),
            Err(MotionError::InvalidSpeed(_))
        ));
        assert!(matches!(
            step_towards(a, b, f32::NAN, 0.1),
            Err(MotionError::InvalidSpeed(_))
        ));
        assert_eq!(step_towards(a, b, 1.0, 0.0).unwrap(), a);
    }

    #[test]
    fn test_facing_vertical_axis_wins() {
        assert_eq!(Facing::from_step(0, 1), Some(Facing::North));
        assert_eq!(Facing::from_step(0, -1), Some(Facing::South));
        assert_eq!(Facing::from_step(1, 0), Some(Facing::East));
        assert_eq!(Facing::from_step(-1, 0), Some(Facing::West));
        // y is compared before x
        assert_eq!(Facing::from_step(3, -2), Some(Facing::South));
        assert_eq!(Facing::from_step(0, 0), None);
    }

    #[test]
    fn test_facing_heading() {
        assert!((Facing::East.heading() - 0.0).abs() < EPSILON);
        assert!((Facing::North.heading() - FRAC_PI_2).abs() < EPSILON);
        assert!((Facing::West.heading() - PI).abs() < EPSILON);
        assert!((Facing::South.heading() + FRAC_PI_2).abs() < EPSILON);
        assert_eq!(Facing::default(), Facing::North);
    }
}
