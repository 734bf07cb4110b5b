//! Obstacle feeds applied to a [`Grid`](super::Grid) between searches.
//!
//! A source turns some external description of the level (a tile map, a
//! seeded scatter) into sets of blocked and hurdle coordinates.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{GridCoordinate, TerrainClass};
use crate::error::NavigationError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Blocked and hurdle coordinates produced by an obstacle source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObstacleSet {
    /// Impassable cells.
    pub blocked: HashSet<GridCoordinate>,
    /// Costly but passable cells.
    pub hurdles: HashSet<GridCoordinate>,
}

/// A single terrain change pushed to a running navigation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObstacleEdit {
    /// Cell to change.
    pub coord: GridCoordinate,
    /// New class for the cell.
    pub terrain: TerrainClass,
}

/// Produces obstacles for a grid of the given size.
pub trait ObstacleSource {
    /// Builds the obstacle set for a `width` x `height` grid.
    fn obstacles(&self, width: usize, height: usize) -> Result<ObstacleSet, NavigationError>;
}

/// Character-per-tile layout, top row first.
///
/// `.` is open, `#` is blocked (walls, trees), `~` is a hurdle (forest).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiLayout {
    rows: Vec<String>,
}

impl AsciiLayout {
    /// Parses and validates the rows. All rows must have the same length.
    pub fn new<S: AsRef<str>>(rows: &[S]) -> Result<Self, NavigationError> {
        let rows: Vec<String> = rows.iter().map(|r| r.as_ref().to_string()).collect();
        let Some(first) = rows.first() else {
            return Err(NavigationError::InvalidLayout("layout has no rows".to_string()));
        };
        let width = first.chars().count();
        if width == 0 {
            return Err(NavigationError::InvalidLayout("layout rows are empty".to_string()));
        }
        for (i, row) in rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width {
                return Err(NavigationError::InvalidLayout(format!(
                    "row {} has {} tiles, expected {}",
                    i, len, width
                )));
            }
            if let Some(ch) = row.chars().find(|ch| !matches!(ch, '.' | '#' | '~')) {
                return Err(NavigationError::InvalidLayout(format!("unknown tile '{}' in row {}", ch, i)));
            }
        }
        Ok(Self { rows })
    }

    /// Width and height of the layout in tiles.
    pub fn dimensions(&self) -> (usize, usize) {
        let width = self.rows.first().map(|r| r.chars().count()).unwrap_or(0);
        (width, self.rows.len())
    }
}

impl ObstacleSource for AsciiLayout {
    fn obstacles(&self, width: usize, height: usize) -> Result<ObstacleSet, NavigationError> {
        if self.dimensions() != (width, height) {
            let (w, h) = self.dimensions();
            return Err(NavigationError::InvalidLayout(format!(
                "layout is {}x{}, grid is {}x{}",
                w, h, width, height
            )));
        }

        let mut set = ObstacleSet::default();
        for (row_idx, row) in self.rows.iter().enumerate() {
            // The first row is the northern edge.
            let y = height - 1 - row_idx;
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    '#' => {
                        set.blocked.insert(GridCoordinate::new(x, y));
                    }
                    '~' => {
                        set.hurdles.insert(GridCoordinate::new(x, y));
                    }
                    _ => {}
                }
            }
        }
        Ok(set)
    }
}

/// Seeded random walls and hurdles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RandomScatter {
    /// Probability that a cell is blocked.
    pub blocked_ratio: f64,
    /// Probability that a cell is a hurdle.
    pub hurdle_ratio: f64,
    /// RNG seed; the same seed always yields the same set.
    pub seed: u64,
    /// Cells that are always left open (spawn points, goals).
    #[cfg_attr(feature = "serde", serde(default))]
    pub keep_clear: Vec<GridCoordinate>,
}

impl ObstacleSource for RandomScatter {
    fn obstacles(&self, width: usize, height: usize) -> Result<ObstacleSet, NavigationError> {
        let valid = |r: f64| (0.0..=1.0).contains(&r);
        if !valid(self.blocked_ratio) || !valid(self.hurdle_ratio) || self.blocked_ratio + self.hurdle_ratio > 1.0 {
            return Err(NavigationError::InvalidConfig("Scatter ratios must lie in [0, 1] and sum to at most 1"));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut set = ObstacleSet::default();
        for y in 0..height {
            for x in 0..width {
                let c = GridCoordinate::new(x, y);
                // Draw for every cell so keep_clear does not shift the sequence.
                let roll: f64 = rng.random();
                if self.keep_clear.contains(&c) {
                    continue;
                }
                if roll < self.blocked_ratio {
                    set.blocked.insert(c);
                } else if roll < self.blocked_ratio + self.hurdle_ratio {
                    set.hurdles.insert(c);
                }
            }
        }
        debug!(seed = self.seed, blocked = set.blocked.len(), hurdles = set.hurdles.len(), "Scattered obstacles");
        Ok(set)
    }
}
