#![warn(missing_docs)]

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use super::obstacles::ObstacleSet;
use crate::error::NavigationError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents a cell in grid coordinates (column, row).
///
/// Identity is value-based: two coordinates are equal iff both components match.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridCoordinate {
    /// The x-coordinate (column index) in the grid.
    pub x: usize,
    /// The y-coordinate (row index) in the grid. North is increasing y.
    pub y: usize,
}

impl GridCoordinate {
    /// Creates a new `GridCoordinate`.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Returns true if `other` is one cardinal step away.
    pub fn is_adjacent(&self, other: GridCoordinate) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Traversal classification of a grid cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerrainClass {
    /// Free cell, base traversal cost of 1.
    #[default]
    Open,
    /// Passable but costly cell (forest, mud); costs the grid's hurdle cost.
    Hurdle,
    /// Impassable cell. Never returned as a neighbor.
    Blocked,
}

impl fmt::Display for TerrainClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerrainClass::Open => write!(f, "Open"),
            TerrainClass::Hurdle => write!(f, "Hurdle"),
            TerrainClass::Blocked => write!(f, "Blocked"),
        }
    }
}

/// Weighted navigability map over integer coordinates.
///
/// Backed by a set of blocked coordinates and a set of hurdle coordinates;
/// every other in-bounds coordinate is open. A `Grid::default()` is
/// unconfigured and rejects searches until [`Grid::configure`] succeeds.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid {
    /// Width of the grid in cells
    width: usize,
    /// Height of the grid in cells
    height: usize,
    /// Impassable cells
    blocked: HashSet<GridCoordinate>,
    /// Costly cells, disjoint from `blocked`
    hurdles: HashSet<GridCoordinate>,
    /// Cost of entering a hurdle cell, always >= 1
    hurdle_cost: u32,
}

impl Grid {
    /// Creates an obstacle-free grid with the given dimensions.
    ///
    /// # Arguments
    /// * `width` - Width of the grid in cells
    /// * `height` - Height of the grid in cells
    /// * `hurdle_cost` - Cost of entering a hurdle cell (must be >= 1)
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The grid or an error if parameters are invalid
    pub fn new(width: usize, height: usize, hurdle_cost: u32) -> Result<Self, NavigationError> {
        let mut grid = Grid::default();
        grid.configure(width, height, [], [], hurdle_cost)?;
        Ok(grid)
    }

    /// Configures dimensions, obstacles and hurdle cost in one step.
    ///
    /// The grid is left untouched if any argument is rejected. A coordinate
    /// listed in both sets is treated as blocked.
    ///
    /// # Errors
    /// * `InvalidDimensions` if `width` or `height` is zero or their product overflows.
    /// * `InvalidConfig` if `hurdle_cost` is zero; a cost below 1 would make the
    ///   Manhattan heuristic overestimate.
    /// * `InvalidCoordinate` if any listed coordinate is out of bounds.
    pub fn configure<B, H>(
        &mut self,
        width: usize,
        height: usize,
        blocked: B,
        hurdles: H,
        hurdle_cost: u32,
    ) -> Result<(), NavigationError>
    where
        B: IntoIterator<Item = GridCoordinate>,
        H: IntoIterator<Item = GridCoordinate>,
    {
        if width == 0 || height == 0 {
            return Err(NavigationError::InvalidDimensions("Width and height must be non-zero"));
        }
        if width.checked_mul(height).is_none() {
            return Err(NavigationError::InvalidDimensions("Grid dimensions too large, would cause overflow"));
        }
        if hurdle_cost < 1 {
            return Err(NavigationError::InvalidConfig("Hurdle cost must be at least 1"));
        }

        let check = |c: GridCoordinate| {
            if c.x < width && c.y < height {
                Ok(c)
            } else {
                Err(NavigationError::InvalidCoordinate { x: c.x, y: c.y, width, height })
            }
        };
        let blocked = blocked.into_iter().map(check).collect::<Result<HashSet<_>, _>>()?;
        let hurdles = hurdles
            .into_iter()
            .map(check)
            .filter(|c| !matches!(c, Ok(c) if blocked.contains(c)))
            .collect::<Result<HashSet<_>, _>>()?;

        debug!(width, height, blocked = blocked.len(), hurdles = hurdles.len(), hurdle_cost, "Grid configured");

        self.width = width;
        self.height = height;
        self.blocked = blocked;
        self.hurdles = hurdles;
        self.hurdle_cost = hurdle_cost;
        Ok(())
    }

    /// Returns true once the grid has non-zero dimensions.
    pub fn is_configured(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width of the grid in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the grid in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cost of entering a hurdle cell.
    pub fn hurdle_cost(&self) -> u32 {
        self.hurdle_cost
    }

    /// Returns true if `c` lies within `[0, width) x [0, height)`.
    pub fn in_bounds(&self, c: GridCoordinate) -> bool {
        c.x < self.width && c.y < self.height
    }

    fn check_bounds(&self, c: GridCoordinate) -> Result<(), NavigationError> {
        if !self.is_configured() {
            return Err(NavigationError::NotInitialized);
        }
        if self.in_bounds(c) {
            Ok(())
        } else {
            Err(NavigationError::InvalidCoordinate { x: c.x, y: c.y, width: self.width, height: self.height })
        }
    }

    /// Gets the terrain class of a cell.
    ///
    /// # Returns
    /// * `Result<TerrainClass, NavigationError>` - The class or an error if out of bounds
    pub fn terrain(&self, c: GridCoordinate) -> Result<TerrainClass, NavigationError> {
        self.check_bounds(c)?;
        Ok(self.classify(c))
    }

    fn classify(&self, c: GridCoordinate) -> TerrainClass {
        if self.blocked.contains(&c) {
            TerrainClass::Blocked
        } else if self.hurdles.contains(&c) {
            TerrainClass::Hurdle
        } else {
            TerrainClass::Open
        }
    }

    /// Returns true if `c` is blocked or outside the grid.
    pub fn is_blocked(&self, c: GridCoordinate) -> bool {
        !self.in_bounds(c) || self.blocked.contains(&c)
    }

    /// Gets the cost of entering a cell: 1 when open, the hurdle cost for a hurdle.
    ///
    /// Blocked and out-of-bounds cells return `u32::MAX`; the search never asks
    /// for them because they are never neighbors.
    pub fn cost(&self, c: GridCoordinate) -> u32 {
        if !self.in_bounds(c) {
            return u32::MAX;
        }
        match self.classify(c) {
            TerrainClass::Open => 1,
            TerrainClass::Hurdle => self.hurdle_cost,
            TerrainClass::Blocked => u32::MAX,
        }
    }

    /// Gets the passable cardinal neighbors of a cell.
    ///
    /// Fixed order for determinism: North (+y), East (+x), South (-y), West (-x).
    pub fn neighbors(&self, c: GridCoordinate) -> Vec<GridCoordinate> {
        let mut out = Vec::with_capacity(4);
        let candidates = [
            c.y.checked_add(1).map(|y| GridCoordinate::new(c.x, y)),
            c.x.checked_add(1).map(|x| GridCoordinate::new(x, c.y)),
            c.y.checked_sub(1).map(|y| GridCoordinate::new(c.x, y)),
            c.x.checked_sub(1).map(|x| GridCoordinate::new(x, c.y)),
        ];
        for n in candidates.into_iter().flatten() {
            if !self.is_blocked(n) {
                out.push(n);
            }
        }
        out
    }

    /// Sets the terrain class of a single cell.
    ///
    /// Must not be interleaved with an in-flight search over the same grid.
    pub fn set_terrain(&mut self, c: GridCoordinate, terrain: TerrainClass) -> Result<(), NavigationError> {
        self.check_bounds(c)?;
        match terrain {
            TerrainClass::Open => {
                self.blocked.remove(&c);
                self.hurdles.remove(&c);
            }
            TerrainClass::Hurdle => {
                self.blocked.remove(&c);
                self.hurdles.insert(c);
            }
            TerrainClass::Blocked => {
                self.hurdles.remove(&c);
                self.blocked.insert(c);
            }
        }
        Ok(())
    }

    /// Re-opens a blocked cell. Returns whether the cell was blocked.
    pub fn clear_blocked(&mut self, c: GridCoordinate) -> Result<bool, NavigationError> {
        self.check_bounds(c)?;
        Ok(self.blocked.remove(&c))
    }

    /// Applies an obstacle feed on top of the current terrain.
    ///
    /// Every coordinate is validated before anything is written.
    pub fn apply(&mut self, obstacles: &ObstacleSet) -> Result<(), NavigationError> {
        for &c in obstacles.blocked.iter().chain(obstacles.hurdles.iter()) {
            self.check_bounds(c)?;
        }
        for &c in &obstacles.hurdles {
            self.set_terrain(c, TerrainClass::Hurdle)?;
        }
        for &c in &obstacles.blocked {
            self.set_terrain(c, TerrainClass::Blocked)?;
        }
        Ok(())
    }

    /// Iterates over the blocked cells in no particular order.
    pub fn blocked(&self) -> impl Iterator<Item = &GridCoordinate> {
        self.blocked.iter()
    }

    /// Iterates over the hurdle cells in no particular order.
    pub fn hurdles(&self) -> impl Iterator<Item = &GridCoordinate> {
        self.hurdles.iter()
    }

    /// Renders the grid as text with the top row printed first.
    ///
    /// `.` open, `~` hurdle, `#` blocked, `*` a cell on `path`.
    pub fn render(&self, path: &[GridCoordinate]) -> String {
        let on_path: HashSet<&GridCoordinate> = path.iter().collect();
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let c = GridCoordinate::new(x, y);
                let ch = if on_path.contains(&c) {
                    '*'
                } else {
                    match self.classify(c) {
                        TerrainClass::Open => '.',
                        TerrainClass::Hurdle => '~',
                        TerrainClass::Blocked => '#',
                    }
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid ({}x{}, hurdle cost: {})", self.width, self.height, self.hurdle_cost)?;
        write!(f, "{}", self.render(&[]))
    }
}
