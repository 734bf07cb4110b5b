#![warn(missing_docs)]

use gridwalk_motion::WorldPoint;

use super::GridCoordinate;
use crate::error::NavigationError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bijection between world positions and grid coordinates.
///
/// Supplied by the embedding application (usually backed by its tilemap).
/// Implementations must be deterministic: `world_to_grid(grid_to_world(c))`
/// returns `c` for every cell they cover.
pub trait TileMapping {
    /// Converts a world position to the cell containing it, or `None` outside the map.
    fn world_to_grid(&self, world_p: WorldPoint) -> Option<GridCoordinate>;

    /// Converts a cell to its representative world position, or `None` outside the map.
    fn grid_to_world(&self, grid_p: GridCoordinate) -> Option<WorldPoint>;
}

/// Square tiles of equal size laid out from a world-space origin.
///
/// Cell `(0, 0)` has its bottom-left corner at `origin`; cells are represented
/// by their centers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UniformTiling {
    /// Width of the tiled area in cells
    width: usize,
    /// Height of the tiled area in cells
    height: usize,
    /// Tile edge length in world units
    spacing: f32,
    /// World coordinates of the bottom-left corner of cell (0, 0)
    origin: WorldPoint,
}

impl UniformTiling {
    /// Creates a new tiling.
    ///
    /// # Arguments
    /// * `width` - Width of the tiled area in cells
    /// * `height` - Height of the tiled area in cells
    /// * `spacing` - Tile edge length in world units
    /// * `origin` - World position of the bottom-left corner of cell (0, 0)
    pub fn new(width: usize, height: usize, spacing: f32, origin: WorldPoint) -> Result<Self, NavigationError> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(NavigationError::InvalidConfig("Tile spacing must be positive"));
        }
        if width == 0 || height == 0 {
            return Err(NavigationError::InvalidDimensions("Width and height must be non-zero"));
        }
        Ok(Self { width, height, spacing, origin })
    }

    /// Tile edge length in world units.
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// World position of the bottom-left corner of cell (0, 0).
    pub fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Gets the world-space bounds of the tiled area.
    ///
    /// # Returns
    /// * `(WorldPoint, WorldPoint)` - The bottom-left and top-right corners
    pub fn world_bounds(&self) -> (WorldPoint, WorldPoint) {
        let max_x = self.origin.x + self.width as f32 * self.spacing;
        let max_y = self.origin.y + self.height as f32 * self.spacing;
        (self.origin, WorldPoint::new(max_x, max_y))
    }
}

impl TileMapping for UniformTiling {
    fn world_to_grid(&self, world_p: WorldPoint) -> Option<GridCoordinate> {
        let grid_x_f = (world_p.x - self.origin.x) / self.spacing;
        let grid_y_f = (world_p.y - self.origin.y) / self.spacing;

        // A point exactly on the far boundary is outside.
        if !(grid_x_f >= 0.0 && grid_y_f >= 0.0) || grid_x_f >= self.width as f32 || grid_y_f >= self.height as f32 {
            return None;
        }

        let grid_x = grid_x_f.floor() as usize;
        let grid_y = grid_y_f.floor() as usize;
        if grid_x < self.width && grid_y < self.height {
            Some(GridCoordinate::new(grid_x, grid_y))
        } else {
            None
        }
    }

    fn grid_to_world(&self, grid_p: GridCoordinate) -> Option<WorldPoint> {
        if grid_p.x < self.width && grid_p.y < self.height {
            let world_x = self.origin.x + (grid_p.x as f32 + 0.5) * self.spacing;
            let world_y = self.origin.y + (grid_p.y as f32 + 0.5) * self.spacing;
            Some(WorldPoint::new(world_x, world_y))
        } else {
            None
        }
    }
}
