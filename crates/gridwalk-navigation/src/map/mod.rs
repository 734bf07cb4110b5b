//! Map-related functionality for navigation.
//!
//! This module provides the weighted navigation grid, the world/tile
//! coordinate bijection and the obstacle feeds that populate the grid.

pub mod grid;
pub mod obstacles;
pub mod tiling;

pub use grid::{Grid, GridCoordinate, TerrainClass};
pub use obstacles::{AsciiLayout, ObstacleEdit, ObstacleSet, ObstacleSource, RandomScatter};
pub use tiling::{TileMapping, UniformTiling};
