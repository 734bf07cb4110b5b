//! This module defines the error types used by the `gridwalk-navigation` crate.

#![warn(missing_docs)]

use gridwalk_motion::{MotionError, WorldPoint};
use thiserror::Error;

/// Error type for navigation operations.
///
/// These are caller errors and precondition violations. An unreachable goal
/// or a search whose start equals its goal is not an error: both produce an
/// empty [`Path`](crate::astar::Path).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    /// A grid coordinate lies outside `[0, width) x [0, height)`.
    #[error("Grid coordinate ({x}, {y}) is outside the {width}x{height} grid")]
    InvalidCoordinate {
        /// Offending column.
        x: usize,
        /// Offending row.
        y: usize,
        /// Grid width at the time of the call.
        width: usize,
        /// Grid height at the time of the call.
        height: usize,
    },
    /// A search was run against a grid that was never configured.
    #[error("Grid has not been configured")]
    NotInitialized,
    /// Width or height is zero or too large.
    #[error("Invalid grid dimensions: {0}")]
    InvalidDimensions(&'static str),
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// A world position has no tile under the active mapping.
    #[error("World position {0} is outside the tile mapping")]
    InvalidWorldCoordinates(WorldPoint),
    /// An obstacle layout could not be parsed.
    #[error("Invalid obstacle layout: {0}")]
    InvalidLayout(String),
    /// Motion integration rejected its inputs.
    #[error(transparent)]
    Motion(#[from] MotionError),
}
