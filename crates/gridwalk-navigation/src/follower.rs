//! Tick-driven path following.
//!
//! [`PathFollower`] turns a requested destination into timed, direction-aware
//! motion across the grid:
//!
//! ```text
//! Idle -> FindingPath -> Turning -> PreparingMovement -> Moving -+-> Idle
//!              ^   |         ^                                   |
//!              |   +-> Idle  +---------- next segment -----------+
//!              +------------- pending redirect ------------------+
//! ```
//!
//! A destination requested while the agent is busy is latched and applied
//! at the next waypoint the agent reaches; the current segment is never cut
//! short.

use gridwalk_motion::{Facing, MotionError, WorldPoint, step_towards};
use tracing::{debug, info, trace, warn};

use crate::astar::{Path, astar_search};
use crate::error::NavigationError;
use crate::map::{Grid, GridCoordinate, TileMapping};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timing and motion parameters for a [`PathFollower`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FollowerConfig {
    /// Seconds to wait in FindingPath before searching.
    pub find_path_delay: f32,
    /// Seconds spent turning before each segment.
    pub turn_delay: f32,
    /// Seconds to rest with the route displayed before moving off.
    pub rest_time: f32,
    /// World units per second.
    pub move_speed: f32,
    /// Remaining distance to a waypoint that counts as arrived.
    pub snap_threshold: f32,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            find_path_delay: 1.0,
            turn_delay: 1.0,
            rest_time: 1.0,
            move_speed: 1.0,
            snap_threshold: 0.1,
        }
    }
}

impl FollowerConfig {
    /// Checks that every value is finite and non-negative and that the speed is positive.
    pub fn validate(&self) -> Result<(), NavigationError> {
        let non_negative = |v: f32| v.is_finite() && v >= 0.0;
        if !non_negative(self.find_path_delay) {
            return Err(NavigationError::InvalidConfig("find_path_delay must be finite and non-negative"));
        }
        if !non_negative(self.turn_delay) {
            return Err(NavigationError::InvalidConfig("turn_delay must be finite and non-negative"));
        }
        if !non_negative(self.rest_time) {
            return Err(NavigationError::InvalidConfig("rest_time must be finite and non-negative"));
        }
        if !non_negative(self.snap_threshold) {
            return Err(NavigationError::InvalidConfig("snap_threshold must be finite and non-negative"));
        }
        if !non_negative(self.move_speed) || self.move_speed == 0.0 {
            return Err(NavigationError::InvalidConfig("move_speed must be finite and positive"));
        }
        Ok(())
    }
}

/// Phase of a [`PathFollower`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FollowerState {
    /// Waiting for a destination.
    #[default]
    Idle,
    /// Waiting out the find-path delay, then searching.
    FindingPath,
    /// Turning toward the next waypoint.
    Turning,
    /// Resting with the route displayed.
    PreparingMovement,
    /// Travelling toward the current target waypoint.
    Moving,
}

impl std::fmt::Display for FollowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FollowerState::Idle => "Idle",
            FollowerState::FindingPath => "FindingPath",
            FollowerState::Turning => "Turning",
            FollowerState::PreparingMovement => "PreparingMovement",
            FollowerState::Moving => "Moving",
        };
        f.write_str(name)
    }
}

/// Observable state of a follower after a tick, for renderers and logs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FollowerSnapshot {
    /// Current phase.
    pub state: FollowerState,
    /// Agent position in world space.
    pub position: WorldPoint,
    /// Agent facing.
    pub facing: Facing,
    /// Route polyline in world space.
    pub waypoints: Vec<WorldPoint>,
    /// Whether the route polyline should be drawn.
    pub path_visible: bool,
    /// Destination of the current traversal.
    pub destination: Option<WorldPoint>,
    /// Destination latched for the next waypoint boundary.
    pub pending_destination: Option<WorldPoint>,
}

/// Single-agent path follower.
///
/// Owns its timers, route and segment indices. The grid is borrowed per
/// tick so the owner can change obstacles between ticks.
#[derive(Debug, Clone)]
pub struct PathFollower<M> {
    config: FollowerConfig,
    mapping: M,
    state: FollowerState,
    position: WorldPoint,
    facing: Facing,
    destination: Option<WorldPoint>,
    pending: Option<WorldPoint>,
    path: Path,
    // Index of the waypoint last reached; None before the first one.
    current: Option<usize>,
    next: usize,
    target: WorldPoint,
    segment_start: WorldPoint,
    find_path_timer: f32,
    turn_timer: f32,
    rest_timer: f32,
    polyline: Vec<WorldPoint>,
    path_visible: bool,
}

impl<M: TileMapping> PathFollower<M> {
    /// Creates an idle follower at `position`.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `config` fails [`FollowerConfig::validate`].
    pub fn new(config: FollowerConfig, mapping: M, position: WorldPoint) -> Result<Self, NavigationError> {
        config.validate()?;
        Ok(Self {
            config,
            mapping,
            state: FollowerState::Idle,
            position,
            facing: Facing::default(),
            destination: None,
            pending: None,
            path: Path::default(),
            current: None,
            next: 0,
            target: position,
            segment_start: position,
            find_path_timer: 0.0,
            turn_timer: 0.0,
            rest_timer: 0.0,
            polyline: Vec::new(),
            path_visible: false,
        })
    }

    /// Current phase.
    pub fn state(&self) -> FollowerState {
        self.state
    }

    /// Agent position in world space.
    pub fn position(&self) -> WorldPoint {
        self.position
    }

    /// Agent facing.
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Destination of the current traversal.
    pub fn destination(&self) -> Option<WorldPoint> {
        self.destination
    }

    /// Destination latched while busy, applied at the next waypoint.
    pub fn pending_destination(&self) -> Option<WorldPoint> {
        self.pending
    }

    /// Route being followed; empty outside a traversal.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Index of the waypoint last reached, `None` before the first.
    pub fn current_segment(&self) -> Option<usize> {
        self.current
    }

    /// Index of the waypoint being approached.
    pub fn next_segment(&self) -> usize {
        self.next
    }

    /// The route polyline for the visualization sink.
    ///
    /// Starts at the point where the current segment began and continues
    /// through every waypoint not yet reached.
    pub fn current_waypoints(&self) -> &[WorldPoint] {
        &self.polyline
    }

    /// Whether the route polyline should be drawn.
    pub fn path_visible(&self) -> bool {
        self.path_visible
    }

    /// Timing and motion parameters.
    pub fn config(&self) -> &FollowerConfig {
        &self.config
    }

    /// Coordinate mapping used to translate waypoints.
    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    /// Copies the observable state.
    pub fn snapshot(&self) -> FollowerSnapshot {
        FollowerSnapshot {
            state: self.state,
            position: self.position,
            facing: self.facing,
            waypoints: self.polyline.clone(),
            path_visible: self.path_visible,
            destination: self.destination,
            pending_destination: self.pending,
        }
    }

    /// Asks the agent to travel to `destination`.
    ///
    /// While idle the request starts a new traversal. Otherwise it is latched
    /// and replaces any earlier latched request; it takes effect when the
    /// agent next reaches a waypoint.
    ///
    /// # Errors
    /// Returns `InvalidWorldCoordinates` if `destination` has no tile.
    pub fn request_destination(&mut self, destination: WorldPoint) -> Result<(), NavigationError> {
        if self.mapping.world_to_grid(destination).is_none() {
            warn!(%destination, "Rejected destination outside the map");
            return Err(NavigationError::InvalidWorldCoordinates(destination));
        }

        if self.state == FollowerState::Idle {
            info!(%destination, "Destination requested");
            self.destination = Some(destination);
            self.pending = None;
            self.transition(FollowerState::FindingPath);
        } else {
            if let Some(previous) = self.pending.replace(destination) {
                debug!(%previous, %destination, "Replacing pending redirect");
            }
            info!(%destination, state = %self.state, "Redirect latched until next waypoint");
        }
        Ok(())
    }

    /// Advances the state machine by `dt` seconds.
    ///
    /// # Errors
    /// * `Motion(NegativeTimeDelta)` if `dt` is negative or NaN.
    /// * `NotInitialized` / `InvalidCoordinate` from the search; the follower
    ///   returns to Idle before reporting them.
    /// * `InvalidWorldCoordinates` if the agent stands outside the mapping.
    pub fn advance(&mut self, grid: &Grid, dt: f32) -> Result<(), NavigationError> {
        if !(dt >= 0.0) {
            return Err(MotionError::NegativeTimeDelta("must be non-negative").into());
        }

        match self.state {
            FollowerState::Idle => Ok(()),
            FollowerState::FindingPath => self.update_finding_path(grid, dt),
            FollowerState::Turning => self.update_turning(dt),
            FollowerState::PreparingMovement => self.update_preparing_movement(dt),
            FollowerState::Moving => self.update_moving(dt),
        }
    }

    fn transition(&mut self, to: FollowerState) {
        debug!(from = %self.state, %to, "Follower state transition");
        self.state = to;
        self.find_path_timer = 0.0;
        self.turn_timer = 0.0;
        self.rest_timer = 0.0;
    }

    fn waypoint_world(&self, index: usize) -> Result<WorldPoint, NavigationError> {
        let coord = self.path.get(index).ok_or(NavigationError::InvalidConfig("waypoint index past end of path"))?;
        self.cell_world(coord)
    }

    fn cell_world(&self, coord: GridCoordinate) -> Result<WorldPoint, NavigationError> {
        self.mapping
            .grid_to_world(coord)
            .ok_or(NavigationError::InvalidConfig("route leaves the tile mapping"))
    }

    fn clear_route(&mut self) {
        self.path = Path::default();
        self.polyline.clear();
        self.path_visible = false;
        self.current = None;
        self.next = 0;
    }

    fn refresh_polyline(&mut self) -> Result<(), NavigationError> {
        let mut polyline = Vec::with_capacity(self.path.len() + 1 - self.next.min(self.path.len()));
        polyline.push(self.segment_start);
        for index in self.next..self.path.len() {
            polyline.push(self.waypoint_world(index)?);
        }
        self.polyline = polyline;
        Ok(())
    }

    fn find_path(&self, grid: &Grid, destination: WorldPoint) -> Result<Path, NavigationError> {
        let start = self
            .mapping
            .world_to_grid(self.position)
            .ok_or(NavigationError::InvalidWorldCoordinates(self.position))?;
        let goal = self
            .mapping
            .world_to_grid(destination)
            .ok_or(NavigationError::InvalidWorldCoordinates(destination))?;
        astar_search(grid, start, goal)
    }

    fn update_finding_path(&mut self, grid: &Grid, dt: f32) -> Result<(), NavigationError> {
        self.find_path_timer += dt;
        if self.find_path_timer < self.config.find_path_delay {
            return Ok(());
        }

        self.current = None;
        self.next = 0;
        let Some(destination) = self.destination else {
            self.transition(FollowerState::Idle);
            return Ok(());
        };

        let path = match self.find_path(grid, destination) {
            Ok(path) => path,
            Err(e) => {
                self.clear_route();
                self.destination = None;
                if let Some(dropped) = self.pending.take() {
                    warn!(%dropped, "Dropping pending redirect after failed search");
                }
                self.transition(FollowerState::Idle);
                return Err(e);
            }
        };

        if path.is_empty() {
            info!(%destination, "Destination unreachable or already reached");
            self.clear_route();
            self.destination = None;
            self.transition(FollowerState::Idle);
            // Still standing on a waypoint, so a latched redirect applies now.
            if let Some(redirect) = self.pending.take() {
                return self.request_destination(redirect);
            }
            return Ok(());
        }

        debug!(%destination, hops = path.len(), "Route found");
        self.path = path;
        self.segment_start = self.position;
        self.target = self.waypoint_world(0)?;
        self.path_visible = true;
        self.refresh_polyline()?;
        self.transition(FollowerState::Turning);
        Ok(())
    }

    fn update_turning(&mut self, dt: f32) -> Result<(), NavigationError> {
        self.turn_timer += dt;
        if self.turn_timer < self.config.turn_delay {
            return Ok(());
        }

        let from = match self.current {
            Some(index) => self.path.get(index),
            None => self.mapping.world_to_grid(self.position),
        };
        if let (Some(from), Some(to)) = (from, self.path.get(self.next)) {
            let dx = to.x as i64 - from.x as i64;
            let dy = to.y as i64 - from.y as i64;
            self.facing = Facing::from_step(dx, dy).unwrap_or(self.facing);
        }
        trace!(facing = %self.facing, next = self.next, "Turned toward next waypoint");

        self.transition(FollowerState::PreparingMovement);
        Ok(())
    }

    fn update_preparing_movement(&mut self, dt: f32) -> Result<(), NavigationError> {
        self.rest_timer += dt;
        self.refresh_polyline()?;

        if self.rest_timer >= self.config.rest_time {
            self.transition(FollowerState::Moving);
        }
        Ok(())
    }

    fn update_moving(&mut self, dt: f32) -> Result<(), NavigationError> {
        if self.position.distance(self.target) > self.config.snap_threshold {
            self.position = step_towards(self.position, self.target, self.config.move_speed, dt)?;
            trace!(position = %self.position, target = %self.target, "Moving");
        }
        if self.position.distance(self.target) > self.config.snap_threshold {
            return Ok(());
        }

        // Arrived at the waypoint at index `next`.
        self.position = self.target;
        self.segment_start = self.target;

        if let Some(redirect) = self.pending.take() {
            info!(position = %self.position, %redirect, "Applying redirect at waypoint");
            self.clear_route();
            self.destination = None;
            self.transition(FollowerState::Idle);
            return self.request_destination(redirect);
        }

        if self.next + 1 < self.path.len() {
            self.current = Some(self.next);
            self.next += 1;
            self.target = self.waypoint_world(self.next)?;
            self.refresh_polyline()?;
            self.transition(FollowerState::Turning);
        } else {
            info!(position = %self.position, "Destination reached");
            self.clear_route();
            self.destination = None;
            self.transition(FollowerState::Idle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{TerrainClass, UniformTiling};

    const DT: f32 = 0.05;
    const MAX_TICKS: usize = 10_000;

    fn gc(x: usize, y: usize) -> GridCoordinate {
        GridCoordinate::new(x, y)
    }

    fn config() -> FollowerConfig {
        FollowerConfig {
            find_path_delay: 0.2,
            turn_delay: 0.1,
            rest_time: 0.15,
            move_speed: 4.0,
            snap_threshold: 0.05,
        }
    }

    fn tiling() -> UniformTiling {
        UniformTiling::new(5, 5, 1.0, WorldPoint::new(0.0, 0.0)).unwrap()
    }

    fn world(c: GridCoordinate) -> WorldPoint {
        tiling().grid_to_world(c).unwrap()
    }

    fn follower_at(c: GridCoordinate) -> PathFollower<UniformTiling> {
        PathFollower::new(config(), tiling(), world(c)).unwrap()
    }

    /// Ticks until `done` holds, recording each distinct state entered.
    fn run_until<F>(follower: &mut PathFollower<UniformTiling>, grid: &Grid, mut done: F) -> Vec<FollowerState>
    where
        F: FnMut(&PathFollower<UniformTiling>) -> bool,
    {
        let mut seen = vec![follower.state()];
        for _ in 0..MAX_TICKS {
            follower.advance(grid, DT).unwrap();
            if seen.last() != Some(&follower.state()) {
                seen.push(follower.state());
            }
            if done(follower) {
                return seen;
            }
        }
        panic!("follower did not settle, states: {:?}", seen);
    }

    #[test]
    fn test_config_validation() {
        assert!(config().validate().is_ok());
        let bad = [
            FollowerConfig { find_path_delay: -1.0, ..config() },
            FollowerConfig { turn_delay: f32::NAN, ..config() },
            FollowerConfig { rest_time: f32::INFINITY, ..config() },
            FollowerConfig { move_speed: 0.0, ..config() },
            FollowerConfig { snap_threshold: -0.1, ..config() },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(NavigationError::InvalidConfig(_))));
            assert!(PathFollower::new(cfg, tiling(), WorldPoint::default()).is_err());
        }
        let zero_delays = FollowerConfig { find_path_delay: 0.0, turn_delay: 0.0, rest_time: 0.0, ..config() };
        assert!(zero_delays.validate().is_ok());
    }

    #[test]
    fn test_single_step_state_sequence() {
        let grid = Grid::new(5, 5, 1).unwrap();
        let mut follower = follower_at(gc(0, 0));
        follower.request_destination(world(gc(1, 0))).unwrap();
        assert_eq!(follower.state(), FollowerState::FindingPath);

        let seen = run_until(&mut follower, &grid, |f| f.state() == FollowerState::Idle);
        assert_eq!(
            seen,
            vec![
                FollowerState::FindingPath,
                FollowerState::Turning,
                FollowerState::PreparingMovement,
                FollowerState::Moving,
                FollowerState::Idle,
            ]
        );
        assert_eq!(follower.position(), world(gc(1, 0)));
        assert_eq!(follower.facing(), Facing::East);
        assert!(!follower.path_visible());
        assert!(follower.path().is_empty());
        assert!(follower.destination().is_none());
    }

    #[test]
    fn test_multi_segment_traversal_reaches_goal() {
        let grid = Grid::new(5, 5, 1).unwrap();
        let mut follower = follower_at(gc(0, 0));
        follower.request_destination(world(gc(4, 4))).unwrap();

        let seen = run_until(&mut follower, &grid, |f| f.state() == FollowerState::Idle);
        // One Turning/PreparingMovement/Moving round per waypoint
        let moves = seen.iter().filter(|s| **s == FollowerState::Moving).count();
        assert_eq!(moves, 8);
        assert_eq!(follower.position(), world(gc(4, 4)));
    }

    #[test]
    fn test_facing_follows_vertical_first() {
        let grid = Grid::new(5, 5, 1).unwrap();
        let mut follower = follower_at(gc(2, 2));
        follower.request_destination(world(gc(2, 0))).unwrap();
        run_until(&mut follower, &grid, |f| f.state() == FollowerState::PreparingMovement);
        assert_eq!(follower.facing(), Facing::South);

        run_until(&mut follower, &grid, |f| f.state() == FollowerState::Idle);
        assert_eq!(follower.facing(), Facing::South);
        assert_eq!(follower.position(), world(gc(2, 0)));
    }

    #[test]
    fn test_polyline_published_while_preparing() {
        let grid = Grid::new(5, 5, 1).unwrap();
        let mut follower = follower_at(gc(0, 0));
        follower.request_destination(world(gc(0, 3))).unwrap();
        run_until(&mut follower, &grid, |f| f.state() == FollowerState::PreparingMovement);
        follower.advance(&grid, 0.0).unwrap();

        assert!(follower.path_visible());
        let expected = vec![world(gc(0, 0)), world(gc(0, 1)), world(gc(0, 2)), world(gc(0, 3))];
        assert_eq!(follower.current_waypoints(), expected.as_slice());
        assert_eq!(follower.snapshot().waypoints, expected);

        // After the first waypoint the polyline starts there
        run_until(&mut follower, &grid, |f| f.current_segment() == Some(0));
        run_until(&mut follower, &grid, |f| f.state() == FollowerState::PreparingMovement);
        let expected = vec![world(gc(0, 1)), world(gc(0, 2)), world(gc(0, 3))];
        assert_eq!(follower.current_waypoints(), expected.as_slice());
    }

    #[test]
    fn test_moving_never_overshoots() {
        let grid = Grid::new(5, 5, 1).unwrap();
        let mut follower = follower_at(gc(0, 0));
        follower.request_destination(world(gc(1, 0))).unwrap();
        run_until(&mut follower, &grid, |f| f.state() == FollowerState::Moving);

        // One huge tick covers far more than the segment
        follower.advance(&grid, 10.0).unwrap();
        assert_eq!(follower.position(), world(gc(1, 0)));
        assert_eq!(follower.state(), FollowerState::Idle);
    }

    #[test]
    fn test_redirect_applied_at_next_waypoint() {
        let grid = Grid::new(5, 5, 1).unwrap();
        let mut follower = follower_at(gc(0, 0));
        follower.request_destination(world(gc(4, 0))).unwrap();
        run_until(&mut follower, &grid, |f| f.state() == FollowerState::Moving);

        // Mid-segment: one tick moves 0.2 of a 1.0 segment
        follower.advance(&grid, DT).unwrap();
        assert_eq!(follower.state(), FollowerState::Moving);

        let redirect = world(gc(0, 4));
        follower.request_destination(redirect).unwrap();
        assert_eq!(follower.state(), FollowerState::Moving);
        assert_eq!(follower.pending_destination(), Some(redirect));

        run_until(&mut follower, &grid, |f| f.state() != FollowerState::Moving);
        assert_eq!(follower.state(), FollowerState::FindingPath);
        assert_eq!(follower.position(), world(gc(1, 0)));
        assert_eq!(follower.destination(), Some(redirect));
        assert!(follower.pending_destination().is_none());
        assert!(follower.path().is_empty());
        assert!(!follower.path_visible());

        run_until(&mut follower, &grid, |f| f.state() == FollowerState::Idle);
        assert_eq!(follower.position(), redirect);
    }

    #[test]
    fn test_redirect_last_write_wins() {
        let grid = Grid::new(5, 5, 1).unwrap();
        let mut follower = follower_at(gc(0, 0));
        follower.request_destination(world(gc(2, 0))).unwrap();
        run_until(&mut follower, &grid, |f| f.state() == FollowerState::Turning);

        follower.request_destination(world(gc(0, 4))).unwrap();
        follower.request_destination(world(gc(4, 4))).unwrap();
        assert_eq!(follower.pending_destination(), Some(world(gc(4, 4))));

        run_until(&mut follower, &grid, |f| f.state() == FollowerState::Idle);
        assert_eq!(follower.position(), world(gc(4, 4)));
    }

    #[test]
    fn test_unreachable_destination_returns_to_idle() {
        let mut grid = Grid::new(5, 5, 1).unwrap();
        for c in [gc(2, 3), gc(1, 2), gc(3, 2), gc(2, 1)] {
            grid.set_terrain(c, TerrainClass::Blocked).unwrap();
        }
        let mut follower = follower_at(gc(0, 0));
        follower.request_destination(world(gc(2, 2))).unwrap();

        let seen = run_until(&mut follower, &grid, |f| f.state() == FollowerState::Idle);
        assert_eq!(seen, vec![FollowerState::FindingPath, FollowerState::Idle]);
        assert_eq!(follower.position(), world(gc(0, 0)));
        assert!(!follower.path_visible());
    }

    #[test]
    fn test_pending_redirect_survives_failed_search() {
        let mut grid = Grid::new(5, 5, 1).unwrap();
        for c in [gc(2, 3), gc(1, 2), gc(3, 2), gc(2, 1)] {
            grid.set_terrain(c, TerrainClass::Blocked).unwrap();
        }
        let mut follower = follower_at(gc(0, 0));
        follower.request_destination(world(gc(2, 2))).unwrap();
        follower.request_destination(world(gc(0, 2))).unwrap();

        follower.advance(&grid, 1.0).unwrap();
        assert_eq!(follower.state(), FollowerState::FindingPath);
        assert_eq!(follower.destination(), Some(world(gc(0, 2))));

        run_until(&mut follower, &grid, |f| f.state() == FollowerState::Idle);
        assert_eq!(follower.position(), world(gc(0, 2)));
    }

    #[test]
    fn test_destination_on_own_cell_stays_put() {
        let grid = Grid::new(5, 5, 1).unwrap();
        let mut follower = follower_at(gc(3, 3));
        follower.request_destination(world(gc(3, 3))).unwrap();
        let seen = run_until(&mut follower, &grid, |f| f.state() == FollowerState::Idle);
        assert_eq!(seen, vec![FollowerState::FindingPath, FollowerState::Idle]);
        assert_eq!(follower.position(), world(gc(3, 3)));
    }

    #[test]
    fn test_obstacle_added_between_ticks_is_respected() {
        let mut grid = Grid::new(5, 5, 1).unwrap();
        let mut follower = follower_at(gc(0, 0));
        follower.request_destination(world(gc(2, 0))).unwrap();
        // Wall goes up before the search runs
        grid.set_terrain(gc(1, 0), TerrainClass::Blocked).unwrap();

        run_until(&mut follower, &grid, |f| f.state() == FollowerState::Turning);
        assert!(!follower.path().iter().any(|c| *c == gc(1, 0)));
        assert_eq!(follower.path().goal(), Some(gc(2, 0)));
    }

    #[test]
    fn test_invalid_inputs() {
        let grid = Grid::new(5, 5, 1).unwrap();
        let mut follower = follower_at(gc(0, 0));

        let outside = WorldPoint::new(-3.0, 2.0);
        assert_eq!(
            follower.request_destination(outside),
            Err(NavigationError::InvalidWorldCoordinates(outside))
        );
        assert_eq!(follower.state(), FollowerState::Idle);

        assert!(matches!(follower.advance(&grid, -0.1), Err(NavigationError::Motion(_))));
        assert!(matches!(follower.advance(&grid, f32::NAN), Err(NavigationError::Motion(_))));
    }

    #[test]
    fn test_unconfigured_grid_is_reported() {
        let grid = Grid::default();
        let mut follower = follower_at(gc(0, 0));
        follower.request_destination(world(gc(2, 2))).unwrap();
        let result = follower.advance(&grid, 1.0);
        assert_eq!(result, Err(NavigationError::NotInitialized));
        assert_eq!(follower.state(), FollowerState::Idle);
    }

    #[test]
    fn test_failed_search_drops_pending_redirect() {
        let mut follower = follower_at(gc(0, 0));
        follower.request_destination(world(gc(4, 4))).unwrap();
        follower.request_destination(world(gc(0, 4))).unwrap();
        assert_eq!(follower.pending_destination(), Some(world(gc(0, 4))));

        let result = follower.advance(&Grid::default(), 1.0);
        assert_eq!(result, Err(NavigationError::NotInitialized));
        assert_eq!(follower.state(), FollowerState::Idle);
        assert!(follower.pending_destination().is_none());

        // A fresh request must not be hijacked at its first waypoint
        let grid = Grid::new(5, 5, 1).unwrap();
        follower.request_destination(world(gc(4, 0))).unwrap();
        run_until(&mut follower, &grid, |f| f.state() == FollowerState::Idle);
        assert_eq!(follower.position(), world(gc(4, 0)));
    }

    #[test]
    fn test_agent_outside_mapping_is_reported() {
        let grid = Grid::new(5, 5, 1).unwrap();
        let mut follower = PathFollower::new(config(), tiling(), WorldPoint::new(50.0, 50.0)).unwrap();
        follower.request_destination(world(gc(1, 1))).unwrap();
        let result = follower.advance(&grid, 1.0);
        assert!(matches!(result, Err(NavigationError::InvalidWorldCoordinates(_))));
        assert_eq!(follower.state(), FollowerState::Idle);
    }
}
