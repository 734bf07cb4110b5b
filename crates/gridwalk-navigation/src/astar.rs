/*

A* = f(n) = g(n) + h(n)

Where:
    n = a cell in the grid
    g(n) = cheapest known cost from start to n (sum of entry costs)
    h(n) = Manhattan distance from n to the goal
    f(n) = frontier priority

h(n) never overestimates as long as every entry cost is >= 1, which
Grid::configure enforces for the hurdle cost.

Loop:
    - pop the entry with lowest f(n); skip it if a cheaper g(n) was recorded since it was pushed
    - if n is the goal, stop (nodes past the goal are never settled)
    - for each passable neighbor m of n:
        - g' = g(n) + cost(m)
        - if m is unvisited or g' < g(m): record g(m) = g', came_from(m) = n, push m with f = g' + h(m)

*/

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::NavigationError;
use crate::frontier::Frontier;
use crate::map::{Grid, GridCoordinate};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordered waypoints from a search.
///
/// The start coordinate is excluded and the goal is the final element, so
/// every element is a cell the agent still has to enter. Consecutive
/// waypoints are 4-adjacent. An empty path means no movement: either the
/// goal is unreachable or it equals the start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Path {
    waypoints: Vec<GridCoordinate>,
}

impl Path {
    /// Wraps waypoints in start-exclusive, goal-inclusive order.
    pub fn new(waypoints: Vec<GridCoordinate>) -> Self {
        Self { waypoints }
    }

    /// Returns true if there is nothing to traverse.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of waypoints (hops).
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Waypoint at `index`.
    pub fn get(&self, index: usize) -> Option<GridCoordinate> {
        self.waypoints.get(index).copied()
    }

    /// Final waypoint, which is the goal.
    pub fn goal(&self) -> Option<GridCoordinate> {
        self.waypoints.last().copied()
    }

    /// All waypoints in traversal order.
    pub fn waypoints(&self) -> &[GridCoordinate] {
        &self.waypoints
    }

    /// Iterates over the waypoints in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = &GridCoordinate> {
        self.waypoints.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.waypoints.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "]")
    }
}

/// Represents the result of an A* search with metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchResult {
    /// The computed path; empty when no movement is possible or needed.
    pub path: Path,
    /// Total cost of entering every waypoint, `None` if the goal was unreachable.
    pub total_cost: Option<u32>,
    /// Number of frontier entries settled (stale entries excluded).
    pub nodes_explored: usize,
}

impl SearchResult {
    fn found(path: Path, total_cost: u32, nodes_explored: usize) -> Self {
        Self {
            path,
            total_cost: Some(total_cost),
            nodes_explored,
        }
    }

    fn unreachable(nodes_explored: usize) -> Self {
        Self {
            path: Path::default(),
            total_cost: None,
            nodes_explored,
        }
    }

    /// Returns true if the goal was reached (including start == goal).
    pub fn is_success(&self) -> bool {
        self.total_cost.is_some()
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total_cost {
            Some(cost) => write!(
                f,
                "SearchResult {{ success: true, path_length: {}, total_cost: {}, nodes_explored: {} }}",
                self.path.len(),
                cost,
                self.nodes_explored
            ),
            None => write!(f, "SearchResult {{ success: false, nodes_explored: {} }}", self.nodes_explored),
        }
    }
}

/// Calculates the Manhattan distance between two grid coordinates.
pub fn manhattan_distance(a: GridCoordinate, b: GridCoordinate) -> u32 {
    let d = a.x.abs_diff(b.x).saturating_add(a.y.abs_diff(b.y));
    u32::try_from(d).unwrap_or(u32::MAX)
}

/// Walks predecessors back from `goal`, excluding `start`, and reverses.
fn reconstruct_path(
    came_from: &HashMap<GridCoordinate, GridCoordinate>,
    start: GridCoordinate,
    goal: GridCoordinate,
) -> Path {
    let mut waypoints = Vec::new();
    let mut current = goal;
    while current != start {
        waypoints.push(current);
        match came_from.get(&current) {
            Some(&previous) => current = previous,
            None => break,
        }
    }
    waypoints.reverse();
    Path::new(waypoints)
}

fn check_endpoint(grid: &Grid, c: GridCoordinate) -> Result<(), NavigationError> {
    if grid.in_bounds(c) {
        Ok(())
    } else {
        Err(NavigationError::InvalidCoordinate {
            x: c.x,
            y: c.y,
            width: grid.width(),
            height: grid.height(),
        })
    }
}

/// Finds the cheapest path from `start` to `goal`.
///
/// # Arguments
/// * `grid` - The grid to plan in. Must not be mutated during the call.
/// * `start` - Starting cell; excluded from the returned path.
/// * `goal` - Goal cell; the last element of a non-empty path.
///
/// # Returns
/// * `Ok(Path)` - Possibly empty: empty when `start == goal` or the goal is unreachable.
/// * `Err(NavigationError)` - `NotInitialized` or `InvalidCoordinate`.
pub fn astar_search(grid: &Grid, start: GridCoordinate, goal: GridCoordinate) -> Result<Path, NavigationError> {
    astar_search_detailed(grid, start, goal).map(|result| result.path)
}

/// Same as [`astar_search`] but also reports cost and search effort.
pub fn astar_search_detailed(
    grid: &Grid,
    start: GridCoordinate,
    goal: GridCoordinate,
) -> Result<SearchResult, NavigationError> {
    if !grid.is_configured() {
        return Err(NavigationError::NotInitialized);
    }
    check_endpoint(grid, start)?;
    check_endpoint(grid, goal)?;

    if start == goal {
        debug!(%start, "Start equals goal, nothing to search");
        return Ok(SearchResult::found(Path::default(), 0, 0));
    }

    let mut frontier = Frontier::new();
    let mut came_from: HashMap<GridCoordinate, GridCoordinate> = HashMap::new();
    let mut cost_so_far: HashMap<GridCoordinate, u32> = HashMap::new();
    let mut nodes_explored = 0;

    cost_so_far.insert(start, 0);
    frontier.push(start, 0, manhattan_distance(start, goal));

    while let Some(entry) = frontier.pop_min() {
        if cost_so_far.get(&entry.coord) != Some(&entry.cost) {
            // Superseded by a cheaper push.
            continue;
        }
        nodes_explored += 1;

        if entry.coord == goal {
            let path = reconstruct_path(&came_from, start, goal);
            debug!(%start, %goal, hops = path.len(), total_cost = entry.cost, nodes_explored, "Path found");
            return Ok(SearchResult::found(path, entry.cost, nodes_explored));
        }

        for next in grid.neighbors(entry.coord) {
            let new_cost = entry.cost.saturating_add(grid.cost(next));
            if cost_so_far.get(&next).is_none_or(|&known| new_cost < known) {
                cost_so_far.insert(next, new_cost);
                came_from.insert(next, entry.coord);
                let priority = new_cost.saturating_add(manhattan_distance(next, goal));
                frontier.push(next, new_cost, priority);
            }
        }
    }

    debug!(%start, %goal, nodes_explored, "Goal unreachable");
    Ok(SearchResult::unreachable(nodes_explored))
}
