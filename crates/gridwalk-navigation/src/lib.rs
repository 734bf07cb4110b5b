//! Grid navigation for a single agent on a tile map.
//!
//! The crate is split the way a navigation stack usually is:
//! * [`map`] holds the weighted grid, the world/tile mapping and obstacle feeds.
//! * [`astar`] runs the search over a [`map::Grid`].
//! * [`follower`] drives an agent along a found path one tick at a time.
//!
//! [`run_nav_task`] ties them together on a tokio interval.

pub mod astar;
pub mod error;
pub mod follower;
pub mod frontier;
pub mod map;

use std::sync::Arc;
use std::time::Duration;

use gridwalk_motion::WorldPoint;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub use astar::{Path, SearchResult, astar_search, astar_search_detailed};
pub use error::NavigationError;
pub use follower::{FollowerConfig, FollowerSnapshot, FollowerState, PathFollower};
pub use map::{Grid, GridCoordinate, ObstacleEdit, TerrainClass, TileMapping};

/// Ticks `follower` at a fixed rate and publishes a snapshot after each tick.
///
/// The task owns the follower and the grid, so obstacle edits land strictly
/// between ticks and never during a search. The grid is published on
/// `grid_tx` at start-up and after every applied edit, so observers draw the
/// walls the search actually uses even if some edits were lost to lag.
/// Rejected destinations and failed ticks are logged and the task carries on.
///
/// # Returns
/// `Ok(())` once the destination channel closes.
pub async fn run_nav_task<M: TileMapping>(
    mut follower: PathFollower<M>,
    mut grid: Grid,
    tick: Duration,
    mut destination_rx: broadcast::Receiver<Arc<WorldPoint>>,
    mut obstacle_rx: broadcast::Receiver<Arc<ObstacleEdit>>,
    snapshot_tx: broadcast::Sender<Arc<FollowerSnapshot>>,
    grid_tx: broadcast::Sender<Arc<Grid>>,
) -> anyhow::Result<()> {
    info!(?tick, "Navigation task started");
    let _ = grid_tx.send(Arc::new(grid.clone()));
    let mut ticker = time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();
    let mut obstacles_open = true;

    loop {
        tokio::select! {
            now = ticker.tick() => {
                let dt = now.saturating_duration_since(last_tick).as_secs_f32();
                last_tick = now;
                if let Err(e) = follower.advance(&grid, dt) {
                    warn!(error = %e, "Follower tick failed");
                }
                // No receivers is fine; the front-end may not be up yet.
                let _ = snapshot_tx.send(Arc::new(follower.snapshot()));
            }
            request = destination_rx.recv() => match request {
                Ok(destination) => {
                    if let Err(e) = follower.request_destination(*destination) {
                        warn!(error = %e, "Destination request rejected");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "Destination receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Destination channel closed, stopping navigation task");
                    return Ok(());
                }
            },
            edit = obstacle_rx.recv(), if obstacles_open => match edit {
                Ok(edit) => {
                    match grid.set_terrain(edit.coord, edit.terrain) {
                        Ok(()) => {
                            debug!(coord = %edit.coord, terrain = ?edit.terrain, "Obstacle edit applied");
                            let _ = grid_tx.send(Arc::new(grid.clone()));
                        }
                        Err(e) => warn!(error = %e, "Obstacle edit rejected"),
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "Obstacle receiver lagged, some edits were lost");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Obstacle channel closed");
                    obstacles_open = false;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::UniformTiling;

    fn tiling() -> UniformTiling {
        UniformTiling::new(4, 4, 1.0, WorldPoint::new(0.0, 0.0)).unwrap()
    }

    fn fast_config() -> FollowerConfig {
        FollowerConfig {
            find_path_delay: 0.0,
            turn_delay: 0.0,
            rest_time: 0.0,
            move_speed: 50.0,
            snap_threshold: 0.05,
        }
    }

    #[tokio::test]
    async fn test_nav_task_reaches_destination_and_stops() {
        let start = WorldPoint::new(0.5, 0.5);
        let goal = WorldPoint::new(3.5, 0.5);
        let follower = PathFollower::new(fast_config(), tiling(), start).unwrap();
        let mut grid = Grid::new(4, 4, 1).unwrap();
        grid.set_terrain(GridCoordinate::new(2, 0), TerrainClass::Blocked).unwrap();

        let (dest_tx, dest_rx) = broadcast::channel(4);
        let (obstacle_tx, obstacle_rx) = broadcast::channel(4);
        let (snap_tx, mut snap_rx) = broadcast::channel(256);
        let (grid_tx, mut grid_rx) = broadcast::channel(8);

        let task = tokio::spawn(run_nav_task(
            follower,
            grid,
            Duration::from_millis(5),
            dest_rx,
            obstacle_rx,
            snap_tx,
            grid_tx,
        ));

        // Reopen the wall before asking to move
        obstacle_tx
            .send(Arc::new(ObstacleEdit { coord: GridCoordinate::new(2, 0), terrain: TerrainClass::Open }))
            .unwrap();
        dest_tx.send(Arc::new(goal)).unwrap();

        // Initial grid first, then the grid with the edit applied
        let initial = time::timeout(Duration::from_secs(1), grid_rx.recv()).await.unwrap().unwrap();
        assert!(initial.is_blocked(GridCoordinate::new(2, 0)));
        let edited = time::timeout(Duration::from_secs(1), grid_rx.recv()).await.unwrap().unwrap();
        assert!(!edited.is_blocked(GridCoordinate::new(2, 0)));

        let arrived = time::timeout(Duration::from_secs(5), async {
            let mut left_idle = false;
            loop {
                match snap_rx.recv().await {
                    Ok(snap) => {
                        left_idle |= snap.state != FollowerState::Idle;
                        if left_idle && snap.state == FollowerState::Idle {
                            return snap;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => panic!("snapshot channel closed"),
                }
            }
        })
        .await
        .expect("follower did not arrive in time");

        assert_eq!(arrived.position, goal);
        assert!(!arrived.path_visible);

        drop(dest_tx);
        let result = time::timeout(Duration::from_secs(1), task).await.expect("task did not stop");
        assert!(result.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_nav_task_survives_bad_requests() {
        let follower = PathFollower::new(fast_config(), tiling(), WorldPoint::new(0.5, 0.5)).unwrap();
        let grid = Grid::new(4, 4, 1).unwrap();

        let (dest_tx, dest_rx) = broadcast::channel(4);
        let (obstacle_tx, obstacle_rx) = broadcast::channel(4);
        let (snap_tx, mut snap_rx) = broadcast::channel(16);
        let (grid_tx, _grid_rx) = broadcast::channel(4);

        let task = tokio::spawn(run_nav_task(
            follower,
            grid,
            Duration::from_millis(5),
            dest_rx,
            obstacle_rx,
            snap_tx,
            grid_tx,
        ));

        dest_tx.send(Arc::new(WorldPoint::new(-10.0, 0.0))).unwrap();
        obstacle_tx
            .send(Arc::new(ObstacleEdit { coord: GridCoordinate::new(9, 9), terrain: TerrainClass::Blocked }))
            .unwrap();
        drop(obstacle_tx);

        let snap = time::timeout(Duration::from_secs(1), snap_rx.recv())
            .await
            .expect("no snapshot published")
            .unwrap();
        assert_eq!(snap.state, FollowerState::Idle);

        drop(dest_tx);
        let result = time::timeout(Duration::from_secs(1), task).await.expect("task did not stop");
        assert!(result.unwrap().is_ok());
    }
}
