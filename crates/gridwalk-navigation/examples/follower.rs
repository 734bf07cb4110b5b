use gridwalk_motion::WorldPoint;
use gridwalk_navigation::map::{TerrainClass, UniformTiling};
use gridwalk_navigation::{FollowerConfig, FollowerState, Grid, GridCoordinate, PathFollower, TileMapping};
use tracing_subscriber::EnvFilter;

// Headless run of the follower state machine at 20 Hz.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let mut grid = Grid::new(8, 6, 5)?;
    for y in 0..5 {
        grid.set_terrain(GridCoordinate::new(3, y), TerrainClass::Blocked)?;
    }
    grid.set_terrain(GridCoordinate::new(5, 2), TerrainClass::Hurdle)?;

    let tiling = UniformTiling::new(8, 6, 1.0, WorldPoint::new(0.0, 0.0))?;
    let config = FollowerConfig {
        find_path_delay: 0.2,
        turn_delay: 0.25,
        rest_time: 0.1,
        move_speed: 2.0,
        snap_threshold: 0.05,
    };
    let start = tiling.grid_to_world(GridCoordinate::new(0, 0)).ok_or("start outside map")?;
    let goal = tiling.grid_to_world(GridCoordinate::new(7, 0)).ok_or("goal outside map")?;
    let detour = tiling.grid_to_world(GridCoordinate::new(7, 5)).ok_or("detour outside map")?;

    let mut follower = PathFollower::new(config, tiling, start)?;
    follower.request_destination(goal)?;

    let dt = 0.05;
    let mut last_state = follower.state();
    for tick in 0..2_000 {
        follower.advance(&grid, dt)?;

        // Change our mind half way; takes effect at the next waypoint
        if tick == 60 {
            follower.request_destination(detour)?;
        }

        if follower.state() != last_state {
            println!(
                "t={:>5.2}s {:>17} -> {:<17} pos {} facing {}",
                tick as f32 * dt,
                last_state.to_string(),
                follower.state().to_string(),
                follower.position(),
                follower.facing()
            );
            last_state = follower.state();
        }
        if follower.state() == FollowerState::Idle && follower.pending_destination().is_none() {
            break;
        }
    }

    println!("\nFinal position: {}", follower.position());
    Ok(())
}
