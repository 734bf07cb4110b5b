mod blackboard;
mod bus;
mod config;
mod graphics;
mod world;

use blackboard::{Blackboard, clear_fault, raise_fault, record_grid, record_tick, snapshot};
use bus::Topic;
use graphics::window_conf;

use gridwalk_motion::WorldPoint;
use gridwalk_navigation::{FollowerSnapshot, Grid, ObstacleEdit, PathFollower, run_nav_task};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::world::World;

const STALL_FAULT: &str = "navigation stalled";

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Gridwalk started. Loading settings...");

    let settings = match config::load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load settings: {:#}", e);
            return;
        }
    };
    let world = match world::build_world(&settings.map, &settings.agent) {
        Ok(world) => world,
        Err(e) => {
            error!("Failed to build world: {:#}", e);
            return;
        }
    };
    let tokio_rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start tokio runtime: {}", e);
            return;
        }
    };

    let bb: Blackboard = Arc::default();
    let destination_topic: Topic<WorldPoint> = Topic::new(8);
    let obstacle_topic: Topic<ObstacleEdit> = Topic::new(64);
    let snapshot_topic: Topic<FollowerSnapshot> = Topic::new(16);
    let grid_topic: Topic<Grid> = Topic::new(4);

    // Subscribe before anything can publish.
    let destination_rx = destination_topic.subscribe();
    let obstacle_rx = obstacle_topic.subscribe();
    let snapshot_rx = snapshot_topic.subscribe();
    let grid_rx = grid_topic.subscribe();

    tokio_rt.spawn({
        let bb = Arc::clone(&bb);
        let settings = settings.clone();
        let world = world.clone();
        async move {
            info!("Simulation task started.");
            let channels = Channels { destination_rx, obstacle_rx, snapshot_topic, snapshot_rx, grid_topic, grid_rx };
            match run(settings, world, bb, channels).await {
                Ok(_) => info!("Simulation tasks finished successfully."),
                Err(e) => error!("Simulation tasks failed: {:?}", e),
            }
        }
    });

    graphics::run_visualization_loop(
        bb,
        world.tiling,
        settings.sim.tile_px,
        destination_topic,
        obstacle_topic,
    )
    .await;
}

/// Receivers are subscribed in `main` before the render loop can publish.
struct Channels {
    destination_rx: broadcast::Receiver<Arc<WorldPoint>>,
    obstacle_rx: broadcast::Receiver<Arc<ObstacleEdit>>,
    snapshot_topic: Topic<FollowerSnapshot>,
    snapshot_rx: broadcast::Receiver<Arc<FollowerSnapshot>>,
    grid_topic: Topic<Grid>,
    grid_rx: broadcast::Receiver<Arc<Grid>>,
}

async fn run(settings: Settings, world: World, bb: Blackboard, channels: Channels) -> anyhow::Result<()> {
    let Channels { destination_rx, obstacle_rx, snapshot_topic, snapshot_rx, grid_topic, grid_rx } = channels;
    let start = world.start_position()?;
    let follower = PathFollower::new(settings.follower, world.tiling, start)?;
    let tick = Duration::from_secs_f32(1.0 / settings.sim.tick_hz);
    info!(%start, tick_hz = settings.sim.tick_hz, "Spawning navigation task");

    tokio::try_join!(
        run_nav_task(
            follower,
            world.grid,
            tick,
            destination_rx,
            obstacle_rx,
            snapshot_topic.sender(),
            grid_topic.sender(),
        ),
        relay_snapshots(bb.clone(), snapshot_rx),
        relay_grids(bb.clone(), grid_rx),
        watchdog(bb, tick),
    )?;
    Ok(())
}

/// Copies every published snapshot onto the blackboard for the render loop.
async fn relay_snapshots(bb: Blackboard, mut rx: broadcast::Receiver<Arc<FollowerSnapshot>>) -> anyhow::Result<()> {
    loop {
        match rx.recv().await {
            Ok(snap) => record_tick(&bb, (*snap).clone()),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "Snapshot relay lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("Snapshot channel closed.");
                return Ok(());
            }
        }
    }
}

/// Keeps the blackboard grid in step with the navigation task's grid.
async fn relay_grids(bb: Blackboard, mut rx: broadcast::Receiver<Arc<Grid>>) -> anyhow::Result<()> {
    loop {
        match rx.recv().await {
            Ok(grid) => record_grid(&bb, grid),
            // Only the newest grid matters; the next recv returns it.
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "Grid relay lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("Grid channel closed.");
                return Ok(());
            }
        }
    }
}

async fn watchdog(bb: Blackboard, tick: Duration) -> anyhow::Result<()> {
    info!("Watchdog task started.");
    let limit = (tick * 10).max(Duration::from_millis(250));
    let mut interval = tokio::time::interval(limit / 2);
    loop {
        interval.tick().await;
        let last_tick_ts = snapshot(&bb).last_tick_ts;
        let age = Instant::now() - last_tick_ts;
        if age > limit {
            warn!(?age, "No navigation tick within the limit");
            raise_fault(&bb, STALL_FAULT);
        } else {
            clear_fault(&bb, STALL_FAULT);
        }
    }
}
