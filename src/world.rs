use anyhow::{Context, bail};
use gridwalk_motion::WorldPoint;
use gridwalk_navigation::map::{AsciiLayout, ObstacleSource, RandomScatter, UniformTiling};
use gridwalk_navigation::{Grid, GridCoordinate, TileMapping};
use tracing::info;

use crate::config::{AgentSettings, MapSettings};

/// The level the agent lives in.
#[derive(Debug, Clone)]
pub struct World {
    pub grid: Grid,
    pub tiling: UniformTiling,
    pub start: GridCoordinate,
}

impl World {
    pub fn start_position(&self) -> anyhow::Result<WorldPoint> {
        self.tiling
            .grid_to_world(self.start)
            .with_context(|| format!("start cell {} has no world position", self.start))
    }
}

/// Builds the grid and tiling from the map settings.
///
/// A `[map.random]` section takes precedence over `layout`.
pub fn build_world(map: &MapSettings, agent: &AgentSettings) -> anyhow::Result<World> {
    let start = GridCoordinate::new(agent.start_x, agent.start_y);

    let (width, height, obstacles) = match &map.random {
        Some(random) => {
            let scatter = RandomScatter {
                blocked_ratio: random.blocked_ratio,
                hurdle_ratio: random.hurdle_ratio,
                seed: random.seed,
                keep_clear: vec![start],
            };
            let set = scatter.obstacles(random.width, random.height)?;
            (random.width, random.height, set)
        }
        None => {
            let layout = AsciiLayout::new(map.layout.as_slice()).context("parsing map.layout")?;
            let (width, height) = layout.dimensions();
            (width, height, layout.obstacles(width, height)?)
        }
    };

    let mut grid = Grid::default();
    grid.configure(width, height, obstacles.blocked, obstacles.hurdles, map.hurdle_cost)?;
    if !grid.in_bounds(start) {
        bail!("agent start {} is outside the {}x{} map", start, width, height);
    }
    if grid.is_blocked(start) {
        bail!("agent start {} is inside a wall", start);
    }

    let tiling = UniformTiling::new(width, height, map.spacing, WorldPoint::new(map.origin_x, map.origin_y))?;
    info!(width, height, %start, "World built");
    Ok(World { grid, tiling, start })
}
