use macroquad::prelude::*;

use gridwalk_motion::WorldPoint;
use gridwalk_navigation::map::UniformTiling;
use gridwalk_navigation::{FollowerSnapshot, Grid, GridCoordinate, ObstacleEdit, TerrainClass, TileMapping};
use tracing::{debug, info};

use crate::blackboard::{Blackboard, snapshot};
use crate::bus::Topic;

// Function to configure the macroquad window
pub fn window_conf() -> Conf {
    Conf {
        window_title: "Gridwalk".to_string(),
        window_width: 1024,
        window_height: 768,
        high_dpi: true,
        ..Default::default()
    }
}

const MARGIN: f32 = 20.0;
const HUD_HEIGHT: f32 = 70.0;

/// Converts between world units and window pixels.
///
/// World y grows upward, screen y grows downward.
#[derive(Debug, Clone, Copy)]
struct View {
    origin: WorldPoint,
    top: f32,
    px_per_unit: f32,
}

impl View {
    fn new(tiling: &UniformTiling, tile_px: f32) -> Self {
        let (min_p, max_p) = tiling.world_bounds();
        Self {
            origin: min_p,
            top: max_p.y,
            px_per_unit: tile_px / tiling.spacing(),
        }
    }

    fn to_screen(&self, p: WorldPoint) -> Vec2 {
        Vec2::new(
            MARGIN + (p.x - self.origin.x) * self.px_per_unit,
            HUD_HEIGHT + MARGIN + (self.top - p.y) * self.px_per_unit,
        )
    }

    fn to_world(&self, screen: Vec2) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + (screen.x - MARGIN) / self.px_per_unit,
            self.top - (screen.y - HUD_HEIGHT - MARGIN) / self.px_per_unit,
        )
    }
}

/// Draws the map and agent, and turns mouse clicks into requests.
///
/// Left click sends the agent to the clicked tile. Right click toggles a wall
/// by publishing an edit to the navigation task. Walls are drawn from the grid
/// the task publishes back, never from a local copy.
pub async fn run_visualization_loop(
    bb: Blackboard,
    tiling: UniformTiling,
    tile_px: f32,
    destinations: Topic<WorldPoint>,
    obstacles: Topic<ObstacleEdit>,
) {
    info!("Visualization loop starting...");
    let view = View::new(&tiling, tile_px);
    let tile = tiling.spacing() * view.px_per_unit;

    loop {
        let state = snapshot(&bb);
        let Some(grid) = state.grid.as_deref() else {
            clear_background(Color::from_rgba(30, 30, 36, 255));
            draw_text("Waiting for navigation...", MARGIN, 30.0, 24.0, WHITE);
            next_frame().await;
            continue;
        };
        let hovered = tiling.world_to_grid(view.to_world(Vec2::from(mouse_position())));

        if let Some(cell) = hovered {
            if is_mouse_button_pressed(MouseButton::Left) && !grid.is_blocked(cell) {
                if let Some(target) = tiling.grid_to_world(cell) {
                    debug!(%cell, "Destination clicked");
                    destinations.publish(target);
                }
            }
            if is_mouse_button_pressed(MouseButton::Right) {
                let agent_cell = state.follower.as_ref().and_then(|f| tiling.world_to_grid(f.position));
                if agent_cell != Some(cell) {
                    toggle_wall(grid, cell, &obstacles);
                }
            }
        }

        clear_background(Color::from_rgba(30, 30, 36, 255));
        draw_grid(grid, &tiling, &view, tile);

        if let Some(cell) = hovered {
            if let Some(center) = tiling.grid_to_world(cell) {
                let p = view.to_screen(center);
                let color = if grid.is_blocked(cell) { RED } else { YELLOW };
                draw_rectangle_lines(p.x - tile / 2.0, p.y - tile / 2.0, tile, tile, 3.0, color);
            }
        }

        if let Some(follower) = &state.follower {
            draw_route(follower, &view);
            draw_agent(follower, &view, tile);
            draw_hud(follower, &state.faults);
        } else {
            draw_text("Waiting for navigation...", MARGIN, 30.0, 24.0, WHITE);
        }

        next_frame().await
    }
}

fn toggle_wall(grid: &Grid, cell: GridCoordinate, obstacles: &Topic<ObstacleEdit>) {
    if let Some(edit) = wall_toggle(grid, cell) {
        debug!(%cell, terrain = %edit.terrain, "Wall toggle requested");
        obstacles.publish(edit);
    }
}

/// Edit that flips `cell` between wall and open ground in `grid`.
fn wall_toggle(grid: &Grid, cell: GridCoordinate) -> Option<ObstacleEdit> {
    if !grid.in_bounds(cell) {
        return None;
    }
    let terrain = if grid.is_blocked(cell) { TerrainClass::Open } else { TerrainClass::Blocked };
    Some(ObstacleEdit { coord: cell, terrain })
}

fn draw_grid(grid: &Grid, tiling: &UniformTiling, view: &View, tile: f32) {
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let cell = GridCoordinate::new(x, y);
            let Some(center) = tiling.grid_to_world(cell) else { continue };
            let p = view.to_screen(center);
            let color = match grid.terrain(cell) {
                Ok(TerrainClass::Open) => Color::from_rgba(210, 205, 180, 255),
                Ok(TerrainClass::Hurdle) => Color::from_rgba(60, 120, 60, 255),
                Ok(TerrainClass::Blocked) | Err(_) => Color::from_rgba(70, 70, 80, 255),
            };
            draw_rectangle(p.x - tile / 2.0, p.y - tile / 2.0, tile, tile, color);
            draw_rectangle_lines(p.x - tile / 2.0, p.y - tile / 2.0, tile, tile, 1.0, Color::from_rgba(0, 0, 0, 60));
        }
    }
}

fn draw_route(follower: &FollowerSnapshot, view: &View) {
    if !follower.path_visible {
        return;
    }
    for pair in follower.waypoints.windows(2) {
        let a = view.to_screen(pair[0]);
        let b = view.to_screen(pair[1]);
        draw_line(a.x, a.y, b.x, b.y, 3.0, ORANGE);
    }
    for p in follower.waypoints.iter().skip(1) {
        let s = view.to_screen(*p);
        draw_circle(s.x, s.y, 4.0, ORANGE);
    }
}

fn draw_agent(follower: &FollowerSnapshot, view: &View, tile: f32) {
    let center = view.to_screen(follower.position);
    // Screen y points down, so the heading flips sign.
    let th = -follower.facing.heading();
    let r_size = tile * 0.35;

    let p1 = Vec2::new(center.x + r_size * th.cos(), center.y + r_size * th.sin());
    let p2 = Vec2::new(
        center.x + r_size * (th + 2.0 * std::f32::consts::PI / 3.0).cos(),
        center.y + r_size * (th + 2.0 * std::f32::consts::PI / 3.0).sin(),
    );
    let p3 = Vec2::new(
        center.x + r_size * (th - 2.0 * std::f32::consts::PI / 3.0).cos(),
        center.y + r_size * (th - 2.0 * std::f32::consts::PI / 3.0).sin(),
    );
    draw_triangle(p1, p2, p3, BLUE);
    draw_line(center.x, center.y, p1.x, p1.y, 2.0, DARKBLUE);
}

fn draw_hud(follower: &FollowerSnapshot, faults: &[String]) {
    draw_text(
        &format!(
            "State: {}  Position: {}  Facing: {}",
            follower.state, follower.position, follower.facing
        ),
        MARGIN,
        24.0,
        22.0,
        WHITE,
    );
    let destination = follower.destination.map_or("-".to_string(), |d| d.to_string());
    let pending = follower.pending_destination.map_or("-".to_string(), |d| d.to_string());
    draw_text(
        &format!("Destination: {}  Pending: {}", destination, pending),
        MARGIN,
        46.0,
        22.0,
        WHITE,
    );
    if !faults.is_empty() {
        draw_text(&format!("Faults: {}", faults.join(", ")), MARGIN, 68.0, 20.0, RED);
    }
}
