use gridwalk_navigation::astar::astar_search_detailed;
use gridwalk_navigation::map::{AsciiLayout, ObstacleSource};
use gridwalk_navigation::{Grid, GridCoordinate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("A* Pathfinding Example");
    println!("======================");

    // '.' open, '#' wall, '~' forest
    let layout = AsciiLayout::new(&[
        "..........",
        ".##....##.",
        "....#.....",
        "..####.#..",
        ".....#.#..",
        ".###.#.##.",
        "...#......",
        ".#.#.###..",
        ".#~~~~~.#.",
        "...###....",
    ])?;
    let (width, height) = layout.dimensions();
    let obstacles = layout.obstacles(width, height)?;

    let mut grid = Grid::default();
    grid.configure(width, height, obstacles.blocked, obstacles.hurdles, 4)?;

    println!("\n{}", grid);

    let start = GridCoordinate::new(0, 0);
    let goal = GridCoordinate::new(9, 9);
    println!("Start: {}, Goal: {}", start, goal);

    let result = astar_search_detailed(&grid, start, goal)?;
    println!("\n{}", result);

    if result.is_success() {
        println!("\nGrid with path:");
        print!("{}", grid.render(result.path.waypoints()));
    } else {
        println!("\nNo path found.");
    }

    // Reopen a wall and search again
    grid.clear_blocked(GridCoordinate::new(3, 0))?;
    let result = astar_search_detailed(&grid, start, goal)?;
    println!("\nAfter clearing (3, 0): {}", result);

    Ok(())
}
