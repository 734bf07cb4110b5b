use gridwalk_navigation::astar::astar_search_detailed;
use gridwalk_navigation::map::{ObstacleSource, RandomScatter};
use gridwalk_navigation::{Grid, GridCoordinate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = (24, 12);
    let start = GridCoordinate::new(0, 0);
    let goal = GridCoordinate::new(width - 1, height - 1);

    for seed in [1_u64, 2, 3] {
        let scatter = RandomScatter {
            blocked_ratio: 0.25,
            hurdle_ratio: 0.15,
            seed,
            keep_clear: vec![start, goal],
        };
        let obstacles = scatter.obstacles(width, height)?;

        let mut grid = Grid::default();
        grid.configure(width, height, obstacles.blocked, obstacles.hurdles, 3)?;

        let result = astar_search_detailed(&grid, start, goal)?;
        println!("Seed {}: {}", seed, result);
        print!("{}", grid.render(result.path.waypoints()));
        println!();
    }

    Ok(())
}
