//! # Start and Goal Placement
//!
//! Picks a roomy start, the farthest reachable goal, and carves a route
//! between them when walking there would be impossible or too roundabout.

use super::clearance;
use crate::generation::GenerationConfig;
use crate::map::{Grid, Position, TileKind};
use crate::utils::{dominant_axis_path, line_samples, walking_distances};
use crate::{SlitheriaError, SlitheriaResult};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// Where the start and goal ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPlacement {
    pub start: Position,
    pub goal: Position,
    /// Whether a route had to be carved between them
    pub carved: bool,
}

/// Tiles the goal search may walk over. Portals and spikes are ignored.
fn goal_walkable(tile: TileKind) -> bool {
    matches!(tile, TileKind::Empty | TileKind::Goal)
}

/// Interior `Empty` cells with enough open floor around them, row-major.
pub fn open_spaces(grid: &Grid, config: &GenerationConfig) -> Vec<Position> {
    grid.interior_positions()
        .filter(|&pos| grid.get(pos) == TileKind::Empty)
        .filter(|&pos| clearance(grid, pos, config.clearance_radius) >= config.start_min_clearance)
        .collect()
}

/// True when the goal cannot be walked to, or the walk is longer than
/// `detour_factor` times the Manhattan distance.
pub fn route_needs_carving(
    walking: Option<u32>,
    start: Position,
    goal: Position,
    detour_factor: f64,
) -> bool {
    match walking {
        None => true,
        Some(distance) => distance as f64 > detour_factor * start.manhattan_distance(goal) as f64,
    }
}

/// Places the start and goal on the grid, carving a route if needed.
pub fn place_start_and_goal(
    grid: &mut Grid,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> SlitheriaResult<SpawnPlacement> {
    let spaces = open_spaces(grid, config);

    let mut start: Option<(Position, usize)> = None;
    for &pos in &spaces {
        let score = clearance(grid, pos, config.clearance_radius);
        if start.map_or(true, |(_, best)| score > best) {
            start = Some((pos, score));
        }
    }
    let Some((start, start_clearance)) = start else {
        return Err(SlitheriaError::PlacementFailed(
            "no open space for the start".to_string(),
        ));
    };
    grid.set(start, TileKind::Start);

    let candidates: Vec<Position> = spaces
        .into_iter()
        .filter(|&pos| pos != start)
        .filter(|&pos| clearance(grid, pos, config.clearance_radius) >= config.goal_min_clearance)
        .collect();
    if candidates.is_empty() {
        return Err(SlitheriaError::PlacementFailed(
            "no open space left for the goal".to_string(),
        ));
    }

    let distances = walking_distances(grid, start, goal_walkable);
    let goal = farthest_walkable(&candidates, |pos| distances.get(&pos).copied())
        .or_else(|| farthest_walkable(&candidates, |pos| Some(start.manhattan_distance(pos))))
        .ok_or_else(|| SlitheriaError::PlacementFailed("no goal candidate".to_string()))?;
    grid.set(goal, TileKind::Goal);

    let walking = distances.get(&goal).copied();
    let carved = route_needs_carving(walking, start, goal, config.detour_factor);
    if carved {
        carve_route(grid, start, goal, config, rng);
    }

    debug!(
        "Start {} (clearance {}), goal {} (walk {:?}), carved: {}",
        start, start_clearance, goal, walking, carved
    );

    Ok(SpawnPlacement { start, goal, carved })
}

/// Candidate with the greatest score; the first one wins ties.
fn farthest_walkable<F>(candidates: &[Position], score: F) -> Option<Position>
where
    F: Fn(Position) -> Option<u32>,
{
    let mut best: Option<(Position, u32)> = None;
    for &pos in candidates {
        if let Some(distance) = score(pos) {
            if best.map_or(true, |(_, longest)| distance > longest) {
                best = Some((pos, distance));
            }
        }
    }
    best.map(|(pos, _)| pos)
}

/// Clears walls along a dominant-axis walk from `start` to `goal`, then
/// thins walls near the straight line between them. Never touches the border.
pub fn carve_route(
    grid: &mut Grid,
    start: Position,
    goal: Position,
    config: &GenerationConfig,
    rng: &mut StdRng,
) {
    for step in dominant_axis_path(start, goal) {
        clear_walls_around(grid, step, config.carve_radius, |_| true);
    }

    for sample in line_samples(start, goal) {
        clear_walls_around(grid, sample, config.obstruction_clear_radius, |_| {
            rng.gen_bool(config.obstruction_clear_chance)
        });
    }
}

fn clear_walls_around<F>(grid: &mut Grid, center: Position, radius: i32, mut should_clear: F)
where
    F: FnMut(Position) -> bool,
{
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let pos = Position::new(center.x + dx, center.y + dy);
            if grid.is_interior(pos) && grid.get(pos) == TileKind::Wall && should_clear(pos) {
                grid.set(pos, TileKind::Empty);
            }
        }
    }
}
