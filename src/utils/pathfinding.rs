//! # Walking Search
//!
//! Plain grid walking (4-neighbour steps, no teleports) used by the
//! placement heuristics.

use crate::map::{Grid, Position, TileKind};
use ::pathfinding::prelude::{bfs, dijkstra_all};
use std::collections::HashMap;

fn walking_steps<'a, F>(grid: &'a Grid, pos: Position, walkable: &'a F) -> Vec<Position>
where
    F: Fn(TileKind) -> bool,
{
    grid.cardinal_neighbors(pos)
        .filter(|&next| walkable(grid.get(next)))
        .collect()
}

/// Walking distance from `start` to every tile reachable through tiles
/// accepted by `walkable`. The start itself is included at distance 0.
pub fn walking_distances<F>(grid: &Grid, start: Position, walkable: F) -> HashMap<Position, u32>
where
    F: Fn(TileKind) -> bool,
{
    let mut distances: HashMap<Position, u32> = dijkstra_all(&start, |&pos| {
        walking_steps(grid, pos, &walkable)
            .into_iter()
            .map(|next| (next, 1u32))
    })
    .into_iter()
    .map(|(pos, (_, cost))| (pos, cost))
    .collect();

    distances.insert(start, 0);
    distances
}

/// Shortest walking distance between two tiles, or `None` when unreachable.
pub fn walking_distance<F>(grid: &Grid, start: Position, goal: Position, walkable: F) -> Option<u32>
where
    F: Fn(TileKind) -> bool,
{
    bfs(
        &start,
        |&pos| walking_steps(grid, pos, &walkable),
        |&pos| pos == goal,
    )
    .map(|path| (path.len() - 1) as u32)
}
