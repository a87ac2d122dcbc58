//! # Feature Placement
//!
//! Everything layered onto raw terrain: start and goal, the spawn safe zone,
//! portal pairs and hazards. Passes run in that order and each only writes
//! onto tiles that are still `Empty` (or `Wall`, for route carving), so a
//! later pass never overwrites an earlier one.

pub mod hazards;
pub mod portals;
pub mod spawn;

pub use hazards::*;
pub use portals::*;
pub use spawn::*;

use crate::generation::{GenerationConfig, Terrain};
use crate::map::{Grid, PortalPair, Position, TileKind};
use crate::SlitheriaResult;
use log::debug;
use rand::rngs::StdRng;

/// Number of `Empty` tiles in the square window of the given radius.
pub fn clearance(grid: &Grid, pos: Position, radius: i32) -> usize {
    grid.count_in_radius(pos, radius, TileKind::Empty)
}

/// Marks `Empty` tiles within `radius` (Chebyshev) of the start as safe.
pub fn mark_safe_zone(grid: &mut Grid, start: Position, radius: i32) -> usize {
    let mut marked = 0;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let pos = Position::new(start.x + dx, start.y + dy);
            if grid.is_interior(pos) && grid.get(pos) == TileKind::Empty {
                grid.set(pos, TileKind::SafeZone);
                marked += 1;
            }
        }
    }
    marked
}

/// Summary of one placement run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFeatures {
    pub start: Position,
    pub goal: Position,
    pub carved: bool,
    pub portals: Vec<PortalPair>,
    pub spikes_added: usize,
}

/// Runs every placement pass over synthesized terrain.
pub struct FeaturePlacer<'a> {
    config: &'a GenerationConfig,
}

impl<'a> FeaturePlacer<'a> {
    pub fn new(config: &'a GenerationConfig) -> Self {
        Self { config }
    }

    /// Places start, goal, safe zone, portals and hazards onto the terrain grid.
    pub fn place(&self, terrain: &mut Terrain, rng: &mut StdRng) -> SlitheriaResult<PlacedFeatures> {
        let spawn = place_start_and_goal(&mut terrain.grid, self.config, rng)?;
        let safe = mark_safe_zone(&mut terrain.grid, spawn.start, self.config.safe_zone_radius);
        let portals = place_portals(
            &mut terrain.grid,
            terrain.layout,
            &terrain.chambers,
            self.config,
            rng,
        );
        let spikes_added =
            distribute_hazards(&mut terrain.grid, &terrain.chambers, spawn.goal, self.config);

        debug!(
            "Features placed: {} safe tiles, {} portal pairs, {} spikes",
            safe,
            portals.len(),
            spikes_added
        );

        Ok(PlacedFeatures {
            start: spawn.start,
            goal: spawn.goal,
            carved: spawn.carved,
            portals,
            spikes_added,
        })
    }
}
