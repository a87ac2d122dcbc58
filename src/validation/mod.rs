//! # Validation Module
//!
//! Proves a finished grid is playable: the border ring is intact, there is
//! exactly one start and one goal, every portal id is paired, and the goal
//! can be reached from the start by walking and teleporting.

use crate::map::{portal_pairs, Grid, PortalPair, Position, TileKind};
use std::collections::VecDeque;

/// Why a grid was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("map has no start tile")]
    MissingStart,

    #[error("map has no goal tile")]
    MissingGoal,

    #[error("map has {0} start tiles, expected exactly one")]
    DuplicateStart(usize),

    #[error("map has {0} goal tiles, expected exactly one")]
    DuplicateGoal(usize),

    #[error("portal {id} appears on {count} tiles, expected exactly two")]
    UnpairedPortal { id: u8, count: usize },

    #[error("border tile at {position} is not a wall")]
    OpenBorder { position: Position },

    #[error("goal is not reachable from the start")]
    UnreachableGoal,
}

/// Seam for the orchestrator's acceptance check.
pub trait MapValidator {
    /// Accepts the grid or reports the first problem found.
    fn validate(&self, grid: &Grid) -> Result<(), ValidationFailure>;
}

/// Locates the single start tile.
pub fn find_start(grid: &Grid) -> Result<Position, ValidationFailure> {
    match grid.positions_of(TileKind::Start).as_slice() {
        [start] => Ok(*start),
        [] => Err(ValidationFailure::MissingStart),
        many => Err(ValidationFailure::DuplicateStart(many.len())),
    }
}

/// Locates the single goal tile.
pub fn find_goal(grid: &Grid) -> Result<Position, ValidationFailure> {
    match grid.positions_of(TileKind::Goal).as_slice() {
        [goal] => Ok(*goal),
        [] => Err(ValidationFailure::MissingGoal),
        many => Err(ValidationFailure::DuplicateGoal(many.len())),
    }
}

/// Breadth-first reachability over walkable tiles plus teleport edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReachabilityValidator;

impl ReachabilityValidator {
    pub fn new() -> Self {
        Self
    }

    /// Whether `goal` can be reached from `start`.
    ///
    /// Steps go to 4-adjacent non-wall tiles. Standing on either end of a
    /// portal pair also reaches its partner in one step. The grid is never
    /// modified; visited cells are tracked in a scratch buffer.
    pub fn is_reachable(grid: &Grid, start: Position, goal: Position, portals: &[PortalPair]) -> bool {
        if !grid.in_bounds(start) || !grid.in_bounds(goal) {
            return false;
        }

        let index = |pos: Position| pos.y as usize * grid.width() + pos.x as usize;
        let mut visited = vec![false; grid.width() * grid.height()];
        let mut queue = VecDeque::new();

        visited[index(start)] = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                return true;
            }

            for next in grid.cardinal_neighbors(current) {
                if !visited[index(next)] && grid.get(next).is_passable() {
                    visited[index(next)] = true;
                    queue.push_back(next);
                }
            }

            if let Some(partner) = portals.iter().find_map(|pair| pair.partner_of(current)) {
                if grid.in_bounds(partner) && !visited[index(partner)] {
                    visited[index(partner)] = true;
                    queue.push_back(partner);
                }
            }
        }

        false
    }
}

impl MapValidator for ReachabilityValidator {
    fn validate(&self, grid: &Grid) -> Result<(), ValidationFailure> {
        if let Some(position) = grid.border_breach() {
            return Err(ValidationFailure::OpenBorder { position });
        }
        let start = find_start(grid)?;
        let goal = find_goal(grid)?;
        let portals = portal_pairs(grid)?;

        if Self::is_reachable(grid, start, goal, &portals) {
            Ok(())
        } else {
            Err(ValidationFailure::UnreachableGoal)
        }
    }
}
