//! # Slitheria Map Generator
//!
//! Procedural generation of playable, provably solvable tile maps for the
//! Slitheria puzzle-platformer.
//!
//! ## Architecture Overview
//!
//! Generation is a one-way pipeline over a single bordered tile grid:
//!
//! - **Terrain synthesis**: one of three interchangeable strategies fills the
//!   grid (cell-collapse constraint propagation, chamber layout, or a
//!   backtracked maze overlaid with rooms)
//! - **Feature placement**: start, goal, portal pairs and hazards are placed
//!   onto the synthesized terrain using clearance and distance heuristics
//! - **Validation**: a breadth-first search over the grid plus teleport edges
//!   proves the goal is reachable from the start
//! - **Orchestration**: a bounded retry loop regenerates failed attempts and
//!   falls back to a deterministic, always-solvable map
//!
//! All randomness flows from one seeded generator, so a fixed seed always
//! reproduces the same map.

pub mod features;
pub mod generation;
pub mod map;
pub mod orchestrator;
pub mod persistence;
pub mod utils;
pub mod validation;

pub use features::*;
pub use generation::*;
pub use map::*;
pub use orchestrator::*;
pub use validation::*;

/// Core error type for the map generator.
#[derive(thiserror::Error, Debug)]
pub enum SlitheriaError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Requested map dimensions are not positive
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// Generation configuration is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Every synthesis pass ended with a cell out of candidate tiles
    #[error("Contradiction during synthesis at {position} after {passes} passes")]
    Contradiction { position: Position, passes: u32 },

    /// No legal cell was found for a feature
    #[error("Feature placement failed: {0}")]
    PlacementFailed(String),

    /// A map failed structural or reachability validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// Map text could not be parsed
    #[error("Malformed map: {0}")]
    MalformedMap(String),
}

/// Result type used throughout the Slitheria codebase.
pub type SlitheriaResult<T> = Result<T, SlitheriaError>;

/// Version information for the generator.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generator configuration constants.
pub mod config {
    /// Default map width in tiles
    pub const DEFAULT_MAP_WIDTH: i32 = 40;

    /// Default map height in tiles
    pub const DEFAULT_MAP_HEIGHT: i32 = 24;

    /// Smallest side length drawn for randomly sized maps
    pub const RANDOM_SIZE_MIN: i32 = 75;

    /// Exclusive upper bound for randomly sized maps
    pub const RANDOM_SIZE_MAX: i32 = 100;

    /// File name prefix for saved maps
    pub const MAP_FILE_PREFIX: &str = "map";
}
