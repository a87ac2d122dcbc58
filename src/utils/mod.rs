//! # Utilities Module
//!
//! Geometry and grid-search helpers shared by the generation passes.

pub mod math;
pub mod pathfinding;

pub use self::math::*;
pub use self::pathfinding::*;
