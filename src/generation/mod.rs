//! # Generation Module
//!
//! Terrain synthesis for new maps.
//!
//! Three interchangeable strategies fill a freshly bordered grid with walls,
//! floor and (for cell-collapse) spikes. Every strategy hands back the same
//! [`Terrain`] value, so feature placement, validation and orchestration are
//! shared between them.

pub mod chambers;
pub mod collapse;
pub mod maze;

pub use chambers::*;
pub use collapse::*;
pub use maze::*;

use crate::map::{Grid, Position};
use crate::{SlitheriaError, SlitheriaResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Every tunable of the pipeline lives here and is passed explicitly into
/// `generate`; there is no process-wide mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Synthesize/place/validate cycles before falling back
    pub max_attempts: u32,
    /// Cell-collapse restarts allowed within one attempt
    pub max_synthesis_restarts: u32,
    /// Largest spike cluster left untouched by thinning
    pub max_spike_cluster: usize,
    /// Probability of clearing each excess spike in a cluster (0.0 to 1.0)
    pub spike_removal_chance: f64,
    /// Radius of the square window used to score clearance
    pub clearance_radius: i32,
    /// Minimum clearance for a cell to count as open space
    pub start_min_clearance: usize,
    /// Minimum clearance for a goal candidate
    pub goal_min_clearance: usize,
    /// Walking distance above this multiple of the Manhattan distance triggers carving
    pub detour_factor: f64,
    /// Radius of wall clearing around each step of a carved path
    pub carve_radius: i32,
    /// Radius of probabilistic wall clearing around carved path samples
    pub obstruction_clear_radius: i32,
    /// Probability of clearing each nearby wall (0.0 to 1.0)
    pub obstruction_clear_chance: f64,
    /// Chebyshev radius around the start marked as a safe zone
    pub safe_zone_radius: i32,
    /// Maximum portal pairs on a map (at most 10, ids are single digits)
    pub max_portal_pairs: usize,
    /// Minimum open 4-neighbours for an organic portal cell
    pub portal_min_open_neighbors: usize,
    /// Minimum chamber width including walls
    pub min_chamber_width: usize,
    /// Minimum chamber height including walls
    pub min_chamber_height: usize,
    /// Upper bound on chamber slot columns
    pub max_chamber_columns: usize,
    /// Upper bound on chamber slot rows
    pub max_chamber_rows: usize,
    /// Gap kept between chambers and around rooms
    pub chamber_padding: usize,
    /// Rooms overlaid on a maze
    pub maze_room_count: usize,
    /// Placement attempts per maze room
    pub maze_room_attempts: u32,
    /// Smallest maze room side
    pub maze_room_min: usize,
    /// Largest maze room side
    pub maze_room_max: usize,
    /// Side of the square hazard regions used when there are no chambers
    pub hazard_region_size: usize,
    /// Regions whose centre is within this distance of the goal are on the critical path
    pub critical_path_radius: f64,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use slitheria::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert!(config.max_attempts >= 1);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            max_attempts: 5,
            max_synthesis_restarts: 32,
            max_spike_cluster: 2,
            spike_removal_chance: 0.8,
            clearance_radius: 2,
            start_min_clearance: 5,
            goal_min_clearance: 2,
            detour_factor: 2.0,
            carve_radius: 1,
            obstruction_clear_radius: 3,
            obstruction_clear_chance: 0.4,
            safe_zone_radius: 1,
            max_portal_pairs: 4,
            portal_min_open_neighbors: 2,
            min_chamber_width: 5,
            min_chamber_height: 5,
            max_chamber_columns: 4,
            max_chamber_rows: 4,
            chamber_padding: 1,
            maze_room_count: 6,
            maze_room_attempts: 30,
            maze_room_min: 3,
            maze_room_max: 7,
            hazard_region_size: 8,
            critical_path_radius: 12.0,
        }
    }

    /// Creates a configuration for testing with smaller, simpler maps.
    pub fn for_testing() -> Self {
        Self {
            max_portal_pairs: 2,
            maze_room_count: 3,
            maze_room_attempts: 15,
            maze_room_max: 5,
            hazard_region_size: 6,
            critical_path_radius: 8.0,
            ..Self::new()
        }
    }

    /// Creates a configuration for the large 75-100 tile maps.
    pub fn for_large_maps() -> Self {
        Self {
            max_attempts: 8,
            max_chamber_columns: 6,
            max_chamber_rows: 6,
            maze_room_count: 12,
            maze_room_max: 11,
            hazard_region_size: 12,
            critical_path_radius: 25.0,
            ..Self::new()
        }
    }

    /// Checks that the configuration is internally consistent.
    pub fn validate(&self) -> SlitheriaResult<()> {
        let probabilities = [
            ("spike_removal_chance", self.spike_removal_chance),
            ("obstruction_clear_chance", self.obstruction_clear_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(SlitheriaError::InvalidConfig(format!(
                    "{} must be within 0.0..=1.0, got {}",
                    name, value
                )));
            }
        }

        if self.max_attempts == 0 {
            return Err(SlitheriaError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.max_portal_pairs > 10 {
            return Err(SlitheriaError::InvalidConfig(format!(
                "max_portal_pairs must be at most 10, got {}",
                self.max_portal_pairs
            )));
        }
        if self.min_chamber_width < 3 || self.min_chamber_height < 3 {
            return Err(SlitheriaError::InvalidConfig(
                "chambers need at least 3 tiles per side".to_string(),
            ));
        }
        if self.max_chamber_columns == 0 || self.max_chamber_rows == 0 {
            return Err(SlitheriaError::InvalidConfig(
                "chamber layouts need at least one column and one row".to_string(),
            ));
        }
        if self.chamber_padding == 0 {
            return Err(SlitheriaError::InvalidConfig(
                "chamber_padding must be at least 1".to_string(),
            ));
        }
        if self.maze_room_min == 0 || self.maze_room_max < self.maze_room_min {
            return Err(SlitheriaError::InvalidConfig(format!(
                "maze room sizes {}..={} are invalid",
                self.maze_room_min, self.maze_room_max
            )));
        }
        if self.hazard_region_size == 0 {
            return Err(SlitheriaError::InvalidConfig(
                "hazard_region_size must be positive".to_string(),
            ));
        }
        if self.clearance_radius < 0 || self.carve_radius < 0 || self.safe_zone_radius < 0 {
            return Err(SlitheriaError::InvalidConfig(
                "radii must not be negative".to_string(),
            ));
        }
        if self.detour_factor < 1.0 {
            return Err(SlitheriaError::InvalidConfig(format!(
                "detour_factor must be at least 1.0, got {}",
                self.detour_factor
            )));
        }

        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The terrain-synthesis strategy run for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainStrategy {
    /// Organic terrain from constraint propagation
    CellCollapse,
    /// A grid of walled chambers joined by doors
    ChamberLayout,
    /// A backtracked maze with rooms cut into it
    MazeWithRooms,
}

impl TerrainStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [TerrainStrategy; 3] = [
        TerrainStrategy::CellCollapse,
        TerrainStrategy::ChamberLayout,
        TerrainStrategy::MazeWithRooms,
    ];

    /// Smallest `(width, height)` the strategy accepts; smaller requests are clamped up.
    pub fn min_dimensions(self) -> (usize, usize) {
        match self {
            TerrainStrategy::CellCollapse => (10, 8),
            TerrainStrategy::ChamberLayout => (10, 8),
            TerrainStrategy::MazeWithRooms => (11, 9),
        }
    }

    /// Human-readable name used in map descriptions and logs.
    pub fn display_name(self) -> &'static str {
        match self {
            TerrainStrategy::CellCollapse => "Cell-collapse",
            TerrainStrategy::ChamberLayout => "Chamber",
            TerrainStrategy::MazeWithRooms => "Maze",
        }
    }

    /// The synthesizer implementing this strategy.
    pub fn synthesizer(self) -> Box<dyn TerrainSynthesizer> {
        match self {
            TerrainStrategy::CellCollapse => Box::new(CellCollapseSynthesizer::new()),
            TerrainStrategy::ChamberLayout => Box::new(ChamberLayoutSynthesizer),
            TerrainStrategy::MazeWithRooms => Box::new(MazeWithRoomsSynthesizer),
        }
    }
}

impl std::fmt::Display for TerrainStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How synthesized terrain is organised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainLayout {
    /// Free-form ground with no chamber structure
    Organic,
    /// Walled chambers or rooms joined by doors and corridors
    Chambered,
}

/// Raw terrain produced by a synthesizer.
#[derive(Debug, Clone)]
pub struct Terrain {
    pub grid: Grid,
    pub layout: TerrainLayout,
    /// Chambers or rooms, empty for organic terrain
    pub chambers: Vec<Chamber>,
}

impl Terrain {
    pub fn organic(grid: Grid) -> Self {
        Self {
            grid,
            layout: TerrainLayout::Organic,
            chambers: Vec::new(),
        }
    }

    /// Chambered terrain; `chambers` may hold fewer than two entries on small maps.
    pub fn chambered(grid: Grid, chambers: Vec<Chamber>) -> Self {
        Self {
            grid,
            layout: TerrainLayout::Chambered,
            chambers,
        }
    }
}

/// Trait for terrain synthesizers.
///
/// Implementations must return a grid whose border ring is intact and whose
/// interior holds only `Wall`, `Empty` and `Spike`.
pub trait TerrainSynthesizer {
    /// Synthesizes terrain of the given size using the shared random generator.
    fn synthesize(
        &self,
        width: usize,
        height: usize,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> SlitheriaResult<Terrain>;

    /// Gets the synthesizer type name for logging and debugging.
    fn synthesizer_type(&self) -> &'static str;
}

/// Represents a rectangular chamber or room.
///
/// The rectangle includes the chamber's own walls, if it has any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chamber {
    /// Unique identifier for this chamber
    pub id: u32,
    /// Top-left corner of the chamber
    pub top_left: Position,
    /// Width of the chamber (including walls)
    pub width: u32,
    /// Height of the chamber (including walls)
    pub height: u32,
    /// Chambers joined to this one by a door or corridor
    pub connections: Vec<u32>,
}

impl Chamber {
    /// Creates a new chamber with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use slitheria::{Chamber, Position};
    ///
    /// let chamber = Chamber::new(1, Position::new(5, 5), 10, 8);
    /// assert_eq!(chamber.id, 1);
    /// assert_eq!(chamber.center(), Position::new(10, 9));
    /// ```
    pub fn new(id: u32, top_left: Position, width: u32, height: u32) -> Self {
        Self {
            id,
            top_left,
            width,
            height,
            connections: Vec::new(),
        }
    }

    /// Gets the bottom-right corner of the chamber.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 - 1,
            self.top_left.y + self.height as i32 - 1,
        )
    }

    /// Gets the center position of the chamber.
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 / 2,
            self.top_left.y + self.height as i32 / 2,
        )
    }

    /// Checks if a position is inside this chamber.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.top_left.x
            && pos.y >= self.top_left.y
            && pos.x < self.top_left.x + self.width as i32
            && pos.y < self.top_left.y + self.height as i32
    }

    /// Checks if this chamber comes within `padding` tiles of another.
    ///
    /// With a padding of zero this is a plain rectangle overlap test.
    pub fn overlaps(&self, other: &Chamber, padding: u32) -> bool {
        let padding = padding as i32;
        !(self.top_left.x >= other.top_left.x + other.width as i32 + padding
            || other.top_left.x >= self.top_left.x + self.width as i32 + padding
            || self.top_left.y >= other.top_left.y + other.height as i32 + padding
            || other.top_left.y >= self.top_left.y + self.height as i32 + padding)
    }

    /// Gets all positions inside the outline.
    pub fn floor_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();

        for y in (self.top_left.y + 1)..(self.top_left.y + self.height as i32 - 1) {
            for x in (self.top_left.x + 1)..(self.top_left.x + self.width as i32 - 1) {
                positions.push(Position::new(x, y));
            }
        }

        positions
    }

    /// Gets all positions on the outline.
    pub fn wall_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();

        // Top and bottom walls
        for x in self.top_left.x..(self.top_left.x + self.width as i32) {
            positions.push(Position::new(x, self.top_left.y));
            positions.push(Position::new(x, self.top_left.y + self.height as i32 - 1));
        }

        // Left and right walls (excluding corners already added)
        for y in (self.top_left.y + 1)..(self.top_left.y + self.height as i32 - 1) {
            positions.push(Position::new(self.top_left.x, y));
            positions.push(Position::new(self.top_left.x + self.width as i32 - 1, y));
        }

        positions
    }

    /// Gets all positions within this chamber (both floor and walls).
    pub fn all_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();

        for y in self.top_left.y..(self.top_left.y + self.height as i32) {
            for x in self.top_left.x..(self.top_left.x + self.width as i32) {
                positions.push(Position::new(x, y));
            }
        }

        positions
    }

    /// Adds a connection to another chamber.
    pub fn add_connection(&mut self, chamber_id: u32) {
        if !self.connections.contains(&chamber_id) {
            self.connections.push(chamber_id);
        }
    }
}

/// Creates the single random generator threaded through a generation run.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::collections::HashSet;

    #[test]
    fn test_generation_config_defaults_are_valid() {
        assert!(GenerationConfig::new().validate().is_ok());
        assert!(GenerationConfig::for_testing().validate().is_ok());
        assert!(GenerationConfig::for_large_maps().validate().is_ok());
    }

    #[test]
    fn test_generation_config_rejects_bad_values() {
        let config = GenerationConfig {
            spike_removal_chance: 1.5,
            ..GenerationConfig::new()
        };
        assert!(matches!(config.validate(), Err(SlitheriaError::InvalidConfig(_))));

        let config = GenerationConfig {
            max_attempts: 0,
            ..GenerationConfig::new()
        };
        assert!(config.validate().is_err());

        let config = GenerationConfig {
            max_portal_pairs: 11,
            ..GenerationConfig::new()
        };
        assert!(config.validate().is_err());

        let config = GenerationConfig {
            maze_room_min: 6,
            maze_room_max: 4,
            ..GenerationConfig::new()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json_fills_missing_fields_with_defaults() {
        let config: GenerationConfig = serde_json::from_str(r#"{"max_attempts": 9}"#).unwrap();
        assert_eq!(config.max_attempts, 9);
        assert_eq!(config.max_portal_pairs, GenerationConfig::new().max_portal_pairs);
    }

    #[test]
    fn test_strategy_minimums() {
        for strategy in TerrainStrategy::ALL {
            let (width, height) = strategy.min_dimensions();
            assert!(width >= 10);
            assert!(height >= 8);
        }
    }

    #[test]
    fn test_chamber_geometry() {
        let chamber = Chamber::new(1, Position::new(5, 5), 10, 8);

        assert_eq!(chamber.bottom_right(), Position::new(14, 12));
        assert_eq!(chamber.center(), Position::new(10, 9));

        assert!(chamber.contains(Position::new(7, 7)));
        assert!(chamber.contains(Position::new(5, 5))); // Top-left corner
        assert!(chamber.contains(Position::new(14, 12))); // Bottom-right corner
        assert!(!chamber.contains(Position::new(4, 5))); // Outside left
        assert!(!chamber.contains(Position::new(15, 12))); // Outside right
    }

    #[test]
    fn test_chamber_overlap_with_padding() {
        let chamber1 = Chamber::new(1, Position::new(1, 1), 5, 5);
        let touching = Chamber::new(2, Position::new(6, 1), 5, 5); // Shares no tile
        let padded = Chamber::new(3, Position::new(7, 1), 5, 5); // One tile gap
        let overlapping = Chamber::new(4, Position::new(3, 3), 5, 5);

        assert!(chamber1.overlaps(&overlapping, 0));
        assert!(!chamber1.overlaps(&touching, 0));
        assert!(chamber1.overlaps(&touching, 1));
        assert!(!chamber1.overlaps(&padded, 1));
        assert!(padded.overlaps(&chamber1, 2));
    }

    #[test]
    fn test_chamber_positions() {
        let chamber = Chamber::new(1, Position::new(5, 5), 4, 4);

        let floor_positions = chamber.floor_positions();
        let wall_positions = chamber.wall_positions();

        // 4x4 chamber should have 2x2 = 4 floor tiles
        assert_eq!(floor_positions.len(), 4);

        // Should have 4*4 - 2*2 = 12 wall tiles
        assert_eq!(wall_positions.len(), 12);
        assert_eq!(chamber.all_positions().len(), 16);

        // Check that floor and wall positions don't overlap
        let floor_set: HashSet<_> = floor_positions.into_iter().collect();
        let wall_set: HashSet<_> = wall_positions.into_iter().collect();
        assert!(floor_set.is_disjoint(&wall_set));
    }

    #[test]
    fn test_chamber_connections() {
        let mut chamber = Chamber::new(1, Position::new(5, 5), 10, 8);
        chamber.add_connection(2);
        chamber.add_connection(3);
        chamber.add_connection(2);
        assert_eq!(chamber.connections, vec![2, 3]);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = seeded_rng(12345);
        let mut b = seeded_rng(12345);
        let xs: Vec<u32> = (0..8).map(|_| a.gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }
}
