//! # Hazard Distribution
//!
//! Spikes laid down by fixed coordinate patterns. Regions near the goal get
//! a sparse pattern so the final approach stays readable; regions away from
//! it get a denser one.

use crate::generation::{Chamber, GenerationConfig};
use crate::map::{Grid, Position, TileKind};
use log::debug;

/// A rectangular area hazards are distributed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardRegion {
    pub top_left: Position,
    pub width: u32,
    pub height: u32,
}

impl HazardRegion {
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 / 2,
            self.top_left.y + self.height as i32 / 2,
        )
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32).flat_map(move |dy| {
            (0..self.width as i32).map(move |dx| Position::new(self.top_left.x + dx, self.top_left.y + dy))
        })
    }

    /// Whether the region's centre lies within `radius` of the goal.
    pub fn is_critical(&self, goal: Position, radius: f64) -> bool {
        self.center().euclidean_distance(goal) <= radius
    }
}

impl From<&Chamber> for HazardRegion {
    fn from(chamber: &Chamber) -> Self {
        Self {
            top_left: chamber.top_left,
            width: chamber.width,
            height: chamber.height,
        }
    }
}

/// Chambers when there are any, otherwise square tiles over the interior.
pub fn hazard_regions(grid: &Grid, chambers: &[Chamber], region_size: usize) -> Vec<HazardRegion> {
    if !chambers.is_empty() {
        return chambers.iter().map(HazardRegion::from).collect();
    }

    let inner_width = grid.width().saturating_sub(2);
    let inner_height = grid.height().saturating_sub(2);
    let mut regions = Vec::new();

    for y in (0..inner_height).step_by(region_size) {
        for x in (0..inner_width).step_by(region_size) {
            regions.push(HazardRegion {
                top_left: Position::new(1 + x as i32, 1 + y as i32),
                width: region_size.min(inner_width - x) as u32,
                height: region_size.min(inner_height - y) as u32,
            });
        }
    }

    regions
}

/// Pattern for regions near the goal.
pub fn critical_spike(pos: Position) -> bool {
    pos.x % 6 == 3 && pos.y % 4 == 2
}

/// Pattern for regions away from the goal.
pub fn off_path_spike(pos: Position) -> bool {
    (pos.x * pos.y) % 4 == 1
}

/// Converts `Empty` cells to spikes region by region. Returns the number of
/// spikes added.
pub fn distribute_hazards(
    grid: &mut Grid,
    chambers: &[Chamber],
    goal: Position,
    config: &GenerationConfig,
) -> usize {
    let mut added = 0;

    for region in hazard_regions(grid, chambers, config.hazard_region_size) {
        let critical = region.is_critical(goal, config.critical_path_radius);
        let rule: fn(Position) -> bool = if critical {
            critical_spike
        } else {
            off_path_spike
        };

        for pos in region.positions() {
            if grid.is_interior(pos) && grid.get(pos) == TileKind::Empty && rule(pos) {
                grid.set(pos, TileKind::Spike);
                added += 1;
            }
        }
    }

    debug!("Distributed {} hazard spikes", added);
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_tile_the_interior() {
        let grid = Grid::new(20, 12);
        let regions = hazard_regions(&grid, &[], 8);

        // 18x10 interior in 8-tile squares: 3 columns, 2 rows
        assert_eq!(regions.len(), 6);
        assert_eq!(regions[2].width, 2);
        assert_eq!(regions[5].height, 2);

        let covered: usize = regions.iter().map(|r| (r.width * r.height) as usize).sum();
        assert_eq!(covered, 18 * 10);
    }

    #[test]
    fn test_chambers_become_regions() {
        let grid = Grid::new(20, 12);
        let chambers = vec![Chamber::new(0, Position::new(2, 2), 6, 5)];
        let regions = hazard_regions(&grid, &chambers, 8);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].center(), Position::new(5, 4));
    }

    #[test]
    fn test_patterns() {
        assert!(critical_spike(Position::new(3, 2)));
        assert!(critical_spike(Position::new(9, 6)));
        assert!(!critical_spike(Position::new(4, 2)));

        assert!(off_path_spike(Position::new(1, 1)));
        assert!(off_path_spike(Position::new(3, 3)));
        assert!(!off_path_spike(Position::new(1, 3)));
        assert!(!off_path_spike(Position::new(2, 5)));
    }

    #[test]
    fn test_critical_regions_get_sparse_pattern() {
        let config = GenerationConfig {
            hazard_region_size: 8,
            critical_path_radius: 6.0,
            ..GenerationConfig::new()
        };
        let mut grid = Grid::new(34, 10);
        let goal = Position::new(4, 4);
        grid.set(goal, TileKind::Goal);

        distribute_hazards(&mut grid, &[], goal, &config);

        // First region is critical: only the sparse pattern appears there
        for pos in (HazardRegion { top_left: Position::new(1, 1), width: 8, height: 8 }).positions() {
            if grid.get(pos) == TileKind::Spike {
                assert!(critical_spike(pos));
            }
        }
        // Last region is far away: dense pattern
        assert_eq!(grid.get(Position::new(29, 1)), TileKind::Spike);
    }

    #[test]
    fn test_only_empty_cells_are_converted() {
        let config = GenerationConfig::new();
        let mut grid = Grid::new(12, 8);
        grid.set(Position::new(1, 1), TileKind::Start);
        grid.set(Position::new(3, 3), TileKind::Portal(0));
        grid.set(Position::new(5, 1), TileKind::SafeZone);

        let added = distribute_hazards(&mut grid, &[], Position::new(40, 40), &config);

        assert!(added > 0);
        assert_eq!(grid.get(Position::new(1, 1)), TileKind::Start);
        assert_eq!(grid.get(Position::new(3, 3)), TileKind::Portal(0));
        assert_eq!(grid.get(Position::new(5, 1)), TileKind::SafeZone);
        assert!(grid.border_breach().is_none());
    }
}
