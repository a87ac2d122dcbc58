//! # Portal Network
//!
//! Pairs of teleport cells. Organic terrain pairs random open cells with the
//! farthest remaining candidate; chambered terrain links consecutive chambers
//! and gets no portals at all when it holds fewer than two.

use crate::generation::{Chamber, GenerationConfig, TerrainLayout};
use crate::map::{Grid, PortalPair, Position, TileKind, MAX_PORTAL_ID};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Places portal pairs and returns them with dense ids starting at 0.
pub fn place_portals(
    grid: &mut Grid,
    layout: TerrainLayout,
    chambers: &[Chamber],
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> Vec<PortalPair> {
    let limit = config.max_portal_pairs.min(MAX_PORTAL_ID as usize + 1);
    let pairs = match layout {
        TerrainLayout::Organic => organic_pairs(grid, config, limit, rng),
        TerrainLayout::Chambered if chambers.len() > 1 => chamber_pairs(grid, chambers, limit, rng),
        TerrainLayout::Chambered => Vec::new(),
    };

    for pair in &pairs {
        grid.set(pair.a, TileKind::Portal(pair.id));
        grid.set(pair.b, TileKind::Portal(pair.id));
    }

    debug!("Placed {} portal pairs", pairs.len());
    pairs
}

/// Interior `Empty` cells with at least `min_open` `Empty` 4-neighbours.
pub fn organic_candidates(grid: &Grid, min_open: usize) -> Vec<Position> {
    grid.interior_positions()
        .filter(|&pos| grid.get(pos) == TileKind::Empty)
        .filter(|&pos| {
            grid.cardinal_neighbors(pos)
                .filter(|&next| grid.get(next) == TileKind::Empty)
                .count()
                >= min_open
        })
        .collect()
}

fn organic_pairs(
    grid: &Grid,
    config: &GenerationConfig,
    limit: usize,
    rng: &mut StdRng,
) -> Vec<PortalPair> {
    let mut candidates = organic_candidates(grid, config.portal_min_open_neighbors);
    let count = limit.min(candidates.len() / 2);
    let mut pairs = Vec::with_capacity(count);

    for id in 0..count {
        let a = candidates.remove(rng.gen_range(0..candidates.len()));

        let mut farthest: Option<(usize, u32)> = None;
        for (index, &pos) in candidates.iter().enumerate() {
            let distance = a.manhattan_distance(pos);
            if farthest.map_or(true, |(_, best)| distance > best) {
                farthest = Some((index, distance));
            }
        }
        let Some((index, _)) = farthest else {
            break;
        };
        let b = candidates.remove(index);

        pairs.push(PortalPair { id: id as u8, a, b });
    }

    pairs
}

/// Empty cells of a chamber whose whole 3x3 neighbourhood is empty.
pub fn chamber_anchor_cells(grid: &Grid, chamber: &Chamber) -> Vec<Position> {
    chamber
        .all_positions()
        .into_iter()
        .filter(|&pos| grid.is_interior(pos))
        .filter(|&pos| {
            grid.get(pos) == TileKind::Empty
                && pos
                    .adjacent_positions()
                    .into_iter()
                    .all(|next| grid.try_get(next) == Some(TileKind::Empty))
        })
        .collect()
}

fn chamber_pairs(
    grid: &Grid,
    chambers: &[Chamber],
    limit: usize,
    rng: &mut StdRng,
) -> Vec<PortalPair> {
    let mut pairs: Vec<PortalPair> = Vec::new();

    for window in chambers.windows(2) {
        if pairs.len() >= limit {
            break;
        }

        let taken: Vec<Position> = pairs.iter().flat_map(|pair| [pair.a, pair.b]).collect();
        let free = |chamber: &Chamber| -> Vec<Position> {
            chamber_anchor_cells(grid, chamber)
                .into_iter()
                .filter(|pos| !taken.contains(pos))
                .collect()
        };

        let from = free(&window[0]);
        let to = free(&window[1]);
        let (Some(&a), Some(&b)) = (from.choose(rng), to.choose(rng)) else {
            debug!(
                "Skipping portal between chambers {} and {}: no open anchor",
                window[0].id, window[1].id
            );
            continue;
        };
        if a == b {
            continue;
        }

        pairs.push(PortalPair {
            id: pairs.len() as u8,
            a,
            b,
        });
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::seeded_rng;

    #[test]
    fn test_organic_candidates_need_open_neighbours() {
        let mut grid = Grid::new(7, 5);
        // Isolate (1,1) behind two walls
        grid.set(Position::new(2, 1), TileKind::Wall);
        grid.set(Position::new(1, 2), TileKind::Wall);

        let candidates = organic_candidates(&grid, 2);
        assert!(!candidates.contains(&Position::new(1, 1)));
        assert!(candidates.contains(&Position::new(3, 2)));
    }

    #[test]
    fn test_organic_portals_pair_distant_cells() {
        let config = GenerationConfig::new();
        let mut grid = Grid::new(30, 12);
        let mut rng = seeded_rng(7);

        let pairs = place_portals(&mut grid, TerrainLayout::Organic, &[], &config, &mut rng);

        assert_eq!(pairs.len(), config.max_portal_pairs);
        for (index, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.id as usize, index);
            assert_ne!(pair.a, pair.b);
            assert_eq!(grid.get(pair.a), TileKind::Portal(pair.id));
            assert_eq!(grid.get(pair.b), TileKind::Portal(pair.id));
            assert!(pair.a.manhattan_distance(pair.b) >= 10);
        }
        assert_eq!(grid.portal_positions().len(), pairs.len());
    }

    #[test]
    fn test_portal_count_is_limited_by_candidates() {
        let config = GenerationConfig::new();
        let mut grid = Grid::filled(9, 5, TileKind::Wall);
        for x in 1..4 {
            grid.set(Position::new(x, 2), TileKind::Empty);
        }
        let mut rng = seeded_rng(2);

        // Only the middle cell has two open neighbours
        let pairs = place_portals(&mut grid, TerrainLayout::Organic, &[], &config, &mut rng);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_chamber_portals_link_consecutive_chambers() {
        let config = GenerationConfig::new();
        let mut grid = Grid::new(30, 12);
        let chambers = vec![
            Chamber::new(0, Position::new(1, 1), 7, 7),
            Chamber::new(1, Position::new(10, 1), 7, 7),
            Chamber::new(2, Position::new(20, 1), 7, 7),
        ];
        let mut rng = seeded_rng(4);

        let pairs = place_portals(&mut grid, TerrainLayout::Chambered, &chambers, &config, &mut rng);

        assert_eq!(pairs.len(), 2);
        assert!(chambers[0].contains(pairs[0].a));
        assert!(chambers[1].contains(pairs[0].b));
        assert!(chambers[1].contains(pairs[1].a));
        assert!(chambers[2].contains(pairs[1].b));
        assert_eq!(pairs[1].id, 1);
    }

    #[test]
    fn test_chamber_without_anchor_is_skipped() {
        let config = GenerationConfig::new();
        let mut grid = Grid::new(30, 12);
        let chambers = vec![
            Chamber::new(0, Position::new(1, 1), 7, 7),
            Chamber::new(1, Position::new(10, 1), 2, 2),
            Chamber::new(2, Position::new(20, 1), 7, 7),
        ];
        for pos in chambers[1].all_positions() {
            grid.set(pos, TileKind::Wall);
        }
        let mut rng = seeded_rng(4);

        let pairs = place_portals(&mut grid, TerrainLayout::Chambered, &chambers, &config, &mut rng);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_single_chamber_gets_no_portals() {
        let config = GenerationConfig::new();
        let mut grid = Grid::new(30, 12);
        let chambers = vec![Chamber::new(0, Position::new(1, 1), 12, 9)];
        let mut rng = seeded_rng(42);

        let pairs = place_portals(&mut grid, TerrainLayout::Chambered, &chambers, &config, &mut rng);
        assert!(pairs.is_empty());
        assert!(grid.portal_positions().is_empty());

        let pairs = place_portals(&mut grid, TerrainLayout::Chambered, &[], &config, &mut rng);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_portal_limit_is_respected() {
        let config = GenerationConfig {
            max_portal_pairs: 1,
            ..GenerationConfig::new()
        };
        let mut grid = Grid::new(40, 12);
        let chambers: Vec<Chamber> = (0..4)
            .map(|i| Chamber::new(i, Position::new(1 + 9 * i as i32, 1), 7, 7))
            .collect();
        let mut rng = seeded_rng(9);

        let pairs = place_portals(&mut grid, TerrainLayout::Chambered, &chambers, &config, &mut rng);
        assert_eq!(pairs.len(), 1);
    }
}
