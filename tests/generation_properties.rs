//! Property tests over generated maps: every map handed back, accepted or
//! fallback, must be structurally sound and independently solvable.

use proptest::prelude::*;
use slitheria::{
    generate, GenerationConfig, Grid, MapValidator, Position, ReachabilityValidator,
    TerrainStrategy, TileKind,
};

fn strategy() -> impl Strategy<Value = TerrainStrategy> {
    prop_oneof![
        Just(TerrainStrategy::CellCollapse),
        Just(TerrainStrategy::ChamberLayout),
        Just(TerrainStrategy::MazeWithRooms),
    ]
}

fn border_is_wall(grid: &Grid) -> bool {
    grid.positions()
        .filter(|&pos| grid.is_border(pos))
        .all(|pos| grid.get(pos) == TileKind::Wall)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_generated_maps_are_sound(
        seed in any::<u64>(),
        width in 10i32..36,
        height in 8i32..24,
        strategy in strategy(),
    ) {
        let config = GenerationConfig::for_testing();
        let doc = generate(width, height, Some(seed), strategy, &config).unwrap();
        let grid = &doc.grid;

        prop_assert!(border_is_wall(grid));
        prop_assert_eq!(grid.count(TileKind::Start), 1);
        prop_assert_eq!(grid.count(TileKind::Goal), 1);
        prop_assert_eq!(grid.get(doc.start), TileKind::Start);
        prop_assert_eq!(grid.get(doc.goal), TileKind::Goal);

        for (id, cells) in grid.portal_positions() {
            prop_assert_eq!(cells.len(), 2, "portal {} is not paired", id);
        }
        let ids: Vec<u8> = doc.portals.iter().map(|pair| pair.id).collect();
        let dense: Vec<u8> = (0..doc.portals.len() as u8).collect();
        prop_assert_eq!(ids, dense);

        prop_assert_eq!(ReachabilityValidator.validate(grid), Ok(()));
        prop_assert!(ReachabilityValidator::is_reachable(grid, doc.start, doc.goal, &doc.portals));
    }

    #[test]
    fn test_generation_is_deterministic(
        seed in any::<u64>(),
        strategy in strategy(),
    ) {
        let config = GenerationConfig::for_testing();
        let first = generate(24, 16, Some(seed), strategy, &config).unwrap();
        let second = generate(24, 16, Some(seed), strategy, &config).unwrap();

        prop_assert_eq!(first.to_text(), second.to_text());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_reparsed_maps_still_validate(
        seed in any::<u64>(),
        strategy in strategy(),
    ) {
        let config = GenerationConfig::for_testing();
        let doc = generate(20, 14, Some(seed), strategy, &config).unwrap();
        let parsed = slitheria::MapDocument::from_text(&doc.to_text()).unwrap();

        prop_assert_eq!(&parsed.grid, &doc.grid);
        prop_assert_eq!(parsed.start, doc.start);
        prop_assert_eq!(parsed.goal, doc.goal);
        prop_assert_eq!(ReachabilityValidator.validate(&parsed.grid), Ok(()));
    }
}

#[test]
fn test_large_map_generation() {
    let config = GenerationConfig::for_large_maps();
    for strategy in TerrainStrategy::ALL {
        let doc = generate(80, 76, Some(2024), strategy, &config).unwrap();
        assert_eq!((doc.width(), doc.height()), (80, 76));
        assert_eq!(ReachabilityValidator.validate(&doc.grid), Ok(()));
        assert_ne!(doc.start, Position::new(0, 0));
    }
}
