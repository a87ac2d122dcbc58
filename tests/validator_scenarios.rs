//! Hand-built grids fed straight to the validator and the placement passes,
//! bypassing terrain synthesis.

use slitheria::{
    place_start_and_goal, seeded_rng, GenerationConfig, GenerationOrchestrator, GenerationOutcome,
    GenerationState, Grid, MapValidator, Position, ReachabilityValidator, SlitheriaResult,
    TerrainStrategy, TileKind, ValidationFailure,
};

#[test]
fn test_single_portal_three_is_rejected() -> SlitheriaResult<()> {
    let grid = Grid::from_rows(&[
        "##########",
        "#x+++3++:#",
        "#++++++++#",
        "##########",
    ])?;

    assert_eq!(
        ReachabilityValidator.validate(&grid),
        Err(ValidationFailure::UnpairedPortal { id: 3, count: 1 })
    );
    Ok(())
}

#[test]
fn test_unpaired_portal_triggers_retry() -> SlitheriaResult<()> {
    struct UnpairedPortalValidator;

    impl MapValidator for UnpairedPortalValidator {
        fn validate(&self, _grid: &Grid) -> Result<(), ValidationFailure> {
            let mut grid = Grid::new(10, 4);
            grid.set(Position::new(1, 1), TileKind::Start);
            grid.set(Position::new(5, 1), TileKind::Portal(3));
            grid.set(Position::new(8, 1), TileKind::Goal);
            ReachabilityValidator.validate(&grid)
        }
    }

    let config = GenerationConfig::for_testing();
    let orchestrator = GenerationOrchestrator::with_validator(config, UnpairedPortalValidator)?;
    let run = orchestrator.run(16, 12, TerrainStrategy::ChamberLayout, &mut seeded_rng(6));

    assert!(run.outcome.is_fallback());
    assert!(run.history.contains(&GenerationState::Retrying));
    assert_eq!(ReachabilityValidator.validate(&run.grid), Ok(()));
    Ok(())
}

#[test]
fn test_straight_corridor_needs_no_carving() -> SlitheriaResult<()> {
    // Open band three rows high so both ends have enough clearance
    let mut grid = Grid::filled(24, 9, TileKind::Wall);
    for y in 3..6 {
        for x in 1..23 {
            grid.set(Position::new(x, y), TileKind::Empty);
        }
    }
    let before_walls = grid.count(TileKind::Wall);
    let config = GenerationConfig::new();

    let placement = place_start_and_goal(&mut grid, &config, &mut seeded_rng(10))?;

    assert!(!placement.carved);
    assert_eq!(grid.count(TileKind::Wall), before_walls);
    assert_eq!(placement.start, Position::new(3, 3));
    assert_eq!(placement.goal, Position::new(22, 5));
    assert_eq!(ReachabilityValidator.validate(&grid), Ok(()));
    Ok(())
}

#[test]
fn test_teleport_only_route_is_reachable() -> SlitheriaResult<()> {
    let grid = Grid::from_rows(&[
        "###########",
        "#x+0#+++++#",
        "#+++#+++0+#",
        "#++++#+++:#",
        "###########",
    ])?;

    assert_eq!(ReachabilityValidator.validate(&grid), Ok(()));
    Ok(())
}

#[test]
fn test_sealed_goal_without_portals_is_unreachable() -> SlitheriaResult<()> {
    let grid = Grid::from_rows(&[
        "###########",
        "#x+++#++++#",
        "#++++#+++:#",
        "###########",
    ])?;

    assert_eq!(
        ReachabilityValidator.validate(&grid),
        Err(ValidationFailure::UnreachableGoal)
    );
    Ok(())
}

#[test]
fn test_always_failing_validator_still_yields_solvable_map() -> SlitheriaResult<()> {
    struct NeverSatisfied;

    impl MapValidator for NeverSatisfied {
        fn validate(&self, _grid: &Grid) -> Result<(), ValidationFailure> {
            Err(ValidationFailure::UnreachableGoal)
        }
    }

    for strategy in TerrainStrategy::ALL {
        let config = GenerationConfig::for_testing();
        let attempts = config.max_attempts;
        let orchestrator = GenerationOrchestrator::with_validator(config, NeverSatisfied)?;
        let run = orchestrator.run(30, 20, strategy, &mut seeded_rng(12));

        assert_eq!(run.outcome, GenerationOutcome::Fallback { attempts });
        assert_eq!(ReachabilityValidator.validate(&run.grid), Ok(()));
        assert_eq!((run.grid.width(), run.grid.height()), (30, 20));
    }
    Ok(())
}
