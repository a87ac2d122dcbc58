//! Text-format scenarios for generated documents.

use slitheria::{generate, GenerationConfig, MapDocument, SlitheriaResult, TerrainStrategy};

#[test]
fn test_chamber_map_header_and_reproducibility() -> SlitheriaResult<()> {
    let config = GenerationConfig::new();
    let doc = generate(12, 10, Some(42), TerrainStrategy::ChamberLayout, &config)?;
    let text = doc.to_text();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[1], "10");
    assert_eq!(lines[2], "12");
    assert_eq!(lines.len(), 3 + 10);
    assert!(lines[3..].iter().all(|row| row.chars().count() == 12));

    let again = generate(12, 10, Some(42), TerrainStrategy::ChamberLayout, &config)?;
    assert_eq!(again.to_text(), text);
    Ok(())
}

#[test]
fn test_every_strategy_round_trips_through_text() -> SlitheriaResult<()> {
    let config = GenerationConfig::for_testing();
    for strategy in TerrainStrategy::ALL {
        let doc = generate(26, 18, Some(7), strategy, &config)?;
        let parsed = MapDocument::from_text(&doc.to_text())?;

        assert_eq!(parsed.to_text(), doc.to_text());
        assert_eq!(parsed.portals, doc.portals);
        assert!(parsed.metadata.is_none());
    }
    Ok(())
}

#[test]
fn test_description_is_single_line() -> SlitheriaResult<()> {
    let doc = generate(20, 12, Some(1), TerrainStrategy::MazeWithRooms, &GenerationConfig::new())?;
    let first_line = doc.to_text().lines().next().map(str::to_string);
    assert_eq!(first_line.as_deref(), Some(doc.description.as_str()));
    assert!(doc.description.starts_with("Maze 12x20") || doc.description.starts_with("Fallback 12x20"));
    Ok(())
}

#[test]
fn test_json_output_carries_metadata() -> SlitheriaResult<()> {
    let doc = generate(16, 12, Some(5), TerrainStrategy::CellCollapse, &GenerationConfig::new())?;
    let json = serde_json::to_string(&doc)?;
    let back: MapDocument = serde_json::from_str(&json)?;

    assert_eq!(back, doc);
    assert!(json.contains("\"seed\":5"));
    Ok(())
}

#[test]
fn test_small_chambered_maps_carry_no_portals() -> SlitheriaResult<()> {
    let config = GenerationConfig::new();
    // Rooms this large never fit an 11x9 maze
    let roomless = GenerationConfig {
        maze_room_min: 9,
        maze_room_max: 9,
        ..GenerationConfig::new()
    };
    for seed in 0..20 {
        let chamber = generate(12, 10, Some(seed), TerrainStrategy::ChamberLayout, &config)?;
        assert!(chamber.portals.is_empty(), "chamber map seed {}", seed);
        assert!(chamber.grid.portal_positions().is_empty());

        let maze = generate(11, 9, Some(seed), TerrainStrategy::MazeWithRooms, &roomless)?;
        assert!(maze.portals.is_empty(), "maze map seed {}", seed);
    }
    Ok(())
}
