//! # Grid Geometry
//!
//! Integer line and corridor helpers.

use crate::map::Position;

/// Steps from `start` to `end` one tile at a time, always moving along the
/// axis with the larger remaining distance (vertical on ties).
///
/// Both endpoints are included and consecutive positions are 4-adjacent.
pub fn dominant_axis_path(start: Position, end: Position) -> Vec<Position> {
    let step_x = (end.x - start.x).signum();
    let step_y = (end.y - start.y).signum();
    let mut current = start;
    let mut path = vec![current];

    while current != end {
        if (end.x - current.x).abs() > (end.y - current.y).abs() {
            current.x += step_x;
        } else {
            current.y += step_y;
        }
        path.push(current);
    }

    path
}

/// Evenly spaced samples along the straight segment from `start` to `end`,
/// one per tile of the longer axis, endpoints included.
pub fn line_samples(start: Position, end: Position) -> Vec<Position> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        return vec![start];
    }

    (0..=steps)
        .map(|i| Position::new(start.x + dx * i / steps, start.y + dy * i / steps))
        .collect()
}

/// Tiles of an L-shaped corridor between two points.
pub fn l_corridor(start: Position, end: Position, horizontal_first: bool) -> Vec<Position> {
    let mut tiles = Vec::new();
    let corner = if horizontal_first {
        Position::new(end.x, start.y)
    } else {
        Position::new(start.x, end.y)
    };

    for (from, to) in [(start, corner), (corner, end)] {
        let min_x = from.x.min(to.x);
        let max_x = from.x.max(to.x);
        let min_y = from.y.min(to.y);
        let max_y = from.y.max(to.y);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                tiles.push(Position::new(x, y));
            }
        }
    }

    tiles
}
