//! # Tile Grid
//!
//! Fixed-size, row-major tile buffer with a wall ring around the outside.
//!
//! The grid is owned by a single generation attempt at a time. Out-of-range
//! access is a programming error and panics immediately, as does writing
//! anything but `Wall` onto the border ring.

use super::{Position, TileKind, MAX_PORTAL_ID};
use crate::{SlitheriaError, SlitheriaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rectangular tile buffer, `height` rows of `width` tiles.
///
/// # Examples
///
/// ```
/// use slitheria::{Grid, Position, TileKind};
///
/// let mut grid = Grid::new(6, 4);
/// assert_eq!(grid.get(Position::new(0, 0)), TileKind::Wall);
/// assert_eq!(grid.get(Position::new(2, 2)), TileKind::Empty);
///
/// grid.set(Position::new(2, 2), TileKind::Spike);
/// assert_eq!(grid.count(TileKind::Spike), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
}

impl Grid {
    /// Creates a grid with a wall ring and an `Empty` interior.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, TileKind::Empty)
    }

    /// Creates a grid with a wall ring and every interior tile set to `interior`.
    pub fn filled(width: usize, height: usize, interior: TileKind) -> Self {
        assert!(width > 0 && height > 0, "grid must not be empty");

        let mut grid = Self {
            width,
            height,
            tiles: vec![TileKind::Wall; width * height],
        };
        for pos in grid.interior_positions().collect::<Vec<_>>() {
            grid.set(pos, interior);
        }
        grid
    }

    /// Builds a grid from text rows without enforcing the border ring.
    ///
    /// Used when reading maps produced elsewhere; the validator reports a
    /// broken ring instead of this constructor panicking on it.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> SlitheriaResult<Self> {
        let height = rows.len();
        let width = rows.first().map(|row| row.as_ref().chars().count()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(SlitheriaError::MalformedMap("map has no tiles".to_string()));
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(SlitheriaError::MalformedMap(format!(
                    "row {} has {} tiles, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            for (x, c) in row.chars().enumerate() {
                let kind = TileKind::from_char(c).ok_or_else(|| {
                    SlitheriaError::MalformedMap(format!(
                        "unknown tile '{}' at ({}, {})",
                        c, x, y
                    ))
                })?;
                tiles.push(kind);
            }
        }

        Ok(Self { width, height, tiles })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Checks whether a position lies inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Checks whether a position lies on the outer wall ring.
    pub fn is_border(&self, pos: Position) -> bool {
        self.in_bounds(pos)
            && (pos.x == 0
                || pos.y == 0
                || pos.x as usize == self.width - 1
                || pos.y as usize == self.height - 1)
    }

    /// Checks whether a position lies strictly inside the wall ring.
    pub fn is_interior(&self, pos: Position) -> bool {
        self.in_bounds(pos) && !self.is_border(pos)
    }

    fn index(&self, pos: Position) -> usize {
        assert!(
            self.in_bounds(pos),
            "position {} outside {}x{} grid",
            pos,
            self.width,
            self.height
        );
        pos.y as usize * self.width + pos.x as usize
    }

    /// Returns the tile at `pos`. Panics when out of range.
    pub fn get(&self, pos: Position) -> TileKind {
        self.tiles[self.index(pos)]
    }

    /// Returns the tile at `pos`, or `None` when out of range.
    pub fn try_get(&self, pos: Position) -> Option<TileKind> {
        if self.in_bounds(pos) {
            Some(self.get(pos))
        } else {
            None
        }
    }

    /// Writes a tile. Panics when out of range, when a non-wall tile would
    /// be written onto the border ring, or when a portal id has no
    /// single-digit code.
    pub fn set(&mut self, pos: Position, kind: TileKind) {
        assert!(
            kind == TileKind::Wall || !self.is_border(pos),
            "border tile {} must stay a wall",
            pos
        );
        if let Some(id) = kind.portal_id() {
            assert!(id <= MAX_PORTAL_ID, "portal id {} is above {}", id, MAX_PORTAL_ID);
        }
        let index = self.index(pos);
        self.tiles[index] = kind;
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Position::new(x as i32, y as i32))
        })
    }

    /// Interior positions (everything inside the wall ring) in row-major order.
    pub fn interior_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(move |&pos| !self.is_border(pos))
    }

    /// In-bounds 4-neighbours of `pos`.
    pub fn cardinal_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(move |&next| self.in_bounds(next))
    }

    /// Positions holding `kind`, row-major.
    pub fn positions_of(&self, kind: TileKind) -> Vec<Position> {
        self.positions().filter(|&pos| self.get(pos) == kind).collect()
    }

    /// Number of tiles equal to `kind`.
    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|&&tile| tile == kind).count()
    }

    /// Counts tiles equal to `kind` in the square window of the given radius
    /// centred on `pos`, clipped to the grid.
    pub fn count_in_radius(&self, pos: Position, radius: i32, kind: TileKind) -> usize {
        let mut count = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if self.try_get(Position::new(pos.x + dx, pos.y + dy)) == Some(kind) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Every portal id on the grid with the positions carrying it.
    pub fn portal_positions(&self) -> BTreeMap<u8, Vec<Position>> {
        let mut portals: BTreeMap<u8, Vec<Position>> = BTreeMap::new();
        for pos in self.positions() {
            if let Some(id) = self.get(pos).portal_id() {
                portals.entry(id).or_default().push(pos);
            }
        }
        portals
    }

    /// First border position that is not a wall, if any.
    pub fn border_breach(&self) -> Option<Position> {
        self.positions()
            .find(|&pos| self.is_border(pos) && self.get(pos) != TileKind::Wall)
    }

    /// Text rows, one string of `width` characters per row.
    pub fn rows(&self) -> Vec<String> {
        self.tiles
            .chunks(self.width)
            .map(|row| row.iter().map(|tile| tile.to_char()).collect())
            .collect()
    }
}

impl From<Grid> for Vec<String> {
    fn from(grid: Grid) -> Self {
        grid.rows()
    }
}

impl TryFrom<Vec<String>> for Grid {
    type Error = SlitheriaError;

    fn try_from(rows: Vec<String>) -> Result<Self, Self::Error> {
        Grid::from_rows(&rows)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
