//! # Tile Kinds
//!
//! The closed set of tiles a generated map may contain, and the character
//! codes used by the text map format.

use serde::{Deserialize, Serialize};

/// Highest portal id that still fits the single-digit text encoding.
pub const MAX_PORTAL_ID: u8 = 9;

/// A single map tile.
///
/// `Portal` carries the id of its pair; a valid map holds exactly two
/// cells for every id in use.
///
/// # Examples
///
/// ```
/// use slitheria::TileKind;
///
/// assert_eq!(TileKind::Wall.to_char(), '#');
/// assert_eq!(TileKind::from_char('3'), Some(TileKind::Portal(3)));
/// assert!(!TileKind::Wall.is_passable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Empty,
    Spike,
    Goal,
    Start,
    Portal(u8),
    /// Cosmetic marker around the spawn; behaves exactly like `Empty`.
    SafeZone,
}

impl TileKind {
    /// Character code used in the text map format.
    ///
    /// Portal ids above [`MAX_PORTAL_ID`] have no code and print as `'?'`,
    /// which [`TileKind::from_char`] rejects. A [`Grid`](super::Grid) never
    /// holds such a portal.
    pub fn to_char(self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Empty => '+',
            TileKind::Spike => '*',
            TileKind::Goal => ':',
            TileKind::Start => 'x',
            TileKind::Portal(id) => char::from_digit(u32::from(id), 10).unwrap_or('?'),
            TileKind::SafeZone => 'S',
        }
    }

    /// Parses a character code; returns `None` for unknown characters.
    pub fn from_char(c: char) -> Option<TileKind> {
        match c {
            '#' => Some(TileKind::Wall),
            '+' => Some(TileKind::Empty),
            '*' => Some(TileKind::Spike),
            ':' => Some(TileKind::Goal),
            'x' => Some(TileKind::Start),
            'S' => Some(TileKind::SafeZone),
            '0'..='9' => c.to_digit(10).map(|d| TileKind::Portal(d as u8)),
            _ => None,
        }
    }

    /// Whether the reachability search may step onto this tile.
    pub fn is_passable(self) -> bool {
        self != TileKind::Wall
    }

    /// Returns the pair id when this tile is a portal.
    pub fn portal_id(self) -> Option<u8> {
        match self {
            TileKind::Portal(id) => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for TileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
