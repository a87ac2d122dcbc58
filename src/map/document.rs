//! # Map Documents
//!
//! The finished, immutable result of generation: the tile grid plus the
//! metadata needed to serialize it and to re-validate it independently.
//!
//! Text format:
//!
//! ```text
//! line 1: free-text description
//! line 2: integer height
//! line 3: integer width
//! lines 4..(3+height): exactly `width` characters per line
//! ```

use super::{Grid, Position};
use crate::validation::{find_goal, find_start, ValidationFailure};
use crate::{SlitheriaError, SlitheriaResult, TerrainStrategy};
use serde::{Deserialize, Serialize};

/// Two cells sharing a portal id; stepping on either teleports to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortalPair {
    pub id: u8,
    pub a: Position,
    pub b: Position,
}

impl PortalPair {
    /// Returns the opposite end of the pair, if `pos` is one of its ends.
    pub fn partner_of(&self, pos: Position) -> Option<Position> {
        if pos == self.a {
            Some(self.b)
        } else if pos == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// How a generation request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationOutcome {
    /// A synthesized map passed validation on the given attempt (1-based).
    Accepted { attempts: u32 },
    /// Every attempt failed and the deterministic fallback map was emitted.
    Fallback { attempts: u32 },
}

impl GenerationOutcome {
    pub fn is_fallback(self) -> bool {
        matches!(self, GenerationOutcome::Fallback { .. })
    }
}

/// Provenance recorded for generated maps. Absent for maps read from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub seed: u64,
    pub strategy: TerrainStrategy,
    pub outcome: GenerationOutcome,
}

/// A complete map ready to hand to the game or to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDocument {
    pub description: String,
    pub grid: Grid,
    pub start: Position,
    pub goal: Position,
    pub portals: Vec<PortalPair>,
    pub metadata: Option<GenerationMetadata>,
}

impl MapDocument {
    /// Builds a document from a finished grid, locating start, goal and
    /// portal pairs.
    ///
    /// Fails if the grid does not hold exactly one start and one goal, or if
    /// any portal id is not used by exactly two cells.
    pub fn from_grid(description: impl Into<String>, grid: Grid) -> SlitheriaResult<Self> {
        let start = find_start(&grid)?;
        let goal = find_goal(&grid)?;
        let portals = portal_pairs(&grid)?;

        Ok(Self {
            description: description.into(),
            grid,
            start,
            goal,
            portals,
            metadata: None,
        })
    }

    /// Attaches generation provenance.
    pub fn with_metadata(mut self, metadata: GenerationMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Renders the text format, one trailing newline per line.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity((self.width() + 1) * (self.height() + 3) + 64);
        text.push_str(self.description.lines().next().unwrap_or_default());
        text.push('\n');
        text.push_str(&format!("{}\n{}\n", self.height(), self.width()));
        for row in self.grid.rows() {
            text.push_str(&row);
            text.push('\n');
        }
        text
    }

    /// Parses the text format.
    ///
    /// # Examples
    ///
    /// ```
    /// use slitheria::MapDocument;
    ///
    /// let text = "Tiny\n3\n5\n#####\n#x+:#\n#####\n";
    /// let doc = MapDocument::from_text(text).unwrap();
    /// assert_eq!(doc.height(), 3);
    /// assert_eq!(doc.width(), 5);
    /// assert_eq!(doc.to_text(), text);
    /// ```
    pub fn from_text(text: &str) -> SlitheriaResult<Self> {
        let mut lines = text.lines();
        let description = lines
            .next()
            .ok_or_else(|| SlitheriaError::MalformedMap("missing description line".to_string()))?;
        let height = parse_dimension(lines.next(), "height")?;
        let width = parse_dimension(lines.next(), "width")?;

        let rows: Vec<&str> = lines.take(height).collect();
        if rows.len() != height {
            return Err(SlitheriaError::MalformedMap(format!(
                "expected {} rows, found {}",
                height,
                rows.len()
            )));
        }

        let grid = Grid::from_rows(&rows)?;
        if grid.width() != width {
            return Err(SlitheriaError::MalformedMap(format!(
                "header width {} does not match row width {}",
                width,
                grid.width()
            )));
        }

        Self::from_grid(description, grid)
    }
}

impl std::fmt::Display for MapDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn parse_dimension(line: Option<&str>, name: &str) -> SlitheriaResult<usize> {
    let line = line.ok_or_else(|| SlitheriaError::MalformedMap(format!("missing {} line", name)))?;
    line.trim()
        .parse::<usize>()
        .map_err(|_| SlitheriaError::MalformedMap(format!("{} '{}' is not a number", name, line)))
}

/// Collects portal pairs, rejecting any id that does not appear exactly twice.
pub fn portal_pairs(grid: &Grid) -> Result<Vec<PortalPair>, ValidationFailure> {
    grid.portal_positions()
        .into_iter()
        .map(|(id, positions)| match positions.as_slice() {
            [a, b] => Ok(PortalPair { id, a: *a, b: *b }),
            _ => Err(ValidationFailure::UnpairedPortal {
                id,
                count: positions.len(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text() -> &'static str {
        "Sample 5x7 map\n5\n7\n#######\n#x+0+:#\n#+###+#\n#++0++#\n#######\n"
    }

    #[test]
    fn test_parse_sample_document() {
        let doc = MapDocument::from_text(sample_text()).unwrap();
        assert_eq!(doc.description, "Sample 5x7 map");
        assert_eq!(doc.start, Position::new(1, 1));
        assert_eq!(doc.goal, Position::new(5, 1));
        assert_eq!(
            doc.portals,
            vec![PortalPair {
                id: 0,
                a: Position::new(3, 1),
                b: Position::new(3, 3)
            }]
        );
        assert!(doc.metadata.is_none());
    }

    #[test]
    fn test_text_output_is_byte_identical_after_parse() {
        let doc = MapDocument::from_text(sample_text()).unwrap();
        assert_eq!(doc.to_text(), sample_text());
        assert_eq!(doc.to_string(), sample_text());
    }

    #[test]
    fn test_header_mismatch_is_rejected() {
        let wrong_width = "Bad\n3\n6\n#####\n#x+:#\n#####\n";
        assert!(matches!(
            MapDocument::from_text(wrong_width),
            Err(SlitheriaError::MalformedMap(_))
        ));

        let missing_rows = "Bad\n4\n5\n#####\n#x+:#\n#####\n";
        assert!(MapDocument::from_text(missing_rows).is_err());

        let bad_number = "Bad\nthree\n5\n";
        assert!(MapDocument::from_text(bad_number).is_err());
    }

    #[test]
    fn test_unpaired_portal_is_rejected() {
        let text = "Bad\n3\n6\n######\n#x3+:#\n######\n";
        match MapDocument::from_text(text) {
            Err(SlitheriaError::Validation(ValidationFailure::UnpairedPortal { id, count })) => {
                assert_eq!(id, 3);
                assert_eq!(count, 1);
            }
            other => panic!("expected unpaired portal, got {:?}", other),
        }
    }

    #[test]
    fn test_start_and_goal_must_be_unique() {
        let two_starts = "Bad\n3\n6\n######\n#xx+:#\n######\n";
        assert!(matches!(
            MapDocument::from_text(two_starts),
            Err(SlitheriaError::Validation(ValidationFailure::DuplicateStart(2)))
        ));

        let no_goal = "Bad\n3\n5\n#####\n#x++#\n#####\n";
        assert!(matches!(
            MapDocument::from_text(no_goal),
            Err(SlitheriaError::Validation(ValidationFailure::MissingGoal))
        ));
    }

    #[test]
    fn test_partner_lookup() {
        let pair = PortalPair {
            id: 1,
            a: Position::new(1, 1),
            b: Position::new(5, 5),
        };
        assert_eq!(pair.partner_of(Position::new(1, 1)), Some(Position::new(5, 5)));
        assert_eq!(pair.partner_of(Position::new(5, 5)), Some(Position::new(1, 1)));
        assert_eq!(pair.partner_of(Position::new(2, 2)), None);
    }

    #[test]
    fn test_json_round_trip_keeps_rows_readable() {
        let doc = MapDocument::from_text(sample_text()).unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"#x+0+:#\""));
        let back: MapDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
