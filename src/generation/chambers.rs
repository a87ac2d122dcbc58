//! # Chamber Layout
//!
//! Legible terrain built from a grid of walled, rectangular chambers.
//!
//! The interior is divided into evenly sized slots. Each slot receives at
//! most one chamber with a random size and offset, leaving a padding strip
//! on the slot's right and bottom edges. Adjacent chambers get one door in
//! each facing wall. Everything outside the chamber outlines stays open
//! floor, so the padding strips form a connected hallway network.

use super::{Chamber, GenerationConfig, Terrain, TerrainSynthesizer};
use crate::map::{Grid, Position, TileKind};
use crate::SlitheriaResult;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Slot geometry for a chamber layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    pub columns: usize,
    pub rows: usize,
    pub slot_width: usize,
    pub slot_height: usize,
}

impl SlotLayout {
    /// Fits as many slots as the minimum chamber size plus padding allows,
    /// bounded by the configured column and row counts.
    pub fn for_map(width: usize, height: usize, config: &GenerationConfig) -> Self {
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(2);

        let columns = (inner_width / (config.min_chamber_width + config.chamber_padding))
            .clamp(1, config.max_chamber_columns.max(1));
        let rows = (inner_height / (config.min_chamber_height + config.chamber_padding))
            .clamp(1, config.max_chamber_rows.max(1));

        Self {
            columns,
            rows,
            slot_width: inner_width / columns,
            slot_height: inner_height / rows,
        }
    }

    /// Top-left interior corner of a slot.
    pub fn slot_origin(&self, column: usize, row: usize) -> Position {
        Position::new(
            1 + (column * self.slot_width) as i32,
            1 + (row * self.slot_height) as i32,
        )
    }
}

/// Terrain synthesizer producing walled chambers joined by doors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChamberLayoutSynthesizer;

impl ChamberLayoutSynthesizer {
    /// Instantiates at most one chamber per slot. Returns the chambers and,
    /// per slot in row-major order, the index of the chamber it holds.
    fn place_chambers(
        &self,
        grid: &Grid,
        layout: &SlotLayout,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> (Vec<Chamber>, Vec<Option<usize>>) {
        let mut chambers: Vec<Chamber> = Vec::new();
        let mut slots = Vec::with_capacity(layout.columns * layout.rows);

        for row in 0..layout.rows {
            for column in 0..layout.columns {
                let max_width = layout.slot_width.saturating_sub(config.chamber_padding);
                let max_height = layout.slot_height.saturating_sub(config.chamber_padding);
                if max_width < config.min_chamber_width || max_height < config.min_chamber_height {
                    slots.push(None);
                    continue;
                }

                let width = rng.gen_range(config.min_chamber_width..=max_width);
                let height = rng.gen_range(config.min_chamber_height..=max_height);
                let offset_x = rng.gen_range(0..=max_width - width);
                let offset_y = rng.gen_range(0..=max_height - height);

                let origin = layout.slot_origin(column, row);
                let top_left = Position::new(origin.x + offset_x as i32, origin.y + offset_y as i32);
                let chamber = Chamber::new(chambers.len() as u32, top_left, width as u32, height as u32);

                if !self.chamber_fits(grid, &chamber) {
                    slots.push(None);
                    continue;
                }

                slots.push(Some(chambers.len()));
                chambers.push(chamber);
            }
        }

        (chambers, slots)
    }

    /// Checks that the whole chamber lies inside the wall ring.
    fn chamber_fits(&self, grid: &Grid, chamber: &Chamber) -> bool {
        grid.is_interior(chamber.top_left) && grid.is_interior(chamber.bottom_right())
    }

    /// Smallest chamber that fits the interior, used when no slot could hold one.
    fn fallback_chamber(&self, grid: &Grid, config: &GenerationConfig) -> Chamber {
        let width = config.min_chamber_width.min(grid.width() - 2).max(1);
        let height = config.min_chamber_height.min(grid.height() - 2).max(1);
        Chamber::new(0, Position::new(1, 1), width as u32, height as u32)
    }

    fn carve_chamber(&self, grid: &mut Grid, chamber: &Chamber) {
        for pos in chamber.wall_positions() {
            grid.set(pos, TileKind::Wall);
        }
        for pos in chamber.floor_positions() {
            grid.set(pos, TileKind::Empty);
        }
    }

    /// Opens one door in each facing wall of every pair of slot neighbours.
    fn connect_chambers(
        &self,
        grid: &mut Grid,
        chambers: &mut [Chamber],
        slots: &[Option<usize>],
        layout: &SlotLayout,
        rng: &mut StdRng,
    ) {
        let slot = |column: usize, row: usize| slots[row * layout.columns + column];

        for row in 0..layout.rows {
            for column in 0..layout.columns {
                let Some(current) = slot(column, row) else {
                    continue;
                };

                if column + 1 < layout.columns {
                    if let Some(east) = slot(column + 1, row) {
                        self.open_horizontal_doors(grid, chambers, current, east, rng);
                    }
                }
                if row + 1 < layout.rows {
                    if let Some(south) = slot(column, row + 1) {
                        self.open_vertical_doors(grid, chambers, current, south, rng);
                    }
                }
            }
        }
    }

    /// Doors in the east wall of `west` and the west wall of `east`.
    fn open_horizontal_doors(
        &self,
        grid: &mut Grid,
        chambers: &mut [Chamber],
        west: usize,
        east: usize,
        rng: &mut StdRng,
    ) {
        let (a, b) = (&chambers[west], &chambers[east]);
        let (row_a, row_b) = door_offsets(
            (a.top_left.y + 1, a.bottom_right().y - 1),
            (b.top_left.y + 1, b.bottom_right().y - 1),
            rng,
        );
        grid.set(Position::new(a.bottom_right().x, row_a), TileKind::Empty);
        grid.set(Position::new(b.top_left.x, row_b), TileKind::Empty);

        link(chambers, west, east);
    }

    /// Doors in the south wall of `north` and the north wall of `south`.
    fn open_vertical_doors(
        &self,
        grid: &mut Grid,
        chambers: &mut [Chamber],
        north: usize,
        south: usize,
        rng: &mut StdRng,
    ) {
        let (a, b) = (&chambers[north], &chambers[south]);
        let (column_a, column_b) = door_offsets(
            (a.top_left.x + 1, a.bottom_right().x - 1),
            (b.top_left.x + 1, b.bottom_right().x - 1),
            rng,
        );
        grid.set(Position::new(column_a, a.bottom_right().y), TileKind::Empty);
        grid.set(Position::new(column_b, b.top_left.y), TileKind::Empty);

        link(chambers, north, south);
    }

    /// Opens a door from a chamber without neighbours onto the floor around it.
    fn open_exit_door(&self, grid: &mut Grid, chamber: &Chamber, rng: &mut StdRng) {
        let bottom_right = chamber.bottom_right();
        let exits: Vec<Position> = chamber
            .wall_positions()
            .into_iter()
            .filter(|&pos| {
                let corner = (pos.x == chamber.top_left.x || pos.x == bottom_right.x)
                    && (pos.y == chamber.top_left.y || pos.y == bottom_right.y);
                !corner
                    && grid.cardinal_neighbors(pos).any(|next| {
                        !chamber.contains(next)
                            && grid.is_interior(next)
                            && grid.get(next) == TileKind::Empty
                    })
            })
            .collect();

        if let Some(&door) = exits.choose(rng) {
            grid.set(door, TileKind::Empty);
        }
    }
}

/// Picks a door coordinate in each inclusive span, sharing one coordinate
/// when the spans overlap so the doors line up.
fn door_offsets(a: (i32, i32), b: (i32, i32), rng: &mut StdRng) -> (i32, i32) {
    let shared = (a.0.max(b.0), a.1.min(b.1));
    if shared.0 <= shared.1 {
        let at = rng.gen_range(shared.0..=shared.1);
        (at, at)
    } else {
        (rng.gen_range(a.0..=a.1), rng.gen_range(b.0..=b.1))
    }
}

fn link(chambers: &mut [Chamber], a: usize, b: usize) {
    let (id_a, id_b) = (chambers[a].id, chambers[b].id);
    chambers[a].add_connection(id_b);
    chambers[b].add_connection(id_a);
}

impl TerrainSynthesizer for ChamberLayoutSynthesizer {
    fn synthesize(
        &self,
        width: usize,
        height: usize,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> SlitheriaResult<Terrain> {
        let mut grid = Grid::new(width, height);
        let layout = SlotLayout::for_map(width, height, config);
        let (mut chambers, slots) = self.place_chambers(&grid, &layout, config, rng);

        if chambers.is_empty() {
            debug!("No chamber slot fits a {}x{} map, using a single chamber", width, height);
            let chamber = self.fallback_chamber(&grid, config);
            self.carve_chamber(&mut grid, &chamber);
            self.open_exit_door(&mut grid, &chamber, rng);
            return Ok(Terrain::chambered(grid, vec![chamber]));
        }

        for chamber in &chambers {
            self.carve_chamber(&mut grid, chamber);
        }
        self.connect_chambers(&mut grid, &mut chambers, &slots, &layout, rng);
        for chamber in chambers.iter().filter(|c| c.connections.is_empty()) {
            self.open_exit_door(&mut grid, chamber, rng);
        }

        debug!(
            "Chamber layout: {} chambers in a {}x{} slot grid",
            chambers.len(),
            layout.columns,
            layout.rows
        );

        Ok(Terrain::chambered(grid, chambers))
    }

    fn synthesizer_type(&self) -> &'static str {
        "ChamberLayoutSynthesizer"
    }
}
