//! # Cell-Collapse Synthesis
//!
//! Organic terrain from local adjacency constraints.
//!
//! Every interior cell starts out able to become a wall, floor or spike.
//! The lowest-entropy cell is repeatedly collapsed to one of its remaining
//! candidates and the choice is propagated breadth-first to its neighbours
//! through a compatibility table. A contradiction throws the whole buffer
//! away and starts over; there is no partial backtracking.

use super::{GenerationConfig, Terrain, TerrainSynthesizer};
use crate::map::{Direction, Grid, Position, TileKind};
use crate::{SlitheriaError, SlitheriaResult};
use bitflags::bitflags;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Tile kinds cell-collapse chooses between, in table order.
pub const TERRAIN_KINDS: [TileKind; 3] = [TileKind::Wall, TileKind::Empty, TileKind::Spike];

bitflags! {
    /// Set of terrain kinds a cell may still become.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Domain: u8 {
        const WALL = 1;
        const EMPTY = 2;
        const SPIKE = 4;
    }
}

impl Domain {
    /// Singleton domain for a terrain kind; empty for anything else.
    pub fn of(kind: TileKind) -> Domain {
        match kind {
            TileKind::Wall => Domain::WALL,
            TileKind::Empty => Domain::EMPTY,
            TileKind::Spike => Domain::SPIKE,
            _ => Domain::empty(),
        }
    }

    /// Number of candidates left.
    pub fn size(self) -> usize {
        self.bits().count_ones() as usize
    }

    /// Candidates in table order.
    pub fn kinds(self) -> impl Iterator<Item = TileKind> {
        TERRAIN_KINDS
            .into_iter()
            .filter(move |&kind| self.contains(Domain::of(kind)))
    }
}

fn terrain_index(kind: TileKind) -> Option<usize> {
    TERRAIN_KINDS.iter().position(|&candidate| candidate == kind)
}

/// Allowed neighbours for every terrain kind in every direction.
///
/// `allowed(a, d)` is the set of kinds that may sit one step in direction
/// `d` from a cell holding `a`. Tables are always symmetric: `b` is allowed
/// next to `a` in direction `d` exactly when `a` is allowed next to `b` in
/// the opposite direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityTable {
    rules: [[Domain; 4]; 3],
}

impl CompatibilityTable {
    /// Builds a table from `rules[kind][direction]`, indexed by
    /// [`TERRAIN_KINDS`] order and [`Direction::index`].
    pub fn new(rules: [[Domain; 4]; 3]) -> SlitheriaResult<Self> {
        let table = Self { rules };
        match table.asymmetry() {
            None => Ok(table),
            Some((a, b, direction)) => Err(SlitheriaError::InvalidConfig(format!(
                "compatibility table is not symmetric: '{}' allows '{}' to the {:?} but not the reverse",
                a, b, direction
            ))),
        }
    }

    /// Walls touch walls and floor, spikes touch floor and spikes, floor
    /// touches everything.
    pub fn standard() -> Self {
        let wall = Domain::WALL | Domain::EMPTY;
        let empty = Domain::all();
        let spike = Domain::EMPTY | Domain::SPIKE;
        Self {
            rules: [[wall; 4], [empty; 4], [spike; 4]],
        }
    }

    /// Kinds allowed one step in `direction` from a cell holding `kind`.
    pub fn allowed(&self, kind: TileKind, direction: Direction) -> Domain {
        terrain_index(kind)
            .map(|index| self.rules[index][direction.index()])
            .unwrap_or_else(Domain::empty)
    }

    /// Union of the allowed sets of every kind still in `domain`.
    pub fn allowed_for_domain(&self, domain: Domain, direction: Direction) -> Domain {
        domain
            .kinds()
            .fold(Domain::empty(), |acc, kind| acc | self.allowed(kind, direction))
    }

    /// First `(a, b, direction)` breaking symmetry, if any.
    pub fn asymmetry(&self) -> Option<(TileKind, TileKind, Direction)> {
        for a in TERRAIN_KINDS {
            for b in TERRAIN_KINDS {
                for direction in Direction::CARDINAL {
                    let forward = self.allowed(a, direction).contains(Domain::of(b));
                    let backward = self
                        .allowed(b, direction.opposite())
                        .contains(Domain::of(a));
                    if forward != backward {
                        return Some((a, b, direction));
                    }
                }
            }
        }
        None
    }

    pub fn is_symmetric(&self) -> bool {
        self.asymmetry().is_none()
    }
}

impl Default for CompatibilityTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Synthesis-time cell state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub domain: Domain,
    pub collapsed: bool,
}

impl Cell {
    fn open() -> Self {
        Self {
            domain: Domain::all(),
            collapsed: false,
        }
    }

    fn fixed(kind: TileKind) -> Self {
        Self {
            domain: Domain::of(kind),
            collapsed: true,
        }
    }

    /// Remaining candidates, or 0 once collapsed.
    pub fn entropy(&self) -> usize {
        if self.collapsed {
            0
        } else {
            self.domain.size()
        }
    }

    /// The chosen kind, once collapsed.
    pub fn value(&self) -> Option<TileKind> {
        if self.collapsed {
            self.domain.kinds().next()
        } else {
            None
        }
    }
}

/// The full buffer of cells for one synthesis pass.
struct Wave {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Wave {
    fn new(width: usize, height: usize) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                cells.push(if border {
                    Cell::fixed(TileKind::Wall)
                } else {
                    Cell::open()
                });
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: Position) -> usize {
        pos.y as usize * self.width + pos.x as usize
    }

    fn cell(&self, pos: Position) -> &Cell {
        &self.cells[self.index(pos)]
    }

    fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        let index = self.index(pos);
        &mut self.cells[index]
    }

    fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width;
        (0..self.height)
            .flat_map(move |y| (0..width).map(move |x| Position::new(x as i32, y as i32)))
    }

    fn border_positions(&self) -> Vec<Position> {
        let (width, height) = (self.width as i32, self.height as i32);
        self.positions()
            .filter(|pos| pos.x == 0 || pos.y == 0 || pos.x == width - 1 || pos.y == height - 1)
            .collect()
    }

    /// Uncollapsed cell with the smallest non-empty domain, ties broken uniformly.
    fn min_entropy_position(&self, rng: &mut StdRng) -> Option<Position> {
        let mut best = usize::MAX;
        let mut candidates = Vec::new();

        for pos in self.positions() {
            let entropy = self.cell(pos).entropy();
            if entropy == 0 {
                continue;
            }
            if entropy < best {
                best = entropy;
                candidates.clear();
            }
            if entropy == best {
                candidates.push(pos);
            }
        }

        if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.gen_range(0..candidates.len())])
        }
    }

    fn first_contradiction(&self) -> Option<Position> {
        self.positions().find(|&pos| {
            let cell = self.cell(pos);
            !cell.collapsed && cell.domain.is_empty()
        })
    }

    fn collapse(&mut self, pos: Position, kind: TileKind) {
        *self.cell_mut(pos) = Cell::fixed(kind);
    }

    fn into_grid(self) -> Grid {
        let mut grid = Grid::filled(self.width, self.height, TileKind::Empty);
        for pos in grid.interior_positions().collect::<Vec<_>>() {
            // Every cell is collapsed once the main loop finishes.
            let kind = self.cell(pos).value().unwrap_or(TileKind::Wall);
            grid.set(pos, kind);
        }
        grid
    }
}

/// Terrain synthesizer driven by constraint propagation.
#[derive(Debug, Clone, Default)]
pub struct CellCollapseSynthesizer {
    table: CompatibilityTable,
}

impl CellCollapseSynthesizer {
    /// Creates a synthesizer using the standard compatibility table.
    pub fn new() -> Self {
        Self::with_table(CompatibilityTable::standard())
    }

    /// Creates a synthesizer with a custom (already validated) table.
    pub fn with_table(table: CompatibilityTable) -> Self {
        debug_assert!(table.is_symmetric());
        Self { table }
    }

    pub fn table(&self) -> &CompatibilityTable {
        &self.table
    }

    /// Runs one full collapse, or returns the first cell left with no candidates.
    fn collapse_once(&self, width: usize, height: usize, rng: &mut StdRng) -> Result<Grid, Position> {
        let mut wave = Wave::new(width, height);
        let border = wave.border_positions();
        self.propagate(&mut wave, border)?;

        while let Some(pos) = wave.min_entropy_position(rng) {
            let candidates: Vec<TileKind> = wave.cell(pos).domain.kinds().collect();
            let kind = candidates[rng.gen_range(0..candidates.len())];
            wave.collapse(pos, kind);
            self.propagate(&mut wave, vec![pos])?;
        }

        if let Some(position) = wave.first_contradiction() {
            return Err(position);
        }

        Ok(wave.into_grid())
    }

    /// Breadth-first arc propagation from `seeds`.
    ///
    /// A neighbour is only enqueued when its domain actually shrank, so the
    /// loop ends after at most one enqueue per removed candidate. Collapsed
    /// neighbours are checked too: with a symmetric table they can only
    /// shrink to nothing, which is a contradiction.
    fn propagate(&self, wave: &mut Wave, seeds: Vec<Position>) -> Result<(), Position> {
        let mut queue: VecDeque<Position> = seeds.into();

        while let Some(pos) = queue.pop_front() {
            let source = wave.cell(pos).domain;

            for direction in Direction::CARDINAL {
                let next = pos.step(direction);
                if !wave.in_bounds(next) {
                    continue;
                }

                let allowed = self.table.allowed_for_domain(source, direction);
                let neighbor = wave.cell_mut(next);
                let narrowed = neighbor.domain & allowed;
                if narrowed == neighbor.domain {
                    continue;
                }

                neighbor.domain = narrowed;
                match narrowed.size() {
                    0 => return Err(next),
                    1 => neighbor.collapsed = true,
                    _ => {}
                }
                queue.push_back(next);
            }
        }

        Ok(())
    }
}

impl TerrainSynthesizer for CellCollapseSynthesizer {
    fn synthesize(
        &self,
        width: usize,
        height: usize,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> SlitheriaResult<Terrain> {
        let passes = config.max_synthesis_restarts.saturating_add(1);
        let mut last_contradiction = None;

        for pass in 0..passes {
            match self.collapse_once(width, height, rng) {
                Ok(mut grid) => {
                    let thinned = thin_spike_clusters(
                        &mut grid,
                        config.max_spike_cluster,
                        config.spike_removal_chance,
                        rng,
                    );
                    debug!(
                        "Cell-collapse finished after {} restarts, thinned {} spikes",
                        pass, thinned
                    );
                    return Ok(Terrain::organic(grid));
                }
                Err(position) => {
                    debug!("Contradiction at {}, restarting synthesis", position);
                    last_contradiction = Some(position);
                }
            }
        }

        match last_contradiction {
            Some(position) => Err(SlitheriaError::Contradiction { position, passes }),
            None => Err(SlitheriaError::InvalidConfig(
                "no synthesis pass was attempted".to_string(),
            )),
        }
    }

    fn synthesizer_type(&self) -> &'static str {
        "CellCollapseSynthesizer"
    }
}

/// Breaks up spike clusters larger than `max_cluster`.
///
/// Clusters are found by 8-way flood fill. Members beyond the allowance are
/// chosen after a shuffle and each reverts to floor with probability
/// `removal_chance`. Returns the number of spikes removed.
pub fn thin_spike_clusters(
    grid: &mut Grid,
    max_cluster: usize,
    removal_chance: f64,
    rng: &mut StdRng,
) -> usize {
    let width = grid.width();
    let mut seen = vec![false; width * grid.height()];
    let index = |pos: Position| pos.y as usize * width + pos.x as usize;
    let mut removed = 0;

    for origin in grid.interior_positions().collect::<Vec<_>>() {
        if grid.get(origin) != TileKind::Spike || seen[index(origin)] {
            continue;
        }

        let mut cluster = vec![origin];
        seen[index(origin)] = true;
        let mut cursor = 0;
        while cursor < cluster.len() {
            let pos = cluster[cursor];
            cursor += 1;
            for next in pos.adjacent_positions() {
                if grid.try_get(next) == Some(TileKind::Spike) && !seen[index(next)] {
                    seen[index(next)] = true;
                    cluster.push(next);
                }
            }
        }

        if cluster.len() <= max_cluster {
            continue;
        }

        cluster.shuffle(rng);
        for &pos in &cluster[max_cluster..] {
            if rng.gen_bool(removal_chance) {
                grid.set(pos, TileKind::Empty);
                removed += 1;
            }
        }
    }

    removed
}
