//! # Maze With Rooms
//!
//! A perfect maze carved by an iterative recursive backtracker, with open
//! rooms cut into it afterwards. Maze cells sit on odd coordinates; the even
//! rows and columns between them are walls until a passage is carved.

use super::{Chamber, GenerationConfig, Terrain, TerrainSynthesizer};
use crate::map::{Grid, Position, TileKind};
use crate::utils::l_corridor;
use crate::SlitheriaResult;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Terrain synthesizer producing a maze with rooms overlaid.
#[derive(Debug, Clone, Copy, Default)]
pub struct MazeWithRoomsSynthesizer;

impl MazeWithRoomsSynthesizer {
    /// Carves a spanning tree over every odd-coordinate cell.
    fn carve_maze(&self, grid: &mut Grid, rng: &mut StdRng) {
        let cells_x = ((grid.width() - 1) / 2) as i32;
        let cells_y = ((grid.height() - 1) / 2) as i32;
        if cells_x == 0 || cells_y == 0 {
            return;
        }

        let to_pos = |cx: i32, cy: i32| Position::new(2 * cx + 1, 2 * cy + 1);
        let mut visited = vec![false; (cells_x * cells_y) as usize];
        let mut stack: Vec<(i32, i32)> = Vec::new();

        let mut current = (0, 0);
        visited[0] = true;
        grid.set(to_pos(0, 0), TileKind::Empty);

        loop {
            let (cx, cy) = current;
            let unvisited: Vec<(i32, i32)> = [(0, -1), (-1, 0), (1, 0), (0, 1)]
                .iter()
                .map(|&(dx, dy)| (cx + dx, cy + dy))
                .filter(|&(nx, ny)| {
                    nx >= 0
                        && ny >= 0
                        && nx < cells_x
                        && ny < cells_y
                        && !visited[(ny * cells_x + nx) as usize]
                })
                .collect();

            if let Some(&(nx, ny)) = unvisited.choose(rng) {
                visited[(ny * cells_x + nx) as usize] = true;
                let from = to_pos(cx, cy);
                let to = to_pos(nx, ny);
                grid.set(Position::new((from.x + to.x) / 2, (from.y + to.y) / 2), TileKind::Empty);
                grid.set(to, TileKind::Empty);
                stack.push(current);
                current = (nx, ny);
            } else if let Some(previous) = stack.pop() {
                current = previous;
            } else {
                break;
            }
        }
    }

    /// Places non-overlapping open rooms, giving up on a room after the
    /// configured number of attempts.
    fn place_rooms(&self, grid: &Grid, config: &GenerationConfig, rng: &mut StdRng) -> Vec<Chamber> {
        let max_width = config.maze_room_max.min(grid.width() - 2);
        let max_height = config.maze_room_max.min(grid.height() - 2);
        if max_width < config.maze_room_min || max_height < config.maze_room_min {
            return Vec::new();
        }

        let mut rooms: Vec<Chamber> = Vec::new();
        for _ in 0..config.maze_room_count {
            for _ in 0..config.maze_room_attempts {
                let width = rng.gen_range(config.maze_room_min..=max_width);
                let height = rng.gen_range(config.maze_room_min..=max_height);
                let x = rng.gen_range(1..=(grid.width() - 1 - width)) as i32;
                let y = rng.gen_range(1..=(grid.height() - 1 - height)) as i32;

                let room = Chamber::new(rooms.len() as u32, Position::new(x, y), width as u32, height as u32);
                if rooms
                    .iter()
                    .all(|other| !room.overlaps(other, config.chamber_padding as u32))
                {
                    rooms.push(room);
                    break;
                }
            }
        }

        rooms
    }

    /// Joins each room to the next one with an L-shaped corridor between centres.
    fn join_rooms(&self, grid: &mut Grid, rooms: &mut [Chamber], rng: &mut StdRng) {
        for i in 1..rooms.len() {
            let from = rooms[i - 1].center();
            let to = rooms[i].center();
            for pos in l_corridor(from, to, rng.gen_bool(0.5)) {
                grid.set(pos, TileKind::Empty);
            }

            let (previous_id, id) = (rooms[i - 1].id, rooms[i].id);
            rooms[i - 1].add_connection(id);
            rooms[i].add_connection(previous_id);
        }
    }
}

impl TerrainSynthesizer for MazeWithRoomsSynthesizer {
    fn synthesize(
        &self,
        width: usize,
        height: usize,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> SlitheriaResult<Terrain> {
        let mut grid = Grid::filled(width, height, TileKind::Wall);
        self.carve_maze(&mut grid, rng);

        let mut rooms = self.place_rooms(&grid, config, rng);
        for room in &rooms {
            for pos in room.all_positions() {
                grid.set(pos, TileKind::Empty);
            }
        }
        self.join_rooms(&mut grid, &mut rooms, rng);

        debug!(
            "Maze {}x{} with {} rooms, {} open tiles",
            width,
            height,
            rooms.len(),
            grid.count(TileKind::Empty)
        );

        Ok(Terrain::chambered(grid, rooms))
    }

    fn synthesizer_type(&self) -> &'static str {
        "MazeWithRoomsSynthesizer"
    }
}
