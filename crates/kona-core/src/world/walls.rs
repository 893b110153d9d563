//! Wall map - coarse barriers over CELL x CELL blocks
//!
//! Walls restrict which categories of particle may enter a block. Some walls
//! depend on an "energized" bit that electrical systems (and ragdoll feet on
//! detector walls) toggle.

use serde::{Deserialize, Serialize};

use super::CELL;
use super::move_table::MoveOutcome;
use crate::simulation::{ElementDef, Falldown};

/// Wall kinds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallType {
    #[default]
    None,
    /// Conductive wall, blocks everything
    Conductive,
    /// Open only while energized
    EWall,
    /// Energized when a ragdoll foot is inside
    Detector,
    Stream,
    Fan,
    /// Only liquids pass
    AllowLiquid,
    /// Deletes particles inside
    AbsorbAll,
    Wall,
    /// Only air passes (blocks every particle)
    AllowAir,
    /// Only powders pass
    AllowPowder,
    /// Conducts, everything passes
    Conductor,
    /// Closed while not energized
    EHole,
    /// Only gases pass
    AllowGas,
    Gravity,
    /// Only energy particles pass
    AllowEnergy,
}

/// Per-block wall tags and energized bits
#[derive(Clone, Debug)]
pub struct WallMap {
    width: usize,
    height: usize,
    walls: Vec<WallType>,
    energized: Vec<bool>,
}

impl WallMap {
    /// Wall map covering a `width` x `height` cell grid
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.div_ceil(CELL);
        let height = height.div_ceil(CELL);
        Self {
            width,
            height,
            walls: vec![WallType::None; width * height],
            energized: vec![false; width * height],
        }
    }

    /// Wall map whose outer ring of blocks is solid wall
    pub fn with_solid_border(width: usize, height: usize) -> Self {
        let mut map = Self::new(width, height);
        for bx in 0..map.width {
            map.set_block(bx, 0, WallType::Wall);
            map.set_block(bx, map.height - 1, WallType::Wall);
        }
        for by in 0..map.height {
            map.set_block(0, by, WallType::Wall);
            map.set_block(map.width - 1, by, WallType::Wall);
        }
        map
    }

    #[inline]
    fn block_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let bx = x as usize / CELL;
        let by = y as usize / CELL;
        if bx >= self.width || by >= self.height {
            return None;
        }
        Some(by * self.width + bx)
    }

    /// Wall at a grid cell
    pub fn wall_at(&self, x: i32, y: i32) -> WallType {
        self.block_offset(x, y)
            .map_or(WallType::None, |offset| self.walls[offset])
    }

    pub fn is_energized(&self, x: i32, y: i32) -> bool {
        self.block_offset(x, y)
            .is_some_and(|offset| self.energized[offset])
    }

    /// Set the wall of a block (block coordinates)
    pub fn set_block(&mut self, bx: usize, by: usize, wall: WallType) {
        if bx < self.width && by < self.height {
            self.walls[by * self.width + bx] = wall;
        }
    }

    /// Set the wall of the block containing a grid cell
    pub fn set_wall(&mut self, x: i32, y: i32, wall: WallType) {
        if let Some(offset) = self.block_offset(x, y) {
            self.walls[offset] = wall;
        }
    }

    /// Set the energized bit of the block containing a grid cell
    pub fn set_energized(&mut self, x: i32, y: i32, energized: bool) {
        if let Some(offset) = self.block_offset(x, y) {
            self.energized[offset] = energized;
        }
    }

    /// E-hole that is currently closed
    pub fn is_closed_ehole(&self, x: i32, y: i32) -> bool {
        self.wall_at(x, y) == WallType::EHole && !self.is_energized(x, y)
    }

    /// Apply wall restrictions to a table outcome for a move into `(nx, ny)`
    ///
    /// `occupant` is the element currently in the destination (NONE if empty).
    pub fn filter_move(
        &self,
        nx: i32,
        ny: i32,
        mover: &ElementDef,
        occupant: &ElementDef,
        outcome: MoveOutcome,
    ) -> MoveOutcome {
        match self.wall_at(nx, ny) {
            WallType::None => outcome,
            WallType::AllowGas if !mover.is_gas() => MoveOutcome::Blocked,
            WallType::AllowEnergy if !mover.is_energy() => MoveOutcome::Blocked,
            WallType::AllowLiquid if mover.falldown != Falldown::Liquid => MoveOutcome::Blocked,
            WallType::AllowPowder if mover.falldown != Falldown::Powder => MoveOutcome::Blocked,
            WallType::AllowAir | WallType::Wall | WallType::Conductive => MoveOutcome::Blocked,
            WallType::EWall if !self.is_energized(nx, ny) => MoveOutcome::Blocked,
            WallType::EHole
                if !self.is_energized(nx, ny) && !mover.is_solid() && !occupant.is_solid() =>
            {
                MoveOutcome::CoOccupy
            }
            _ => outcome,
        }
    }

    /// Whether a wall prevents creating a particle of `element` at a cell
    ///
    /// Creation filters on category flags rather than the falldown class.
    pub fn blocks_creation(&self, x: i32, y: i32, element: &ElementDef) -> bool {
        match self.wall_at(x, y) {
            WallType::AllowGas => !element.is_gas(),
            WallType::AllowEnergy => !element.is_energy(),
            WallType::AllowLiquid => !element.is_liquid(),
            WallType::AllowPowder => !element.is_part(),
            WallType::AllowAir | WallType::Wall | WallType::Conductive => true,
            WallType::EWall => !self.is_energized(x, y),
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.walls.fill(WallType::None);
        self.energized.fill(false);
    }
}
