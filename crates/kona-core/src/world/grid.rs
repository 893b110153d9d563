//! Position maps - which particle occupies each cell
//!
//! Two dense maps cover the grid: one for ordinary particles and one for
//! energy particles, so a photon can share a cell with a powder grain. Each
//! cell holds at most one entry per map.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Size of a macro cell (walls, air pressure, gravity) in grid cells
pub const CELL: usize = 4;

/// Cell coordinate of a float position
///
/// Every conversion from a particle position to a grid cell goes through this
/// function. Rust evaluates `f32` arithmetic in single precision on every
/// supported target, so the value rounded here is the value stored in the
/// particle, and two call sites can never disagree about the cell.
#[inline]
pub fn round_to_cell(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// Cell coordinates of a float position
#[inline]
pub fn cell_of(x: f32, y: f32) -> IVec2 {
    IVec2::new(round_to_cell(x), round_to_cell(y))
}

/// A map entry: particle index plus its element
///
/// `element == 0` marks an empty cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PmapEntry {
    pub index: u32,
    pub element: u16,
}

impl PmapEntry {
    pub const EMPTY: PmapEntry = PmapEntry {
        index: 0,
        element: 0,
    };

    pub fn new(index: usize, element: u16) -> Self {
        Self {
            index: index as u32,
            element,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.element == 0
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// True if this entry refers to particle `index`
    pub fn points_to(&self, index: usize) -> bool {
        !self.is_empty() && self.index() == index
    }
}

/// One dense occupancy map over the grid
#[derive(Clone, Debug)]
pub struct PositionMap {
    width: usize,
    height: usize,
    cells: Vec<PmapEntry>,
}

impl PositionMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![PmapEntry::EMPTY; width * height],
        }
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Entry at a cell (empty outside the grid)
    pub fn get(&self, x: i32, y: i32) -> PmapEntry {
        self.offset(x, y)
            .map(|offset| self.cells[offset])
            .unwrap_or(PmapEntry::EMPTY)
    }

    /// Overwrite a cell (ignored outside the grid)
    pub fn set(&mut self, x: i32, y: i32, entry: PmapEntry) {
        if let Some(offset) = self.offset(x, y) {
            self.cells[offset] = entry;
        }
    }

    pub fn clear_cell(&mut self, x: i32, y: i32) {
        self.set(x, y, PmapEntry::EMPTY);
    }

    /// Clear a cell only if it still refers to particle `index`
    pub fn clear_if(&mut self, x: i32, y: i32, index: usize) -> bool {
        if self.get(x, y).points_to(index) {
            self.clear_cell(x, y);
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.cells.fill(PmapEntry::EMPTY);
    }

    /// Non-empty cells as `(position, entry)`
    pub fn occupied(&self) -> impl Iterator<Item = (IVec2, PmapEntry)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_empty())
            .map(move |(offset, entry)| {
                (
                    IVec2::new((offset % width) as i32, (offset / width) as i32),
                    *entry,
                )
            })
    }
}

/// Ordinary and energy occupancy maps
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Solids, powders, liquids, gases, characters
    pub pmap: PositionMap,
    /// Energy particles
    pub photons: PositionMap,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pmap: PositionMap::new(width, height),
            photons: PositionMap::new(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Map holding particles of the given category
    pub fn layer(&self, energy: bool) -> &PositionMap {
        if energy { &self.photons } else { &self.pmap }
    }

    pub fn layer_mut(&mut self, energy: bool) -> &mut PositionMap {
        if energy {
            &mut self.photons
        } else {
            &mut self.pmap
        }
    }

    pub fn clear(&mut self) {
        self.pmap.clear();
        self.photons.clear();
    }
}
