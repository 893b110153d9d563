//! Surface normals for reflecting and refracting energy particles
//!
//! A boundary cell blocks the probing element but has at least one
//! orthogonal neighbour that does not. The normal is estimated by walking
//! along the boundary to both sides of the hit point and taking the
//! perpendicular of the chord between the two ends. Diagonal surfaces come
//! out slightly off; the estimate is approximate on purpose.

use glam::{IVec2, Vec2};

use super::grid::round_to_cell;
use super::move_table::MoveOutcome;
use super::world::World;
use crate::simulation::ElementId as E;

/// Steps walked to each side of the hit point
pub const SURF_RANGE: usize = 10;
/// Fewer successful steps than this and there is no usable normal
pub const NORMAL_MIN_EST: i32 = 3;
/// Sub-steps searched for the boundary crossing
pub const NORMAL_INTERP: usize = 20;
/// Sub-step size as a fraction of the velocity
pub const NORMAL_FRAC: f32 = 16.0;

const WALK_DX: [i32; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const WALK_DY: [i32; 8] = [0, 1, 1, 1, 0, -1, -1, -1];
/// Exits allowed after arriving through direction `i`
const WALK_EXITS: [u8; 8] = [0x83, 0x07, 0x0E, 0x1C, 0x38, 0x70, 0xE0, 0xC1];

/// What the boundary is tested against
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceProbe {
    pub element: u16,
    /// Only glass counts as blocking (refraction)
    pub refract: bool,
}

impl SurfaceProbe {
    pub fn new(element: u16) -> Self {
        Self {
            element,
            refract: false,
        }
    }

    pub fn refracting(element: u16) -> Self {
        Self {
            element,
            refract: true,
        }
    }
}

/// Bitmask of the compass directions in the half-plane facing `(dx, dy)`
///
/// ```text
///   5 6 7
///   4 + 0
///   3 2 1
/// ```
pub fn direction_to_map(dx: f32, dy: f32) -> u8 {
    (dx >= 0.0) as u8
        | (((dx + dy) >= 0.0) as u8) << 1
        | ((dy >= 0.0) as u8) << 2
        | (((dy - dx) >= 0.0) as u8) << 3
        | ((dx <= 0.0) as u8) << 4
        | (((dx + dy) <= 0.0) as u8) << 5
        | ((dy <= 0.0) as u8) << 6
        | (((dy - dx) <= 0.0) as u8) << 7
}

impl World {
    /// Would this cell stop the probe
    pub fn is_blocking(&self, probe: SurfaceProbe, x: i32, y: i32) -> bool {
        if probe.refract {
            if !self.grid.in_bounds(x, y) {
                return false;
            }
            let element = self.occupant_at(x, y).element;
            return element == E::GLAS || element == E::BGLA;
        }
        self.eval_move(probe.element, x, y).0 == MoveOutcome::Blocked
    }

    /// Blocking, with at least one non-blocking orthogonal neighbour
    pub fn is_boundary(&self, probe: SurfaceProbe, x: i32, y: i32) -> bool {
        if !self.is_blocking(probe, x, y) {
            return false;
        }
        !(self.is_blocking(probe, x, y - 1)
            && self.is_blocking(probe, x, y + 1)
            && self.is_blocking(probe, x - 1, y)
            && self.is_blocking(probe, x + 1, y))
    }

    /// Step to a neighbouring boundary cell allowed by `mask`
    ///
    /// `last` is the direction of the previous step, it narrows the mask so
    /// the walk cannot double back.
    pub fn find_next_boundary(
        &self,
        probe: SurfaceProbe,
        pos: &mut IVec2,
        mask: u8,
        last: &mut Option<usize>,
    ) -> bool {
        let width = self.width() as i32;
        let height = self.height() as i32;
        if pos.x <= 0 || pos.x >= width - 1 || pos.y <= 0 || pos.y >= height - 1 {
            return false;
        }

        let (mask, start) = match *last {
            Some(dir) => (mask & WALK_EXITS[dir], dir),
            None => (mask, 0),
        };

        for step in 0..8 {
            let dir = (step + start) & 7;
            if mask & (1 << dir) == 0 {
                continue;
            }
            let next = IVec2::new(pos.x + WALK_DX[dir], pos.y + WALK_DY[dir]);
            if self.is_boundary(probe, next.x, next.y) {
                *pos = next;
                *last = Some(dir);
                return true;
            }
        }
        false
    }

    /// Normal of the boundary at `(x, y)` for a particle travelling along `(dx, dy)`
    pub fn get_normal(&self, probe: SurfaceProbe, x: i32, y: i32, dx: f32, dy: f32) -> Option<Vec2> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        if !self.is_boundary(probe, x, y) {
            return None;
        }

        let left_mask = direction_to_map(-dy, dx);
        let right_mask = direction_to_map(dy, -dx);
        let mut left = IVec2::new(x, y);
        let mut right = left;
        let (mut left_ok, mut right_ok) = (true, true);
        let (mut left_last, mut right_last) = (None, None);

        let mut progress = 0;
        for _ in 0..SURF_RANGE {
            if left_ok {
                left_ok = self.find_next_boundary(probe, &mut left, left_mask, &mut left_last);
            }
            if right_ok {
                right_ok = self.find_next_boundary(probe, &mut right, right_mask, &mut right_last);
            }
            progress += left_ok as i32 + right_ok as i32;
            if !left_ok && !right_ok {
                break;
            }
        }

        if progress < NORMAL_MIN_EST || left == right {
            log::trace!("No surface normal at ({}, {}): walk stalled", x, y);
            return None;
        }

        let chord = (right - left).as_vec2();
        Some(Vec2::new(chord.y, -chord.x) / chord.length())
    }

    /// First boundary cell along a sub-stepped path and the scaled direction
    fn boundary_crossing(
        &self,
        probe: SurfaceProbe,
        x0: f32,
        y0: f32,
        dx: f32,
        dy: f32,
    ) -> Option<(IVec2, Vec2)> {
        let step = Vec2::new(dx, dy) / NORMAL_FRAC;
        let mut pos = Vec2::new(x0, y0);
        for _ in 0..NORMAL_INTERP {
            let cell = IVec2::new(round_to_cell(pos.x), round_to_cell(pos.y));
            if self.is_boundary(probe, cell.x, cell.y) {
                return Some((cell, step));
            }
            pos += step;
        }
        None
    }

    /// Sub-cell accurate normal lookup along a particle's path
    ///
    /// A photon crossing into a boundary also fires the photoelectric effect
    /// at the crossing cell.
    pub fn get_normal_interp(
        &mut self,
        probe: SurfaceProbe,
        x0: f32,
        y0: f32,
        dx: f32,
        dy: f32,
    ) -> Option<Vec2> {
        let (cell, step) = self.boundary_crossing(probe, x0, y0, dx, dy)?;
        if probe.element == E::PHOT {
            self.photoelectric_effect(cell.x, cell.y);
        }
        self.get_normal(probe, cell.x, cell.y, step.x, step.y)
    }

    /// Normal of the first surface an element meets travelling from `(x, y)`
    /// along `(dx, dy)`, without side effects
    pub fn find_surface_normal(&self, element: u16, x: f32, y: f32, dx: f32, dy: f32) -> Option<Vec2> {
        let probe = SurfaceProbe::new(element);
        let (cell, step) = self.boundary_crossing(probe, x, y, dx, dy)?;
        self.get_normal(probe, cell.x, cell.y, step.x, step.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    /// 32x32 world with a five-cell-thick metal floor starting at y = 20
    fn floor_world() -> World {
        let mut world = World::new(&SimConfig::small(32, 32));
        for y in 20..25 {
            for x in 2..30 {
                world.create_particle(None, x, y, E::METL);
            }
        }
        world
    }

    #[test]
    fn test_direction_map_halves() {
        // Moving right: the right half-plane plus the vertical axis
        let right = direction_to_map(1.0, 0.0);
        assert_eq!(right, 0b1100_0111);
        assert_eq!(direction_to_map(-1.0, 0.0), 0b0111_1100);
    }

    #[test]
    fn test_boundary_needs_open_neighbour() {
        let world = floor_world();
        let probe = SurfaceProbe::new(E::PHOT);
        assert!(world.is_boundary(probe, 15, 20));
        assert!(!world.is_boundary(probe, 15, 22));
        assert!(!world.is_boundary(probe, 15, 18));
    }

    #[test]
    fn test_refract_probe_only_sees_glass() {
        let mut world = floor_world();
        world.create_particle(None, 10, 10, E::GLAS);
        let probe = SurfaceProbe::refracting(E::PHOT);
        assert!(world.is_blocking(probe, 10, 10));
        assert!(!world.is_blocking(probe, 15, 20));
        assert!(!world.is_blocking(probe, -1, 10));
    }

    #[test]
    fn test_flat_floor_normal_points_up() {
        let world = floor_world();
        let normal = world
            .find_surface_normal(E::PHOT, 15.0, 19.0, 0.0, 1.0)
            .expect("normal");
        assert!(normal.x.abs() < 1e-5);
        assert!((normal.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_velocity_has_no_normal() {
        let world = floor_world();
        let probe = SurfaceProbe::new(E::PHOT);
        assert!(world.get_normal(probe, 15, 20, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_lone_cell_has_no_normal() {
        let mut world = World::new(&SimConfig::small(32, 32));
        world.create_particle(None, 15, 15, E::METL);
        let probe = SurfaceProbe::new(E::PHOT);
        assert!(world.is_boundary(probe, 15, 15));
        assert!(world.get_normal(probe, 15, 15, 0.0, 1.0).is_none());
    }

    #[test]
    fn test_normal_is_deterministic() {
        let world = floor_world();
        let a = world.find_surface_normal(E::PHOT, 12.3, 18.9, 0.4, 1.0);
        let b = world.find_surface_normal(E::PHOT, 12.3, 18.9, 0.4, 1.0);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_surface_in_reach() {
        let world = floor_world();
        assert!(world.find_surface_normal(E::PHOT, 15.0, 5.0, 0.0, 1.0).is_none());
    }

    #[test]
    fn test_interp_sparks_pscn_next_to_nscn() {
        let mut world = World::new(&SimConfig::small(32, 32));
        for x in 2..30 {
            for y in 20..25 {
                let element = if x == 15 && y == 20 { E::PSCN } else { E::NSCN };
                world.create_particle(None, x, y, element);
            }
        }
        let probe = SurfaceProbe::new(E::PHOT);
        let normal = world.get_normal_interp(probe, 15.0, 19.0, 0.0, 1.0);
        assert!(normal.is_some());
        assert_eq!(world.occupant_at(15, 20).element, E::SPRK);
    }
}
