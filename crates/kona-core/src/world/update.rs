//! Reference tick driver
//!
//! Scans the particle array once in index order. Later particles see the
//! positions earlier ones already moved to in the same tick.

use glam::{IVec2, Vec2};
use smallvec::SmallVec;

use super::boundary::SurfaceProbe;
use super::grid::cell_of;
use super::hooks::HookOutcome;
use super::move_table::MoveOutcome;
use super::movement::MoveResult;
use super::photons::WAVELENGTH_MASK;
use super::rng_trait::WorldRng;
use super::stats::SimStats;
use super::walls::WallType;
use super::world::World;
use crate::entity::RagdollId;
use crate::simulation::{ElementId as E, ElementProperties, Falldown};

/// Longest sweep in cells, keeps runaway velocities bounded
const MAX_SWEEP_STEPS: f32 = 128.0;

/// Unit step along the dominant axis of a gravity vector
fn fall_direction(gravity: Vec2) -> Option<IVec2> {
    if gravity.length_squared() < 1e-6 {
        return None;
    }
    if gravity.y.abs() >= gravity.x.abs() {
        Some(IVec2::new(0, gravity.y.signum() as i32))
    } else {
        Some(IVec2::new(gravity.x.signum() as i32, 0))
    }
}

impl World {
    /// Advance the simulation by one tick
    pub fn step(&mut self, stats: &mut dyn SimStats, rng: &mut dyn WorldRng) {
        let end = self.store.last_active();
        for index in 0..end {
            if self.store.is_live(index) {
                self.update_particle(index, stats, rng);
            }
        }

        for _ in 0..std::mem::take(&mut self.pending_reactions) {
            stats.record_reaction();
        }
        self.refresh_ragdoll_defaults();
        self.store.recalc_last_active();
        self.advance_frame();
    }

    fn update_particle(&mut self, index: usize, stats: &mut dyn SimStats, rng: &mut dyn WorldRng) {
        let Some(part) = self.store.get(index).copied() else {
            return;
        };
        let here = cell_of(part.x, part.y);

        if self.walls.wall_at(here.x, here.y) == WallType::AbsorbAll {
            self.kill_particle(index);
            stats.record_particle_killed();
            return;
        }

        let def = self.elements.get(part.element);
        let decays = def.has(ElementProperties::LIFE_DEC);
        let kill_at_zero = def.has(ElementProperties::LIFE_KILL_DEC);
        if decays && part.life > 0 {
            let life = part.life - 1;
            if let Some(p) = self.store.get_mut(index) {
                p.life = life;
            }
            if life <= 0 && kill_at_zero {
                self.kill_particle(index);
                stats.record_particle_killed();
                return;
            }
        }
        if part.element == E::PHOT && part.ctype & WAVELENGTH_MASK == 0 {
            self.kill_particle(index);
            stats.record_particle_killed();
            return;
        }

        if let Some(update) = self.behaviors.get(part.element).update {
            if update(self, index, rng) == HookOutcome::Killed {
                stats.record_particle_killed();
                return;
            }
            if !self.store.is_live(index) {
                return;
            }
        }

        self.integrate_forces(index);
        self.advance(index, stats, rng);
    }

    /// Velocity update: loss, wind and gravity by element
    fn integrate_forces(&mut self, index: usize) {
        let Some(part) = self.store.get(index).copied() else {
            return;
        };
        let def = self.elements.get(part.element);
        let (loss, advection, weight) = (def.loss, def.advection, def.gravity);

        let pos = Vec2::new(part.x, part.y);
        let cell = cell_of(part.x, part.y);
        let mut v = Vec2::new(part.vx, part.vy) * loss;
        if advection != 0.0 {
            v += self.ambient.wind(cell.x, cell.y) * advection;
        }
        if weight != 0.0 {
            v += self.gravity_at(pos) * weight;
        }

        if let Some(p) = self.store.get_mut(index) {
            p.vx = v.x;
            p.vy = v.y;
        }
    }

    /// Move a particle along its velocity and deal with whatever stops it
    fn advance(&mut self, index: usize, stats: &mut dyn SimStats, rng: &mut dyn WorldRng) {
        let Some(part) = self.store.get(index).copied() else {
            return;
        };
        let def = self.elements.get(part.element);
        let falldown = def.falldown;
        let is_gas = def.is_gas();
        let is_energy = def.is_energy();
        let collision = def.collision;

        if part.vx == 0.0 && part.vy == 0.0 && falldown == Falldown::Static && !is_gas {
            return;
        }
        if part.element == E::PHOT && !self.refract_photon(index, rng) {
            return;
        }
        let Some(part) = self.store.get(index).copied() else {
            return;
        };

        let here = cell_of(part.x, part.y);
        let start = Vec2::new(part.x, part.y);
        let velocity = Vec2::new(part.vx, part.vy);
        let (clear, hit) = self.sweep(part.element, start, velocity);

        let mut result = self.do_move(index, here.x, here.y, clear.x, clear.y, rng);
        if let Some(hit) = hit {
            if result != MoveResult::Absorbed {
                if let Some(at) = self.store.get(index).copied() {
                    // Poke the blocking cell so contact effects fire
                    let from = cell_of(at.x, at.y);
                    result = self.do_move(index, from.x, from.y, hit.x, hit.y, rng);
                }
            }
        }

        if result == MoveResult::Absorbed {
            stats.record_particle_absorbed();
            return;
        }
        let Some(now) = self.store.get(index).copied() else {
            stats.record_particle_killed();
            return;
        };
        let moved = cell_of(now.x, now.y) != here;

        if result == MoveResult::Blocked {
            if is_energy {
                self.reflect(index);
                return;
            }
            if let Some(p) = self.store.get_mut(index) {
                p.vx *= collision;
                p.vy *= collision;
            }
        }

        if moved {
            stats.record_particle_moved();
            return;
        }
        if !is_energy && (falldown != Falldown::Static || is_gas) {
            match self.slide(index, falldown, is_gas, rng) {
                MoveResult::Absorbed => stats.record_particle_absorbed(),
                MoveResult::Moved => stats.record_particle_moved(),
                MoveResult::Blocked => {}
            }
        }
    }

    /// Walk the path in unit steps, returning the last clear point and the
    /// point where the path became blocked
    fn sweep(&self, element: u16, start: Vec2, velocity: Vec2) -> (Vec2, Option<Vec2>) {
        let steps = velocity.abs().max_element().ceil().clamp(1.0, MAX_SWEEP_STEPS);
        let step = velocity / steps;
        let mut clear = start;
        let mut last_cell = cell_of(start.x, start.y);

        for k in 1..=steps as i32 {
            let point = start + step * k as f32;
            let cell = cell_of(point.x, point.y);
            if cell != last_cell {
                // Leaving the playable area is handled by the commit
                if self.out_of_bounds(cell.x, cell.y) {
                    return (point, None);
                }
                if self.eval_move(element, cell.x, cell.y).0 == MoveOutcome::Blocked {
                    return (clear, Some(point));
                }
                last_cell = cell;
            }
            clear = point;
        }
        (clear, None)
    }

    /// Bounce an energy particle off the surface it ran into
    fn reflect(&mut self, index: usize) {
        let Some(part) = self.store.get(index).copied() else {
            return;
        };
        let probe = SurfaceProbe::new(part.element);
        let Some(normal) = self.get_normal_interp(probe, part.x, part.y, part.vx, part.vy) else {
            return;
        };
        let v = Vec2::new(part.vx, part.vy);
        let v = v - 2.0 * v.dot(normal) * normal;
        if let Some(p) = self.store.get_mut(index) {
            p.vx = v.x;
            p.vy = v.y;
        }
    }

    /// Falling-sand fallback moves for a particle that could not follow its
    /// velocity
    fn slide(
        &mut self,
        index: usize,
        falldown: Falldown,
        is_gas: bool,
        rng: &mut dyn WorldRng,
    ) -> MoveResult {
        let Some(part) = self.store.get(index).copied() else {
            return MoveResult::Blocked;
        };
        let here = cell_of(part.x, part.y);
        let down = match fall_direction(self.gravity_at(Vec2::new(part.x, part.y))) {
            Some(down) => down,
            None if is_gas => IVec2::Y,
            None => return MoveResult::Blocked,
        };
        let side = IVec2::new(-down.y, down.x);
        let side = if rng.gen_bool() { side } else { -side };

        let mut candidates: SmallVec<[IVec2; 5]> = SmallVec::new();
        match falldown {
            Falldown::Powder => candidates.extend([down, down + side, down - side]),
            Falldown::Liquid => candidates.extend([down, down + side, down - side, side, -side]),
            Falldown::Static if is_gas => candidates.extend([side, -down, -side]),
            Falldown::Static => {}
        }

        for offset in candidates {
            let target = here + offset;
            let result = self.do_move(index, here.x, here.y, target.x as f32, target.y as f32, rng);
            if result != MoveResult::Blocked {
                return result;
            }
        }
        MoveResult::Blocked
    }

    /// Ragdolls with no live body carry the default element
    fn refresh_ragdoll_defaults(&mut self) {
        let element = self.ragdoll_default_element();
        for id in [RagdollId::One, RagdollId::Two] {
            if self.count(id.element()) > 0 {
                continue;
            }
            if self.elements.is_element(element as i32) {
                self.ragdolls.get_mut(id).set_element(&self.elements, element);
            } else {
                self.ragdolls.get_mut(id).element = E::DUST;
            }
        }
    }
}
