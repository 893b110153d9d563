//! Movement resolver - evaluate, try and commit single-cell moves
//!
//! `try_move` decides what happens when a particle attempts to enter a cell
//! and applies the side effects of that decision. `do_move` wraps it with the
//! edge handling and commits accepted positions through `move_particle`, the
//! only place that rewrites a moving particle's map entries.

use super::grid::{PmapEntry, cell_of, round_to_cell};
use super::hooks::{Contact, Reaction};
use super::move_table::MoveOutcome;
use super::portal::slot_for_offset;
use super::rng_trait::WorldRng;
use super::varies::VariesContext;
use super::walls::WallType;
use super::world::World;
use super::CELL;
use crate::config::EdgeMode;
use crate::simulation::{ElementId as E, ElementProperties, MAX_TEMP, Particle, clamp_temp};

/// Result of a move attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveResult {
    /// Nothing moved
    Blocked,
    /// The move went through, or there is no point retrying it
    Moved,
    /// The mover was consumed (killed, stored or converted); stop processing it
    Absorbed,
}

impl MoveResult {
    /// Numeric form: 0 blocked, 1 moved, -1 absorbed
    pub fn code(self) -> i32 {
        match self {
            MoveResult::Blocked => 0,
            MoveResult::Moved => 1,
            MoveResult::Absorbed => -1,
        }
    }
}

/// Wrap a float coordinate around the playable span of an axis
fn wrap_coordinate(v: f32, extent: i32) -> f32 {
    let cell = CELL as f32;
    let span = extent as f32 - 2.0 * cell;
    (v - cell + 0.5).rem_euclid(span) + cell - 0.5
}

impl World {
    /// Outside the playable area (the one-block border unless the edge is open)
    pub fn out_of_bounds(&self, x: i32, y: i32) -> bool {
        let width = self.width() as i32;
        let height = self.height() as i32;
        if self.settings().edge_mode == EdgeMode::Open {
            return x < 0 || y < 0 || x >= width || y >= height;
        }
        let cell = CELL as i32;
        x < cell || y < cell || x >= width - cell || y >= height - cell
    }

    /// Outcome for an element entering `(nx, ny)` and the occupant it meets
    ///
    /// The occupant is the ordinary map entry, or the particle concealed in a
    /// powered invisible wall. Unknown ids and out-of-grid cells are Blocked.
    pub fn eval_move(&self, mover: u16, nx: i32, ny: i32) -> (MoveOutcome, PmapEntry) {
        if !self.grid.in_bounds(nx, ny) {
            return (MoveOutcome::Blocked, PmapEntry::EMPTY);
        }

        let mut occupant = self.occupant_at(nx, ny);
        if occupant.element == E::PINV {
            if let Some(hidden) = self.hidden_occupant(occupant.index()) {
                occupant = hidden;
            }
        }

        if mover == E::NONE
            || !self.elements.contains(mover)
            || !self.elements.contains(occupant.element)
        {
            return (MoveOutcome::Blocked, occupant);
        }

        let mut outcome = self.move_table().evaluate(mover, occupant.element);
        if outcome == MoveOutcome::Varies {
            outcome = match self.store.get(occupant.index()) {
                Some(part) if !occupant.is_empty() => self.varies.resolve(&VariesContext {
                    mover,
                    occupant: part,
                    pressure: self.ambient.pressure(nx, ny),
                }),
                _ => MoveOutcome::Blocked,
            };
        }

        let outcome = self.walls.filter_move(
            nx,
            ny,
            self.elements.get(mover),
            self.elements.get(occupant.element),
            outcome,
        );
        (outcome, occupant)
    }

    /// Attempt to move particle `index` from `(x, y)` into `(nx, ny)`
    ///
    /// Applies the side effects of the outcome but does not change the
    /// mover's own position; `do_move` does that for accepted moves.
    pub fn try_move(
        &mut self,
        index: usize,
        x: i32,
        y: i32,
        nx: i32,
        ny: i32,
        rng: &mut dyn WorldRng,
    ) -> MoveResult {
        if x == nx && y == ny {
            return MoveResult::Moved;
        }
        // Leaving the grid always "works"; the commit kills the particle
        if !self.grid.in_bounds(nx, ny) {
            return MoveResult::Moved;
        }
        let Some(mover) = self.store.get(index).copied() else {
            return MoveResult::Blocked;
        };

        let (mut outcome, occupant) = self.eval_move(mover.element, nx, ny);

        // Half-silvered mirror
        if outcome == MoveOutcome::Blocked
            && mover.element == E::PHOT
            && ((occupant.element == E::BMTL && rng.chance(1, 2))
                || self.occupant_at(x, y).element == E::BMTL)
        {
            outcome = MoveOutcome::CoOccupy;
        }

        if outcome == MoveOutcome::Blocked || outcome == MoveOutcome::Varies {
            return self.resolve_blocked(index, x, y, nx, ny, occupant);
        }

        if mover.element == E::SPNG {
            // A swapped occupant lands in the sponge's old cell
            let vacated = outcome == MoveOutcome::CoOccupy || occupant.is_empty();
            self.drag_behind_sponge(index, x, y, &mover, vacated);
        }

        match outcome {
            MoveOutcome::Blocked | MoveOutcome::Varies => MoveResult::Blocked,
            MoveOutcome::CoOccupy => self.resolve_co_occupy(index, x, y, nx, ny, occupant, rng),
            MoveOutcome::Swap => self.resolve_swap(index, x, y, nx, ny, occupant),
        }
    }

    fn resolve_blocked(
        &mut self,
        index: usize,
        x: i32,
        y: i32,
        nx: i32,
        ny: i32,
        occupant: PmapEntry,
    ) -> MoveResult {
        let Some(mover) = self.store.get(index).copied() else {
            return MoveResult::Blocked;
        };
        if occupant.is_empty() {
            return MoveResult::Blocked;
        }
        let target = occupant.index();
        let legacy = self.legacy_mode();

        if occupant.element == E::WOOD && mover.speed() > 5.0 {
            self.change_type(target, E::SAWD);
        }

        let mover_def = self.elements.get(mover.element);
        if !mover_def.is_energy() {
            if !legacy && mover_def.is_gas() && mover_def.heat_conduct > 0 {
                if self.conducts_heat(target) {
                    self.average_temperature(index, target);
                }
            }
            return MoveResult::Blocked;
        }

        let target_def = self.elements.get(occupant.element);
        if !legacy && mover.element == E::PHOT {
            if occupant.element == E::COAL || occupant.element == E::BCOL {
                if let Some(coal) = self.store.get_mut(target) {
                    coal.temp = mover.temp;
                }
            }
            if occupant.element != E::FILT && self.conducts_heat(target) {
                self.average_temperature(index, target);
            }
        } else if (mover.element == E::NEUT || mover.element == E::ELEC)
            && target_def.has(ElementProperties::CLONE | ElementProperties::BREAKABLECLONE)
        {
            if let Some(clone) = self.store.get_mut(target) {
                if clone.ctype == 0 {
                    clone.ctype = mover.element as i32;
                }
            }
        }

        if occupant.element == E::PRTI || occupant.element == E::PPTI {
            let slot = slot_for_offset(x - nx, y - ny);
            if let Some(channel) = self.portal_channel_of(target) {
                if self.store_in_portal(index, channel, slot).is_ok() {
                    return MoveResult::Absorbed;
                }
            }
        }
        MoveResult::Blocked
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_co_occupy(
        &mut self,
        index: usize,
        x: i32,
        y: i32,
        nx: i32,
        ny: i32,
        occupant: PmapEntry,
        rng: &mut dyn WorldRng,
    ) -> MoveResult {
        if occupant.is_empty() {
            return MoveResult::Moved;
        }
        let element = self.store.element(index);
        let Some(hook) = self.behaviors.get(element).co_occupy else {
            return MoveResult::Moved;
        };

        let contact = Contact {
            mover: index,
            x,
            y,
            nx,
            ny,
            occupant,
        };
        match hook(self, &contact, rng) {
            Reaction::None => MoveResult::Moved,
            Reaction::Reacted => {
                self.pending_reactions += 1;
                MoveResult::Moved
            }
            Reaction::Consumed => {
                self.pending_reactions += 1;
                MoveResult::Absorbed
            }
        }
    }

    fn resolve_swap(
        &mut self,
        index: usize,
        x: i32,
        y: i32,
        nx: i32,
        ny: i32,
        occupant: PmapEntry,
    ) -> MoveResult {
        let Some(mover) = self.store.get(index).copied() else {
            return MoveResult::Blocked;
        };
        let legacy = self.legacy_mode();
        let target = occupant.index();

        // Sinks eat the mover
        match occupant.element {
            E::VOID | E::PVOD => {
                self.kill_particle(index);
                return MoveResult::Absorbed;
            }
            E::BHOL | E::NBHL => {
                self.kill_particle(index);
                if !legacy {
                    if let Some(sink) = self.store.get_mut(target) {
                        sink.temp = clamp_temp(sink.temp + mover.temp / 2.0);
                    }
                }
                return MoveResult::Absorbed;
            }
            E::WHOL | E::NWHL if mover.element == E::ANAR => {
                if !legacy {
                    if let Some(source) = self.store.get_mut(target) {
                        source.temp = clamp_temp(source.temp - (MAX_TEMP - mover.temp) / 2.0);
                    }
                }
                self.kill_particle(index);
                return MoveResult::Absorbed;
            }
            E::DEUT if mover.element == E::ELEC => {
                if let Some(deut) = self.store.get_mut(target) {
                    if deut.life < 6000 {
                        deut.life += 1;
                    }
                    deut.temp = 0.0;
                }
                self.kill_particle(index);
                return MoveResult::Absorbed;
            }
            E::VIBR | E::BVBR if self.elements.get(mover.element).is_energy() => {
                if let Some(vibranium) = self.store.get_mut(target) {
                    vibranium.tmp += 20;
                }
                self.kill_particle(index);
                return MoveResult::Absorbed;
            }
            _ => {}
        }

        let occupant_def = self.elements.get(occupant.element);
        match mover.element {
            E::NEUT if occupant_def.has(ElementProperties::NEUTABSORB) => {
                self.kill_particle(index);
                return MoveResult::Absorbed;
            }
            E::CNCT if y < ny => {
                let below = self.occupant_at(x, y + 1).element;
                if below == E::CNCT || below == E::ROCK {
                    return MoveResult::Blocked;
                }
            }
            E::GBMB if mover.life > 0 => return MoveResult::Blocked,
            _ => {}
        }

        // A closed e-hole holds what is inside
        if self.walls.is_closed_ehole(x, y) && !self.walls.is_closed_ehole(nx, ny) {
            return MoveResult::Blocked;
        }

        if occupant.is_empty() {
            return MoveResult::Moved;
        }

        if mover.element == E::NEUT {
            return self.neutron_penetrate(x, y, nx, ny, target);
        }

        let Some(displaced) = self.store.get(target).copied() else {
            return MoveResult::Moved;
        };
        let (dx, dy) = (x - nx, y - ny);
        let landing = cell_of(displaced.x, displaced.y);
        if !self.out_of_bounds(landing.x + dx, landing.y + dy) {
            if !self.grid.pmap.clear_if(nx, ny, target) {
                self.release_hidden(nx, ny, target);
            }
            if let Some(part) = self.store.get_mut(target) {
                part.x += dx as f32;
                part.y += dy as f32;
            }
            self.pmap_add(target);
        }
        MoveResult::Moved
    }

    /// A moving sponge drags the line of particles trailing behind it
    ///
    /// The walk starts next to the sponge, opposite its velocity, and shifts
    /// each trailing particle by the sponge's whole-cell velocity. It stops at
    /// an empty cell, another sponge, an indestructible particle, or a
    /// particle whose new cell is taken. The sponge's own cell counts as free
    /// only when `vacated`.
    fn drag_behind_sponge(
        &mut self,
        sponge_index: usize,
        x: i32,
        y: i32,
        sponge: &Particle,
        vacated: bool,
    ) {
        let (vx, vy) = (sponge.vx as i32, sponge.vy as i32);
        let (step_x, step_y) = (-vx.signum(), -vy.signum());
        if step_x == 0 && step_y == 0 {
            return;
        }

        let (mut cx, mut cy) = (x + step_x, y + step_y);
        while !self.out_of_bounds(cx, cy) {
            let trailing = self.occupant_at(cx, cy);
            if trailing.is_empty()
                || trailing.element == E::SPNG
                || trailing.element == E::PINV
                || self
                    .elements
                    .get(trailing.element)
                    .has(ElementProperties::INDESTRUCTIBLE)
            {
                break;
            }
            let (tx, ty) = (cx + vx, cy + vy);
            if self.out_of_bounds(tx, ty) {
                break;
            }
            let landing = self.occupant_at(tx, ty);
            if !landing.is_empty() && !(vacated && landing.points_to(sponge_index)) {
                break;
            }

            let index = trailing.index();
            self.grid.pmap.clear_if(cx, cy, index);
            if let Some(part) = self.store.get_mut(index) {
                part.x += vx as f32;
                part.y += vy as f32;
            }
            self.pmap_add(index);
            cx += step_x;
            cy += step_y;
        }
    }

    /// A neutron pushes `target` back to its own cell, shifting whatever it
    /// was passing through forward into the target's cell
    fn neutron_penetrate(&mut self, x: i32, y: i32, nx: i32, ny: i32, target: usize) -> MoveResult {
        let under = self.occupant_at(x, y);
        if !under.is_empty()
            && !self
                .elements
                .get(under.element)
                .has(ElementProperties::NEUTPENETRATE)
        {
            return MoveResult::Moved;
        }
        if self.walls.wall_at(x, y) == WallType::AllowEnergy {
            return MoveResult::Moved;
        }

        if under.is_empty() {
            self.grid.pmap.clear_cell(nx, ny);
        } else {
            self.grid.pmap.set(nx, ny, under);
            if let Some(part) = self.store.get_mut(under.index()) {
                part.x = nx as f32;
                part.y = ny as f32;
            }
        }

        if let Some(part) = self.store.get_mut(target) {
            part.x = x as f32;
            part.y = y as f32;
            let entry = PmapEntry::new(target, part.element);
            self.grid.pmap.set(x, y, entry);
        }
        MoveResult::Moved
    }

    /// Try a move towards a float destination and commit it if accepted
    pub fn do_move(
        &mut self,
        index: usize,
        x: i32,
        y: i32,
        nxf: f32,
        nyf: f32,
        rng: &mut dyn WorldRng,
    ) -> MoveResult {
        let (mut nxf, mut nyf) = (nxf, nyf);
        if self.settings().edge_mode == EdgeMode::Loop {
            let cell = CELL as i32;
            let (width, height) = (self.width() as i32, self.height() as i32);
            let inside = |v: i32, extent: i32| v >= cell && v < extent - cell;
            // Only coordinates that left the playable area are wrapped
            if !inside(round_to_cell(nxf), width) {
                nxf = wrap_coordinate(nxf, width);
            }
            if !inside(round_to_cell(nyf), height) {
                nyf = wrap_coordinate(nyf, height);
            }
        }

        let nx = round_to_cell(nxf);
        let ny = round_to_cell(nyf);
        let result = self.try_move(index, x, y, nx, ny, rng);
        if result == MoveResult::Blocked || !self.store.is_live(index) {
            return result;
        }
        match self.move_particle(index, x, y, nxf, nyf) {
            MoveResult::Absorbed => MoveResult::Absorbed,
            _ => result,
        }
    }

    /// Commit a particle's new float position and fix up its map entries
    ///
    /// Entries at the old cell are cleared only if they still refer to this
    /// particle. Leaving the playable area kills it.
    pub fn move_particle(&mut self, index: usize, x: i32, y: i32, nxf: f32, nyf: f32) -> MoveResult {
        let nx = round_to_cell(nxf);
        let ny = round_to_cell(nyf);
        let Some(part) = self.store.get_mut(index) else {
            return MoveResult::Blocked;
        };
        part.x = nxf;
        part.y = nyf;
        let element = part.element;
        if nx == x && ny == y {
            return MoveResult::Moved;
        }

        if !self.grid.pmap.clear_if(x, y, index)
            && !self.release_hidden(x, y, index)
        {
            self.grid.photons.clear_if(x, y, index);
        }

        if self.out_of_bounds(nx, ny) {
            self.kill_particle(index);
            return MoveResult::Absorbed;
        }

        let entry = PmapEntry::new(index, element);
        if self.elements.get(element).is_energy() {
            self.grid.photons.set(nx, ny, entry);
            return MoveResult::Moved;
        }

        let dest = self.occupant_at(nx, ny);
        if dest.element == E::PINV && dest.index() != index {
            self.hidden.insert(dest.index(), entry);
        } else if element != E::MOVS || dest.is_empty() || dest.element == E::MOVS {
            self.grid.pmap.set(nx, ny, entry);
        }
        MoveResult::Moved
    }
}
