//! World - particle store, position maps and the services keeping them in sync
//!
//! Every write to the maps funnels through `create_particle`, `kill_particle`,
//! `change_type` and the movement functions, so after each of them returns a
//! map entry always names a live particle standing in that cell.

use ahash::AHashMap;
use glam::Vec2;

use super::ambient::AmbientFields;
use super::grid::{Grid, PmapEntry, cell_of, round_to_cell};
use super::hooks::BehaviorRegistry;
use super::move_table::MoveTable;
use super::particle_store::ParticleStore;
use super::portal::PortalStore;
use super::varies::VariesRules;
use super::walls::WallMap;
use crate::config::{EdgeMode, GravityMode, SimConfig};
use crate::entity::{Ragdoll, RagdollId, RagdollSet};
use crate::simulation::{ElementId as E, ElementProperties, Elements, Particle, clamp_temp};

/// Switches fixed at construction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldSettings {
    pub width: usize,
    pub height: usize,
    pub edge_mode: EdgeMode,
    pub legacy_mode: bool,
    pub gravity_mode: GravityMode,
}

impl WorldSettings {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            width: config.world.width,
            height: config.world.height,
            edge_mode: config.world.edge_mode,
            legacy_mode: config.physics.legacy_mode,
            gravity_mode: config.physics.gravity_mode,
        }
    }
}

/// The simulated grid and everything living on it
pub struct World {
    /// Element definitions
    pub elements: Elements,

    /// Static move outcomes, rebuilt when `elements` changes
    move_table: MoveTable,

    /// Runtime rules for `Varies` outcomes
    pub varies: VariesRules,

    /// Per-element hooks
    pub behaviors: BehaviorRegistry,

    pub(crate) store: ParticleStore,
    pub(crate) grid: Grid,

    /// Walls over CELL blocks
    pub walls: WallMap,

    /// Pressure, wind, heat and gravity published by the field solvers
    pub ambient: AmbientFields,

    pub(crate) portals: PortalStore,
    pub(crate) ragdolls: RagdollSet,

    /// Particles concealed inside powered invisible walls, keyed by wall index
    pub(crate) hidden: AHashMap<usize, PmapEntry>,

    element_counts: Vec<u32>,
    settings: WorldSettings,

    /// Element a fresh first ragdoll carries
    ragdoll_default_element: u16,

    /// Reactions since the last drain into `SimStats`
    pub(crate) pending_reactions: u32,

    frame: u64,
}

impl World {
    pub fn new(config: &SimConfig) -> Self {
        Self::with_elements(config, Elements::new())
    }

    /// World over a custom element registry
    pub fn with_elements(config: &SimConfig, elements: Elements) -> Self {
        let settings = WorldSettings::from_config(config);
        let move_table = MoveTable::build(&elements);
        let walls = match settings.edge_mode {
            EdgeMode::Solid => WallMap::with_solid_border(settings.width, settings.height),
            _ => WallMap::new(settings.width, settings.height),
        };
        let element_counts = vec![0; elements.len()];

        log::debug!(
            "World {}x{} created (capacity {}, edge mode {:?})",
            settings.width,
            settings.height,
            config.world.max_particles,
            settings.edge_mode
        );

        Self {
            elements,
            move_table,
            varies: VariesRules::with_defaults(),
            behaviors: BehaviorRegistry::with_defaults(),
            store: ParticleStore::new(config.world.max_particles),
            grid: Grid::new(settings.width, settings.height),
            walls,
            ambient: AmbientFields::new(settings.width, settings.height),
            portals: PortalStore::new(),
            ragdolls: RagdollSet::default(),
            hidden: AHashMap::new(),
            element_counts,
            settings,
            ragdoll_default_element: E::DUST,
            pending_reactions: 0,
            frame: 0,
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn width(&self) -> usize {
        self.settings.width
    }

    pub fn height(&self) -> usize {
        self.settings.height
    }

    pub fn legacy_mode(&self) -> bool {
        self.settings.legacy_mode
    }

    pub fn set_legacy_mode(&mut self, legacy: bool) {
        self.settings.legacy_mode = legacy;
    }

    pub fn set_gravity_mode(&mut self, mode: GravityMode) {
        self.settings.gravity_mode = mode;
    }

    /// Ticks completed since creation or the last clear
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub(crate) fn advance_frame(&mut self) {
        self.frame += 1;
    }

    pub fn move_table(&self) -> &MoveTable {
        &self.move_table
    }

    /// Rebuild the move table after editing `elements`
    pub fn rebuild_move_table(&mut self) {
        self.move_table = MoveTable::build(&self.elements);
        if self.element_counts.len() < self.elements.len() {
            self.element_counts.resize(self.elements.len(), 0);
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn particle(&self, index: usize) -> Option<&Particle> {
        self.store.get(index)
    }

    /// Mutable access to a live particle
    ///
    /// Changing `x`, `y` or `element` through this bypasses the maps; use
    /// `move_particle` and `change_type` for those.
    pub fn particle_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.store.get_mut(index)
    }

    pub fn particles(&self) -> impl Iterator<Item = (usize, &Particle)> {
        self.store.iter_live()
    }

    pub fn live_count(&self) -> usize {
        self.store.live_count()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Number of live particles of an element
    pub fn count(&self, element: u16) -> u32 {
        self.element_counts
            .get(element as usize)
            .copied()
            .unwrap_or(0)
    }

    fn adjust_count(&mut self, element: u16, delta: i32) {
        if let Some(count) = self.element_counts.get_mut(element as usize) {
            *count = count.saturating_add_signed(delta);
        }
    }

    /// Ordinary map entry at a cell, element refreshed from the particle
    pub fn occupant_at(&self, x: i32, y: i32) -> PmapEntry {
        let entry = self.grid.pmap.get(x, y);
        if entry.is_empty() {
            return entry;
        }
        PmapEntry::new(entry.index(), self.store.element(entry.index()))
    }

    /// Energy map entry at a cell, element refreshed from the particle
    pub fn energy_at(&self, x: i32, y: i32) -> PmapEntry {
        let entry = self.grid.photons.get(x, y);
        if entry.is_empty() {
            return entry;
        }
        PmapEntry::new(entry.index(), self.store.element(entry.index()))
    }

    /// Particle concealed by the powered invisible wall `wall`
    pub fn hidden_occupant(&self, wall: usize) -> Option<PmapEntry> {
        let entry = self.hidden.get(&wall)?;
        let element = self.store.element(entry.index());
        (element != E::NONE).then(|| PmapEntry::new(entry.index(), element))
    }

    /// Create a particle
    ///
    /// With no `hint` the cell must be free in the particle's map and not
    /// walled off. With a hint the particle at that index is replaced in place
    /// at `(x, y)`, skipping the occupancy check. Returns `None` when creation
    /// is refused or the store is full.
    pub fn create_particle(
        &mut self,
        hint: Option<usize>,
        x: i32,
        y: i32,
        element: u16,
    ) -> Option<usize> {
        if !self.elements.is_element(element as i32) {
            log::warn!("Refusing to create unknown element {}", element);
            return None;
        }
        if !self.grid.in_bounds(x, y) {
            return None;
        }
        if let Some(allowed) = self.behaviors.get(element).create_allowed {
            if !allowed(self, element) {
                return None;
            }
        }

        let def = self.elements.get(element);
        let is_energy = def.is_energy();
        let fresh = Particle {
            element,
            x: x as f32,
            y: y as f32,
            life: def.default_life,
            ctype: def.default_ctype,
            temp: def.default_temp,
            ..Particle::EMPTY
        };

        let mut restored = false;
        let (index, previous) = match hint.filter(|&index| self.store.is_live(index)) {
            Some(index) => {
                let Some(old) = self.store.get(index).copied() else {
                    return None;
                };
                self.pmap_remove(index, &old);
                if old.element == E::PINV {
                    restored = self.restore_hidden(index, &old);
                }
                self.adjust_count(old.element, -1);
                if let Some(slot) = self.store.get_mut(index) {
                    *slot = fresh;
                }
                (index, old.element)
            }
            None => {
                if self.walls.blocks_creation(x, y, self.elements.get(element)) {
                    return None;
                }
                if !self.grid.layer(is_energy).get(x, y).is_empty() {
                    return None;
                }
                (self.store.alloc(fresh)?, E::NONE)
            }
        };

        // A released occupant keeps the cell of a replaced wall
        if !restored || is_energy {
            self.pmap_add(index);
        }
        self.adjust_count(element, 1);

        if previous != E::NONE && previous != element {
            if let Some(hook) = self.behaviors.get(previous).change_type {
                hook(self, index, previous, element);
            }
        }
        if let Some(hook) = self.behaviors.get(element).change_type {
            hook(self, index, previous, element);
        }
        Some(index)
    }

    /// Kill a particle and return its slot to the free list
    ///
    /// Killing a free slot is a no-op and returns false.
    pub fn kill_particle(&mut self, index: usize) -> bool {
        let Some(part) = self.store.get(index).copied() else {
            return false;
        };
        if let Some(hook) = self.behaviors.get(part.element).change_type {
            hook(self, index, part.element, E::NONE);
        }

        self.pmap_remove(index, &part);
        if part.element == E::PINV {
            self.restore_hidden(index, &part);
        }
        self.adjust_count(part.element, -1);
        self.store.free(index);
        true
    }

    /// Turn a particle into another element in place
    ///
    /// Moves the map entry between the ordinary and energy maps when the
    /// category changes. Changing to NONE kills the particle.
    pub fn change_type(&mut self, index: usize, element: u16) -> bool {
        let Some(part) = self.store.get(index).copied() else {
            return false;
        };
        if element == E::NONE {
            return self.kill_particle(index);
        }
        if !self.elements.is_element(element as i32) {
            return false;
        }

        let from = part.element;
        let from_hook = self.behaviors.get(from).change_type;
        let to_hook = self.behaviors.get(element).change_type;
        if let Some(hook) = from_hook {
            hook(self, index, from, element);
        }
        if from == element {
            return true;
        }
        if let Some(hook) = to_hook {
            hook(self, index, from, element);
        }

        self.pmap_remove(index, &part);
        let restored = from == E::PINV && self.restore_hidden(index, &part);
        if let Some(slot) = self.store.get_mut(index) {
            slot.element = element;
        }
        if restored && !self.elements.get(element).is_energy() {
            // The released occupant keeps the cell
            log::trace!("Particle {} shares its cell with the occupant it concealed", index);
        } else {
            self.pmap_add(index);
        }
        self.adjust_count(from, -1);
        self.adjust_count(element, 1);
        true
    }

    /// Spark a conductor that is not already sparking
    pub fn spark_conductive_attempt(&mut self, index: usize) -> bool {
        let Some(part) = self.store.get(index).copied() else {
            return false;
        };
        let def = self.elements.get(part.element);
        if !def.has(ElementProperties::CONDUCTS) || part.life != 0 {
            return false;
        }
        if !self.change_type(index, E::SPRK) {
            return false;
        }
        if let Some(spark) = self.store.get_mut(index) {
            spark.ctype = part.element as i32;
            spark.life = 4;
        }
        true
    }

    /// Place a derived energy particle, claiming its cell in the energy map
    /// even if another energy particle is there
    pub(crate) fn place_energy_particle(&mut self, particle: Particle) -> Option<usize> {
        let cell = cell_of(particle.x, particle.y);
        if !self.grid.in_bounds(cell.x, cell.y) {
            return None;
        }
        let index = self.store.alloc(particle)?;
        self.grid
            .photons
            .set(cell.x, cell.y, PmapEntry::new(index, particle.element));
        self.adjust_count(particle.element, 1);
        Some(index)
    }

    /// Insert a particle's entry at its current cell
    pub(crate) fn pmap_add(&mut self, index: usize) {
        let Some(part) = self.store.get(index).copied() else {
            return;
        };
        let cell = cell_of(part.x, part.y);
        let entry = PmapEntry::new(index, part.element);
        if self.elements.get(part.element).is_energy() {
            self.grid.photons.set(cell.x, cell.y, entry);
            return;
        }

        let holder = self.occupant_at(cell.x, cell.y);
        if holder.element == E::PINV && holder.index() != index {
            self.hidden.insert(holder.index(), entry);
        } else {
            self.grid.pmap.set(cell.x, cell.y, entry);
        }
    }

    /// Drop whichever entry at the particle's cell refers to it
    pub(crate) fn pmap_remove(&mut self, index: usize, part: &Particle) {
        let cell = cell_of(part.x, part.y);
        if self.grid.pmap.clear_if(cell.x, cell.y, index)
            || self.grid.photons.clear_if(cell.x, cell.y, index)
        {
            return;
        }
        self.release_hidden(cell.x, cell.y, index);
    }

    /// Forget `index` if the wall at `(x, y)` conceals it
    pub(crate) fn release_hidden(&mut self, x: i32, y: i32, index: usize) -> bool {
        let holder = self.occupant_at(x, y);
        if holder.element == E::PINV
            && self
                .hidden
                .get(&holder.index())
                .is_some_and(|hidden| hidden.points_to(index))
        {
            self.hidden.remove(&holder.index());
            return true;
        }
        false
    }

    /// Put a departing wall's concealed particle back into the map
    ///
    /// Returns true when the occupant took over the wall's cell.
    fn restore_hidden(&mut self, wall: usize, part: &Particle) -> bool {
        let Some(hidden) = self.hidden.remove(&wall) else {
            return false;
        };
        let Some(occupant) = self.store.get(hidden.index()).copied() else {
            return false;
        };
        let wall_cell = cell_of(part.x, part.y);
        if cell_of(occupant.x, occupant.y) != wall_cell {
            return false;
        }
        self.grid.pmap.set(
            wall_cell.x,
            wall_cell.y,
            PmapEntry::new(hidden.index(), occupant.element),
        );
        true
    }

    /// Gravity acting at a position: the global mode plus the external field
    pub fn gravity_at(&self, pos: Vec2) -> Vec2 {
        let base = match self.settings.gravity_mode {
            GravityMode::Vertical => Vec2::new(0.0, 1.0),
            GravityMode::Off => Vec2::ZERO,
            GravityMode::Radial => {
                let centre = Vec2::new(
                    self.settings.width as f32 / 2.0,
                    self.settings.height as f32 / 2.0,
                );
                let offset = pos - centre;
                offset / (0.01 - offset.length())
            }
        };
        base + self
            .ambient
            .gravity(round_to_cell(pos.x), round_to_cell(pos.y))
    }

    /// Conducts heat right now (an unpowered HSWC is an insulator)
    pub(crate) fn conducts_heat(&self, index: usize) -> bool {
        let Some(part) = self.store.get(index) else {
            return false;
        };
        self.elements.get(part.element).heat_conduct > 0
            && (part.element != E::HSWC || part.life == 10)
    }

    /// Move both temperatures to their average
    pub(crate) fn average_temperature(&mut self, a: usize, b: usize) {
        let (Some(ta), Some(tb)) = (
            self.store.get(a).map(|p| p.temp),
            self.store.get(b).map(|p| p.temp),
        ) else {
            return;
        };
        let average = clamp_temp((ta + tb) / 2.0);
        for index in [a, b] {
            if let Some(part) = self.store.get_mut(index) {
                part.temp = average;
            }
        }
    }

    pub fn ragdoll(&self, id: RagdollId) -> &Ragdoll {
        self.ragdolls.get(id)
    }

    pub fn ragdoll_mut(&mut self, id: RagdollId) -> &mut Ragdoll {
        self.ragdolls.get_mut(id)
    }

    pub fn ragdoll_default_element(&self) -> u16 {
        self.ragdoll_default_element
    }

    /// Element a first ragdoll starts with (the selected tool, usually)
    pub fn set_ragdoll_default_element(&mut self, element: u16) {
        self.ragdoll_default_element = element;
    }

    pub fn portals(&self) -> &PortalStore {
        &self.portals
    }

    pub fn portals_mut(&mut self) -> &mut PortalStore {
        &mut self.portals
    }

    /// Remove every particle and reset the fields
    pub fn clear(&mut self) {
        self.store.clear();
        self.grid.clear();
        self.walls = match self.settings.edge_mode {
            EdgeMode::Solid => WallMap::with_solid_border(self.settings.width, self.settings.height),
            _ => WallMap::new(self.settings.width, self.settings.height),
        };
        self.ambient.clear();
        self.portals.clear();
        self.ragdolls = RagdollSet::default();
        self.hidden.clear();
        self.element_counts.fill(0);
        self.pending_reactions = 0;
        self.frame = 0;
        log::info!("World cleared");
    }
}
