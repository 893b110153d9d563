//! World - grid, particles and the movement core

mod ambient;
mod boundary;
mod grid;
pub mod hooks;
mod move_table;
mod movement;
mod particle_store;
mod photons;
pub mod portal;
mod reactions;
pub mod rng_trait;
pub mod stats;
mod update;
mod varies;
mod walls;
#[allow(clippy::module_inception)]
mod world;

pub use ambient::{AmbientFields, MAX_PRESSURE};
pub use boundary::{
    NORMAL_FRAC, NORMAL_INTERP, NORMAL_MIN_EST, SURF_RANGE, SurfaceProbe, direction_to_map,
};
pub use grid::{CELL, Grid, PmapEntry, PositionMap, cell_of, round_to_cell};
pub use hooks::{BehaviorRegistry, Contact, ElementBehavior, HookOutcome, Reaction};
pub use move_table::{MoveOutcome, MoveTable};
pub use movement::MoveResult;
pub use particle_store::ParticleStore;
pub use photons::{
    GLASS_DISP, GLASS_IOR, filter_wavelengths, interact_wavelengths, wavelength_bin,
};
pub use portal::{
    PORTAL_CAPACITY, PORTAL_CHANNELS, PORTAL_RX, PORTAL_RY, PORTAL_SLOTS, PortalChannel,
    PortalStore, channel_for_temp, slot_for_offset,
};
pub use rng_trait::WorldRng;
pub use stats::{CountingStats, NoopStats, SimStats};
pub use varies::{
    DEFAULT_PRESSURE_RESISTANCE, VariesContext, VariesRule, VariesRules, pressure_resistance,
    void_accepts,
};
pub use walls::{WallMap, WallType};
pub use world::{World, WorldSettings};
