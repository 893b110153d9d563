//! Element data for the Kona particle sandbox
//!
//! This crate provides the foundational data types shared by the simulation:
//! - Element definitions (ElementId, ElementDef, Elements)
//! - Element categories and property flags (ElementProperties, Falldown)
//! - The particle record and temperature bounds (Particle, MIN_TEMP, MAX_TEMP)

mod elements;
mod particle;

pub use elements::{ElementDef, ElementId, ElementProperties, Elements, Falldown};
pub use particle::{MAX_TEMP, MIN_TEMP, Particle, R_TEMP, clamp_temp};
