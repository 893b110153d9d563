pub mod config;
pub mod entity;
pub mod error;
pub mod world;

// Re-export element data from kona-simulation
pub mod simulation {
    pub use kona_simulation::*;
}

pub use config::SimConfig;
pub use error::{ConfigError, PortalError};
pub use world::World;
