//! Simulation configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `kona.ron` file (if exists)
//! 3. Environment variables prefixed with `KONA_`
//!
//! Example environment variable: `KONA_PHYSICS__LEGACY_MODE=true`

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::world::CELL;

/// Main simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SimConfig {
    #[serde(default)]
    pub world: WorldConfig,

    #[serde(default)]
    pub physics: PhysicsConfig,
}

/// What happens at the edge of the world
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeMode {
    /// Particles entering the border are deleted
    #[default]
    Void,
    /// The border is lined with solid wall
    Solid,
    /// Particles leaving one side re-enter on the other
    Loop,
    /// No border, the whole grid is playable
    Open,
}

/// Direction of the global gravity field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GravityMode {
    #[default]
    Vertical,
    Off,
    /// Pulls toward the centre of the world
    Radial,
}

/// Grid dimensions and capacity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width in cells (multiple of CELL)
    pub width: usize,
    /// Height in cells (multiple of CELL)
    pub height: usize,
    /// Fixed particle capacity
    pub max_particles: usize,
    pub edge_mode: EdgeMode,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 612,
            height: 384,
            max_particles: 612 * 384,
            edge_mode: EdgeMode::Void,
        }
    }
}

/// Physics switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Legacy heat behaviour: no heat transfer on absorption or photon impact
    pub legacy_mode: bool,
    pub gravity_mode: GravityMode,
    /// Seed for the simulation RNG
    pub seed: u64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            legacy_mode: false,
            gravity_mode: GravityMode::Vertical,
            seed: 0x6b6f_6e61,
        }
    }
}

impl SimConfig {
    /// Load configuration from all sources
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("world.width", defaults.world.width as i64)?
            .set_default("world.height", defaults.world.height as i64)?
            .set_default("world.max_particles", defaults.world.max_particles as i64)?
            .set_default("world.edge_mode", "Void")?
            .set_default("physics.legacy_mode", false)?
            .set_default("physics.gravity_mode", "Vertical")?
            .set_default("physics.seed", defaults.physics.seed as i64)?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(
                File::with_name("kona")
                    .format(config::FileFormat::Ron)
                    .required(false),
            )
            // Layer 3: Environment variables (KONA_WORLD__WIDTH, etc.)
            .add_source(Environment::with_prefix("KONA").separator("__"));

        let config = builder.build().context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Parse a RON document, missing sections fall back to defaults
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject worlds the grid cannot represent
    pub fn validate(&self) -> Result<(), ConfigError> {
        let WorldConfig { width, height, .. } = self.world;
        if width == 0 || height == 0 || width % CELL != 0 || height % CELL != 0 {
            return Err(ConfigError::InvalidDimensions {
                width,
                height,
                cell: CELL,
            });
        }
        if self.world.max_particles == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    /// Seeded RNG for a simulation built from this config
    pub fn make_rng(&self) -> Xoshiro256StarStar {
        Xoshiro256StarStar::seed_from_u64(self.physics.seed)
    }

    /// Small world used by tests and tools
    pub fn small(width: usize, height: usize) -> Self {
        Self {
            world: WorldConfig {
                width,
                height,
                max_particles: width * height,
                edge_mode: EdgeMode::Void,
            },
            physics: PhysicsConfig::default(),
        }
    }
}
