//! Error types
//!
//! Movement itself reports policy outcomes (`MoveResult`, `Option`), these
//! cover the few places with a real error channel.

use thiserror::Error;

/// Failure to park a particle in a portal channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PortalError {
    #[error("portal channel {channel} slot {slot} is full")]
    SlotFull { channel: usize, slot: usize },

    #[error("portal slot {0} out of range")]
    InvalidSlot(usize),

    #[error("portal channel {0} out of range")]
    InvalidChannel(usize),

    #[error("particle {0} is not live")]
    DeadParticle(usize),
}

/// Invalid simulation configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("world size {width}x{height} must be a non-zero multiple of {cell}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        cell: usize,
    },

    #[error("particle capacity must be non-zero")]
    ZeroCapacity,
}
