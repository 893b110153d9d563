//! Particle record and temperature bounds

use serde::{Deserialize, Serialize};

/// Lowest representable temperature (Kelvin)
pub const MIN_TEMP: f32 = 0.0;

/// Highest representable temperature (Kelvin)
pub const MAX_TEMP: f32 = 9999.0;

/// Room temperature (22 °C in Kelvin)
pub const R_TEMP: f32 = 295.15;

/// Clamp a temperature into `[MIN_TEMP, MAX_TEMP]`
#[inline]
pub fn clamp_temp(temp: f32) -> f32 {
    if temp.is_nan() {
        return MIN_TEMP;
    }
    temp.clamp(MIN_TEMP, MAX_TEMP)
}

/// A single particle slot
///
/// A live particle has a non-zero `element`. A freed slot has `element == 0`
/// and reuses `life` as the link to the next free slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Element id (0 = free slot)
    pub element: u16,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Countdown or state counter, meaning depends on the element
    pub life: i32,
    /// Carried element or wavelength bits
    pub ctype: i32,
    /// Temperature in Kelvin
    pub temp: f32,
    pub tmp: i32,
    pub tmp2: i32,
}

impl Particle {
    pub const EMPTY: Particle = Particle {
        element: 0,
        x: 0.0,
        y: 0.0,
        vx: 0.0,
        vy: 0.0,
        life: 0,
        ctype: 0,
        temp: 0.0,
        tmp: 0,
        tmp2: 0,
    };

    pub fn is_live(&self) -> bool {
        self.element != 0
    }

    /// Speed (length of the velocity vector)
    pub fn speed(&self) -> f32 {
        self.vx.hypot(self.vy)
    }
}
