//! Ambient fields sampled per CELL block
//!
//! The air, heat and gravity solvers live outside this crate. They publish
//! their results here and movement reads them back; the only writes from the
//! movement side are pressure bumps.

use glam::Vec2;

use super::CELL;

/// Largest magnitude a pressure cell may hold
pub const MAX_PRESSURE: f32 = 256.0;

/// Pressure, wind, heat and gravity per block
#[derive(Clone, Debug)]
pub struct AmbientFields {
    width: usize,
    height: usize,
    pressure: Vec<f32>,
    wind: Vec<Vec2>,
    heat: Vec<f32>,
    gravity: Vec<Vec2>,
}

impl AmbientFields {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.div_ceil(CELL);
        let height = height.div_ceil(CELL);
        let len = width * height;
        Self {
            width,
            height,
            pressure: vec![0.0; len],
            wind: vec![Vec2::ZERO; len],
            heat: vec![crate::simulation::R_TEMP; len],
            gravity: vec![Vec2::ZERO; len],
        }
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let bx = x as usize / CELL;
        let by = y as usize / CELL;
        (bx < self.width && by < self.height).then(|| by * self.width + bx)
    }

    /// Pressure at a grid cell (0 outside)
    pub fn pressure(&self, x: i32, y: i32) -> f32 {
        self.offset(x, y).map_or(0.0, |offset| self.pressure[offset])
    }

    pub fn set_pressure(&mut self, x: i32, y: i32, value: f32) {
        if let Some(offset) = self.offset(x, y) {
            self.pressure[offset] = value.clamp(-MAX_PRESSURE, MAX_PRESSURE);
        }
    }

    /// Add to the pressure at a grid cell, saturating at the bounds
    pub fn add_pressure(&mut self, x: i32, y: i32, delta: f32) {
        if let Some(offset) = self.offset(x, y) {
            let value = self.pressure[offset] + delta;
            self.pressure[offset] = value.clamp(-MAX_PRESSURE, MAX_PRESSURE);
        }
    }

    pub fn wind(&self, x: i32, y: i32) -> Vec2 {
        self.offset(x, y).map_or(Vec2::ZERO, |offset| self.wind[offset])
    }

    pub fn set_wind(&mut self, x: i32, y: i32, wind: Vec2) {
        if let Some(offset) = self.offset(x, y) {
            self.wind[offset] = wind;
        }
    }

    pub fn heat(&self, x: i32, y: i32) -> f32 {
        self.offset(x, y)
            .map_or(crate::simulation::R_TEMP, |offset| self.heat[offset])
    }

    pub fn set_heat(&mut self, x: i32, y: i32, heat: f32) {
        if let Some(offset) = self.offset(x, y) {
            self.heat[offset] = crate::simulation::clamp_temp(heat);
        }
    }

    /// Extra gravity from the external field (added to the global mode)
    pub fn gravity(&self, x: i32, y: i32) -> Vec2 {
        self.offset(x, y)
            .map_or(Vec2::ZERO, |offset| self.gravity[offset])
    }

    pub fn set_gravity(&mut self, x: i32, y: i32, gravity: Vec2) {
        if let Some(offset) = self.offset(x, y) {
            self.gravity[offset] = gravity;
        }
    }

    pub fn clear(&mut self) {
        self.pressure.fill(0.0);
        self.wind.fill(Vec2::ZERO);
        self.heat.fill(crate::simulation::R_TEMP);
        self.gravity.fill(Vec2::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressure_saturates() {
        let mut fields = AmbientFields::new(16, 16);
        fields.add_pressure(1, 1, 200.0);
        fields.add_pressure(1, 1, 200.0);
        assert_eq!(fields.pressure(1, 1), MAX_PRESSURE);
        fields.set_pressure(1, 1, -1000.0);
        assert_eq!(fields.pressure(0, 0), -MAX_PRESSURE);
    }

    #[test]
    fn test_fields_are_per_block() {
        let mut fields = AmbientFields::new(16, 16);
        fields.set_wind(5, 5, Vec2::new(1.0, 0.0));
        assert_eq!(fields.wind(4, 7), Vec2::new(1.0, 0.0));
        assert_eq!(fields.wind(8, 7), Vec2::ZERO);
    }

    #[test]
    fn test_out_of_range_reads_are_neutral() {
        let fields = AmbientFields::new(8, 8);
        assert_eq!(fields.pressure(-1, 0), 0.0);
        assert_eq!(fields.gravity(100, 100), Vec2::ZERO);
        assert_eq!(fields.heat(-5, -5), crate::simulation::R_TEMP);
    }
}
