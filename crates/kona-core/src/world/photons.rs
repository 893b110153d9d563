//! Photon optics - wavelengths, derived photons, glass refraction
//!
//! A photon's `ctype` holds 30 wavelength bits, red at the top. Filters
//! combine those bits with their own, glass bends photons by a dispersion
//! that depends on where the bits sit.

use glam::Vec2;

use super::boundary::SurfaceProbe;
use super::grid::cell_of;
use super::rng_trait::WorldRng;
use super::world::World;
use crate::simulation::{ElementId as E, Particle};

/// Mask of the wavelength bits
pub const WAVELENGTH_MASK: i32 = 0x3FFF_FFFF;
/// Refractive index of glass at the centre of the spectrum
pub const GLASS_IOR: f32 = 1.9;
/// Spread of the refractive index across the spectrum
pub const GLASS_DISP: f32 = 0.07;

const PHOTON_LIFE: i32 = 680;
const CHERENKOV_SPECTRUM: i32 = 0xF80;
const CHERENKOV_MIN_SPEED: f32 = 1.44;
const CHERENKOV_SPEED: f32 = 1.269;

/// Wavelengths a filter particle stands for
///
/// Its own `ctype` if set, otherwise a five-bit band picked by temperature.
pub fn filter_wavelengths(filter: &Particle) -> i32 {
    if filter.ctype & WAVELENGTH_MASK != 0 {
        return filter.ctype;
    }
    let band = (((filter.temp - 273.0) * 0.025) as i32).clamp(0, 25);
    0x1F << band
}

/// New wavelengths of a photon passing a filter, by the filter's mode in `tmp`
pub fn interact_wavelengths(filter: &Particle, wavelengths: i32) -> i32 {
    let filter_wl = filter_wavelengths(filter);
    let shift = || (((filter.temp - 273.0) * 0.025) as i32).clamp(1, 29);
    match filter.tmp {
        0 => filter_wl,
        1 => wavelengths & filter_wl,
        2 => wavelengths | filter_wl,
        3 => wavelengths & !filter_wl,
        // Red shift
        4 => (wavelengths << shift()) & WAVELENGTH_MASK,
        // Blue shift
        5 => (wavelengths >> shift()) & WAVELENGTH_MASK,
        6 => wavelengths,
        7 => wavelengths ^ filter_wl,
        8 => !wavelengths & WAVELENGTH_MASK,
        _ => filter_wl,
    }
}

/// Spectral bin (0..=58) used for dispersion
///
/// A wide spectrum is narrowed to a random five-bit band first, so the photon
/// picks one colour on entering glass. `None` when no wavelength is left.
pub fn wavelength_bin(wavelengths: &mut i32, rng: &mut dyn WorldRng) -> Option<i32> {
    let bits = *wavelengths & WAVELENGTH_MASK;
    if bits == 0 {
        return None;
    }
    let low = bits.trailing_zeros() as i32;
    let high = 31 - bits.leading_zeros() as i32;
    if high - low < 5 {
        return Some(high + low);
    }
    let start = low + rng.between(0, high - low - 4);
    *wavelengths &= 0x1F << start;
    Some(start * 2 + 4)
}

impl World {
    /// Photon hitting PSCN that touches NSCN sparks it
    pub fn photoelectric_effect(&mut self, x: i32, y: i32) {
        let target = self.occupant_at(x, y);
        if target.element != E::PSCN {
            return;
        }
        let touches_nscn = [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .iter()
            .any(|&(dx, dy)| self.occupant_at(x + dx, y + dy).element == E::NSCN);
        if touches_nscn {
            self.spark_conductive_attempt(target.index());
        }
    }

    /// Extra photon emitted beside a photon passing through excited GLOW
    pub(crate) fn create_gain_photon(&mut self, source: usize, rng: &mut dyn WorldRng) -> Option<usize> {
        let photon = *self.store.get(source)?;
        let side = Vec2::new(-photon.vy, photon.vx) * 0.3;
        let pos = if rng.gen_bool() {
            Vec2::new(photon.x, photon.y) + side
        } else {
            Vec2::new(photon.x, photon.y) - side
        };

        let cell = cell_of(pos.x, pos.y);
        let glow = self.occupant_at(cell.x, cell.y);
        if glow.element != E::GLOW {
            return None;
        }
        let temp = self.store.get(glow.index())?.temp;
        let band = (((temp - 273.0) * 0.25) as i32).clamp(0, 25);

        self.place_energy_particle(Particle {
            element: E::PHOT,
            x: pos.x,
            y: pos.y,
            vx: photon.vx,
            vy: photon.vy,
            life: PHOTON_LIFE,
            ctype: 0x1F << band,
            temp,
            ..Particle::EMPTY
        })
    }

    /// Blue photon shed by a fast neutron inside glass
    pub(crate) fn create_cherenkov_photon(
        &mut self,
        source: usize,
        rng: &mut dyn WorldRng,
    ) -> Option<usize> {
        let neutron = *self.store.get(source)?;
        let cell = cell_of(neutron.x, neutron.y);
        let glass = self.occupant_at(cell.x, cell.y);
        if glass.element != E::GLAS && glass.element != E::BGLA {
            return None;
        }
        if neutron.speed() < CHERENKOV_MIN_SPEED {
            return None;
        }
        let temp = self.store.get(glass.index())?.temp;

        let v = Vec2::new(neutron.vx, neutron.vy);
        let side = Vec2::new(-neutron.vy, neutron.vx) * 2.5;
        let v = if rng.gen_bool() { v + side } else { v - side };
        let v = v.normalize_or_zero() * CHERENKOV_SPEED;

        self.place_energy_particle(Particle {
            element: E::PHOT,
            x: neutron.x,
            y: neutron.y,
            vx: v.x,
            vy: v.y,
            life: PHOTON_LIFE,
            ctype: CHERENKOV_SPECTRUM,
            temp,
            ..Particle::EMPTY
        })
    }

    /// Bend a photon about to cross a glass surface
    ///
    /// Returns false when the photon should hold still this tick (total
    /// internal reflection or it ran out of wavelengths and died).
    pub(crate) fn refract_photon(&mut self, index: usize, rng: &mut dyn WorldRng) -> bool {
        let Some(photon) = self.store.get(index).copied() else {
            return false;
        };
        let is_glass = |element: u16| element == E::GLAS || element == E::BGLA;
        let here = cell_of(photon.x, photon.y);
        let there = cell_of(photon.x + photon.vx, photon.y + photon.vy);
        let inside = is_glass(self.occupant_at(here.x, here.y).element);
        let entering = is_glass(self.occupant_at(there.x, there.y).element);
        if inside == entering {
            return true;
        }

        let probe = SurfaceProbe::refracting(E::PHOT);
        let Some(normal) = self.get_normal_interp(probe, photon.x, photon.y, photon.vx, photon.vy)
        else {
            return true;
        };

        let mut wavelengths = photon.ctype;
        let Some(bin) = wavelength_bin(&mut wavelengths, rng) else {
            self.kill_particle(index);
            return false;
        };
        let index_of_glass = GLASS_IOR - GLASS_DISP * (bin as f32 - 30.0) / 30.0;
        let eta = if inside {
            index_of_glass
        } else {
            1.0 / index_of_glass
        };

        let v = Vec2::new(photon.vx, photon.vy);
        let speed = v.length();
        let dir = v / speed;
        // Face the normal against the direction of travel
        let normal = if normal.dot(dir) > 0.0 { -normal } else { normal };
        let cos_in = -normal.dot(dir);
        let k = 1.0 - eta * eta * (1.0 - cos_in * cos_in);

        let (v, moves) = if k < 0.0 {
            (v - 2.0 * v.dot(normal) * normal, false)
        } else {
            let out = eta * dir + (eta * cos_in - k.sqrt()) * normal;
            (out * speed, true)
        };
        if let Some(part) = self.store.get_mut(index) {
            part.vx = v.x;
            part.vy = v.y;
            part.ctype = wavelengths;
        }
        moves
    }
}
