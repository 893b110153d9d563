//! Co-occupancy reactions
//!
//! Run when an energy-like mover slips into a cell it shares with another
//! particle. The mover keeps its own motion; the reaction may convert it,
//! spawn derived particles or poke the occupant's counters. The occupant is
//! never moved here.

use super::hooks::{Contact, Reaction};
use super::photons::{interact_wavelengths, WAVELENGTH_MASK};
use super::rng_trait::WorldRng;
use super::varies::pressure_resistance;
use super::world::World;
use crate::simulation::{ElementId as E, Particle};

/// Photon bits above the lowest six, the part C5 can hold
const C5_BITS: i32 = !0x3F;

pub(crate) fn co_occupy_reaction(
    world: &mut World,
    contact: &Contact,
    rng: &mut dyn WorldRng,
) -> Reaction {
    let Some(mover) = world.store.get(contact.mover).copied() else {
        return Reaction::None;
    };
    let Some(occupant) = world.store.get(contact.occupant.index()).copied() else {
        return Reaction::None;
    };

    match mover.element {
        E::PHOT => photon_reaction(world, contact, &mover, &occupant, rng),
        E::NEUT => {
            if (occupant.element == E::GLAS || occupant.element == E::BGLA) && rng.chance(1, 10) {
                if world.create_cherenkov_photon(contact.mover, rng).is_some() {
                    return Reaction::Reacted;
                }
            }
            Reaction::None
        }
        E::ELEC if occupant.element == E::GLOW => {
            world.change_type(contact.mover, E::PHOT);
            set_ctype(world, contact.mover, WAVELENGTH_MASK);
            Reaction::Reacted
        }
        E::PROT if occupant.element == E::INVIS => {
            world.change_type(contact.mover, E::NEUT);
            Reaction::Reacted
        }
        E::BIZR | E::BIZRG if occupant.element == E::FILT => {
            set_ctype(world, contact.mover, interact_wavelengths(&occupant, mover.ctype));
            Reaction::Reacted
        }
        _ => Reaction::None,
    }
}

fn photon_reaction(
    world: &mut World,
    contact: &Contact,
    photon: &Particle,
    occupant: &Particle,
    rng: &mut dyn WorldRng,
) -> Reaction {
    let target = contact.occupant.index();
    match occupant.element {
        E::GLOW => {
            if occupant.life == 0 && rng.chance(1, 30) {
                if let Some(glow) = world.store.get_mut(target) {
                    glow.life = 120;
                }
                world.create_gain_photon(contact.mover, rng);
                return Reaction::Reacted;
            }
            Reaction::None
        }
        E::FILT => {
            set_ctype(world, contact.mover, interact_wavelengths(occupant, photon.ctype));
            Reaction::Reacted
        }
        E::C5 => c5_reaction(world, contact, photon, occupant),
        E::INVIS => {
            let resistance = pressure_resistance(occupant);
            let pressure = world.ambient.pressure(contact.nx, contact.ny);
            if (-resistance..=resistance).contains(&pressure) {
                world.change_type(contact.mover, E::NEUT);
                set_ctype(world, contact.mover, 0);
                return Reaction::Reacted;
            }
            Reaction::None
        }
        E::PINV if occupant.life == 0 => {
            world.change_type(contact.mover, E::ELEC);
            set_ctype(world, contact.mover, 0);
            Reaction::Reacted
        }
        E::BIZR | E::BIZRG | E::BIZRS => {
            world.change_type(contact.mover, E::ELEC);
            set_ctype(world, contact.mover, 0);
            Reaction::Reacted
        }
        E::H2 if photon.tmp & 1 == 0 => {
            world.change_type(contact.mover, E::PROT);
            if let Some(proton) = world.store.get_mut(contact.mover) {
                proton.ctype = 0;
                proton.tmp2 = 1;
            }
            // The hydrogen gives up its electron in place
            world.create_particle(Some(target), contact.x, contact.y, E::ELEC);
            Reaction::Consumed
        }
        E::GPMP if occupant.life == 0 => {
            world.change_type(contact.mover, E::GRVT);
            if let Some(graviton) = world.store.get_mut(contact.mover) {
                graviton.tmp = (occupant.temp - 273.15) as i32;
            }
            Reaction::Reacted
        }
        _ => Reaction::None,
    }
}

/// C5 either merges a passing photon with the one it holds, or swallows it
fn c5_reaction(
    world: &mut World,
    contact: &Contact,
    photon: &Particle,
    c5: &Particle,
) -> Reaction {
    let target = contact.occupant.index();

    if c5.life > 0 && c5.ctype & photon.ctype & C5_BITS != 0 {
        let held_vx = ((c5.tmp << 16) >> 16) as f32 / 255.0;
        let held_vy = (c5.tmp >> 16) as f32 / 255.0;

        if let Some(part) = world.store.get_mut(contact.mover) {
            if part.vx + held_vx == 0.0 && part.vy + held_vy == 0.0 {
                // Head-on: shoot off at a right angle instead of stopping dead
                part.vx = held_vy;
                part.vy = -held_vx;
            } else {
                let speed_sq = part.vx * part.vx + part.vy * part.vy;
                part.ctype = (c5.ctype & part.ctype) >> 6;
                part.vx += held_vx;
                part.vy += held_vy;
                let scale = (speed_sq / (part.vx * part.vx + part.vy * part.vy)).sqrt();
                part.vx *= scale;
                part.vy *= scale;
            }
        }
        if let Some(holder) = world.store.get_mut(target) {
            holder.life = 0;
            holder.ctype = 0;
        }
        return Reaction::Reacted;
    }

    if c5.ctype == 0 && photon.ctype & C5_BITS != 0 {
        if let Some(holder) = world.store.get_mut(target) {
            holder.life = 1;
            holder.ctype = photon.ctype;
            holder.tmp = ((photon.vx * 255.0) as i32 & 0xFFFF)
                | ((photon.vy * 16_711_680.0) as i32 & !0xFFFF);
            holder.tmp2 = (((photon.x - contact.x as f32) * 255.0) as i32 & 0xFFFF)
                | (((photon.y - contact.y as f32) * 16_711_680.0) as i32 & !0xFFFF);
        }
        world.kill_particle(contact.mover);
        return Reaction::Consumed;
    }
    Reaction::None
}

fn set_ctype(world: &mut World, index: usize, ctype: i32) {
    if let Some(part) = world.store.get_mut(index) {
        part.ctype = ctype;
    }
}
