//! Portal channels - park particles in one place, re-emit them in another
//!
//! Portals pick a channel from their temperature. Each channel has eight
//! slots, one per neighbour direction of the intake:
//!
//! ```text
//!   0 1 2
//!   7 . 3
//!   6 5 4
//! ```
//!
//! An outlet takes from slot `(count + 4) % 8` so a particle comes out on
//! the opposite side to where it went in, jittered by one slot so a busy
//! portal does not jam.

use std::collections::VecDeque;

use super::grid::cell_of;
use super::hooks::HookOutcome;
use super::rng_trait::WorldRng;
use super::world::World;
use crate::entity::RagdollId;
use crate::error::PortalError;
use crate::simulation::{ElementId as E, ElementProperties, Particle};

/// Number of temperature channels
pub const PORTAL_CHANNELS: usize = 101;
/// Directional slots per channel
pub const PORTAL_SLOTS: usize = 8;
/// Particles one slot can hold
pub const PORTAL_CAPACITY: usize = 80;

/// Neighbour offset of each slot
pub const PORTAL_RX: [i32; PORTAL_SLOTS] = [-1, 0, 1, 1, 1, 0, -1, -1];
pub const PORTAL_RY: [i32; PORTAL_SLOTS] = [-1, -1, -1, 0, 1, 1, 1, 0];

/// Slot for a particle entering from offset `(rx, ry)` relative to the portal
///
/// Offsets beyond one cell are scaled down first. Anything unmatched goes in
/// the top slot.
pub fn slot_for_offset(rx: i32, ry: i32) -> usize {
    let (mut rx, mut ry) = (rx, ry);
    if rx.abs() > 1 || ry.abs() > 1 {
        let scale = rx.abs().max(ry.abs()) as f32;
        rx = (rx as f32 / scale) as i32;
        ry = (ry as f32 / scale) as i32;
    }
    (0..PORTAL_SLOTS)
        .find(|&slot| PORTAL_RX[slot] == rx && PORTAL_RY[slot] == ry)
        .unwrap_or(1)
}

/// Channel selected by a portal's temperature
pub fn channel_for_temp(temp: f32) -> usize {
    let channel = ((temp - 73.15) / 100.0 + 1.0) as i32;
    channel.clamp(0, PORTAL_CHANNELS as i32 - 1) as usize
}

/// Eight bounded FIFO slots of parked particles
#[derive(Clone, Debug, Default)]
pub struct PortalChannel {
    slots: [VecDeque<Particle>; PORTAL_SLOTS],
}

impl PortalChannel {
    pub fn len(&self, slot: usize) -> usize {
        self.slots.get(slot).map_or(0, VecDeque::len)
    }

    /// Full (or not a slot at all)
    pub fn is_full(&self, slot: usize) -> bool {
        self.slots
            .get(slot)
            .map_or(true, |queue| queue.len() >= PORTAL_CAPACITY)
    }

    pub fn front(&self, slot: usize) -> Option<&Particle> {
        self.slots.get(slot)?.front()
    }

    /// Park a copy of a particle, false when the slot is full
    pub fn push(&mut self, slot: usize, particle: Particle) -> bool {
        match self.slots.get_mut(slot) {
            Some(queue) if queue.len() < PORTAL_CAPACITY => {
                queue.push_back(particle);
                true
            }
            _ => false,
        }
    }

    pub fn pop(&mut self, slot: usize) -> Option<Particle> {
        self.slots.get_mut(slot)?.pop_front()
    }

    pub fn total(&self) -> usize {
        self.slots.iter().map(VecDeque::len).sum()
    }

    pub fn clear(&mut self) {
        for queue in &mut self.slots {
            queue.clear();
        }
    }
}

/// All portal channels of a world
#[derive(Clone, Debug)]
pub struct PortalStore {
    channels: Vec<PortalChannel>,
}

impl PortalStore {
    pub fn new() -> Self {
        Self {
            channels: vec![PortalChannel::default(); PORTAL_CHANNELS],
        }
    }

    pub fn channel(&self, channel: usize) -> Option<&PortalChannel> {
        self.channels.get(channel)
    }

    pub fn channel_mut(&mut self, channel: usize) -> Option<&mut PortalChannel> {
        self.channels.get_mut(channel)
    }

    /// Particles parked across every channel
    pub fn total_stored(&self) -> usize {
        self.channels.iter().map(PortalChannel::total).sum()
    }

    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.clear();
        }
    }
}

impl Default for PortalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Channel of a portal particle, recorded in its `tmp`
    pub fn portal_channel_of(&mut self, portal: usize) -> Option<usize> {
        let part = self.store.get_mut(portal)?;
        let channel = channel_for_temp(part.temp);
        part.tmp = channel as i32;
        Some(channel)
    }

    /// Move a live particle into a portal slot
    ///
    /// The particle leaves the simulation: it is killed, or a spark reverts to
    /// the conductor it was riding. A full slot leaves it untouched.
    pub fn store_in_portal(
        &mut self,
        index: usize,
        channel: usize,
        slot: usize,
    ) -> Result<(), PortalError> {
        if slot >= PORTAL_SLOTS {
            return Err(PortalError::InvalidSlot(slot));
        }
        let Some(part) = self.store.get(index).copied() else {
            return Err(PortalError::DeadParticle(index));
        };
        let parked = self
            .portals
            .channel_mut(channel)
            .ok_or(PortalError::InvalidChannel(channel))?;
        if !parked.push(slot, part) {
            log::trace!("Portal channel {} slot {} is full", channel, slot);
            return Err(PortalError::SlotFull { channel, slot });
        }

        if part.element == E::SPRK && self.elements.is_element(part.ctype) {
            self.change_type(index, part.ctype as u16);
        } else {
            self.kill_particle(index);
        }
        Ok(())
    }
}

/// Update hook of PRTI/PPTI: swallow movable neighbours
pub(crate) fn portal_intake(world: &mut World, index: usize, _rng: &mut dyn WorldRng) -> HookOutcome {
    let Some(portal) = world.store.get(index).copied() else {
        return HookOutcome::Killed;
    };
    // A powered intake needs its charge
    if portal.element == E::PPTI && portal.tmp2 < 10 {
        return HookOutcome::Continue;
    }
    let Some(channel) = world.portal_channel_of(index) else {
        return HookOutcome::Continue;
    };
    let cell = cell_of(portal.x, portal.y);

    for slot in 0..PORTAL_SLOTS {
        if world.portals.channel(channel).map_or(true, |c| c.is_full(slot)) {
            continue;
        }
        let (x, y) = (cell.x + PORTAL_RX[slot], cell.y + PORTAL_RY[slot]);
        if !world.grid.in_bounds(x, y) {
            continue;
        }

        let mut neighbour = world.occupant_at(x, y);
        let movable = world
            .elements
            .get(neighbour.element)
            .has(ElementProperties::MOVABLE);
        if neighbour.is_empty() || (!movable && neighbour.element != E::SPRK) {
            neighbour = world.energy_at(x, y);
            if neighbour.is_empty() {
                continue;
            }
        }
        // Ragdolls enter through their own foot checks
        if matches!(neighbour.element, E::STKM | E::STKM2 | E::FIGH) {
            continue;
        }
        match world.store_in_portal(neighbour.index(), channel, slot) {
            Ok(()) | Err(PortalError::SlotFull { .. }) => {}
            Err(err) => log::trace!("Portal {} skipped neighbour: {}", index, err),
        }
    }
    HookOutcome::Continue
}

/// Update hook of PRTO/PPTO: emit parked particles into empty neighbours
pub(crate) fn portal_emit(world: &mut World, index: usize, rng: &mut dyn WorldRng) -> HookOutcome {
    let Some(portal) = world.store.get(index).copied() else {
        return HookOutcome::Killed;
    };
    if portal.element == E::PPTO && portal.tmp2 < 10 {
        return HookOutcome::Continue;
    }
    let Some(channel) = world.portal_channel_of(index) else {
        return HookOutcome::Continue;
    };
    let cell = cell_of(portal.x, portal.y);

    for count in 0..PORTAL_SLOTS {
        let (x, y) = (cell.x + PORTAL_RX[count], cell.y + PORTAL_RY[count]);
        if !world.grid.in_bounds(x, y) || !world.occupant_at(x, y).is_empty() {
            continue;
        }
        let slot = (count as i32 + 4 + rng.between(-1, 1)).rem_euclid(PORTAL_SLOTS as i32) as usize;
        let Some(parked) = world
            .portals
            .channel(channel)
            .and_then(|c| c.front(slot))
            .copied()
        else {
            continue;
        };

        // A parked player is allowed back into the world
        let player = RagdollId::for_element(parked.element);
        if let Some(id) = player {
            world.ragdoll_mut(id).spawned = false;
        }
        let Some(created) = world.create_particle(None, x, y, parked.element) else {
            // Still parked, so no other body may be created
            if let Some(id) = player {
                world.ragdoll_mut(id).spawned = true;
            }
            continue;
        };
        if let Some(queue) = world.portals.channel_mut(channel) {
            queue.pop(slot);
        }
        if let Some(part) = world.store.get_mut(created) {
            part.vx = parked.vx;
            part.vy = parked.vy;
            part.life = parked.life;
            part.ctype = parked.ctype;
            part.temp = parked.temp;
            part.tmp = parked.tmp;
            part.tmp2 = parked.tmp2;
        }
    }
    HookOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    /// Draws the midpoint so outlets never jitter
    struct MidRng;

    impl WorldRng for MidRng {
        fn gen_bool(&mut self) -> bool {
            false
        }

        fn gen_f32(&mut self) -> f32 {
            0.5
        }

        fn between(&mut self, low: i32, high: i32) -> i32 {
            (low + high) / 2
        }
    }

    fn world() -> World {
        World::new(&SimConfig::small(32, 32))
    }

    #[test]
    fn test_slot_for_offset() {
        assert_eq!(slot_for_offset(-1, -1), 0);
        assert_eq!(slot_for_offset(0, -1), 1);
        assert_eq!(slot_for_offset(1, 0), 3);
        assert_eq!(slot_for_offset(-1, 0), 7);
        // Scaled down from two cells away
        assert_eq!(slot_for_offset(0, 2), 5);
        assert_eq!(slot_for_offset(0, 0), 1);
    }

    #[test]
    fn test_channel_for_temp() {
        assert_eq!(channel_for_temp(295.15), 3);
        assert_eq!(channel_for_temp(0.0), 0);
        assert_eq!(channel_for_temp(9999.0), PORTAL_CHANNELS - 1);
    }

    #[test]
    fn test_channel_capacity() {
        let mut channel = PortalChannel::default();
        for _ in 0..PORTAL_CAPACITY {
            assert!(channel.push(2, Particle::EMPTY));
        }
        assert!(channel.is_full(2));
        assert!(!channel.push(2, Particle::EMPTY));
        assert!(channel.is_full(PORTAL_SLOTS));
        assert_eq!(channel.total(), PORTAL_CAPACITY);
    }

    #[test]
    fn test_store_kills_and_parks_copy() {
        let mut world = world();
        let sand = world.create_particle(None, 10, 10, E::SAND).expect("sand");
        assert_eq!(world.store_in_portal(sand, 3, 5), Ok(()));
        assert!(world.particle(sand).is_none());
        assert!(world.occupant_at(10, 10).is_empty());
        let parked = world.portals().channel(3).and_then(|c| c.front(5)).copied();
        assert_eq!(parked.map(|p| p.element), Some(E::SAND));
    }

    #[test]
    fn test_store_into_full_slot_fails_untouched() {
        let mut world = world();
        let sand = world.create_particle(None, 10, 10, E::SAND).expect("sand");
        if let Some(channel) = world.portals_mut().channel_mut(3) {
            for _ in 0..PORTAL_CAPACITY {
                channel.push(1, Particle::EMPTY);
            }
        }

        let result = world.store_in_portal(sand, 3, 1);
        assert_eq!(result, Err(PortalError::SlotFull { channel: 3, slot: 1 }));
        let part = world.particle(sand).expect("still live");
        assert_eq!((part.x, part.y), (10.0, 10.0));
        assert!(world.occupant_at(10, 10).points_to(sand));
    }

    #[test]
    fn test_store_rejects_bad_arguments() {
        let mut world = world();
        let sand = world.create_particle(None, 10, 10, E::SAND).expect("sand");
        assert_eq!(
            world.store_in_portal(sand, 3, PORTAL_SLOTS),
            Err(PortalError::InvalidSlot(PORTAL_SLOTS))
        );
        assert_eq!(
            world.store_in_portal(sand, PORTAL_CHANNELS, 0),
            Err(PortalError::InvalidChannel(PORTAL_CHANNELS))
        );
        world.kill_particle(sand);
        assert_eq!(
            world.store_in_portal(sand, 3, 0),
            Err(PortalError::DeadParticle(sand))
        );
    }

    #[test]
    fn test_stored_spark_reverts_to_conductor() {
        let mut world = world();
        let metal = world.create_particle(None, 10, 10, E::METL).expect("metal");
        assert!(world.spark_conductive_attempt(metal));
        assert_eq!(world.store_in_portal(metal, 3, 0), Ok(()));
        assert_eq!(world.particle(metal).map(|p| p.element), Some(E::METL));
    }

    #[test]
    fn test_intake_takes_movable_neighbours_only() {
        let mut world = world();
        let portal = world.create_particle(None, 15, 15, E::PRTI).expect("portal");
        world.create_particle(None, 15, 14, E::SAND);
        world.create_particle(None, 16, 15, E::METL);
        world.create_particle(None, 14, 16, E::PHOT);

        portal_intake(&mut world, portal, &mut MidRng);

        assert_eq!(world.particle(portal).map(|p| p.tmp), Some(3));
        let channel = world.portals().channel(3).expect("channel");
        assert_eq!(channel.len(1), 1);
        assert_eq!(channel.len(6), 1);
        assert_eq!(channel.len(3), 0);
        assert_eq!(world.count(E::SAND), 0);
        assert_eq!(world.count(E::PHOT), 0);
        assert_eq!(world.count(E::METL), 1);
    }

    #[test]
    fn test_unpowered_ppti_does_nothing() {
        let mut world = world();
        let portal = world.create_particle(None, 15, 15, E::PPTI).expect("portal");
        world.create_particle(None, 15, 14, E::SAND);
        portal_intake(&mut world, portal, &mut MidRng);
        assert_eq!(world.count(E::SAND), 1);
    }

    #[test]
    fn test_emit_comes_out_opposite() {
        let mut world = world();
        let intake = world.create_particle(None, 5, 15, E::PRTI).expect("intake");
        let sand = world.create_particle(None, 5, 14, E::SAND).expect("sand");
        if let Some(part) = world.particle_mut(sand) {
            part.temp = 400.0;
        }
        portal_intake(&mut world, intake, &mut MidRng);
        assert_eq!(world.count(E::SAND), 0);

        let outlet = world.create_particle(None, 20, 15, E::PRTO).expect("outlet");
        portal_emit(&mut world, outlet, &mut MidRng);

        // Went in through the top slot, comes out below the outlet
        let out = world.occupant_at(20, 16);
        assert_eq!(out.element, E::SAND);
        assert_eq!(world.particle(out.index()).map(|p| p.temp), Some(400.0));
        assert_eq!(world.portals().total_stored(), 0);
    }

    #[test]
    fn test_emit_keeps_player_parked_when_store_is_full() {
        let mut config = SimConfig::small(32, 32);
        config.world.max_particles = 2;
        let mut world = World::new(&config);
        if let Some(channel) = world.portals_mut().channel_mut(3) {
            channel.push(
                1,
                Particle {
                    element: E::STKM,
                    life: 100,
                    ..Particle::EMPTY
                },
            );
        }
        world.ragdoll_mut(RagdollId::One).spawned = true;
        let outlet = world.create_particle(None, 20, 15, E::PRTO).expect("outlet");
        let filler = world.create_particle(None, 8, 8, E::METL).expect("filler");

        portal_emit(&mut world, outlet, &mut MidRng);
        assert_eq!(world.count(E::STKM), 0);
        assert_eq!(world.portals().total_stored(), 1);
        assert!(world.ragdoll(RagdollId::One).spawned);

        // With room again the parked body still bars a second one
        world.kill_particle(filler);
        assert!(world.create_particle(None, 10, 10, E::STKM).is_none());
        portal_emit(&mut world, outlet, &mut MidRng);
        assert_eq!(world.count(E::STKM), 1);
        assert_eq!(world.portals().total_stored(), 0);
    }

    #[test]
    fn test_intake_leaves_neighbour_when_slot_is_full() {
        let mut world = world();
        let intake = world.create_particle(None, 5, 15, E::PRTI).expect("intake");
        let sand = world.create_particle(None, 5, 14, E::SAND).expect("sand");
        let channel = world.portal_channel_of(intake).expect("channel");
        if let Some(queue) = world.portals_mut().channel_mut(channel) {
            for _ in 0..PORTAL_CAPACITY {
                queue.push(1, Particle::EMPTY);
            }
        }
        portal_intake(&mut world, intake, &mut MidRng);
        assert!(world.particle(sand).is_some());
        assert_eq!(world.portals().total_stored(), PORTAL_CAPACITY);
    }

    #[test]
    fn test_emit_waits_for_room() {
        let mut world = world();
        if let Some(channel) = world.portals_mut().channel_mut(3) {
            channel.push(
                1,
                Particle {
                    element: E::SAND,
                    ..Particle::EMPTY
                },
            );
        }
        let outlet = world.create_particle(None, 20, 15, E::PRTO).expect("outlet");
        world.create_particle(None, 20, 16, E::METL);
        portal_emit(&mut world, outlet, &mut MidRng);
        assert_eq!(world.portals().total_stored(), 1);
    }
}
