//! Integration tests for movement, collision and the tick driver
//!
//! These go through the public API only: build a world, place particles,
//! move them or step the whole simulation, then check the maps and records.

use kona_core::PortalError;
use kona_core::config::SimConfig;
use kona_core::entity::RagdollId;
use kona_core::simulation::{
    ElementDef, ElementId, ElementProperties, Elements, Falldown, MAX_TEMP,
};
use kona_core::world::{
    CountingStats, MoveOutcome, MoveResult, NoopStats, World, cell_of,
};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

fn rng() -> Xoshiro256StarStar {
    Xoshiro256StarStar::seed_from_u64(0x5eed)
}

fn world() -> World {
    World::new(&SimConfig::small(64, 64))
}

fn place(world: &mut World, x: i32, y: i32, element: u16) -> usize {
    world
        .create_particle(None, x, y, element)
        .expect("cell should be free")
}

fn set_temp(world: &mut World, index: usize, temp: f32) {
    if let Some(part) = world.particle_mut(index) {
        part.temp = temp;
    }
}

fn temp(world: &World, index: usize) -> f32 {
    world.particle(index).map(|p| p.temp).expect("particle should be live")
}

/// Every map entry names a live particle standing in that cell
fn assert_maps_consistent(world: &World) {
    for layer in [&world.grid().pmap, &world.grid().photons] {
        for (cell, entry) in layer.occupied() {
            let part = world
                .particle(entry.index())
                .unwrap_or_else(|| panic!("entry at {:?} points to a free slot", cell));
            assert_eq!(cell_of(part.x, part.y), cell, "particle {} is elsewhere", entry.index());
        }
    }
}

// ============================================================================
// Collision scenarios
// ============================================================================

#[test]
fn test_light_gas_blocked_by_heavier_particle_shares_heat() {
    let mut elements = Elements::new();
    elements.register(ElementDef {
        id: 120,
        name: "LITE".to_string(),
        weight: 5,
        properties: ElementProperties::TYPE_GAS,
        heat_conduct: 50,
        advection: 1.0,
        loss: 0.3,
        ..Default::default()
    });
    elements.register(ElementDef {
        id: 121,
        name: "HEVY".to_string(),
        weight: 10,
        properties: ElementProperties::TYPE_PART,
        falldown: Falldown::Powder,
        heat_conduct: 50,
        ..Default::default()
    });
    let mut world = World::with_elements(&SimConfig::small(64, 64), elements);

    let gas = place(&mut world, 10, 10, 120);
    let heavy = place(&mut world, 11, 10, 121);
    set_temp(&mut world, gas, 400.0);
    set_temp(&mut world, heavy, 300.0);

    let result = world.do_move(gas, 10, 10, 11.0, 10.0, &mut rng());
    assert_eq!(result, MoveResult::Blocked);
    assert_eq!(world.particle(gas).map(|p| (p.x, p.y)), Some((10.0, 10.0)));
    assert_eq!(world.particle(heavy).map(|p| (p.x, p.y)), Some((11.0, 10.0)));
    assert_eq!(temp(&world, gas), 350.0);
    assert_eq!(temp(&world, heavy), 350.0);
}

#[test]
fn test_legacy_mode_skips_heat_exchange() {
    let mut world = world();
    world.set_legacy_mode(true);
    let fire = place(&mut world, 10, 10, ElementId::FIRE);
    let metal = place(&mut world, 11, 10, ElementId::METL);
    set_temp(&mut world, fire, 900.0);

    let result = world.do_move(fire, 10, 10, 11.0, 10.0, &mut rng());
    assert_eq!(result, MoveResult::Blocked);
    assert_eq!(temp(&world, fire), 900.0);
    assert!(temp(&world, metal) < 900.0);
}

#[test]
fn test_photon_passes_through_glass() {
    let mut world = world();
    let glass = place(&mut world, 20, 20, ElementId::GLAS);
    let photon = place(&mut world, 19, 20, ElementId::PHOT);
    let before = *world.particle(glass).expect("glass");

    assert_eq!(world.eval_move(ElementId::PHOT, 20, 20).0, MoveOutcome::CoOccupy);
    let result = world.do_move(photon, 19, 20, 20.0, 20.0, &mut rng());
    assert_eq!(result, MoveResult::Moved);

    assert_eq!(world.particle(photon).map(|p| p.x), Some(20.0));
    assert!(world.occupant_at(20, 20).points_to(glass));
    assert!(world.energy_at(20, 20).points_to(photon));
    assert_eq!(world.particle(glass).copied(), Some(before));
    assert_maps_consistent(&world);
}

#[test]
fn test_black_hole_heat_is_clamped() {
    let mut world = world();
    let hole = place(&mut world, 20, 21, ElementId::BHOL);
    let dust = place(&mut world, 20, 20, ElementId::DUST);
    set_temp(&mut world, hole, MAX_TEMP - 10.0);
    set_temp(&mut world, dust, 1000.0);

    let result = world.do_move(dust, 20, 20, 20.0, 21.0, &mut rng());
    assert_eq!(result, MoveResult::Absorbed);
    assert!(world.particle(dust).is_none());
    assert_eq!(temp(&world, hole), MAX_TEMP);
    assert!(world.occupant_at(20, 20).is_empty());
    assert_eq!(world.count(ElementId::DUST), 0);
}

#[test]
fn test_identical_particles_never_displace() {
    let mut world = world();
    for element in [ElementId::SAND, ElementId::WATR, ElementId::GAS, ElementId::METL] {
        let a = place(&mut world, 30, 30, element);
        let b = place(&mut world, 30, 31, element);
        assert_eq!(world.eval_move(element, 30, 31).0, MoveOutcome::Blocked);
        assert_eq!(world.do_move(a, 30, 30, 30.0, 31.0, &mut rng()), MoveResult::Blocked);
        assert!(world.occupant_at(30, 31).points_to(b));
        world.kill_particle(a);
        world.kill_particle(b);
    }
}

#[test]
fn test_full_portal_slot_leaves_particle_alone() {
    let mut world = world();
    let mut rng = rng();
    let portal = place(&mut world, 30, 30, ElementId::PRTI);
    let channel = world.portal_channel_of(portal).expect("portal");

    for n in 0..80 {
        let sand = place(&mut world, 10 + n % 40, 10 + n / 40, ElementId::SAND);
        world.store_in_portal(sand, channel, 3).expect("room left");
    }
    let last = place(&mut world, 20, 20, ElementId::SAND);
    let err = world.store_in_portal(last, channel, 3).unwrap_err();
    assert_eq!(err, PortalError::SlotFull { channel, slot: 3 });
    assert_eq!(world.particle(last).map(|p| (p.x, p.y)), Some((20.0, 20.0)));
    assert!(world.occupant_at(20, 20).points_to(last));

    // Other slots are unaffected
    assert!(world.store_in_portal(last, channel, 4).is_ok());
    assert_eq!(world.portals().total_stored(), 81);
    world.step(&mut NoopStats, &mut rng);
    assert_maps_consistent(&world);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_kill_is_idempotent_and_slot_is_reused() {
    let mut world = world();
    let sand = place(&mut world, 10, 10, ElementId::SAND);
    assert!(world.kill_particle(sand));
    assert!(!world.kill_particle(sand));
    assert_eq!(world.count(ElementId::SAND), 0);
    assert_eq!(world.live_count(), 0);

    let water = place(&mut world, 10, 10, ElementId::WATR);
    assert_eq!(water, sand);
    assert_eq!(world.count(ElementId::WATR), 1);
}

#[test]
fn test_creation_fails_when_store_is_full() {
    let mut config = SimConfig::small(64, 64);
    config.world.max_particles = 3;
    let mut world = World::new(&config);
    for x in 10..13 {
        place(&mut world, x, 10, ElementId::METL);
    }
    assert!(world.create_particle(None, 20, 10, ElementId::METL).is_none());
    assert_eq!(world.live_count(), 3);
}

// ============================================================================
// Tick driver
// ============================================================================

#[test]
fn test_maps_stay_consistent_over_many_ticks() {
    let mut world = world();
    let mut rng = rng();
    for x in 8..56 {
        place(&mut world, x, 50, ElementId::METL);
    }
    for x in 12..52 {
        place(&mut world, x, 20, ElementId::SAND);
        place(&mut world, x, 24, ElementId::WATR);
        if x % 3 == 0 {
            place(&mut world, x, 30, ElementId::GAS);
        }
        if x % 5 == 0 {
            let photon = place(&mut world, x, 35, ElementId::PHOT);
            if let Some(part) = world.particle_mut(photon) {
                part.vx = 1.5;
                part.vy = -0.5;
            }
        }
    }

    let mut stats = CountingStats::default();
    for _ in 0..120 {
        world.step(&mut stats, &mut rng);
        assert_maps_consistent(&world);
    }
    assert!(stats.moved > 0);
    assert_eq!(world.frame(), 120);
}

#[test]
fn test_sand_sinks_through_water_without_loss() {
    let mut world = world();
    let mut rng = rng();
    for y in 20..41 {
        place(&mut world, 19, y, ElementId::METL);
        place(&mut world, 31, y, ElementId::METL);
    }
    for x in 19..32 {
        place(&mut world, x, 41, ElementId::METL);
    }
    for y in 30..41 {
        for x in 20..31 {
            place(&mut world, x, y, ElementId::WATR);
        }
    }
    for x in 22..29 {
        place(&mut world, x, 26, ElementId::SAND);
    }
    let water = world.count(ElementId::WATR);
    let sand = world.count(ElementId::SAND);

    for _ in 0..200 {
        world.step(&mut NoopStats, &mut rng);
    }

    assert_eq!(world.count(ElementId::WATR), water);
    assert_eq!(world.count(ElementId::SAND), sand);
    let sand_below = world
        .particles()
        .filter(|(_, p)| p.element == ElementId::SAND && p.y > 34.0)
        .count();
    assert!(sand_below > 0);
    assert_maps_consistent(&world);
}

#[test]
fn test_photons_bounce_inside_a_metal_box() {
    let mut world = world();
    let mut rng = rng();
    for i in 10..=40 {
        place(&mut world, i, 10, ElementId::METL);
        place(&mut world, i, 40, ElementId::METL);
    }
    for j in 11..40 {
        place(&mut world, 10, j, ElementId::METL);
        place(&mut world, 40, j, ElementId::METL);
    }
    let photon = place(&mut world, 25, 25, ElementId::PHOT);
    if let Some(part) = world.particle_mut(photon) {
        part.vx = 2.0;
        part.vy = 1.0;
    }

    for _ in 0..100 {
        world.step(&mut NoopStats, &mut rng);
        let Some(part) = world.particle(photon) else {
            break;
        };
        let cell = cell_of(part.x, part.y);
        assert!(cell.x > 10 && cell.x < 40 && cell.y > 10 && cell.y < 40);
    }
}

// ============================================================================
// Ragdolls
// ============================================================================

#[test]
fn test_ragdoll_stands_on_a_floor() {
    let mut world = world();
    let mut rng = rng();
    for y in 42..45 {
        for x in 10..54 {
            place(&mut world, x, y, ElementId::METL);
        }
    }
    let head = place(&mut world, 30, 29, ElementId::STKM);

    for _ in 0..40 {
        world.step(&mut NoopStats, &mut rng);
        let body = world.ragdoll(RagdollId::One);
        for leg in &body.legs {
            let foot = cell_of(leg.foot.pos.x, leg.foot.pos.y);
            assert_ne!(world.occupant_at(foot.x, foot.y).element, ElementId::METL);
        }
    }

    let part = world.particle(head).expect("ragdoll should survive");
    assert!(part.y > 15.0 && part.y < 42.0);
    assert_eq!(world.ragdoll(RagdollId::One).owner, Some(head));
    assert_maps_consistent(&world);
}

#[test]
fn test_ragdoll_carries_the_selected_element_when_respawned() {
    let mut world = world();
    let mut rng = rng();
    world.set_ragdoll_default_element(ElementId::WATR);
    world.step(&mut NoopStats, &mut rng);

    let head = place(&mut world, 30, 20, ElementId::STKM);
    world.step(&mut NoopStats, &mut rng);
    assert_eq!(world.ragdoll(RagdollId::One).element, ElementId::WATR);
    assert_eq!(
        world.particle(head).map(|p| p.ctype),
        Some(ElementId::WATR as i32)
    );
}
