//! Per-element behaviour hooks
//!
//! Every element may carry an update hook (run once per tick from the scan), a
//! co-occupancy hook (run when a particle of that element moves into a shared
//! cell), a change-type hook (run whenever a particle turns into or out of that
//! element) and a create-allowed predicate. Most elements have none of them.

use super::grid::PmapEntry;
use super::rng_trait::WorldRng;
use super::world::World;
use crate::entity::ragdoll;
use crate::simulation::ElementId as E;

/// Result of an update hook
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookOutcome {
    Continue,
    /// The particle died, skip the rest of its tick
    Killed,
}

/// Result of a co-occupancy reaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    None,
    /// Something changed, the mover keeps moving
    Reacted,
    /// The mover was used up (killed or converted in place)
    Consumed,
}

/// A mover entering a cell it shares with `occupant`
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    pub mover: usize,
    pub x: i32,
    pub y: i32,
    pub nx: i32,
    pub ny: i32,
    pub occupant: PmapEntry,
}

pub type UpdateHook = fn(&mut World, usize, &mut dyn WorldRng) -> HookOutcome;
pub type CoOccupyHook = fn(&mut World, &Contact, &mut dyn WorldRng) -> Reaction;
/// `(world, index, from, to)`
pub type ChangeTypeHook = fn(&mut World, usize, u16, u16);
pub type CreateAllowedHook = fn(&World, u16) -> bool;

/// Optional hooks of one element
#[derive(Clone, Copy, Debug, Default)]
pub struct ElementBehavior {
    pub update: Option<UpdateHook>,
    pub co_occupy: Option<CoOccupyHook>,
    pub change_type: Option<ChangeTypeHook>,
    pub create_allowed: Option<CreateAllowedHook>,
}

impl ElementBehavior {
    pub const NONE: ElementBehavior = ElementBehavior {
        update: None,
        co_occupy: None,
        change_type: None,
        create_allowed: None,
    };
}

/// Hooks indexed by element id
#[derive(Clone, Debug)]
pub struct BehaviorRegistry {
    behaviors: Vec<ElementBehavior>,
}

impl BehaviorRegistry {
    pub fn empty() -> Self {
        Self {
            behaviors: Vec::new(),
        }
    }

    /// Hooks for the built-in elements
    pub fn with_defaults() -> Self {
        use super::{portal, reactions};

        let mut registry = Self::empty();

        // Co-occupancy reactions, keyed by the mover
        for mover in [E::PHOT, E::NEUT, E::ELEC, E::PROT, E::BIZR, E::BIZRG] {
            registry.register(
                mover,
                ElementBehavior {
                    co_occupy: Some(reactions::co_occupy_reaction),
                    ..Default::default()
                },
            );
        }

        registry.register(
            E::PRTI,
            ElementBehavior {
                update: Some(portal::portal_intake),
                ..Default::default()
            },
        );
        registry.register(
            E::PPTI,
            ElementBehavior {
                update: Some(portal::portal_intake),
                ..Default::default()
            },
        );
        registry.register(
            E::PRTO,
            ElementBehavior {
                update: Some(portal::portal_emit),
                ..Default::default()
            },
        );
        registry.register(
            E::PPTO,
            ElementBehavior {
                update: Some(portal::portal_emit),
                ..Default::default()
            },
        );

        for player in [E::STKM, E::STKM2] {
            registry.register(
                player,
                ElementBehavior {
                    update: Some(ragdoll::run_ragdoll),
                    change_type: Some(ragdoll::ragdoll_change_type),
                    create_allowed: Some(ragdoll::ragdoll_create_allowed),
                    ..Default::default()
                },
            );
        }

        registry
    }

    /// Register (or replace) the hooks of an element
    pub fn register(&mut self, element: u16, behavior: ElementBehavior) {
        let index = element as usize;
        if self.behaviors.len() <= index {
            self.behaviors.resize(index + 1, ElementBehavior::NONE);
        }
        self.behaviors[index] = behavior;
    }

    /// Hooks of an element (no hooks for unknown ids)
    pub fn get(&self, element: u16) -> ElementBehavior {
        self.behaviors
            .get(element as usize)
            .copied()
            .unwrap_or(ElementBehavior::NONE)
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
