//! Move compatibility table
//!
//! `[mover][occupant] -> MoveOutcome`, built once from the element registry.
//! Category rules go first, then the hand-picked pair exceptions. The table
//! is read-only afterwards; changing element metadata means building a new
//! one.

use crate::simulation::{ElementId as E, ElementProperties as P, Elements};

/// Result of a compatibility check between a mover and a cell occupant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// No movement (bounce)
    Blocked,
    /// Exchange places with the occupant
    Swap,
    /// Both particles share the cell
    CoOccupy,
    /// Depends on runtime state, see `VariesRules`
    Varies,
}

/// Occupants a photon passes through
const PHOTON_TRANSPARENT: &[u16] = &[
    E::GLAS,
    E::PHOT,
    E::FILT,
    E::H2,
    E::WATR,
    E::DSTW,
    E::SLTW,
    E::GLOW,
    E::ISOZ,
    E::ISZS,
    E::QRTZ,
    E::PQRT,
    E::INVIS,
    E::BGLA,
    E::C5,
    E::PINV,
];

/// Occupants protons and gravitons cannot pass
const PROTON_OPAQUE: &[u16] = &[
    E::DMND,
    E::INSL,
    E::VOID,
    E::PVOD,
    E::VIBR,
    E::BVBR,
    E::PRTO,
    E::PRTI,
    E::PPTO,
    E::PPTI,
];

/// Cells a ragdoll may enter besides liquids and gases
const RAGDOLL_PASSABLE: &[u16] = &[E::NONE, E::PRTO, E::SPAWN, E::SPAWN2];

const RAGDOLLS: &[u16] = &[E::STKM, E::STKM2, E::FIGH];

/// Specific pair exceptions, applied last and in order
const PAIR_OVERRIDES: &[(u16, u16, MoveOutcome)] = &[
    (E::DEST, E::DMND, MoveOutcome::Blocked),
    (E::DEST, E::CLNE, MoveOutcome::Blocked),
    (E::DEST, E::PCLN, MoveOutcome::Blocked),
    (E::DEST, E::BCLN, MoveOutcome::Blocked),
    (E::DEST, E::PBCN, MoveOutcome::Blocked),
    (E::DEST, E::ROCK, MoveOutcome::Blocked),
    (E::NEUT, E::INVIS, MoveOutcome::CoOccupy),
    (E::ELEC, E::PINV, MoveOutcome::CoOccupy),
    (E::ELEC, E::LCRY, MoveOutcome::CoOccupy),
    (E::ELEC, E::EXOT, MoveOutcome::CoOccupy),
    (E::ELEC, E::GLOW, MoveOutcome::CoOccupy),
    (E::PHOT, E::LCRY, MoveOutcome::Varies),
    (E::PHOT, E::GPMP, MoveOutcome::Varies),
    (E::PHOT, E::BIZR, MoveOutcome::CoOccupy),
    (E::ELEC, E::BIZR, MoveOutcome::CoOccupy),
    (E::PHOT, E::BIZRG, MoveOutcome::CoOccupy),
    (E::ELEC, E::BIZRG, MoveOutcome::CoOccupy),
    (E::PHOT, E::BIZRS, MoveOutcome::CoOccupy),
    (E::ELEC, E::BIZRS, MoveOutcome::CoOccupy),
    (E::BIZR, E::FILT, MoveOutcome::CoOccupy),
    (E::BIZRG, E::FILT, MoveOutcome::CoOccupy),
    (E::ANAR, E::WHOL, MoveOutcome::Swap),
    (E::ANAR, E::NWHL, MoveOutcome::Swap),
    (E::ELEC, E::DEUT, MoveOutcome::Swap),
    (E::SPNG, E::SPNG, MoveOutcome::Varies),
    (E::THDR, E::THDR, MoveOutcome::CoOccupy),
    (E::EMBR, E::EMBR, MoveOutcome::CoOccupy),
    (E::TRON, E::SWCH, MoveOutcome::Varies),
    (E::RAZR, E::CNCT, MoveOutcome::Swap),
    (E::RAZR, E::GEL, MoveOutcome::Swap),
    (E::MOVS, E::MOVS, MoveOutcome::CoOccupy),
];

/// Dense mover x occupant outcome matrix
#[derive(Clone, Debug)]
pub struct MoveTable {
    size: usize,
    outcomes: Vec<MoveOutcome>,
}

impl MoveTable {
    /// Build the table for a populated registry
    pub fn build(elements: &Elements) -> Self {
        let size = elements.len();
        let mut table = Self {
            size,
            outcomes: vec![MoveOutcome::Swap; size * size],
        };

        // Nothing moves for the empty element
        for dest in 0..size {
            table.set(E::NONE as usize, dest, MoveOutcome::Blocked);
        }

        // Photons go through everything unless something below says otherwise
        for dest in 1..size {
            table.set(E::PHOT as usize, dest, MoveOutcome::CoOccupy);
        }

        for mover in 1..size {
            let m = elements.get(mover as u16);
            for dest in 1..size {
                let d = elements.get(dest as u16);

                // Weight ordering also stops identical elements displacing each other
                if m.weight <= d.weight || dest == E::GEL as usize {
                    table.set(mover, dest, MoveOutcome::Blocked);
                }
                if mover == E::NEUT as usize {
                    if d.has(P::NEUTPASS) {
                        table.set(mover, dest, MoveOutcome::CoOccupy);
                    }
                    if d.has(P::NEUTABSORB) || d.has(P::NEUTPENETRATE) {
                        table.set(mover, dest, MoveOutcome::Swap);
                    }
                }
                if m.has(P::NEUTPENETRATE) && dest == E::NEUT as usize {
                    table.set(mover, dest, MoveOutcome::Blocked);
                }
                if m.is_energy() && d.is_energy() {
                    table.set(mover, dest, MoveOutcome::CoOccupy);
                }
                if d.has(P::INDESTRUCTIBLE) {
                    table.set(mover, dest, MoveOutcome::Blocked);
                }
            }
        }

        for dest in 0..size {
            let d = elements.get(dest as u16);
            let passable = d.is_liquid() || d.is_gas() || RAGDOLL_PASSABLE.contains(&(dest as u16));
            let ragdoll_move = if passable {
                MoveOutcome::CoOccupy
            } else {
                MoveOutcome::Blocked
            };
            for &ragdoll in RAGDOLLS {
                table.set(ragdoll as usize, dest, ragdoll_move);
            }
            // Sparks never move
            table.set(E::SPRK as usize, dest, MoveOutcome::Blocked);
        }

        for mover in 1..size {
            let m = elements.get(mover as u16);
            // Sinks accept everything so they can eat it
            table.set(mover, E::BHOL as usize, MoveOutcome::Swap);
            table.set(mover, E::NBHL as usize, MoveOutcome::Swap);
            for &ragdoll in RAGDOLLS {
                table.set(mover, ragdoll as usize, MoveOutcome::Blocked);
            }
            table.set(mover, E::INVIS as usize, MoveOutcome::Varies);
            table.set(mover, E::PINV as usize, MoveOutcome::Varies);
            table.set(mover, E::CNCT as usize, MoveOutcome::Blocked);
            table.set(mover, E::PVOD as usize, MoveOutcome::Varies);
            table.set(mover, E::VOID as usize, MoveOutcome::Varies);
            table.set(mover, E::EMBR as usize, MoveOutcome::Blocked);
            table.set(E::EMBR as usize, mover, MoveOutcome::Blocked);
            if m.is_energy() {
                table.set(mover, E::VIBR as usize, MoveOutcome::Swap);
                table.set(mover, E::BVBR as usize, MoveOutcome::Swap);
            }
            if m.is_part() && mover != E::RAZR as usize {
                table.set(mover, E::SAWD as usize, MoveOutcome::Blocked);
            }
        }

        for dest in 0..size {
            let d = elements.get(dest as u16);
            let id = dest as u16;
            if PHOTON_TRANSPARENT.contains(&id) || d.has(P::CLONE | P::BREAKABLECLONE) {
                table.set(E::PHOT as usize, dest, MoveOutcome::CoOccupy);
            }
            if !PROTON_OPAQUE.contains(&id) {
                table.set(E::PROT as usize, dest, MoveOutcome::CoOccupy);
                table.set(E::GRVT as usize, dest, MoveOutcome::CoOccupy);
            }
        }

        for &(mover, dest, outcome) in PAIR_OVERRIDES {
            table.set(mover as usize, dest as usize, outcome);
        }

        // Unregistered ids fail closed in both directions
        for id in 1..size {
            if !elements.contains(id as u16) {
                for other in 0..size {
                    table.set(id, other, MoveOutcome::Blocked);
                    table.set(other, id, MoveOutcome::Blocked);
                }
            }
        }

        log::debug!(
            "Built move table for {} elements ({} pair overrides)",
            size,
            PAIR_OVERRIDES.len()
        );
        table
    }

    #[inline]
    fn set(&mut self, mover: usize, dest: usize, outcome: MoveOutcome) {
        if mover < self.size && dest < self.size {
            self.outcomes[mover * self.size + dest] = outcome;
        }
    }

    /// Outcome for `mover` entering a cell held by `dest`
    ///
    /// Ids outside the table are Blocked.
    #[inline]
    pub fn evaluate(&self, mover: u16, dest: u16) -> MoveOutcome {
        let (mover, dest) = (mover as usize, dest as usize);
        if mover >= self.size || dest >= self.size {
            return MoveOutcome::Blocked;
        }
        self.outcomes[mover * self.size + dest]
    }

    /// Number of element ids covered
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::ElementDef;

    fn table() -> (Elements, MoveTable) {
        let elements = Elements::new();
        let table = MoveTable::build(&elements);
        (elements, table)
    }

    /// Elements with no special treatment anywhere in the table
    fn plain_ids() -> Vec<u16> {
        vec![
            E::DUST,
            E::STNE,
            E::SAND,
            E::SALT,
            E::WATR,
            E::OIL,
            E::LAVA,
            E::GAS,
            E::FIRE,
            E::METL,
            E::WOOD,
            E::IRON,
            E::BRCK,
        ]
    }

    #[test]
    fn test_default_rule_follows_weight() {
        let (elements, table) = table();
        for &a in &plain_ids() {
            for &b in &plain_ids() {
                let blocked = elements.get(a).weight <= elements.get(b).weight;
                let outcome = table.evaluate(a, b);
                assert_eq!(
                    outcome == MoveOutcome::Blocked,
                    blocked,
                    "{} into {} gave {:?}",
                    elements.get(a).name,
                    elements.get(b).name,
                    outcome
                );
            }
        }
    }

    #[test]
    fn test_same_element_never_displaces() {
        let (elements, table) = table();
        for element in elements.iter().filter(|e| e.id != E::NONE) {
            let outcome = table.evaluate(element.id, element.id);
            if matches!(element.id, E::THDR | E::EMBR | E::MOVS | E::PHOT | E::NEUT
                | E::ELEC | E::PROT | E::GRVT | E::BHOL | E::NBHL
                | E::SPNG | E::INVIS | E::PINV | E::VOID | E::PVOD)
            {
                continue;
            }
            assert_eq!(outcome, MoveOutcome::Blocked, "{}", element.name);
        }
    }

    #[test]
    fn test_empty_destination_is_swap() {
        let (_, table) = table();
        assert_eq!(table.evaluate(E::DUST, E::NONE), MoveOutcome::Swap);
        assert_eq!(table.evaluate(E::PHOT, E::NONE), MoveOutcome::Swap);
        assert_eq!(table.evaluate(E::NONE, E::DUST), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(E::SPRK, E::NONE), MoveOutcome::Blocked);
    }

    #[test]
    fn test_energy_rules() {
        let (_, table) = table();
        assert_eq!(table.evaluate(E::PHOT, E::GLAS), MoveOutcome::CoOccupy);
        assert_eq!(table.evaluate(E::PHOT, E::CLNE), MoveOutcome::CoOccupy);
        assert_eq!(table.evaluate(E::PHOT, E::METL), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(E::PHOT, E::NEUT), MoveOutcome::CoOccupy);
        assert_eq!(table.evaluate(E::PHOT, E::LCRY), MoveOutcome::Varies);
        assert_eq!(table.evaluate(E::NEUT, E::GLAS), MoveOutcome::CoOccupy);
        assert_eq!(table.evaluate(E::NEUT, E::WATR), MoveOutcome::Swap);
        assert_eq!(table.evaluate(E::NEUT, E::MERC), MoveOutcome::Swap);
        assert_eq!(table.evaluate(E::WATR, E::NEUT), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(E::PROT, E::METL), MoveOutcome::CoOccupy);
        assert_eq!(table.evaluate(E::PROT, E::DMND), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(E::ELEC, E::VIBR), MoveOutcome::Swap);
    }

    #[test]
    fn test_sinks_and_barriers() {
        let (_, table) = table();
        assert_eq!(table.evaluate(E::METL, E::BHOL), MoveOutcome::Swap);
        assert_eq!(table.evaluate(E::DUST, E::DMND), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(E::PHOT, E::DMND), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(E::DUST, E::STKM), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(E::DEST, E::STKM), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(E::DUST, E::VOID), MoveOutcome::Varies);
        assert_eq!(table.evaluate(E::DUST, E::INVIS), MoveOutcome::Varies);
        assert_eq!(table.evaluate(E::DUST, E::SAWD), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(E::RAZR, E::SAWD), MoveOutcome::Swap);
        assert_eq!(table.evaluate(E::ANAR, E::WHOL), MoveOutcome::Swap);
    }

    #[test]
    fn test_ragdoll_rows() {
        let (_, table) = table();
        assert_eq!(table.evaluate(E::STKM, E::NONE), MoveOutcome::CoOccupy);
        assert_eq!(table.evaluate(E::STKM, E::WATR), MoveOutcome::CoOccupy);
        assert_eq!(table.evaluate(E::STKM, E::GAS), MoveOutcome::CoOccupy);
        assert_eq!(table.evaluate(E::STKM, E::SPAWN), MoveOutcome::CoOccupy);
        assert_eq!(table.evaluate(E::STKM, E::DUST), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(E::STKM2, E::METL), MoveOutcome::Blocked);
    }

    #[test]
    fn test_out_of_range_ids_are_blocked() {
        let (_, table) = table();
        assert_eq!(table.evaluate(500, E::NONE), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(E::DUST, 500), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(u16::MAX, u16::MAX), MoveOutcome::Blocked);
    }

    #[test]
    fn test_unregistered_ids_are_blocked() {
        let mut elements = Elements::empty();
        elements.register(ElementDef {
            id: 1,
            name: "HEAVY".to_string(),
            weight: 90,
            properties: P::TYPE_PART,
            ..Default::default()
        });
        elements.register(ElementDef {
            id: 3,
            name: "LIGHT".to_string(),
            weight: 10,
            properties: P::TYPE_LIQUID,
            ..Default::default()
        });
        let table = MoveTable::build(&elements);
        assert_eq!(table.len(), 4);
        assert_eq!(table.evaluate(1, 3), MoveOutcome::Swap);
        assert_eq!(table.evaluate(1, 2), MoveOutcome::Blocked);
        assert_eq!(table.evaluate(2, 0), MoveOutcome::Blocked);
    }
}
