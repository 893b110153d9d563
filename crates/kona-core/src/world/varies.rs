//! Runtime rules for `MoveOutcome::Varies`
//!
//! Pairs whose outcome depends on live particle state are marked `Varies` in
//! the move table and resolved here by a rule registered for the occupant's
//! element. A missing rule resolves to `Blocked`.

use super::move_table::MoveOutcome;
use crate::simulation::{ElementId as E, Particle};

/// Pressure an INVIS cell resists when its `tmp` is unset
pub const DEFAULT_PRESSURE_RESISTANCE: f32 = 4.0;

/// State a varies rule may consult
#[derive(Clone, Copy, Debug)]
pub struct VariesContext<'a> {
    /// Element of the moving particle
    pub mover: u16,
    /// Particle in the destination cell
    pub occupant: &'a Particle,
    /// Ambient pressure at the destination
    pub pressure: f32,
}

pub type VariesRule = fn(&VariesContext) -> MoveOutcome;

/// Varies rules keyed by occupant element
#[derive(Clone)]
pub struct VariesRules {
    rules: Vec<Option<VariesRule>>,
}

impl VariesRules {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Rules for the built-in elements
    pub fn with_defaults() -> Self {
        let mut rules = Self::empty();
        rules.register(E::LCRY, liquid_crystal);
        rules.register(E::GPMP, gravity_pump);
        rules.register(E::INVIS, pressure_wall);
        rules.register(E::PINV, powered_invisible);
        rules.register(E::PVOD, powered_void);
        rules.register(E::VOID, void);
        rules.register(E::SWCH, switch);
        rules.register(E::SPNG, sponge);
        rules
    }

    /// Register (or replace) the rule for an occupant element
    pub fn register(&mut self, occupant: u16, rule: VariesRule) {
        let index = occupant as usize;
        if self.rules.len() <= index {
            self.rules.resize(index + 1, None);
        }
        self.rules[index] = Some(rule);
    }

    pub fn has_rule(&self, occupant: u16) -> bool {
        self.rules
            .get(occupant as usize)
            .is_some_and(|rule| rule.is_some())
    }

    /// Resolve a varies outcome to Blocked, Swap or CoOccupy
    pub fn resolve(&self, ctx: &VariesContext) -> MoveOutcome {
        let outcome = self
            .rules
            .get(ctx.occupant.element as usize)
            .copied()
            .flatten()
            .map_or(MoveOutcome::Blocked, |rule| rule(ctx));

        if outcome == MoveOutcome::Varies {
            log::trace!(
                "Varies rule for element {} did not decide, blocking",
                ctx.occupant.element
            );
            return MoveOutcome::Blocked;
        }
        outcome
    }
}

impl Default for VariesRules {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn co_occupy_if(open: bool) -> MoveOutcome {
    if open {
        MoveOutcome::CoOccupy
    } else {
        MoveOutcome::Blocked
    }
}

/// Whether a void with this `ctype`/`tmp` filter eats the mover
pub fn void_accepts(occupant: &Particle, mover: u16) -> bool {
    occupant.ctype == 0 || (occupant.ctype == mover as i32) != (occupant.tmp & 1 != 0)
}

/// Pressure an INVIS particle withstands
pub fn pressure_resistance(occupant: &Particle) -> f32 {
    if occupant.tmp > 0 {
        occupant.tmp as f32
    } else {
        DEFAULT_PRESSURE_RESISTANCE
    }
}

fn liquid_crystal(ctx: &VariesContext) -> MoveOutcome {
    if ctx.mover != E::PHOT {
        return MoveOutcome::Blocked;
    }
    co_occupy_if(ctx.occupant.life > 5)
}

fn gravity_pump(ctx: &VariesContext) -> MoveOutcome {
    if ctx.mover != E::PHOT {
        return MoveOutcome::Blocked;
    }
    co_occupy_if(ctx.occupant.life < 10)
}

fn pressure_wall(ctx: &VariesContext) -> MoveOutcome {
    let resistance = pressure_resistance(ctx.occupant);
    co_occupy_if(ctx.pressure < -resistance || ctx.pressure > resistance)
}

fn powered_invisible(ctx: &VariesContext) -> MoveOutcome {
    co_occupy_if(ctx.occupant.life >= 10)
}

fn powered_void(ctx: &VariesContext) -> MoveOutcome {
    if ctx.occupant.life == 10 && void_accepts(ctx.occupant, ctx.mover) {
        MoveOutcome::Swap
    } else {
        MoveOutcome::Blocked
    }
}

fn void(ctx: &VariesContext) -> MoveOutcome {
    if void_accepts(ctx.occupant, ctx.mover) {
        MoveOutcome::Swap
    } else {
        MoveOutcome::Blocked
    }
}

fn switch(ctx: &VariesContext) -> MoveOutcome {
    if ctx.mover != E::TRON {
        return MoveOutcome::Blocked;
    }
    co_occupy_if(ctx.occupant.life >= 10)
}

fn sponge(ctx: &VariesContext) -> MoveOutcome {
    co_occupy_if(ctx.occupant.vx != 0.0 || ctx.occupant.vy != 0.0)
}
