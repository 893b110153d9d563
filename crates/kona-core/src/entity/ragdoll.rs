//! Stick-figure ragdolls driven by STKM and STKM2 particles
//!
//! The owning particle is the head. Each leg is a knee and a foot, both verlet
//! points, integrated once per tick from the owner's update hook. The ragdoll
//! keeps a back-reference to its owner; the particle itself carries nothing
//! ragdoll-specific apart from the carried element in `ctype`.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::simulation::{
    ElementId as E, ElementProperties, Elements, Falldown, Particle, clamp_temp,
};
use crate::world::{
    CELL, HookOutcome, MoveOutcome, WallType, World, WorldRng, cell_of, round_to_cell,
    void_accepts,
};

/// Verlet time step
const DT: f32 = 0.9;

const ROCKET_HEAD: f32 = 0.35;
const ROCKET_FEET: f32 = 0.15;
/// Stronger vertical thrust, enough to beat gravity
const ROCKET_HEAD_V: f32 = 0.3;
const ROCKET_FEET_V: f32 = 0.45;

/// Pressure that tears apart a ragdoll without a fan
const LETHAL_PRESSURE: f32 = 4.5;
const MAX_LIFE: i32 = 100;
/// Frames between two lightning bolts
const LIGHTNING_COOLDOWN: u32 = 30;
const LIGHTNING_POWER: i32 = 100;

bitflags! {
    /// Movement intent
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RagdollCommand: u8 {
        const LEFT = 1;
        const RIGHT = 2;
        const JUMP = 4;
        const SPAWN = 8;
    }
}

/// A joint with its current and previous sample
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VerletPoint {
    pub pos: Vec2,
    pub prev: Vec2,
    /// Acceleration consumed by the next integration
    pub acc: Vec2,
}

impl VerletPoint {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            prev: pos,
            acc: Vec2::ZERO,
        }
    }

    /// One verlet step with `extra` added to the accumulated acceleration
    pub fn integrate(&mut self, extra: Vec2) {
        let next = 2.0 * self.pos - self.prev + (self.acc + extra) * DT * DT;
        self.prev = self.pos;
        self.pos = next;
        self.acc = Vec2::ZERO;
    }

    pub fn revert(&mut self) {
        self.pos = self.prev;
    }

    pub fn swap_samples(&mut self) {
        std::mem::swap(&mut self.pos, &mut self.prev);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub knee: VerletPoint,
    pub foot: VerletPoint,
}

/// Persistent state of one player ragdoll
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ragdoll {
    /// Particle acting as the head
    pub owner: Option<usize>,
    pub legs: [Leg; 2],
    pub comm: RagdollCommand,
    /// Last command before the horizontal keys were released
    pub pcomm: RagdollCommand,
    /// Element the ragdoll is made of and emits
    pub element: u16,
    pub rocket_boots: bool,
    /// Emit air instead of particles
    pub fan: bool,
    /// Frames since the last emission
    pub frames: u32,
    /// A body exists, live or parked in a portal
    pub spawned: bool,
}

impl Default for Ragdoll {
    fn default() -> Self {
        Self {
            owner: None,
            legs: [Leg::default(); 2],
            comm: RagdollCommand::empty(),
            pcomm: RagdollCommand::empty(),
            element: E::DUST,
            rocket_boots: false,
            fan: false,
            frames: 0,
            spawned: false,
        }
    }
}

impl Ragdoll {
    /// Bind to a new head and stand the legs up beneath it
    pub fn init_legs(&mut self, owner: usize, head: Vec2) {
        let c = cell_of(head.x, head.y).as_vec2();
        self.owner = Some(owner);
        self.legs = [
            Leg {
                knee: VerletPoint::at(c + Vec2::new(-1.0, 6.0)),
                foot: VerletPoint::at(c + Vec2::new(-3.0, 12.0)),
            },
            Leg {
                knee: VerletPoint::at(c + Vec2::new(1.0, 6.0)),
                foot: VerletPoint::at(c + Vec2::new(3.0, 12.0)),
            },
        ];
        self.comm = RagdollCommand::empty();
        self.pcomm = RagdollCommand::empty();
        self.frames = 0;
        self.rocket_boots = false;
        self.fan = false;
    }

    /// Take on an element the ragdoll touched, if it is one it can carry
    pub fn set_element(&mut self, elements: &Elements, element: u16) {
        if !elements.is_element(element as i32) {
            return;
        }
        let def = elements.get(element);
        let carriable = def.falldown != Falldown::Static
            || def.is_gas()
            || def.is_liquid()
            || def.is_energy()
            || element == E::LOLZ
            || element == E::LOVE;
        if carriable && !(self.rocket_boots && element == E::PLSM) {
            self.element = element;
            self.fan = false;
        }
        if element == E::TESC || element == E::LIGH {
            self.element = E::LIGH;
            self.fan = false;
        }
    }

    fn facing(&self) -> i32 {
        self.pcomm.contains(RagdollCommand::RIGHT) as i32
            - self.pcomm.contains(RagdollCommand::LEFT) as i32
    }
}

/// Which of the two player ragdolls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RagdollId {
    One,
    Two,
}

impl RagdollId {
    pub fn for_element(element: u16) -> Option<Self> {
        match element {
            E::STKM => Some(RagdollId::One),
            E::STKM2 => Some(RagdollId::Two),
            _ => None,
        }
    }

    pub fn element(self) -> u16 {
        match self {
            RagdollId::One => E::STKM,
            RagdollId::Two => E::STKM2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RagdollSet {
    one: Ragdoll,
    two: Ragdoll,
}

impl RagdollSet {
    pub fn get(&self, id: RagdollId) -> &Ragdoll {
        match id {
            RagdollId::One => &self.one,
            RagdollId::Two => &self.two,
        }
    }

    pub fn get_mut(&mut self, id: RagdollId) -> &mut Ragdoll {
        match id {
            RagdollId::One => &mut self.one,
            RagdollId::Two => &mut self.two,
        }
    }
}

/// What became of the head during a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fate {
    Alive,
    Died,
    /// Stored in a portal, the body lives on
    Parked,
}

/// Update hook of STKM and STKM2
pub(crate) fn run_ragdoll(world: &mut World, index: usize, rng: &mut dyn WorldRng) -> HookOutcome {
    let Some(head) = world.particle(index).copied() else {
        return HookOutcome::Killed;
    };
    let Some(id) = RagdollId::for_element(head.element) else {
        return HookOutcome::Continue;
    };

    let mut body = *world.ragdoll(id);
    let outcome = match drive(world, &mut body, head, index, rng) {
        Fate::Alive => HookOutcome::Continue,
        Fate::Died => {
            log::debug!("Ragdoll {:?} died at ({}, {})", id, head.x, head.y);
            body.spawned = false;
            body.owner = None;
            HookOutcome::Killed
        }
        Fate::Parked => {
            log::debug!("Ragdoll {:?} entered a portal", id);
            body.spawned = true;
            body.owner = None;
            HookOutcome::Killed
        }
    };
    *world.ragdoll_mut(id) = body;
    outcome
}

/// Change-type hook: a particle turning into a ragdoll element binds the
/// ragdoll, one turning away releases it
pub(crate) fn ragdoll_change_type(world: &mut World, index: usize, from: u16, to: u16) {
    if from == to {
        return;
    }
    if let Some(id) = RagdollId::for_element(from) {
        let body = world.ragdoll_mut(id);
        body.spawned = false;
        body.owner = None;
    }
    if let Some(id) = RagdollId::for_element(to) {
        let Some(head) = world.particle(index).map(|p| Vec2::new(p.x, p.y)) else {
            return;
        };
        let body = world.ragdoll_mut(id);
        body.init_legs(index, head);
        body.spawned = true;
        log::debug!("Ragdoll {:?} bound to particle {}", id, index);
    }
}

/// Create-allowed hook: one body per player
pub(crate) fn ragdoll_create_allowed(world: &World, element: u16) -> bool {
    RagdollId::for_element(element)
        .map_or(true, |id| world.count(element) == 0 && !world.ragdoll(id).spawned)
}

/// The foot's cell is on the grid and would block the ragdoll
fn foot_blocked(world: &World, element: u16, foot: Vec2) -> bool {
    let cell = cell_of(foot.x, foot.y);
    world.grid().in_bounds(cell.x, cell.y)
        && world.eval_move(element, cell.x, cell.y).0 == MoveOutcome::Blocked
}

/// Unit axis for rocket thrust: against gravity, or against the velocity when
/// there is next to no gravity
fn rocket_axis(gravity: Vec2, velocity: Vec2) -> (Vec2, bool) {
    let mut axis = gravity;
    let mut low_gravity = false;
    if axis.abs().max_element() < 0.001 {
        low_gravity = true;
        axis = -velocity;
    }
    if axis.abs().max_element() < 0.001 {
        axis = Vec2::Y;
    }
    (axis.normalize(), low_gravity)
}

fn commit_head(world: &mut World, index: usize, head: &Particle) {
    if let Some(part) = world.particle_mut(index) {
        part.life = head.life;
        part.temp = clamp_temp(head.temp);
        part.vx = head.vx;
        part.vy = head.vy;
        part.ctype = head.ctype;
    }
}

/// Plasma puff from a rocket boot
fn exhaust(world: &mut World, foot: Vec2, dy: i32, velocity: Vec2, life: i32) {
    let cell = cell_of(foot.x, foot.y);
    if let Some(np) = world.create_particle(None, cell.x, cell.y + dy, E::PLSM) {
        if let Some(part) = world.particle_mut(np) {
            part.vx = velocity.x;
            part.vy = velocity.y;
            part.life += life;
        }
    }
}

fn drive(
    world: &mut World,
    body: &mut Ragdoll,
    mut head: Particle,
    index: usize,
    rng: &mut dyn WorldRng,
) -> Fate {
    let element = head.element;
    let cell = cell_of(head.x, head.y);
    let (x, y) = (cell.x, cell.y);

    // 1. Carried element
    if !body.fan && world.elements.is_element(head.ctype) {
        body.set_element(&world.elements, head.ctype as u16);
    }
    body.frames += 1;

    // 2. Temperature
    if head.temp < 243.0 {
        head.life -= 1;
    }
    if (243.0..309.6).contains(&head.temp) {
        head.temp += 1.0;
    }

    // 3. Death by injury or blast
    if head.life < 1 || (world.ambient.pressure(x, y) >= LETHAL_PRESSURE && !body.fan) {
        for r in -2..=1 {
            world.create_particle(None, x + r, y - 2, body.element);
            world.create_particle(None, x + r + 1, y + 2, body.element);
            world.create_particle(None, x - 2, y + r + 1, body.element);
            world.create_particle(None, x + 2, y + r, body.element);
        }
        world.kill_particle(index);
        return Fate::Died;
    }

    // 4. Gravity pulls the legs and lifts the head
    let g = world.gravity_at(Vec2::new(head.x, head.y));
    let (rb, low_gravity) = rocket_axis(g, Vec2::new(head.vx, head.vy));
    let mut v = Vec2::new(head.vx, head.vy) - g * DT;

    for leg in &mut body.legs {
        leg.knee.integrate(Vec2::ZERO);
        leg.foot.integrate(g);
    }

    // 5. Walking: push off with whichever foot trails
    let ground = (body.legs[0].foot.pos + body.legs[1].foot.pos) / 2.0 + Vec2::new(-g.y, g.x);
    let dl = ground.distance_squared(body.legs[0].foot.pos);
    let dr = ground.distance_squared(body.legs[1].foot.pos);

    if body.comm.contains(RagdollCommand::LEFT) {
        let foot = if dl > dr { 0 } else { 1 };
        if foot_blocked(world, element, body.legs[foot].foot.pos) {
            body.legs[foot].foot.acc = Vec2::new(-3.0 * g.y - 3.0 * g.x, 3.0 * g.x - 3.0 * g.y);
            body.legs[0].knee.acc = Vec2::new(-g.y, g.x);
        } else if body.rocket_boots {
            let thrust = Vec2::new(-rb.y, rb.x);
            v += thrust * ROCKET_HEAD;
            for leg in &mut body.legs {
                leg.foot.acc += thrust * ROCKET_FEET;
            }
            let both = body.comm.contains(RagdollCommand::RIGHT);
            for (n, leg) in body.legs.iter().enumerate() {
                if n == 1 && both {
                    continue;
                }
                exhaust(world, leg.foot.pos, 0, v + Vec2::new(rb.y, -rb.x) * 25.0, 30);
            }
        }
    }

    if body.comm.contains(RagdollCommand::RIGHT) {
        let foot = if dl < dr { 0 } else { 1 };
        if foot_blocked(world, element, body.legs[foot].foot.pos) {
            body.legs[foot].foot.acc = Vec2::new(3.0 * g.y - 3.0 * g.x, -3.0 * g.x - 3.0 * g.y);
            body.legs[0].knee.acc = Vec2::new(g.y, -g.x);
        } else if body.rocket_boots {
            let thrust = Vec2::new(rb.y, -rb.x);
            v += thrust * ROCKET_HEAD;
            for leg in &mut body.legs {
                leg.foot.acc += thrust * ROCKET_FEET;
            }
            let both = body.comm.contains(RagdollCommand::LEFT);
            for (n, leg) in body.legs.iter().enumerate() {
                if n == 0 && both {
                    continue;
                }
                exhaust(world, leg.foot.pos, 0, v + Vec2::new(-rb.y, rb.x) * 25.0, 30);
            }
        }
    }

    // Both directions at once brake the rockets
    if body.rocket_boots && body.comm.contains(RagdollCommand::LEFT | RagdollCommand::RIGHT) {
        v *= 0.5;
        for leg in &mut body.legs {
            leg.foot.acc = Vec2::ZERO;
        }
    }

    // 6. Jump
    if body.comm.contains(RagdollCommand::JUMP) {
        if body.rocket_boots {
            let (head_effect, feet_effect) = if low_gravity {
                (ROCKET_HEAD, ROCKET_FEET)
            } else {
                (ROCKET_HEAD_V, ROCKET_FEET_V)
            };
            v -= rb * head_effect;
            for leg in &mut body.legs {
                leg.foot.acc -= rb * feet_effect;
            }
            for leg in body.legs {
                exhaust(world, leg.foot.pos, 1, v + rb * 30.0, 10);
            }
        } else if foot_blocked(world, element, body.legs[0].foot.pos)
            || foot_blocked(world, element, body.legs[1].foot.pos)
        {
            v -= 4.0 * g;
            for leg in &mut body.legs {
                leg.foot.acc -= g;
            }
        }
    }

    // 7. Detector walls notice feet
    for leg in &body.legs {
        let foot = cell_of(leg.foot.pos.x, leg.foot.pos.y);
        if world.walls.wall_at(foot.x, foot.y) == WallType::Detector {
            world.walls.set_energized(foot.x, foot.y, true);
        }
    }

    // 8. Whatever the head touches
    for rx in -2..=2 {
        for ry in -2..=2 {
            let (sx, sy) = (x + rx, y + ry);
            if (rx == 0 && ry == 0) || !world.grid().in_bounds(sx, sy) {
                continue;
            }
            let mut r = world.occupant_at(sx, sy);
            if r.is_empty() {
                r = world.energy_at(sx, sy);
            }
            let wall = world.walls.wall_at(sx, sy);
            if r.is_empty() && wall == WallType::None {
                continue;
            }

            body.set_element(&world.elements, r.element);
            if r.element == E::PLNT && head.life < MAX_LIFE {
                head.life = (head.life + 5).min(MAX_LIFE);
                world.kill_particle(r.index());
            }
            if r.element == E::NEUT {
                head.life = if head.life <= MAX_LIFE {
                    head.life - (102 - head.life) / 2
                } else {
                    (head.life as f32 * 0.9) as i32
                };
                world.kill_particle(r.index());
            }
            match wall {
                WallType::Fan => body.fan = true,
                WallType::EHole => body.rocket_boots = false,
                WallType::Gravity => body.rocket_boots = true,
                _ => {}
            }
            if r.element == E::PRTI || r.element == E::PPTI {
                if let Some(fate) = interact(world, body, &mut head, index, sx, sy, rng) {
                    return fate;
                }
            }
        }
    }

    // 9. Emit the carried element ahead of the head
    let facing = body.facing();
    let rx = x + 3 * facing;
    let ry = if body.pcomm.is_empty() { y - 3 } else { y };
    if body.comm.contains(RagdollCommand::SPAWN) {
        let ry = ry - 2 * rng.between(1, 2);
        v = emit(world, body, v, rx, ry, g, rng);
    }

    // 10. Joint constraints
    for leg in &mut body.legs {
        let d = 25.0 / ((leg.knee.pos - leg.foot.pos).length_squared() + 25.0) - 0.5;
        leg.foot.pos -= (leg.knee.pos - leg.foot.pos) * d;
        leg.knee.pos += (leg.knee.pos - leg.foot.pos) * d;
    }
    let neck = Vec2::new(head.x, head.y);
    for leg in &mut body.legs {
        let d = 36.0 / ((leg.knee.pos - neck).length_squared() + 36.0) - 0.5;
        v -= (leg.knee.pos - neck) * d;
        leg.knee.pos += (leg.knee.pos - neck) * d;
    }

    // 11. Pop feet out of obstacles
    settle_feet(world, body, element);

    // 12. Keep the legs apart
    let side = Vec2::new(-g.y, g.x);
    if side != Vec2::ZERO {
        let push = side.normalize() * 0.2;
        if body.legs[0].foot.pos.distance_squared(body.legs[1].foot.pos) < 16.0 {
            body.legs[0].foot.acc -= push;
            body.legs[1].foot.acc += push;
        }
        if body.legs[0].knee.pos.distance_squared(body.legs[1].knee.pos) < 16.0 {
            body.legs[0].knee.acc -= push;
            body.legs[1].knee.acc += push;
        }
    }

    head.vx = v.x;
    head.vy = v.y;

    // 13. Whatever the feet stand in
    let feet = [body.legs[0].foot.pos, body.legs[1].foot.pos];
    let probes = [
        (round_to_cell(feet[0].x), round_to_cell(feet[0].y)),
        (round_to_cell(feet[1].x), round_to_cell(feet[1].y)),
        (round_to_cell(feet[0].x), feet[0].y.floor() as i32),
        (round_to_cell(feet[1].x), feet[1].y.floor() as i32),
    ];
    for (px, py) in probes {
        if let Some(fate) = interact(world, body, &mut head, index, px, py, rng) {
            return fate;
        }
    }

    head.ctype = body.element as i32;
    commit_head(world, index, &head);
    Fate::Alive
}

/// Revert feet that ended up in blocking cells; a foot still stuck after the
/// revert swaps its samples so it does not bounce back next tick
fn settle_feet(world: &World, body: &mut Ragdoll, element: u16) {
    for leg in &mut body.legs {
        if foot_blocked(world, element, leg.foot.pos) {
            leg.foot.revert();
        }
    }
    for leg in &mut body.legs {
        if foot_blocked(world, element, leg.foot.pos) {
            leg.foot.swap_samples();
        }
    }
}

/// Spawn command; returns the head velocity after recoil
fn emit(
    world: &mut World,
    body: &mut Ragdoll,
    mut v: Vec2,
    rx: i32,
    ry: i32,
    g: Vec2,
    rng: &mut dyn WorldRng,
) -> Vec2 {
    let facing = body.facing();
    let target = world.occupant_at(rx, ry);
    if world.elements.get(target.element).is_solid() {
        if !target.is_empty() {
            world.spark_conductive_attempt(target.index());
        }
        body.frames = 0;
        return v;
    }

    let created = if body.fan {
        let cx = rx + 3 * facing;
        let cell = CELL as i32;
        for j in -4..=4 {
            for k in -4..=4 {
                let (px, py) = (cx + j, ry + k);
                world.ambient.add_pressure(px, py, 0.03);
                world.ambient.add_pressure(px, py + cell, 0.03);
                world.ambient.add_pressure(px + cell, py, 0.03);
                world.ambient.add_pressure(px + cell, py + cell, 0.03);
            }
        }
        None
    } else if body.element == E::LIGH && body.frames < LIGHTNING_COOLDOWN {
        None
    } else {
        world.create_particle(None, rx, ry, body.element)
    };
    let Some(np) = created else {
        return v;
    };

    if body.element == E::PHOT {
        let speed = rng.between(-1, 1).abs() * 3;
        if speed == 0 {
            world.kill_particle(np);
        } else if let Some(part) = world.particle_mut(np) {
            part.vy = 0.0;
            part.vx = if body.pcomm.intersects(RagdollCommand::LEFT | RagdollCommand::RIGHT) {
                (facing * speed) as f32
            } else {
                speed as f32
            };
        }
    } else if body.element == E::LIGH {
        let mut angle = if g != Vec2::ZERO {
            g.x.atan2(g.y).to_degrees()
        } else {
            rng.between(0, 359) as f32
        };
        if body.pcomm.contains(RagdollCommand::LEFT) {
            angle += 180.0;
        }
        if angle > 360.0 {
            angle -= 360.0;
        }
        if angle < 0.0 {
            angle += 360.0;
        }
        let life = rng.between(0, 1 + LIGHTNING_POWER / 15) + LIGHTNING_POWER / 7;
        if let Some(part) = world.particle_mut(np) {
            part.tmp = angle as i32;
            part.life = life;
            part.temp = clamp_temp(life as f32 * LIGHTNING_POWER as f32 / 2.5);
            part.tmp2 = 1;
        }
    } else {
        let weight = world.elements.get(body.element).weight as f32;
        let push = 5.0 * facing as f32;
        if let Some(part) = world.particle_mut(np) {
            part.vx += g.y * push;
            part.vy -= g.x * push;
            v.x -= weight * part.vx / 1000.0;
        }
    }
    body.frames = 0;
    v
}

/// Effects of whatever sits at `(x, y)` on the ragdoll
fn interact(
    world: &mut World,
    body: &mut Ragdoll,
    head: &mut Particle,
    index: usize,
    x: i32,
    y: i32,
    rng: &mut dyn WorldRng,
) -> Option<Fate> {
    if !world.grid().in_bounds(x, y) {
        return None;
    }
    let r = world.occupant_at(x, y);
    let target = world.particle(r.index()).copied().filter(|_| !r.is_empty())?;
    let def = world.elements.get(r.element);
    let deadly = def.has(ElementProperties::DEADLY);
    let radioactive = def.has(ElementProperties::RADIOACTIVE);

    if r.element == E::SPRK && body.element != E::LIGH {
        head.life -= rng.between(32, 51);
    }

    let extreme = (body.element != E::LIGH && target.temp >= 323.0) || target.temp <= 243.0;
    if world.conducts_heat(r.index())
        && extreme
        && !(body.rocket_boots && r.element == E::PLSM)
    {
        head.life -= 2;
        body.legs[0].foot.acc.y -= 1.0;
    }

    if deadly {
        head.life -= if r.element == E::ACID { 5 } else { 1 };
    }
    if radioactive {
        head.life -= 1;
    }

    if r.element == E::PRTI || r.element == E::PPTI {
        commit_head(world, index, head);
        if let Some(channel) = world.portal_channel_of(r.index()) {
            // Slot 1 comes back out straight below the outlet
            if world.store_in_portal(index, channel, 1).is_ok() {
                return Some(Fate::Parked);
            }
        }
    }

    if r.element == E::BHOL || r.element == E::NBHL {
        if !world.legacy_mode() {
            if let Some(hole) = world.particle_mut(r.index()) {
                hole.temp = clamp_temp(hole.temp + head.temp / 2.0);
            }
        }
        world.kill_particle(index);
        return Some(Fate::Died);
    }

    let open_void = r.element == E::VOID || (r.element == E::PVOD && target.life == 10);
    if open_void && void_accepts(&target, head.element) {
        world.kill_particle(index);
        return Some(Fate::Died);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::world::NoopStats;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn world() -> World {
        World::new(&SimConfig::small(64, 64))
    }

    fn rng() -> Xoshiro256StarStar {
        Xoshiro256StarStar::seed_from_u64(7)
    }

    fn floor(world: &mut World, y: i32) {
        for fy in y..y + 3 {
            for fx in 10..54 {
                world.create_particle(None, fx, fy, E::METL);
            }
        }
    }

    #[test]
    fn test_verlet_integration() {
        let mut point = VerletPoint::at(Vec2::new(5.0, 5.0));
        point.acc = Vec2::new(1.0, 0.0);
        point.integrate(Vec2::new(0.0, 1.0));
        assert!((point.pos - Vec2::new(5.81, 5.81)).length() < 1e-5);
        assert_eq!(point.prev, Vec2::new(5.0, 5.0));
        assert_eq!(point.acc, Vec2::ZERO);

        point.swap_samples();
        assert_eq!(point.pos, Vec2::new(5.0, 5.0));
        point.revert();
        assert!((point.pos - Vec2::new(5.81, 5.81)).length() < 1e-5);
    }

    #[test]
    fn test_create_binds_owner_and_legs() {
        let mut world = world();
        let head = world.create_particle(None, 30, 30, E::STKM).expect("stickman");
        let body = world.ragdoll(RagdollId::One);
        assert!(body.spawned);
        assert_eq!(body.owner, Some(head));
        assert_eq!(body.legs[0].knee.pos, Vec2::new(29.0, 36.0));
        assert_eq!(body.legs[0].foot.pos, Vec2::new(27.0, 42.0));
        assert_eq!(body.legs[1].foot.pos, Vec2::new(33.0, 42.0));
        assert!(!world.ragdoll(RagdollId::Two).spawned);
    }

    #[test]
    fn test_one_body_per_player() {
        let mut world = world();
        assert!(world.create_particle(None, 20, 20, E::STKM).is_some());
        assert!(world.create_particle(None, 40, 20, E::STKM).is_none());
        assert!(world.create_particle(None, 40, 20, E::STKM2).is_some());
        assert_eq!(world.count(E::STKM), 1);
    }

    #[test]
    fn test_kill_releases_body() {
        let mut world = world();
        let head = world.create_particle(None, 20, 20, E::STKM).expect("stickman");
        world.kill_particle(head);
        let body = world.ragdoll(RagdollId::One);
        assert!(!body.spawned);
        assert_eq!(body.owner, None);
        assert!(world.create_particle(None, 30, 20, E::STKM).is_some());
    }

    #[test]
    fn test_change_type_away_releases_body() {
        let mut world = world();
        let head = world.create_particle(None, 20, 20, E::STKM).expect("stickman");
        assert!(world.change_type(head, E::DUST));
        assert!(!world.ragdoll(RagdollId::One).spawned);
    }

    #[test]
    fn test_set_element_rules() {
        let elements = Elements::new();
        let mut body = Ragdoll::default();
        assert_eq!(body.element, E::DUST);

        body.set_element(&elements, E::WATR);
        assert_eq!(body.element, E::WATR);

        body.set_element(&elements, E::METL);
        assert_eq!(body.element, E::WATR);

        body.rocket_boots = true;
        body.set_element(&elements, E::PLSM);
        assert_eq!(body.element, E::WATR);

        body.fan = true;
        body.set_element(&elements, E::TESC);
        assert_eq!(body.element, E::LIGH);
        assert!(!body.fan);
    }

    #[test]
    fn test_rocket_axis() {
        let (axis, low) = rocket_axis(Vec2::new(0.0, 2.0), Vec2::ZERO);
        assert_eq!(axis, Vec2::Y);
        assert!(!low);

        let (axis, low) = rocket_axis(Vec2::ZERO, Vec2::new(3.0, 0.0));
        assert_eq!(axis, Vec2::new(-1.0, 0.0));
        assert!(low);

        let (axis, _) = rocket_axis(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(axis, Vec2::Y);
    }

    #[test]
    fn test_blocked_foot_stays_put() {
        let mut world = world();
        world.create_particle(None, 20, 20, E::METL);
        let mut body = Ragdoll::default();
        body.legs[0].foot = VerletPoint {
            pos: Vec2::new(20.0, 20.0),
            prev: Vec2::new(20.0, 19.0),
            acc: Vec2::ZERO,
        };
        body.legs[1].foot = VerletPoint::at(Vec2::new(30.0, 19.0));

        settle_feet(&world, &mut body, E::STKM);
        assert_eq!(body.legs[0].foot.pos, Vec2::new(20.0, 19.0));

        // Gravity keeps pressing the foot into the metal; it must not jitter
        for _ in 0..5 {
            body.legs[0].foot.integrate(Vec2::Y);
            settle_feet(&world, &mut body, E::STKM);
            assert_eq!(body.legs[0].foot.pos, Vec2::new(20.0, 19.0));
            assert_eq!(body.legs[0].foot.prev, Vec2::new(20.0, 19.0));
        }
    }

    #[test]
    fn test_death_scatters_carried_element() {
        let mut world = world();
        let head = world.create_particle(None, 30, 30, E::STKM).expect("stickman");
        if let Some(part) = world.particle_mut(head) {
            part.life = 0;
            part.ctype = E::SAND as i32;
        }
        let outcome = run_ragdoll(&mut world, head, &mut rng());
        assert_eq!(outcome, HookOutcome::Killed);
        assert_eq!(world.count(E::STKM), 0);
        assert_eq!(world.count(E::SAND), 16);
        assert!(!world.ragdoll(RagdollId::One).spawned);
    }

    #[test]
    fn test_pressure_kills_without_fan() {
        let mut world = world();
        let head = world.create_particle(None, 30, 30, E::STKM).expect("stickman");
        world.ambient.set_pressure(30, 30, 5.0);
        world.ragdoll_mut(RagdollId::One).fan = true;
        assert_eq!(run_ragdoll(&mut world, head, &mut rng()), HookOutcome::Continue);

        world.ragdoll_mut(RagdollId::One).fan = false;
        assert_eq!(run_ragdoll(&mut world, head, &mut rng()), HookOutcome::Killed);
    }

    #[test]
    fn test_jump_needs_ground() {
        let head_vy = |jump: bool| {
            let mut world = world();
            floor(&mut world, 42);
            let head = world.create_particle(None, 30, 29, E::STKM).expect("stickman");
            if jump {
                world.press_key(RagdollId::One, crate::entity::RagdollKey::Up);
            }
            run_ragdoll(&mut world, head, &mut rng());
            world.particle(head).map(|p| p.vy).expect("alive")
        };
        assert!(head_vy(true) < head_vy(false) - 3.0);

        // No floor, no jump
        let mut world = world();
        let head = world.create_particle(None, 30, 20, E::STKM).expect("stickman");
        world.press_key(RagdollId::One, crate::entity::RagdollKey::Up);
        run_ragdoll(&mut world, head, &mut rng());
        let vy = world.particle(head).map(|p| p.vy).expect("alive");
        assert!(vy > -3.0);
    }

    #[test]
    fn test_plant_heals_and_neutron_hurts() {
        let mut world = world();
        let head = world.create_particle(None, 30, 30, E::STKM).expect("stickman");
        world.create_particle(None, 31, 29, E::PLNT);
        if let Some(part) = world.particle_mut(head) {
            part.life = 50;
        }
        run_ragdoll(&mut world, head, &mut rng());
        assert_eq!(world.particle(head).map(|p| p.life), Some(55));
        assert_eq!(world.count(E::PLNT), 0);

        world.create_particle(None, 29, 31, E::NEUT);
        run_ragdoll(&mut world, head, &mut rng());
        assert_eq!(world.particle(head).map(|p| p.life), Some(55 - (102 - 55) / 2));
        assert_eq!(world.count(E::NEUT), 0);
    }

    #[test]
    fn test_fan_and_gravity_walls() {
        let mut world = world();
        let head = world.create_particle(None, 30, 30, E::STKM).expect("stickman");
        world.walls.set_wall(32, 32, WallType::Gravity);
        run_ragdoll(&mut world, head, &mut rng());
        assert!(world.ragdoll(RagdollId::One).rocket_boots);

        world.walls.set_wall(32, 32, WallType::Fan);
        run_ragdoll(&mut world, head, &mut rng());
        assert!(world.ragdoll(RagdollId::One).fan);
    }

    #[test]
    fn test_spawn_emits_carried_element() {
        let mut world = world();
        let head = world.create_particle(None, 30, 30, E::STKM).expect("stickman");
        world.ragdoll_mut(RagdollId::One).element = E::WATR;
        world.press_key(RagdollId::One, crate::entity::RagdollKey::Down);
        run_ragdoll(&mut world, head, &mut rng());
        assert_eq!(world.count(E::WATR), 1);
        assert_eq!(world.ragdoll(RagdollId::One).frames, 0);
        assert_eq!(world.particle(head).map(|p| p.ctype), Some(E::WATR as i32));
    }

    #[test]
    fn test_foot_in_portal_parks_body() {
        let mut world = world();
        world.create_particle(None, 27, 41, E::PRTI);
        world.create_particle(None, 30, 29, E::STKM).expect("stickman");
        world.step(&mut NoopStats, &mut rng());

        assert_eq!(world.count(E::STKM), 0);
        assert_eq!(world.portals().total_stored(), 1);
        let body = world.ragdoll(RagdollId::One);
        assert!(body.spawned);
        assert_eq!(body.owner, None);
        assert!(world.create_particle(None, 40, 20, E::STKM).is_none());
    }

    #[test]
    fn test_black_hole_swallows_ragdoll() {
        let mut world = world();
        let hole = world.create_particle(None, 27, 42, E::BHOL).expect("hole");
        let head = world.create_particle(None, 30, 30, E::STKM).expect("stickman");
        let before = world.particle(hole).map(|p| p.temp).expect("hole");

        let mut body = *world.ragdoll(RagdollId::One);
        let mut part = *world.particle(head).expect("head");
        let fate = interact(&mut world, &mut body, &mut part, head, 27, 42, &mut rng());
        assert_eq!(fate, Some(Fate::Died));
        assert_eq!(world.count(E::STKM), 0);
        let after = world.particle(hole).map(|p| p.temp).expect("hole");
        assert!(after > before);
    }
}
