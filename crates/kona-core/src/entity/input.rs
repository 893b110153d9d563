//! Keyboard-style control of the player ragdolls

use super::ragdoll::{Ragdoll, RagdollCommand, RagdollId};
use crate::world::World;

/// Keys a ragdoll responds to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RagdollKey {
    Left,
    Right,
    /// Jump
    Up,
    /// Emit the carried element
    Down,
}

impl Ragdoll {
    pub fn press_key(&mut self, key: RagdollKey) {
        let command = match key {
            RagdollKey::Left => RagdollCommand::LEFT,
            RagdollKey::Right => RagdollCommand::RIGHT,
            RagdollKey::Up => RagdollCommand::JUMP,
            RagdollKey::Down => RagdollCommand::SPAWN,
        };
        self.comm.insert(command);
    }

    /// Releasing a horizontal key remembers the last direction in `pcomm`
    pub fn release_key(&mut self, key: RagdollKey) {
        match key {
            RagdollKey::Left | RagdollKey::Right => {
                self.pcomm = self.comm;
                self.comm.remove(RagdollCommand::LEFT | RagdollCommand::RIGHT);
            }
            RagdollKey::Up => self.comm.remove(RagdollCommand::JUMP),
            RagdollKey::Down => self.comm.remove(RagdollCommand::SPAWN),
        }
    }
}

impl World {
    pub fn press_key(&mut self, id: RagdollId, key: RagdollKey) {
        self.ragdoll_mut(id).press_key(key);
    }

    pub fn release_key(&mut self, id: RagdollId, key: RagdollKey) {
        self.ragdoll_mut(id).release_key(key);
    }
}
