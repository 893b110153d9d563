//! Fixed-capacity particle array with an intrusive free list

use crate::simulation::Particle;

/// End-of-list marker for the free list
const FREE_END: i32 = -1;

/// Particle records plus free-list bookkeeping
///
/// Freed slots have `element == 0` and store the index of the next free slot
/// in `life`, so allocation and release are both O(1).
#[derive(Clone, Debug)]
pub struct ParticleStore {
    parts: Vec<Particle>,
    free_head: i32,
    /// One past the highest slot that may be live
    last_active: usize,
    live: usize,
}

impl ParticleStore {
    pub fn new(capacity: usize) -> Self {
        let mut store = Self {
            parts: vec![Particle::EMPTY; capacity],
            free_head: FREE_END,
            last_active: 0,
            live: 0,
        };
        store.rebuild_free_list();
        store
    }

    fn rebuild_free_list(&mut self) {
        let capacity = self.parts.len();
        for (index, part) in self.parts.iter_mut().enumerate() {
            *part = Particle::EMPTY;
            part.life = if index + 1 < capacity {
                (index + 1) as i32
            } else {
                FREE_END
            };
        }
        self.free_head = if capacity > 0 { 0 } else { FREE_END };
        self.last_active = 0;
        self.live = 0;
    }

    pub fn capacity(&self) -> usize {
        self.parts.len()
    }

    /// Number of live particles
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Iteration bound: no live particle has an index at or above this
    pub fn last_active(&self) -> usize {
        self.last_active
    }

    /// Take a free slot and write `particle` into it
    ///
    /// Returns `None` when the store is full; callers drop the effect.
    pub fn alloc(&mut self, particle: Particle) -> Option<usize> {
        debug_assert!(particle.is_live(), "allocating a particle without an element");
        if self.free_head == FREE_END {
            return None;
        }
        let index = self.free_head as usize;
        self.free_head = self.parts[index].life;
        self.parts[index] = particle;
        self.live += 1;
        if index + 1 > self.last_active {
            self.last_active = index + 1;
        }
        Some(index)
    }

    /// Return a slot to the free list
    ///
    /// Freeing an already-free slot is a no-op and returns false.
    pub fn free(&mut self, index: usize) -> bool {
        let Some(part) = self.parts.get_mut(index) else {
            return false;
        };
        if !part.is_live() {
            return false;
        }
        *part = Particle::EMPTY;
        part.life = self.free_head;
        self.free_head = index as i32;
        self.live -= 1;
        true
    }

    /// Shrink `last_active` past trailing free slots
    pub fn recalc_last_active(&mut self) {
        while self.last_active > 0 && !self.parts[self.last_active - 1].is_live() {
            self.last_active -= 1;
        }
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.parts.get(index).filter(|part| part.is_live())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.parts.get_mut(index).filter(|part| part.is_live())
    }

    pub fn is_live(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Element of a slot (0 for free or out of range)
    pub fn element(&self, index: usize) -> u16 {
        self.get(index).map_or(0, |part| part.element)
    }

    /// Live particles in index order
    pub fn iter_live(&self) -> impl Iterator<Item = (usize, &Particle)> {
        self.parts[..self.last_active]
            .iter()
            .enumerate()
            .filter(|(_, part)| part.is_live())
    }

    /// Free every slot
    pub fn clear(&mut self) {
        self.rebuild_free_list();
    }
}
