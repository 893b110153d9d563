//! Simulation statistics collection trait

/// Trait for collecting simulation statistics
///
/// The tick driver reports through this trait so hosts can plug in their own
/// collectors without the core depending on them.
pub trait SimStats {
    /// Record that a particle changed cell
    fn record_particle_moved(&mut self);

    /// Record that a particle died (life ran out, left the world, reaction)
    fn record_particle_killed(&mut self);

    /// Record that a particle was consumed by a move (sink, portal, reaction)
    fn record_particle_absorbed(&mut self);

    /// Record that a contact reaction fired
    fn record_reaction(&mut self);
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl SimStats for NoopStats {
    fn record_particle_moved(&mut self) {}
    fn record_particle_killed(&mut self) {}
    fn record_particle_absorbed(&mut self) {}
    fn record_reaction(&mut self) {}
}

/// Plain counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountingStats {
    pub moved: u64,
    pub killed: u64,
    pub absorbed: u64,
    pub reactions: u64,
}

impl SimStats for CountingStats {
    fn record_particle_moved(&mut self) {
        self.moved += 1;
    }

    fn record_particle_killed(&mut self) {
        self.killed += 1;
    }

    fn record_particle_absorbed(&mut self) {
        self.absorbed += 1;
    }

    fn record_reaction(&mut self) {
        self.reactions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_stats_record() {
        let mut stats = NoopStats;
        // Should do nothing without panicking
        stats.record_particle_moved();
        stats.record_particle_killed();
        stats.record_particle_absorbed();
        stats.record_reaction();
    }

    #[test]
    fn test_counting_stats() {
        let mut stats = CountingStats::default();
        stats.record_particle_moved();
        stats.record_particle_moved();
        stats.record_particle_absorbed();
        stats.record_particle_killed();
        stats.record_reaction();

        assert_eq!(
            stats,
            CountingStats {
                moved: 2,
                killed: 1,
                absorbed: 1,
                reactions: 1
            }
        );
    }

    #[test]
    fn test_stats_as_trait_object() {
        let mut counting = CountingStats::default();
        {
            let stats: &mut dyn SimStats = &mut counting;
            stats.record_reaction();
        }
        assert_eq!(counting.reactions, 1);
    }
}
