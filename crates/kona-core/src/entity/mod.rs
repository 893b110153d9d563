pub mod input;
pub mod ragdoll;

pub use input::RagdollKey;
pub use ragdoll::{Leg, Ragdoll, RagdollCommand, RagdollId, RagdollSet, VerletPoint};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::ElementId;

    #[test]
    fn test_ragdoll_ids_round_trip_elements() {
        for id in [RagdollId::One, RagdollId::Two] {
            assert_eq!(RagdollId::for_element(id.element()), Some(id));
        }
        assert_eq!(RagdollId::for_element(ElementId::FIGH), None);
    }

    #[test]
    fn test_ragdoll_set_is_independent() {
        let mut set = RagdollSet::default();
        set.get_mut(RagdollId::Two).spawned = true;
        assert!(!set.get(RagdollId::One).spawned);
        assert!(set.get(RagdollId::Two).spawned);
    }
}
