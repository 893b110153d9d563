//! RNG trait abstraction for the simulation
//!
//! Movement, reactions and ragdolls draw randomness through this trait so
//! tests can pass a seeded `Xoshiro256StarStar` (or a scripted stub) and
//! hosts can use whatever generator they own.

/// Random number generator trait for the simulation
pub trait WorldRng {
    /// Generate random boolean with 50% probability
    fn gen_bool(&mut self) -> bool;

    /// Generate random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// Uniform integer in `[low, high]` (inclusive)
    fn between(&mut self, low: i32, high: i32) -> i32;

    /// Check if random value is less than probability threshold
    fn check_probability(&mut self, probability: f32) -> bool {
        self.gen_f32() < probability
    }

    /// True with probability `numerator / denominator`
    fn chance(&mut self, numerator: i32, denominator: i32) -> bool {
        if denominator <= 0 {
            return false;
        }
        self.between(0, denominator - 1) < numerator
    }
}

// Blanket implementation for any type implementing rand::Rng
impl<T: ?Sized + rand::Rng> WorldRng for T {
    fn gen_bool(&mut self) -> bool {
        rand::Rng::r#gen(self)
    }

    fn gen_f32(&mut self) -> f32 {
        rand::Rng::r#gen(self)
    }

    fn between(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        rand::Rng::gen_range(self, low..=high)
    }
}
