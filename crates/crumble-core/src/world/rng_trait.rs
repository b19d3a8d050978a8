//! RNG trait abstraction for the cell rules
//!
//! Rules only ever need a coin flip, a unit float and a float range, so they
//! take `&mut impl WorldRng` instead of a concrete generator:
//! - `FastRng` (xorshift32) in the running world
//! - seeded `rand` generators or scripted doubles in tests

/// Random number source used by the simulation
pub trait WorldRng {
    /// Random boolean with 50% probability
    fn gen_bool(&mut self) -> bool;

    /// Random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// True with the given probability
    fn check_probability(&mut self, probability: f32) -> bool {
        self.gen_f32() < probability
    }

    /// Uniform f32 in [min, max)
    fn gen_range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + self.gen_f32() * (max - min)
    }

    /// Either -1 or +1, picked as `gen_f32() > 0.5`
    fn gen_direction(&mut self) -> i32 {
        if self.gen_f32() > 0.5 { 1 } else { -1 }
    }
}

// Blanket implementation for any type implementing rand::Rng, FastRng included
impl<T: ?Sized + rand::Rng> WorldRng for T {
    fn gen_bool(&mut self) -> bool {
        rand::Rng::r#gen(self)
    }

    fn gen_f32(&mut self) -> f32 {
        rand::Rng::r#gen(self)
    }
}
