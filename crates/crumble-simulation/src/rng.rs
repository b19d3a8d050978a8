//! Small xorshift32 generator used for all per-cell randomness
//!
//! Cell rules draw several random numbers per cell per tick, so the generator
//! has to be a handful of shifts. It plugs into `rand` through `RngCore` and
//! `SeedableRng`, which means every `rand::Rng` helper works on it.

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Seed used when none is given, or when the given seed is zero
pub const DEFAULT_SEED: u32 = 123_456_789;

/// xorshift32 state. Never zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastRng {
    state: u32,
}

impl FastRng {
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 { DEFAULT_SEED } else { seed };
        Self { state }
    }

    #[inline]
    fn advance(&mut self) -> u32 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        self.state = s;
        s
    }

    /// Uniform float in `[0, 1)` built from the low 24 bits of the next state
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.advance() & 0x00FF_FFFF) as f32 / 16_777_216.0
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for FastRng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl RngCore for FastRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.advance()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = self.advance() as u64;
        let hi = self.advance() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.advance().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for FastRng {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new((state ^ (state >> 32)) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_zero_seed_falls_back() {
        assert_eq!(FastRng::new(0), FastRng::new(DEFAULT_SEED));
        assert_eq!(FastRng::from_seed([0; 4]).state(), DEFAULT_SEED);
    }

    #[test]
    fn test_known_first_value() {
        let mut rng = FastRng::new(1);
        // 1 ^ (1 << 13) = 8193; 8193 ^ (8193 >> 17) = 8193; 8193 ^ (8193 << 5) = 270369
        assert_eq!(rng.next_u32(), 270_369);
    }

    #[test]
    fn test_state_never_zero() {
        let mut rng = FastRng::default();
        for _ in 0..10_000 {
            assert_ne!(rng.next_u32(), 0);
        }
    }

    #[test]
    fn test_next_f32_range() {
        let mut rng = FastRng::new(42);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_works_with_rand_helpers() {
        let mut rng = FastRng::new(7);
        for _ in 0..100 {
            let v: i32 = rng.gen_range(-3..=3);
            assert!((-3..=3).contains(&v));
        }
    }

    #[test]
    fn test_deterministic() {
        let mut a = FastRng::new(99);
        let mut b = FastRng::new(99);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }
}
