// Deterministic PRNG shared by every price-path model.
//
// SplitMix64: period 2^64, good avalanche (adjacent seeds produce
// uncorrelated streams), passes BigCrush / PractRand. Replaces the
// 32-bit LCGs common in toy simulators, which have lattice artifacts
// and correlated output across adjacent seeds.

use std::f64::consts::PI;

/// Uniforms below this are floored before `ln()` so Box-Muller never sees
/// `ln(0)`. Per the numerical-edge-case policy, this is a specified
/// behavior, not an error path.
const UNIFORM_FLOOR: f64 = 1e-10;

pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        SplitMix64 { state: seed }
    }

    /// Advance state and return a 64-bit pseudo-random integer.
    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Uniform in \[0, 1), floored at `UNIFORM_FLOOR` to keep `ln()` finite.
    pub fn next_uniform(&mut self) -> f64 {
        let u = (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64);
        if u < UNIFORM_FLOOR {
            log::trace!("prng: floored uniform draw at {UNIFORM_FLOOR:e}");
            UNIFORM_FLOOR
        } else {
            u
        }
    }

    /// Standard normal via Box-Muller. Consumes two uniforms per call.
    pub fn next_normal(&mut self) -> f64 {
        let u1 = self.next_uniform();
        let u2 = self.next_uniform();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}
