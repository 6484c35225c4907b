//! Deterministic seeded pseudo-random generation.
//!
//! Reproducibility-oriented, not randomness-quality-oriented: the sequence
//! is a pure function of the seed string, so a stored seed replays a
//! planning run exactly. Not suitable for anything security-sensitive.

const LCG_MULTIPLIER: u64 = 9301;
const LCG_INCREMENT: u64 = 49297;
const LCG_MODULUS: u64 = 233_280;

/// A small linear-congruential generator seeded from a string.
///
/// The state is an explicit value threaded through calls; nothing global,
/// so the same seed yields the same sequence regardless of what else runs
/// in the process.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Build a generator from an arbitrary seed string.
    pub fn from_seed(seed: &str) -> Self {
        let mut hash: u64 = 0;
        for byte in seed.bytes() {
            hash = hash.wrapping_mul(31).wrapping_add(u64::from(byte));
        }
        Self {
            state: hash % LCG_MODULUS,
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.state as f64 / LCG_MODULUS as f64
    }

    /// Fisher-Yates shuffle driven by this generator.
    pub fn shuffle<T>(&mut self, xs: &mut [T]) {
        for i in (1..xs.len()).rev() {
            let j = (self.next_f64() * (i as f64 + 1.0)) as usize;
            xs.swap(i, j.min(i));
        }
    }
}
