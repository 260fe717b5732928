//! Deterministic random number generation for the metric walk.
//!
//! RULE: The simulator never calls a platform RNG. All draws flow
//! through a WalkRng derived from the single master seed, so a run is
//! fully reproducible from its seed.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::types::Seed;

pub struct WalkRng {
    inner: Pcg64Mcg,
}

impl WalkRng {
    pub fn new(master_seed: Seed) -> Self {
        let derived = master_seed ^ 0x9e37_79b9_7f4a_7c15;
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived),
        }
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Draw an i64 in [lo, hi]. Both endpoints are included.
    pub fn next_i64_in(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "empty range: {lo}..={hi}");
        let span = (hi - lo) as u64 + 1;
        lo + (self.next_u64() % span) as i64
    }
}
