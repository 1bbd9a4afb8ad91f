use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the random choices made while generating.
pub trait RandomSource {
    /// Uniform integer in the closed range `[min, max]`.
    fn int_in(&mut self, min: u64, max: u64) -> u64;

    /// Fair coin flip.
    fn coin(&mut self) -> bool;
}

impl<R: Rng> RandomSource for R {
    fn int_in(&mut self, min: u64, max: u64) -> u64 {
        self.gen_range(min..=max)
    }

    fn coin(&mut self) -> bool {
        self.gen_bool(0.5)
    }
}

/// The seed shared by every fixed-seed generation in this process.
///
/// This is the one piece of global state in the crate. It is computed on
/// first use and never changes afterwards.
pub fn process_seed() -> u64 {
    static SEED: OnceLock<u64> = OnceLock::new();
    *SEED.get_or_init(|| {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let seed = rand::thread_rng().gen_range(0..=1u64 << 16) + now;
        seed.wrapping_mul(seed) % 94_906_249
    })
}

/// A generator seeded from [`process_seed`], so it replays the same choices
/// every time it is created within one process.
pub fn fixed_rng() -> StdRng {
    StdRng::seed_from_u64(process_seed())
}
