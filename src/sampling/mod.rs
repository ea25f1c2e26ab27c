//! Row sampling and train/test splitting.
//!
//! Every call builds its own generator: `ChaCha8Rng::seed_from_u64(seed)` when a seed is given,
//! otherwise one seeded from OS entropy. No generator state survives a call, so the same seed, input
//! and arguments always produce the same rows in the same order.

mod sample;
mod split;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use sample::{sample, SampleMethod};
pub use split::split;

pub(crate) fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}
