use crate::config::Randomness;
use crate::error::Result;

use rand::rngs::OsRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Picks uniformly among equally scored candidates.
///
/// Backed by a ChaCha20 stream cipher, a cryptographically strong generator, so ties are broken
/// without bias.  With [`Randomness::Entropy`] the key comes from the operating system; failing
/// to obtain it is an error rather than a reason to fall back to a deterministic choice.
#[derive(Debug)]
pub(crate) struct TieBreaker {
    rng: ChaCha20Rng,
}

impl TieBreaker {
    pub fn new(randomness: Randomness) -> Result<Self> {
        let rng = match randomness {
            Randomness::Entropy => ChaCha20Rng::from_rng(OsRng)?,
            Randomness::Seeded(seed) => ChaCha20Rng::seed_from_u64(seed),
        };
        Ok(Self { rng })
    }

    /// Uniform index in `0..n`; `n` must be non-zero.
    pub fn pick(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "nothing to pick from");
        if n == 1 {
            0
        } else {
            self.rng.gen_range(0..n)
        }
    }

    /// Remove and return a uniformly chosen element of a non-empty candidate list.
    pub fn choose<T>(&mut self, mut candidates: Vec<T>) -> Option<T> {
        if candidates.is_empty() {
            return None;
        }
        let i = self.pick(candidates.len());
        Some(candidates.swap_remove(i))
    }
}
