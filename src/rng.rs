//! A thin-but-stable wrapper over `rand::rngs::SmallRng` that provides the
//! handful of draws that schema generation needs.

use rand::{rngs::SmallRng, Rng as _, SeedableRng};

const DEFAULT_SEED: u64 = 0xfa70_fa70_fa70_fa70;

/// A pseudorandom number generator.
///
/// Not cryptographically secure. Two `Rng`s created with the same seed produce
/// the same sequence of draws, and therefore the same generated protocols.
///
/// You can attain a reference to an `Rng` via the
/// [`Context::rng`][crate::Context::rng] method.
#[derive(Clone, Debug)]
pub struct Rng {
    inner: SmallRng,
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Rng {
    /// Create a new `Rng` from the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Generate a random `usize` in the inclusive range `lo..=hi`.
    ///
    /// # Panics
    ///
    /// Panics when `lo > hi`.
    #[inline]
    pub fn gen_count(&mut self, lo: usize, hi: usize) -> usize {
        self.inner.gen_range(lo..=hi)
    }

    /// Choose an index into `weights` with probability proportional to each
    /// weight.
    ///
    /// Returns `None` when every weight is zero.
    pub fn choose_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|w| u64::from(*w)).sum();
        if total == 0 {
            return None;
        }

        let mut target = self.inner.gen_range(0..total);
        for (i, w) in weights.iter().enumerate() {
            let w = u64::from(*w);
            if target < w {
                return Some(i);
            }
            target -= w;
        }
        unreachable!("target is always below the total weight")
    }
}
