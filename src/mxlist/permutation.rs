use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use super::MxRecord;

/// Reorders the members of one preference tier.
///
/// [`MxList::shuffle_with`](super::MxList::shuffle_with) calls this once per
/// tier. Implementations must only reorder, never add or drop records.
pub trait Permutation {
    fn permute(&mut self, tier: &mut [MxRecord]);
}

impl<P: Permutation + ?Sized> Permutation for &mut P {
    fn permute(&mut self, tier: &mut [MxRecord]) {
        (**self).permute(tier);
    }
}

/// Uniform Fisher–Yates permutation driven by any [`Rng`].
#[derive(Debug, Clone)]
pub struct RandomPermutation<R = StdRng> {
    rng: R,
}

impl RandomPermutation<StdRng> {
    /// Generator seeded from OS entropy, so repeated runs do not keep
    /// favouring the same host among equals.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible generator, mostly useful in tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomPermutation<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Permutation for RandomPermutation<R> {
    fn permute(&mut self, tier: &mut [MxRecord]) {
        tier.shuffle(&mut self.rng);
    }
}

/// Identity permutation: tiers keep the order the resolver returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOrder;

impl Permutation for KeepOrder {
    fn permute(&mut self, _tier: &mut [MxRecord]) {}
}
