use rand::{Rng, SeedableRng, rngs::SmallRng};


/// Picks the child slot a meld descends into.
/// Every tree owns one, so concurrent searches never contend on a generator.
/// Only uniform spread matters here, not cryptographic strength.
#[derive(Clone, Debug)]
pub struct SlotPicker<R = SmallRng> {
    rng: R,
}

impl SlotPicker<SmallRng> {

    /// Deterministic stream, for reproducible tree shapes
    pub fn seeded(seed: u64) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: SmallRng::from_os_rng() }
    }

    pub(crate) fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> SlotPicker<R> {

    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Uniform index in `[0, k)`
    pub fn pick(&mut self, k: usize) -> usize {
        self.rng.random_range(0..k)
    }
}
