use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Capability the board generator draws its randomness from.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_float(&mut self) -> f64;
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn next_float(&mut self) -> f64 {
        (**self).next_float()
    }
}

/// Adapts any `rand` generator into a [`RandomSource`].
#[derive(Clone, Debug)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_float(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

pub type SeededSource = RngSource<SmallRng>;

impl SeededSource {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}
