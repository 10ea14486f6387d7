use cashorcut_core::{RandomSource, SeededSource};

/// Unseeded randomness, the production board source.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug, Default)]
pub struct EntropySource(rand::rngs::ThreadRng);

#[cfg(not(target_arch = "wasm32"))]
impl RandomSource for EntropySource {
    fn next_float(&mut self) -> f64 {
        use rand::Rng;
        self.0.random::<f64>()
    }
}

/// Unseeded randomness, the production board source. Backed by JavaScript's `Math.random`.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug, Default)]
pub struct EntropySource;

#[cfg(target_arch = "wasm32")]
impl RandomSource for EntropySource {
    fn next_float(&mut self) -> f64 {
        js_sys::Math::random()
    }
}

/// Board randomness for a session: fresh entropy, or a forced seed while debugging.
#[derive(Clone, Debug)]
pub enum SessionSource {
    Entropy(EntropySource),
    Seeded(SeededSource),
}

impl SessionSource {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => {
                log::warn!("Boards are generated from forced seed {}", seed);
                Self::Seeded(SeededSource::seeded(seed))
            }
            None => Self::Entropy(EntropySource::default()),
        }
    }
}

impl RandomSource for SessionSource {
    fn next_float(&mut self) -> f64 {
        match self {
            Self::Entropy(source) => source.next_float(),
            Self::Seeded(source) => source.next_float(),
        }
    }
}
