use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// The single source of randomness for globe generation.
///
/// ChaCha8 output is specified independently of platform and word size, so
/// equal seeds and equal call sequences agree across processes.
#[derive(Debug, Clone)]
pub struct GlobeRng {
    rng: ChaCha8Rng,
}

impl GlobeRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn next_uint(&mut self) -> u32 {
        self.rng.next_u32()
    }

    /// Uniform real in `[0, 1)`.
    pub fn next_real(&mut self) -> f32 {
        self.rng.r#gen::<f32>()
    }
}
