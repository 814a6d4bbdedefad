use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ports::Draw;

/// `Draw` backed by a standard RNG; seed it for reproducible runs.
#[derive(Debug, Clone)]
pub struct RngDraw {
    rng: StdRng,
}

impl RngDraw {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Seeded when `seed` is given, entropy-backed otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl Draw for RngDraw {
    fn percent(&mut self) -> f64 {
        self.rng.gen_range(0.0..100.0)
    }
}
