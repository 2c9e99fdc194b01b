use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of the per-lap noise and puncture draws.
pub trait RandomSource {
    /// Sample from a normal distribution.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64;

    /// Returns true with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
}

/// Deterministic generator: the same seed replays the same race noise.
pub struct SeededRandom {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Picks a fresh seed from the thread rng. Read it back with `seed()` to replay the run.
    pub fn unseeded() -> Self {
        Self::new(rand::thread_rng().gen())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        // Box-Muller transform
        let u1: f64 = self.rng.gen::<f64>().max(1e-10);
        let u2: f64 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }
}

/// No noise and no punctures. Leaves only the deterministic part of the lap-time model.
#[derive(Debug, Default, Clone, Copy)]
pub struct Calm;

impl RandomSource for Calm {
    fn normal(&mut self, mean: f64, _std_dev: f64) -> f64 {
        mean
    }

    fn chance(&mut self, _p: f64) -> bool {
        false
    }
}
