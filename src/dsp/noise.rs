//! Noise and randomness source
//!
//! A single seedable generator drives every random choice in a render:
//! white noise, echo gains and delays, pre-explosion offsets and parameter
//! mutation. Two sources built from the same seed produce identical draws.

use chrono::Utc;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::SampleBuffer;
use crate::error::Result;

/// Seedable pseudorandom source
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: StdRng,
    seed: u64,
}

impl NoiseSource {
    /// Create a source with an explicit seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a source seeded from the wall clock's sub-second microseconds
    pub fn from_clock() -> Self {
        let seed = u64::from(Utc::now().timestamp_subsec_micros());
        debug!("Seeding noise source from clock: {}", seed);
        Self::seeded(seed)
    }

    /// The seed this source was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in [low, high); returns `low` for an empty range
    pub fn range(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    /// Uniform index in [0, n); returns 0 when `n` is 0
    pub fn index_below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Uniform sample in [-1.0, 1.0]
    pub fn bipolar(&mut self) -> f32 {
        self.rng.gen_range(-1.0_f32..=1.0)
    }

    /// Buffer of `len` white noise samples, each uniform in [-1.0, 1.0]
    pub fn white_noise(&mut self, len: usize) -> Result<SampleBuffer> {
        let mut buffer = SampleBuffer::silence(len)?;
        for sample in buffer.samples_mut() {
            *sample = self.bipolar();
        }
        Ok(buffer)
    }
}
