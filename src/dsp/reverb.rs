//! Echo-accumulation reverb
//!
//! Builds a reverb tail by repeatedly deriving a low-passed copy of a
//! running echo source, delaying it by a random amount and summing it into
//! a wet buffer twice the dry length:
//! - early reflections: bright, short delays (up to 300ms), gain 0.03-0.06
//! - late reflections: duller sweep, long delays (up to 2s), gain 0.03-0.04
//!
//! After each echo is derived the echo source itself is attenuated, so
//! successive reflections decay geometrically.

use log::debug;

use super::filter::sliding_low_pass;
use super::noise::NoiseSource;
use crate::engine::ops::{accumulate_in_place, amplify_clamp, delay_shift};
use crate::engine::{millis_to_frames, SampleBuffer};
use crate::error::Result;

// ============================================================================
// Reflection Profiles
// ============================================================================

/// Shape of one class of reflections
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionProfile {
    /// Low-pass coefficient at the start of the echo
    pub alpha_start: f64,
    /// Low-pass coefficient at the end of the echo
    pub alpha_end: f64,
    /// Lower bound of the random echo-source gain
    pub gain_min: f64,
    /// Upper bound (exclusive) of the random echo-source gain
    pub gain_max: f64,
    /// Upper bound (exclusive) of the random delay in milliseconds
    pub max_delay_ms: f64,
}

impl ReflectionProfile {
    /// Short, bright reflections
    pub const EARLY: ReflectionProfile = ReflectionProfile {
        alpha_start: 0.5,
        alpha_end: 0.5,
        gain_min: 0.03,
        gain_max: 0.06,
        max_delay_ms: 300.0,
    };

    /// Long reflections filtered towards a duller tail
    pub const LATE: ReflectionProfile = ReflectionProfile {
        alpha_start: 0.5,
        alpha_end: 0.2,
        gain_min: 0.03,
        gain_max: 0.04,
        max_delay_ms: 2000.0,
    };
}

// ============================================================================
// Reverb Engine
// ============================================================================

/// Synthetic reverb built from delayed, filtered echoes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReverbEngine {
    early_reflections: usize,
    late_reflections: usize,
}

impl ReverbEngine {
    /// Create a reverb with the given reflection counts
    pub fn new(early_reflections: usize, late_reflections: usize) -> Self {
        Self {
            early_reflections,
            late_reflections,
        }
    }

    /// Number of early reflections
    pub fn early_reflections(&self) -> usize {
        self.early_reflections
    }

    /// Number of late reflections
    pub fn late_reflections(&self) -> usize {
        self.late_reflections
    }

    /// Return `dry` followed by room for its tail, with every echo summed in
    ///
    /// The result is always twice the dry length; the second half starts
    /// silent and only gains content from delayed echoes.
    pub fn apply(&self, dry: &SampleBuffer, noise: &mut NoiseSource) -> Result<SampleBuffer> {
        debug!(
            "Calculating reverb: {} early, {} late reflections",
            self.early_reflections, self.late_reflections
        );

        let mut wet = SampleBuffer::silence(dry.len() * 2)?;
        wet.samples_mut()[..dry.len()].copy_from_slice(dry.samples());
        let mut echo = wet.try_copy()?;

        for i in 0..self.early_reflections {
            debug!("Early reflection {}/{}", i + 1, self.early_reflections);
            reflect(&mut wet, &mut echo, &ReflectionProfile::EARLY, noise)?;
        }
        for i in 0..self.late_reflections {
            debug!("Late reflection {}/{}", i + 1, self.late_reflections);
            reflect(&mut wet, &mut echo, &ReflectionProfile::LATE, noise)?;
        }

        Ok(wet)
    }
}

/// Derive one echo from `echo`, attenuate `echo`, then sum the delayed echo
/// into `wet`
fn reflect(
    wet: &mut SampleBuffer,
    echo: &mut SampleBuffer,
    profile: &ReflectionProfile,
    noise: &mut NoiseSource,
) -> Result<()> {
    let mut reflection = sliding_low_pass(echo, profile.alpha_start, profile.alpha_end)?;

    let gain = noise.range(profile.gain_min, profile.gain_max);
    amplify_clamp(echo, gain as f32);

    let delay = noise.index_below(millis_to_frames(profile.max_delay_ms));
    delay_shift(&mut reflection, delay);
    accumulate_in_place(wet, &reflection)
}

// ============================================================================
// Tests
// ============================================================================
