//! DSP building blocks
//!
//! Randomness, the swept low-pass filter, the resampler and the
//! echo-accumulation reverb.

pub mod filter;
pub mod noise;
pub mod reverb;

pub use filter::{change_speed, interpolate, sliding_low_pass};
pub use noise::NoiseSource;
pub use reverb::{ReflectionProfile, ReverbEngine};
