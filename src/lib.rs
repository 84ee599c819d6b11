//! Explodomatica - Procedural Explosion Sound Synthesizer
//!
//! Renders explosion sound effects from nothing but white noise:
//! 1. Noise layers are resampled, faded and low-passed, then summed
//! 2. Optional pre-explosions are scattered ahead of the main blast
//! 3. The mix is slowed down and given a synthetic reverb tail
//!
//! # Architecture
//!
//! - `engine`: the sample buffer, pure buffer operations and WAV I/O
//! - `dsp`: noise, filtering, resampling and reverb
//! - `synth`: explosion parameters, layer synthesis and the composer
//! - `cli`: command-line front end

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod synth;

pub use error::{ExplodeError, Result};
pub use synth::{ExplosionComposer, ExplosionDef};
