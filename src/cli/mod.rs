//! CLI Module
//!
//! Command-line interface for rendering explosions.

pub mod commands;

use clap::Parser;
use std::path::PathBuf;

use crate::error::Result;
use crate::synth::ExplosionDef;

/// Explodomatica - procedural explosion sound generator
#[derive(Parser, Debug)]
#[command(name = "explodomatica")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output WAV file (overwritten if it exists)
    pub output: PathBuf,

    /// Duration in seconds
    #[arg(long)]
    pub duration: Option<f64>,

    /// Number of noise layers (1-10)
    #[arg(long)]
    pub layers: Option<usize>,

    /// Number of pre-explosions (0-5)
    #[arg(long = "pre-explosions")]
    pub pre_explosions: Option<usize>,

    /// Window in seconds within which pre-explosions start
    #[arg(long = "pre-delay")]
    pub pre_delay: Option<f64>,

    /// Low-pass factor applied to the pre-explosions (0.0-1.0)
    #[arg(long = "pre-lp-factor")]
    pub pre_lp_factor: Option<f64>,

    /// Number of low-pass passes over the pre-explosions
    #[arg(long = "pre-lp-passes")]
    pub pre_lp_passes: Option<usize>,

    /// Final speed factor (<1.0 slows the explosion down)
    #[arg(long)]
    pub speed: Option<f64>,

    /// Number of early reverb reflections
    #[arg(long = "early-reflections")]
    pub early_reflections: Option<usize>,

    /// Number of late reverb reflections
    #[arg(long = "late-reflections")]
    pub late_reflections: Option<usize>,

    /// Skip the reverb stage
    #[arg(long = "no-reverb")]
    pub no_reverb: bool,

    /// Seed for a reproducible render
    #[arg(long)]
    pub seed: Option<u64>,

    /// Load parameters from a JSON preset
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// Save the parameters actually used as a JSON preset
    #[arg(long = "save-preset")]
    pub save_preset: Option<PathBuf>,

    /// Randomly nudge every parameter before rendering
    #[arg(long)]
    pub mutate: bool,

    /// Output bit depth: 16, 24 or 32 (float)
    #[arg(long = "bit-depth", default_value_t = 16)]
    pub bit_depth: u16,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the explosion parameters: defaults, then preset, then flags
    pub fn explosion_def(&self) -> Result<ExplosionDef> {
        let mut def = match &self.preset {
            Some(path) => ExplosionDef::load_preset(path)?,
            None => ExplosionDef::default(),
        };

        if let Some(v) = self.duration {
            def.duration = v;
        }
        if let Some(v) = self.layers {
            def.layer_count = v;
        }
        if let Some(v) = self.pre_explosions {
            def.pre_explosion_count = v;
        }
        if let Some(v) = self.pre_delay {
            def.pre_explosion_delay = v;
        }
        if let Some(v) = self.pre_lp_factor {
            def.pre_explosion_low_pass_factor = v;
        }
        if let Some(v) = self.pre_lp_passes {
            def.pre_explosion_low_pass_passes = v;
        }
        if let Some(v) = self.speed {
            def.final_speed_factor = v;
        }
        if let Some(v) = self.early_reflections {
            def.reverb_early_reflections = v;
        }
        if let Some(v) = self.late_reflections {
            def.reverb_late_reflections = v;
        }
        if self.no_reverb {
            def.reverb_enabled = false;
        }

        def.validate()?;
        Ok(def)
    }
}
