//! Explosion composer
//!
//! Drives a full render as a strictly forward sequence of stages:
//!
//! `Idle -> PreExplosions -> MainExplosion -> Merge -> SpeedChange ->
//! TrimDry -> Reverb -> TrimWet -> Done`
//!
//! A composer renders exactly once; any error aborts the whole run and
//! nothing partial is returned.

use std::fmt;

use log::{debug, info, warn};

use crate::dsp::filter::{change_speed_in_place, sliding_low_pass_in_place};
use crate::dsp::{NoiseSource, ReverbEngine};
use crate::engine::ops::{
    accumulate_in_place, amplify_clamp, delay_shift, normalize, trim_trailing_silence,
};
use crate::engine::{seconds_to_frames, SampleBuffer};
use crate::error::{ExplodeError, Result};
use crate::synth::def::ExplosionDef;
use crate::synth::layer::make_explosion;

/// Pipeline stages, in the only order they can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Nothing rendered yet
    #[default]
    Idle,
    /// Building the pre-explosion bed
    PreExplosions,
    /// Synthesizing the main explosion
    MainExplosion,
    /// Summing the pre-explosion bed into the main explosion
    Merge,
    /// Resampling by the final speed factor
    SpeedChange,
    /// Trimming trailing silence before reverb
    TrimDry,
    /// Adding the reverb tail
    Reverb,
    /// Clamping to full scale and trimming trailing silence after reverb
    TrimWet,
    /// Render finished
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => write!(f, "Idle"),
            Stage::PreExplosions => write!(f, "PreExplosions"),
            Stage::MainExplosion => write!(f, "MainExplosion"),
            Stage::Merge => write!(f, "Merge"),
            Stage::SpeedChange => write!(f, "SpeedChange"),
            Stage::TrimDry => write!(f, "TrimDry"),
            Stage::Reverb => write!(f, "Reverb"),
            Stage::TrimWet => write!(f, "TrimWet"),
            Stage::Done => write!(f, "Done"),
        }
    }
}

/// Renders one explosion from an [`ExplosionDef`]
#[derive(Debug)]
pub struct ExplosionComposer {
    def: ExplosionDef,
    noise: NoiseSource,
    stage: Stage,
    trace: Vec<Stage>,
}

impl ExplosionComposer {
    /// Create a composer for a validated definition
    ///
    /// # Errors
    /// * `InvalidParameter` - If any parameter is out of range
    pub fn new(def: ExplosionDef, noise: NoiseSource) -> Result<Self> {
        def.validate()?;
        Ok(Self {
            def,
            noise,
            stage: Stage::Idle,
            trace: vec![Stage::Idle],
        })
    }

    /// Create a composer with a reproducible seed
    pub fn with_seed(def: ExplosionDef, seed: u64) -> Result<Self> {
        Self::new(def, NoiseSource::seeded(seed))
    }

    /// The definition being rendered
    pub fn def(&self) -> &ExplosionDef {
        &self.def
    }

    /// Current stage
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Every stage entered so far, in order
    pub fn trace(&self) -> &[Stage] {
        &self.trace
    }

    /// Seed of the noise source driving this render
    pub fn seed(&self) -> u64 {
        self.noise.seed()
    }

    fn enter(&mut self, stage: Stage) {
        debug!("Stage {} -> {}", self.stage, stage);
        self.stage = stage;
        self.trace.push(stage);
    }

    /// Run the full pipeline and return the finished explosion
    ///
    /// # Errors
    /// * `ComposerSpent` - If this composer has already started a render
    /// * `OutOfMemory` - If any buffer allocation fails
    pub fn compose(&mut self) -> Result<SampleBuffer> {
        if self.stage != Stage::Idle {
            return Err(ExplodeError::ComposerSpent);
        }
        info!(
            "Composing explosion: {:.2}s, {} layers, seed {}",
            self.def.duration,
            self.def.layer_count,
            self.noise.seed()
        );

        let pre_explosions = if self.def.pre_explosion_count > 0 {
            self.enter(Stage::PreExplosions);
            Some(self.make_pre_explosions()?)
        } else {
            None
        };

        self.enter(Stage::MainExplosion);
        let mut explosion =
            make_explosion(self.def.duration, self.def.layer_count, &mut self.noise)?;

        self.enter(Stage::Merge);
        if let Some(bed) = pre_explosions {
            accumulate_in_place(&mut explosion, &bed)?;
            normalize(&mut explosion);
        }

        self.enter(Stage::SpeedChange);
        change_speed_in_place(&mut explosion, self.def.final_speed_factor)?;

        self.enter(Stage::TrimDry);
        trim_trailing_silence(&mut explosion);

        self.enter(Stage::Reverb);
        if self.def.reverb_enabled {
            let reverb = ReverbEngine::new(
                self.def.reverb_early_reflections,
                self.def.reverb_late_reflections,
            );
            explosion = reverb.apply(&explosion, &mut self.noise)?;
        }

        self.enter(Stage::TrimWet);
        // Echoes sum on top of a full-scale dry signal
        amplify_clamp(&mut explosion, 1.0);
        trim_trailing_silence(&mut explosion);

        self.enter(Stage::Done);
        if explosion.is_empty() {
            warn!("Rendered explosion is empty");
        }
        info!(
            "Explosion ready: {} samples ({:.2}s)",
            explosion.len(),
            explosion.duration_secs()
        );

        Ok(explosion)
    }

    /// Build the bed of smaller explosions that lead into the main one
    fn make_pre_explosions(&mut self) -> Result<SampleBuffer> {
        let mut bed = SampleBuffer::silence(seconds_to_frames(self.def.duration))?;
        let max_offset = seconds_to_frames(self.def.pre_explosion_delay);

        for i in 0..self.def.pre_explosion_count {
            let mut pre = make_explosion(
                self.def.duration / 2.0,
                self.def.layer_count,
                &mut self.noise,
            )?;

            let offset = self.noise.index_below(max_offset);
            debug!(
                "Pre-explosion {}/{} at offset {}",
                i + 1,
                self.def.pre_explosion_count,
                offset
            );
            delay_shift(&mut pre, offset);
            accumulate_in_place(&mut bed, &pre)?;
            normalize(&mut bed);
        }

        let factor = self.def.pre_explosion_low_pass_factor;
        for _ in 0..self.def.pre_explosion_low_pass_passes {
            sliding_low_pass_in_place(&mut bed, factor, factor)?;
            normalize(&mut bed);
        }

        Ok(bed)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ops::NORMALIZE_HEADROOM;
    use crate::engine::SAMPLE_RATE;
    use approx::assert_abs_diff_eq;

    fn minimal() -> ExplosionDef {
        ExplosionDef {
            duration: 1.0,
            layer_count: 1,
            pre_explosion_count: 0,
            final_speed_factor: 1.0,
            reverb_early_reflections: 0,
            reverb_late_reflections: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_render() {
        let mut composer = ExplosionComposer::with_seed(minimal(), 1234).unwrap();
        let out = composer.compose().unwrap();

        assert!(!out.is_empty());
        assert!(out.len() <= SAMPLE_RATE as usize);
        assert_abs_diff_eq!(out.peak(), 1.0 / NORMALIZE_HEADROOM, epsilon = 1e-3);
        assert!(out.get(out.len() - 1).unwrap().abs() >= 1e-5);
    }

    #[test]
    fn test_trace_without_pre_explosions() {
        let mut composer = ExplosionComposer::with_seed(minimal(), 1).unwrap();
        composer.compose().unwrap();

        assert_eq!(
            composer.trace(),
            &[
                Stage::Idle,
                Stage::MainExplosion,
                Stage::Merge,
                Stage::SpeedChange,
                Stage::TrimDry,
                Stage::Reverb,
                Stage::TrimWet,
                Stage::Done,
            ]
        );
        assert_eq!(composer.stage(), Stage::Done);
    }

    #[test]
    fn test_trace_with_pre_explosions() {
        let def = ExplosionDef {
            pre_explosion_count: 2,
            duration: 0.2,
            ..minimal()
        };
        let mut composer = ExplosionComposer::with_seed(def, 1).unwrap();
        composer.compose().unwrap();
        assert_eq!(composer.trace()[1], Stage::PreExplosions);
    }

    #[test]
    fn test_second_compose_is_rejected() {
        let mut composer = ExplosionComposer::with_seed(minimal(), 1).unwrap();
        composer.compose().unwrap();
        assert!(matches!(composer.compose(), Err(ExplodeError::ComposerSpent)));
    }

    #[test]
    fn test_invalid_def_is_rejected() {
        let def = ExplosionDef {
            layer_count: 0,
            ..minimal()
        };
        assert!(matches!(
            ExplosionComposer::with_seed(def, 1),
            Err(ExplodeError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_render() {
        let def = ExplosionDef {
            duration: 0.3,
            layer_count: 3,
            pre_explosion_count: 1,
            final_speed_factor: 0.5,
            reverb_early_reflections: 2,
            reverb_late_reflections: 3,
            ..Default::default()
        };
        let a = ExplosionComposer::with_seed(def.clone(), 77).unwrap().compose().unwrap();
        let b = ExplosionComposer::with_seed(def, 77).unwrap().compose().unwrap();
        assert_eq!(a.samples(), b.samples());
    }

    #[test]
    fn test_reverb_render_stays_in_full_scale() {
        let def = ExplosionDef {
            duration: 0.5,
            pre_explosion_count: 2,
            reverb_early_reflections: 3,
            reverb_late_reflections: 5,
            ..Default::default()
        };

        for seed in [0, 7, 42, 99, 1234] {
            let out = ExplosionComposer::with_seed(def.clone(), seed)
                .unwrap()
                .compose()
                .unwrap();
            assert!(!out.is_empty());
            assert!(out.peak() <= 1.0, "seed {} peaked at {}", seed, out.peak());
        }
    }

    #[test]
    fn test_zero_duration_renders_empty() {
        let def = ExplosionDef {
            duration: 0.0,
            ..Default::default()
        };
        let out = ExplosionComposer::with_seed(def, 1).unwrap().compose().unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_reverb_disabled_matches_dry() {
        let dry_def = ExplosionDef {
            reverb_enabled: false,
            reverb_early_reflections: 5,
            ..minimal()
        };
        let out = ExplosionComposer::with_seed(dry_def, 5).unwrap().compose().unwrap();
        let reference = ExplosionComposer::with_seed(minimal(), 5).unwrap().compose().unwrap();
        assert_eq!(out.samples(), reference.samples());
    }

    #[test]
    fn test_pre_explosion_bed() {
        let def = ExplosionDef {
            duration: 0.2,
            layer_count: 2,
            pre_explosion_count: 3,
            pre_explosion_low_pass_passes: 2,
            ..minimal()
        };
        let mut composer = ExplosionComposer::with_seed(def, 9).unwrap();
        let bed = composer.make_pre_explosions().unwrap();

        assert_eq!(bed.len(), seconds_to_frames(0.2));
        assert_abs_diff_eq!(bed.peak(), 1.0 / NORMALIZE_HEADROOM, epsilon = 1e-5);
    }
}
