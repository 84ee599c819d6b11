//! Explosion parameters
//!
//! `ExplosionDef` is the single configuration record for a render. It is
//! built once (from defaults, a JSON preset, or command-line overrides),
//! validated, and then only read.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::NoiseSource;
use crate::error::{ExplodeError, Result};

// ============================================================================
// Parameter Ranges
// ============================================================================

/// Duration range in seconds
pub const DURATION_RANGE: RangeInclusive<f64> = 0.0..=60.0;

/// Most layers a single explosion may stack
pub const MAX_LAYERS: usize = 10;

/// Layer count range
pub const LAYER_RANGE: RangeInclusive<usize> = 1..=MAX_LAYERS;

/// Pre-explosion count range
pub const PRE_EXPLOSION_RANGE: RangeInclusive<usize> = 0..=5;

/// Pre-explosion delay range in seconds
pub const PRE_DELAY_RANGE: RangeInclusive<f64> = 0.0..=3.0;

/// Pre-explosion low-pass factor range
pub const PRE_LOW_PASS_FACTOR_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// Pre-explosion low-pass pass-count range
pub const PRE_LOW_PASS_PASSES_RANGE: RangeInclusive<usize> = 0..=10;

/// Smallest final speed factor
pub const MIN_SPEED_FACTOR: f64 = 0.1;

/// Largest final speed factor
pub const MAX_SPEED_FACTOR: f64 = 10.0;

/// Final speed factor range
pub const SPEED_RANGE: RangeInclusive<f64> = MIN_SPEED_FACTOR..=MAX_SPEED_FACTOR;

/// Early reflection count range
pub const EARLY_REFLECTION_RANGE: RangeInclusive<usize> = 0..=50;

/// Late reflection count range
pub const LATE_REFLECTION_RANGE: RangeInclusive<usize> = 0..=2000;

// ============================================================================
// Explosion Definition
// ============================================================================

/// Parameters for one explosion render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionDef {
    /// Duration in seconds (roughly; speed change and reverb alter the result)
    pub duration: f64,
    /// Number of noise layers per explosion
    pub layer_count: usize,
    /// Number of smaller explosions leading into the main one
    pub pre_explosion_count: usize,
    /// Window in seconds within which each pre-explosion starts
    pub pre_explosion_delay: f64,
    /// Constant low-pass coefficient for the pre-explosion bed
    pub pre_explosion_low_pass_factor: f64,
    /// How many times the pre-explosion bed is low-passed and renormalized
    pub pre_explosion_low_pass_passes: usize,
    /// Final resampling factor (>1 faster and shorter, <1 slower and longer)
    pub final_speed_factor: f64,
    /// Number of early reverb reflections
    pub reverb_early_reflections: usize,
    /// Number of late reverb reflections
    pub reverb_late_reflections: usize,
    /// Whether the reverb stage runs at all
    pub reverb_enabled: bool,
}

impl Default for ExplosionDef {
    fn default() -> Self {
        Self {
            duration: 4.0,
            layer_count: 4,
            pre_explosion_count: 1,
            pre_explosion_delay: 0.2,
            pre_explosion_low_pass_factor: 0.5,
            pre_explosion_low_pass_passes: 1,
            final_speed_factor: 0.25,
            reverb_early_reflections: 10,
            reverb_late_reflections: 50,
            reverb_enabled: true,
        }
    }
}

impl ExplosionDef {
    /// Validate all parameters are within their ranges
    pub fn validate(&self) -> Result<()> {
        check_float("duration", self.duration, &DURATION_RANGE)?;
        check_count("layer_count", self.layer_count, &LAYER_RANGE)?;
        check_count(
            "pre_explosion_count",
            self.pre_explosion_count,
            &PRE_EXPLOSION_RANGE,
        )?;
        check_float(
            "pre_explosion_delay",
            self.pre_explosion_delay,
            &PRE_DELAY_RANGE,
        )?;
        check_float(
            "pre_explosion_low_pass_factor",
            self.pre_explosion_low_pass_factor,
            &PRE_LOW_PASS_FACTOR_RANGE,
        )?;
        check_count(
            "pre_explosion_low_pass_passes",
            self.pre_explosion_low_pass_passes,
            &PRE_LOW_PASS_PASSES_RANGE,
        )?;
        check_float("final_speed_factor", self.final_speed_factor, &SPEED_RANGE)?;
        check_count(
            "reverb_early_reflections",
            self.reverb_early_reflections,
            &EARLY_REFLECTION_RANGE,
        )?;
        check_count(
            "reverb_late_reflections",
            self.reverb_late_reflections,
            &LATE_REFLECTION_RANGE,
        )?;
        Ok(())
    }

    /// Return a copy with every parameter nudged by a small random amount
    ///
    /// Continuous parameters are scaled by a factor in [0.9, 1.1); counts
    /// move by -1, 0 or +1. Results are clamped back into range.
    pub fn mutated(&self, noise: &mut NoiseSource) -> Self {
        let mut scale = |value: f64| value * noise.range(0.9, 1.1);
        let duration = scale(self.duration);
        let pre_explosion_delay = scale(self.pre_explosion_delay);
        let pre_explosion_low_pass_factor = scale(self.pre_explosion_low_pass_factor);
        let final_speed_factor = scale(self.final_speed_factor);

        let mut nudge = |value: usize, range: &RangeInclusive<usize>| {
            let step = noise.index_below(3) as isize - 1;
            (value as isize + step).clamp(*range.start() as isize, *range.end() as isize) as usize
        };

        Self {
            duration: clamp_float(duration, &DURATION_RANGE),
            layer_count: nudge(self.layer_count, &LAYER_RANGE),
            pre_explosion_count: nudge(self.pre_explosion_count, &PRE_EXPLOSION_RANGE),
            pre_explosion_delay: clamp_float(pre_explosion_delay, &PRE_DELAY_RANGE),
            pre_explosion_low_pass_factor: clamp_float(
                pre_explosion_low_pass_factor,
                &PRE_LOW_PASS_FACTOR_RANGE,
            ),
            pre_explosion_low_pass_passes: nudge(
                self.pre_explosion_low_pass_passes,
                &PRE_LOW_PASS_PASSES_RANGE,
            ),
            final_speed_factor: clamp_float(final_speed_factor, &SPEED_RANGE),
            reverb_early_reflections: nudge(
                self.reverb_early_reflections,
                &EARLY_REFLECTION_RANGE,
            ),
            reverb_late_reflections: nudge(self.reverb_late_reflections, &LATE_REFLECTION_RANGE),
            reverb_enabled: self.reverb_enabled,
        }
    }

    /// Load a JSON preset; missing fields take their defaults
    ///
    /// # Errors
    /// * `PresetNotFound` - If the file does not exist
    /// * `Serialization` - If the file is not a valid preset
    /// * `InvalidParameter` - If a value is out of range
    pub fn load_preset(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ExplodeError::PresetNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = fs::read_to_string(path)?;
        let def: ExplosionDef = serde_json::from_str(&contents)?;
        def.validate()?;
        Ok(def)
    }

    /// Save this definition as a pretty-printed JSON preset
    pub fn save_preset(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn check_float(param: &str, value: f64, range: &RangeInclusive<f64>) -> Result<()> {
    if value.is_finite() && range.contains(&value) {
        return Ok(());
    }
    Err(ExplodeError::invalid_parameter(
        param,
        value,
        format!("{} to {}", range.start(), range.end()),
    ))
}

fn check_count(param: &str, value: usize, range: &RangeInclusive<usize>) -> Result<()> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(ExplodeError::invalid_parameter(
        param,
        value,
        format!("{} to {}", range.start(), range.end()),
    ))
}

fn clamp_float(value: f64, range: &RangeInclusive<f64>) -> f64 {
    value.clamp(*range.start(), *range.end())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let def = ExplosionDef::default();
        assert_eq!(def.duration, 4.0);
        assert_eq!(def.layer_count, 4);
        assert_eq!(def.pre_explosion_count, 1);
        assert_eq!(def.pre_explosion_delay, 0.2);
        assert_eq!(def.pre_explosion_low_pass_factor, 0.5);
        assert_eq!(def.final_speed_factor, 0.25);
        assert_eq!(def.reverb_early_reflections, 10);
        assert_eq!(def.reverb_late_reflections, 50);
        assert!(def.validate().is_ok());
    }

    #[test_case(ExplosionDef { layer_count: 0, ..Default::default() }, "layer_count" ; "no layers")]
    #[test_case(ExplosionDef { layer_count: 11, ..Default::default() }, "layer_count" ; "too many layers")]
    #[test_case(ExplosionDef { duration: -1.0, ..Default::default() }, "duration" ; "negative duration")]
    #[test_case(ExplosionDef { duration: f64::NAN, ..Default::default() }, "duration" ; "nan duration")]
    #[test_case(ExplosionDef { final_speed_factor: 0.0, ..Default::default() }, "final_speed_factor" ; "zero speed")]
    #[test_case(ExplosionDef { final_speed_factor: 0.05, ..Default::default() }, "final_speed_factor" ; "speed below minimum")]
    #[test_case(ExplosionDef { final_speed_factor: 1e-4, duration: 60.0, ..Default::default() }, "final_speed_factor" ; "tiny speed on long render")]
    #[test_case(ExplosionDef { pre_explosion_low_pass_factor: 1.5, ..Default::default() }, "pre_explosion_low_pass_factor" ; "low pass factor above one")]
    #[test_case(ExplosionDef { reverb_late_reflections: 5000, ..Default::default() }, "reverb_late_reflections" ; "too many late reflections")]
    fn test_validate_rejects(def: ExplosionDef, expected_param: &str) {
        match def.validate() {
            Err(ExplodeError::InvalidParameter { param, .. }) => {
                assert_eq!(param, expected_param)
            }
            other => panic!("Expected InvalidParameter, got: {:?}", other),
        }
    }

    #[test]
    fn test_zero_duration_is_valid() {
        let def = ExplosionDef {
            duration: 0.0,
            ..Default::default()
        };
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_mutated_stays_valid_and_close() {
        let def = ExplosionDef::default();
        let mut noise = NoiseSource::seeded(17);

        for _ in 0..100 {
            let mutated = def.mutated(&mut noise);
            assert!(mutated.validate().is_ok(), "{:?}", mutated);
            assert!((mutated.duration - def.duration).abs() <= def.duration * 0.1);
            assert!(mutated.layer_count.abs_diff(def.layer_count) <= 1);
            assert_eq!(mutated.reverb_enabled, def.reverb_enabled);
        }
    }

    #[test]
    fn test_speed_bounds_are_inclusive() {
        for speed in [MIN_SPEED_FACTOR, MAX_SPEED_FACTOR] {
            let def = ExplosionDef {
                final_speed_factor: speed,
                ..Default::default()
            };
            assert!(def.validate().is_ok(), "{}", speed);
        }
    }

    #[test]
    fn test_mutated_clamps_at_bounds() {
        let def = ExplosionDef {
            layer_count: 1,
            pre_explosion_count: 0,
            pre_explosion_low_pass_factor: 1.0,
            final_speed_factor: MIN_SPEED_FACTOR,
            ..Default::default()
        };
        let mut noise = NoiseSource::seeded(3);

        for _ in 0..50 {
            let mutated = def.mutated(&mut noise);
            assert!(mutated.layer_count >= 1);
            assert!(mutated.pre_explosion_low_pass_factor <= 1.0);
            assert!(mutated.final_speed_factor >= MIN_SPEED_FACTOR);
            assert!(mutated.validate().is_ok());
        }
    }

    #[test]
    fn test_preset_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preset.json");

        let def = ExplosionDef {
            duration: 2.5,
            layer_count: 6,
            reverb_enabled: false,
            ..Default::default()
        };
        def.save_preset(&path).unwrap();

        assert_eq!(ExplosionDef::load_preset(&path).unwrap(), def);
    }

    #[test]
    fn test_partial_preset_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "duration": 1.5, "layer_count": 2 }"#).unwrap();

        let def = ExplosionDef::load_preset(&path).unwrap();
        assert_eq!(
            def,
            ExplosionDef {
                duration: 1.5,
                layer_count: 2,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_preset_errors() {
        let dir = tempdir().unwrap();

        let missing = ExplosionDef::load_preset(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ExplodeError::PresetNotFound { .. })));

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "not json").unwrap();
        assert!(matches!(
            ExplosionDef::load_preset(&garbage),
            Err(ExplodeError::Serialization(_))
        ));

        let out_of_range = dir.path().join("bad.json");
        fs::write(&out_of_range, r#"{ "layer_count": 0 }"#).unwrap();
        assert!(matches!(
            ExplosionDef::load_preset(&out_of_range),
            Err(ExplodeError::InvalidParameter { .. })
        ));
    }
}
