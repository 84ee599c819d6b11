//! Layer synthesis
//!
//! An explosion is a stack of noise layers. Layer 0 is long, bright and
//! lightly faded; each higher layer is sped up, faded harder and filtered
//! toward a lower cutoff. Summed, they give a transient over a rumble.

use log::debug;

use crate::dsp::filter::{change_speed_in_place, sliding_low_pass_in_place};
use crate::dsp::NoiseSource;
use crate::engine::ops::{accumulate_in_place, fade_out_linear, normalize};
use crate::engine::{seconds_to_frames, SampleBuffer};
use crate::error::Result;

/// Processing applied to one layer, derived from its index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerShape {
    /// Speed-up applied to the raw noise, if any
    pub speed_factor: Option<f64>,
    /// Number of full-length linear fade-out passes
    pub fade_passes: usize,
    /// Low-pass coefficient at the start of the sweep
    pub alpha_start: f64,
    /// Low-pass coefficient at the end of the sweep
    pub alpha_end: f64,
    /// Number of low-pass + normalize passes
    pub filter_passes: usize,
}

impl LayerShape {
    /// Shape of layer `index` out of `layer_count`
    pub fn for_layer(index: usize, layer_count: usize) -> Self {
        let count = layer_count.max(1) as f64;
        Self {
            speed_factor: (index > 0).then(|| 2.0 * index as f64),
            fade_passes: (index + 1).min(3),
            alpha_start: (index + 1) as f64 / count,
            alpha_end: index as f64 / count,
            filter_passes: 3usize.saturating_sub(index).max(1),
        }
    }
}

/// Synthesize layer `index` of an explosion lasting `duration` seconds
pub fn make_layer(
    index: usize,
    layer_count: usize,
    duration: f64,
    noise: &mut NoiseSource,
) -> Result<SampleBuffer> {
    let shape = LayerShape::for_layer(index, layer_count);
    debug!("Layer {}/{}: {:?}", index + 1, layer_count, shape);

    let mut layer = noise.white_noise(seconds_to_frames(duration))?;

    if let Some(factor) = shape.speed_factor {
        change_speed_in_place(&mut layer, factor)?;
    }

    for _ in 0..shape.fade_passes {
        let len = layer.len();
        fade_out_linear(&mut layer, len);
    }

    for _ in 0..shape.filter_passes {
        sliding_low_pass_in_place(&mut layer, shape.alpha_start, shape.alpha_end)?;
        normalize(&mut layer);
    }

    Ok(layer)
}

/// Synthesize and sum `layer_count` layers into one normalized explosion
///
/// Zero layers yield an empty buffer.
pub fn make_explosion(
    duration: f64,
    layer_count: usize,
    noise: &mut NoiseSource,
) -> Result<SampleBuffer> {
    let mut layers = (0..layer_count)
        .map(|i| make_layer(i, layer_count, duration, noise))
        .collect::<Result<Vec<_>>>()?
        .into_iter();

    let Some(mut explosion) = layers.next() else {
        return Ok(SampleBuffer::default());
    };
    for layer in layers {
        accumulate_in_place(&mut explosion, &layer)?;
    }

    normalize(&mut explosion);
    Ok(explosion)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ops::NORMALIZE_HEADROOM;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    #[test]
    fn test_shape_first_layer() {
        let shape = LayerShape::for_layer(0, 4);
        assert_eq!(shape.speed_factor, None);
        assert_eq!(shape.fade_passes, 1);
        assert_eq!(shape.filter_passes, 3);
        assert_abs_diff_eq!(shape.alpha_start, 0.25);
        assert_abs_diff_eq!(shape.alpha_end, 0.0);
    }

    #[test_case(1, Some(2.0), 2, 2 ; "second layer")]
    #[test_case(2, Some(4.0), 3, 1 ; "third layer")]
    #[test_case(3, Some(6.0), 3, 1 ; "fourth layer")]
    #[test_case(9, Some(18.0), 3, 1 ; "tenth layer")]
    fn test_shape_progression(index: usize, speed: Option<f64>, fades: usize, filters: usize) {
        let shape = LayerShape::for_layer(index, 10);
        assert_eq!(shape.speed_factor, speed);
        assert_eq!(shape.fade_passes, fades);
        assert_eq!(shape.filter_passes, filters);
        assert!(shape.alpha_end < shape.alpha_start);
    }

    #[test]
    fn test_higher_layers_are_shorter() {
        let mut noise = NoiseSource::seeded(1);
        let base = make_layer(0, 3, 0.1, &mut noise).unwrap();
        let second = make_layer(1, 3, 0.1, &mut noise).unwrap();
        let third = make_layer(2, 3, 0.1, &mut noise).unwrap();

        assert_eq!(base.len(), 4410);
        assert_eq!(second.len(), 2205);
        assert_eq!(third.len(), 1102);
    }

    #[test]
    fn test_layer_is_normalized_and_faded() {
        let mut noise = NoiseSource::seeded(2);
        let layer = make_layer(0, 1, 0.1, &mut noise).unwrap();

        assert_abs_diff_eq!(layer.peak(), 1.0 / NORMALIZE_HEADROOM, epsilon = 1e-5);

        let quarter = layer.len() / 4;
        let head = layer.samples()[..quarter].iter().map(|s| s.abs()).fold(0.0, f32::max);
        let tail = layer.samples()[3 * quarter..].iter().map(|s| s.abs()).fold(0.0, f32::max);
        assert!(tail < head);
    }

    #[test]
    fn test_explosion_length_follows_base_layer() {
        let mut noise = NoiseSource::seeded(3);
        let explosion = make_explosion(0.2, 4, &mut noise).unwrap();
        assert_eq!(explosion.len(), 8820);
        assert_abs_diff_eq!(explosion.peak(), 1.0 / NORMALIZE_HEADROOM, epsilon = 1e-5);
        assert!(explosion.is_finite());
    }

    #[test]
    fn test_explosion_degenerate_inputs() {
        let mut noise = NoiseSource::seeded(4);
        assert!(make_explosion(0.0, 4, &mut noise).unwrap().is_empty());
        assert!(make_explosion(1.0, 0, &mut noise).unwrap().is_empty());
    }

    #[test]
    fn test_explosion_is_reproducible() {
        let a = make_explosion(0.1, 3, &mut NoiseSource::seeded(8)).unwrap();
        let b = make_explosion(0.1, 3, &mut NoiseSource::seeded(8)).unwrap();
        assert_eq!(a.samples(), b.samples());
    }
}
