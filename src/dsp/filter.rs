//! Filtering and resampling
//!
//! A one-pole low-pass whose coefficient sweeps across the buffer, and a
//! linear-interpolation speed changer. Both build a new buffer; the
//! `_in_place` variants swap the result into the source handle.

use crate::engine::{SampleBuffer, SAMPLE_RATE};
use crate::error::{ExplodeError, Result};

/// Spans narrower than this fraction of a sample period are averaged
/// instead of interpolated
const MIN_INTERPOLATION_SPAN: f64 = 0.01 / SAMPLE_RATE as f64;

/// Low-pass `buffer` with a coefficient swept from `alpha1` to `alpha2`
///
/// The swept coefficient is squared before use, so the cutoff moves
/// non-linearly and lingers at the low end:
///
/// `out[0] = in[0]`
/// `out[i] = out[i-1] + a(i)^2 * (in[i] - out[i-1])`, with
/// `a(i) = alpha1 + (i / len) * (alpha2 - alpha1)`.
///
/// Equal endpoints give a constant-coefficient filter.
pub fn sliding_low_pass(buffer: &SampleBuffer, alpha1: f64, alpha2: f64) -> Result<SampleBuffer> {
    if !alpha1.is_finite() || !alpha2.is_finite() {
        return Err(ExplodeError::invalid_parameter(
            "low_pass_alpha",
            format!("{}..{}", alpha1, alpha2),
            "finite coefficients",
        ));
    }

    let input = buffer.samples();
    let len = input.len();
    let mut out = SampleBuffer::silence(len)?;
    if len == 0 {
        return Ok(out);
    }

    let output = out.samples_mut();
    output[0] = input[0];

    let mut previous = input[0] as f64;
    for i in 1..len {
        let alpha = (i as f64 / len as f64) * (alpha2 - alpha1) + alpha1;
        let alpha = alpha * alpha;
        previous += alpha * (input[i] as f64 - previous);
        output[i] = previous as f32;
    }

    Ok(out)
}

/// In-place variant of [`sliding_low_pass`]
pub fn sliding_low_pass_in_place(buffer: &mut SampleBuffer, alpha1: f64, alpha2: f64) -> Result<()> {
    let filtered = sliding_low_pass(buffer, alpha1, alpha2)?;
    buffer.replace_with(filtered);
    Ok(())
}

/// Value at `x` on the line through `(x1, y1)` and `(x2, y2)`
///
/// Returns the midpoint average when the two x-coordinates nearly coincide.
pub fn interpolate(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if (x2 - x1).abs() < MIN_INTERPOLATION_SPAN {
        return (y1 + y2) / 2.0;
    }
    (x - x1) * (y2 - y1) / (x2 - x1) + y1
}

/// Resample `buffer` to play `factor` times faster
///
/// The output holds `len / factor` samples; output sample `i` reads the
/// source at fractional index `i / new_len * len`. Factors above 1.0
/// shorten the sound and below 1.0 lengthen it. Interpolation indices are
/// clamped to the last source sample.
///
/// # Errors
/// * `InvalidParameter` - If `factor` is not a positive finite number
pub fn change_speed(buffer: &SampleBuffer, factor: f64) -> Result<SampleBuffer> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ExplodeError::invalid_parameter(
            "speed_factor",
            factor,
            "a positive finite number",
        ));
    }

    let input = buffer.samples();
    let old_len = input.len();
    let new_len = (old_len as f64 / factor) as usize;
    let mut out = SampleBuffer::silence(new_len)?;
    if new_len == 0 {
        return Ok(out);
    }

    let last = old_len - 1;
    let output = out.samples_mut();
    output[0] = input[0];

    for (i, sample) in output.iter_mut().enumerate().skip(1) {
        let point = i as f64 / new_len as f64 * old_len as f64;
        let sp1 = (point as usize).min(last);
        let sp2 = (sp1 + 1).min(last);
        *sample = interpolate(
            point,
            sp1 as f64,
            input[sp1] as f64,
            sp2 as f64,
            input[sp2] as f64,
        ) as f32;
    }

    Ok(out)
}

/// In-place variant of [`change_speed`]
pub fn change_speed_in_place(buffer: &mut SampleBuffer, factor: f64) -> Result<()> {
    let resampled = change_speed(buffer, factor)?;
    buffer.replace_with(resampled);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
