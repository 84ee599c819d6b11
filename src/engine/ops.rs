//! Buffer operations
//!
//! Pure operations over one or two sample buffers: mixing, fading, shifting
//! and amplitude management. Operations that combine buffers always return a
//! new buffer; the `_in_place` variants replace the target's storage.

use super::buffer::SampleBuffer;
use crate::error::Result;

/// Samples quieter than this are treated as silence when trimming
pub const SILENCE_THRESHOLD: f32 = 1e-5;

/// Slack applied by [`normalize`] so the peak lands just below full scale
pub const NORMALIZE_HEADROOM: f32 = 1.001;

/// Elementwise sum of two buffers
///
/// The result is as long as the longer input; missing samples in the
/// shorter one count as zero.
pub fn mix(a: &SampleBuffer, b: &SampleBuffer) -> Result<SampleBuffer> {
    let len = a.len().max(b.len());
    let mut out = SampleBuffer::silence(len)?;

    for (dst, &src) in out.samples_mut().iter_mut().zip(a.samples()) {
        *dst += src;
    }
    for (dst, &src) in out.samples_mut().iter_mut().zip(b.samples()) {
        *dst += src;
    }

    Ok(out)
}

/// Replace `acc` with `mix(acc, inc)`, releasing the old storage of `acc`
pub fn accumulate_in_place(acc: &mut SampleBuffer, inc: &SampleBuffer) -> Result<()> {
    let sum = mix(acc, inc)?;
    acc.replace_with(sum);
    Ok(())
}

/// Fade the first `n` samples linearly from 1.0 down towards 0.0
///
/// Samples past `n` are untouched. Repeated passes over the same prefix
/// compound into a `(1 - i/n)^k` curve.
pub fn fade_out_linear(buffer: &mut SampleBuffer, n: usize) {
    let n = n.min(buffer.len());
    if n == 0 {
        return;
    }

    for (i, sample) in buffer.samples_mut()[..n].iter_mut().enumerate() {
        let factor = 1.0 - (i as f64 / n as f64);
        *sample = (*sample as f64 * factor) as f32;
    }
}

/// Shift samples later by `delay` samples
///
/// The tail that runs past the end is discarded and the vacated head is
/// silenced. Walks from the end toward the start so every source sample is
/// read before it is overwritten.
pub fn delay_shift(buffer: &mut SampleBuffer, delay: usize) {
    if delay == 0 {
        return;
    }

    let samples = buffer.samples_mut();
    for i in (0..samples.len()).rev() {
        samples[i] = if i >= delay { samples[i - delay] } else { 0.0 };
    }
}

/// Scale so the peak lands at `1 / NORMALIZE_HEADROOM`
///
/// All-zero and empty buffers are left unchanged.
pub fn normalize(buffer: &mut SampleBuffer) {
    let max = buffer.peak();
    if max <= 0.0 {
        return;
    }

    let divisor = NORMALIZE_HEADROOM * max;
    for sample in buffer.samples_mut() {
        *sample /= divisor;
    }
}

/// Multiply every sample by `gain`, then clamp to [-1.0, 1.0]
pub fn amplify_clamp(buffer: &mut SampleBuffer, gain: f32) {
    for sample in buffer.samples_mut() {
        *sample = (*sample * gain).clamp(-1.0, 1.0);
    }
}

/// Shrink the valid length past trailing near-silent samples
///
/// Stops at the first sample, scanning from the end, whose magnitude is at
/// least [`SILENCE_THRESHOLD`]. Storage is not reallocated and interior
/// silence is kept.
pub fn trim_trailing_silence(buffer: &mut SampleBuffer) {
    let keep = buffer
        .samples()
        .iter()
        .rposition(|s| s.abs() >= SILENCE_THRESHOLD)
        .map_or(0, |last| last + 1);
    buffer.set_len(keep);
}

// ============================================================================
// Tests
// ============================================================================
