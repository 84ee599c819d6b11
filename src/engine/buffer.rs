//! Sample Buffer Management
//!
//! Provides the core mono sample buffer type. Every buffer runs at the fixed
//! [`SAMPLE_RATE`] and tracks a valid length separately from its allocated
//! capacity, so trimming never reallocates.

use crate::error::{ExplodeError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Sample rate for all processing (44.1kHz)
pub const SAMPLE_RATE: u32 = 44100;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert a duration in seconds to a whole number of frames
///
/// Negative or non-finite durations yield zero frames.
#[inline]
pub fn seconds_to_frames(seconds: f64) -> usize {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * SAMPLE_RATE as f64) as usize
}

/// Convert a duration in milliseconds to a whole number of frames
#[inline]
pub fn millis_to_frames(millis: f64) -> usize {
    seconds_to_frames(millis / 1000.0)
}

// ============================================================================
// Sample Buffer
// ============================================================================

/// Mono buffer of 32-bit float samples at [`SAMPLE_RATE`]
///
/// Storage is always zero-filled up to `capacity()`. Only the first `len()`
/// samples are meaningful, and every read or write is checked against
/// `len()`, never against capacity.
///
/// # Example
/// ```
/// use explodomatica::engine::SampleBuffer;
///
/// let mut buffer = SampleBuffer::allocate(100).unwrap();
/// assert_eq!(buffer.len(), 0);
/// assert_eq!(buffer.capacity(), 100);
///
/// buffer.set_len(50);
/// assert_eq!(buffer.samples().len(), 50);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBuffer {
    data: Vec<f32>,
    len: usize,
}

impl SampleBuffer {
    /// Allocate a zero-filled buffer with room for `capacity` samples
    ///
    /// The new buffer has length 0.
    ///
    /// # Errors
    /// * `OutOfMemory` - If the storage cannot be reserved
    pub fn allocate(capacity: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| ExplodeError::OutOfMemory {
                requested: capacity,
            })?;
        data.resize(capacity, 0.0);
        Ok(Self { data, len: 0 })
    }

    /// Allocate a buffer of `len` silent samples
    pub fn silence(len: usize) -> Result<Self> {
        let mut buffer = Self::allocate(len)?;
        buffer.len = len;
        Ok(buffer)
    }

    /// Wrap existing samples; the length is the vector's length
    pub fn from_samples(samples: Vec<f32>) -> Self {
        let len = samples.len();
        Self { data: samples, len }
    }

    /// Create a sine wave test tone at half amplitude
    ///
    /// # Arguments
    /// * `num_samples` - Length of the tone in samples
    /// * `frequency` - Frequency in Hz
    pub fn sine_wave(num_samples: usize, frequency: f32) -> Self {
        let delta = frequency * 2.0 * std::f32::consts::PI / SAMPLE_RATE as f32;
        let samples = (0..num_samples)
            .map(|i| (delta * i as f32).sin() * 0.5)
            .collect();
        Self::from_samples(samples)
    }

    /// Number of meaningful samples
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer holds no meaningful samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of samples the storage can hold without reallocating
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Set the number of meaningful samples
    ///
    /// The length is clamped to the capacity. Samples exposed by growing
    /// the length keep whatever the storage holds (zero unless previously
    /// written).
    pub fn set_len(&mut self, len: usize) {
        self.len = len.min(self.data.len());
    }

    /// Get the duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.len as f64 / SAMPLE_RATE as f64
    }

    /// Immutable view of the meaningful samples
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data[..self.len]
    }

    /// Mutable view of the meaningful samples
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data[..self.len]
    }

    /// Get a sample, or None past the valid length
    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.samples().get(index).copied()
    }

    /// Set a sample; returns false past the valid length
    #[inline]
    pub fn set(&mut self, index: usize, value: f32) -> bool {
        match self.samples_mut().get_mut(index) {
            Some(sample) => {
                *sample = value;
                true
            }
            None => false,
        }
    }

    /// Full independent duplicate of the meaningful samples
    pub fn try_copy(&self) -> Result<Self> {
        let mut copy = Self::allocate(self.len)?;
        copy.data.copy_from_slice(self.samples());
        copy.len = self.len;
        Ok(copy)
    }

    /// Replace this buffer's contents with `other`, releasing the old storage
    ///
    /// The new contents are always fully computed before the swap, so the
    /// handle is never observable half-replaced.
    pub fn replace_with(&mut self, other: SampleBuffer) {
        *self = other;
    }

    /// Largest absolute sample value (0.0 for empty buffers)
    pub fn peak(&self) -> f32 {
        self.samples().iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
    }

    /// Check if all samples are finite (not NaN or Infinity)
    pub fn is_finite(&self) -> bool {
        self.samples().iter().all(|s| s.is_finite())
    }

    /// Consume the buffer and return the meaningful samples
    pub fn into_samples(mut self) -> Vec<f32> {
        self.data.truncate(self.len);
        self.data
    }
}

// ============================================================================
// Tests
// ============================================================================
