//! Audio file I/O for Explodomatica
//!
//! Writes finished explosions as mono WAV files and reads them back.
//! The default output format is 16-bit PCM at [`SAMPLE_RATE`].

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;

use crate::engine::buffer::{SampleBuffer, SAMPLE_RATE};
use crate::error::{ExplodeError, Result};

/// Export format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    /// Bit depth: 16, 24, or 32 (float)
    pub bit_depth: u16,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat { bit_depth: 16 }
    }
}

impl ExportFormat {
    /// Create a new export format with the given bit depth
    pub fn new(bit_depth: u16) -> Self {
        ExportFormat { bit_depth }
    }

    /// Check the bit depth is one we can write
    pub fn validate(&self) -> Result<()> {
        self.wav_spec().map(|_| ())
    }

    fn wav_spec(&self) -> Result<WavSpec> {
        let sample_format = match self.bit_depth {
            16 | 24 => SampleFormat::Int,
            32 => SampleFormat::Float,
            other => {
                return Err(ExplodeError::UnsupportedFormat {
                    format: format!("{}-bit audio (only 16, 24, 32 supported)", other),
                })
            }
        };

        Ok(WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: self.bit_depth,
            sample_format,
        })
    }
}

/// Export a buffer to a mono WAV file
///
/// The target file is overwritten if it exists. Samples are clamped to
/// [-1.0, 1.0] before integer quantization.
///
/// # Errors
/// * `UnsupportedFormat` - If the bit depth is not 16, 24 or 32
/// * `AudioWrite` - If the file cannot be created or written
pub fn export_wav(buffer: &SampleBuffer, path: &Path, format: ExportFormat) -> Result<()> {
    let spec = format.wav_spec()?;
    let write_err = |source: hound::Error| ExplodeError::AudioWrite {
        path: path.display().to_string(),
        source,
    };

    let mut writer = WavWriter::create(path, spec).map_err(write_err)?;

    match format.bit_depth {
        16 => {
            for &sample in buffer.samples() {
                let scaled = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
                writer.write_sample(scaled).map_err(write_err)?;
            }
        }
        24 => {
            for &sample in buffer.samples() {
                // 24-bit stored as i32 in hound
                let scaled = (sample.clamp(-1.0, 1.0) * 8388607.0) as i32;
                writer.write_sample(scaled).map_err(write_err)?;
            }
        }
        _ => {
            for &sample in buffer.samples() {
                writer.write_sample(sample).map_err(write_err)?;
            }
        }
    }

    writer.finalize().map_err(write_err)?;
    info!("Saved output in '{}'", path.display());

    Ok(())
}

/// Import a mono WAV file written at [`SAMPLE_RATE`]
///
/// # Errors
/// * `AudioRead` - If the file cannot be opened or decoded
/// * `UnsupportedFormat` - If the file is not mono or not at [`SAMPLE_RATE`]
pub fn import_wav(path: &Path) -> Result<SampleBuffer> {
    let read_err = |source: hound::Error| ExplodeError::AudioRead {
        path: path.display().to_string(),
        source,
    };

    let reader = WavReader::open(path).map_err(read_err)?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(ExplodeError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono supported)", spec.channels),
        });
    }
    if spec.sample_rate != SAMPLE_RATE {
        return Err(ExplodeError::UnsupportedFormat {
            format: format!("{} Hz audio (only {} Hz supported)", spec.sample_rate, SAMPLE_RATE),
        });
    }

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_err)?,
        SampleFormat::Int => {
            let max_val = (1u32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(read_err)?
        }
    };

    Ok(SampleBuffer::from_samples(samples))
}

// ============================================================================
// Tests
// ============================================================================
