//! Sample buffer engine
//!
//! The buffer type, the pure buffer operations that glue the pipeline
//! together, and WAV file I/O.

pub mod buffer;
pub mod io;
pub mod ops;

pub use buffer::{millis_to_frames, seconds_to_frames, SampleBuffer, SAMPLE_RATE};
pub use io::{export_wav, import_wav, ExportFormat};
