//! Error handling for Explodomatica
//!
//! Every error carries an error code and, where one exists, a recovery hint.

use thiserror::Error;

/// Result type alias for Explodomatica operations
pub type Result<T> = std::result::Result<T, ExplodeError>;

/// Main error type for Explodomatica operations
#[derive(Error, Debug)]
pub enum ExplodeError {
    // Resource Errors
    #[error("Out of memory: could not allocate {requested} samples")]
    OutOfMemory { requested: usize },

    // Parameter Errors
    #[error("Invalid parameter: {param} = {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // Audio File Errors
    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to write audio file: {path}")]
    AudioWrite {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to read audio file: {path}")]
    AudioRead {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Preset not found: {path}")]
    PresetNotFound { path: String },

    // Pipeline Errors
    #[error("Composer has already rendered its explosion")]
    ComposerSpent,

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExplodeError {
    /// Build an `InvalidParameter` error from anything displayable
    pub fn invalid_parameter(
        param: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        ExplodeError::InvalidParameter {
            param: param.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ExplodeError::OutOfMemory { .. } => "OUT_OF_MEMORY",
            ExplodeError::InvalidParameter { .. } => "INVALID_PARAMETER",
            ExplodeError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ExplodeError::AudioWrite { .. } => "AUDIO_WRITE",
            ExplodeError::AudioRead { .. } => "AUDIO_READ",
            ExplodeError::PresetNotFound { .. } => "PRESET_NOT_FOUND",
            ExplodeError::ComposerSpent => "COMPOSER_SPENT",
            ExplodeError::Io(_) => "IO_ERROR",
            ExplodeError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Allocation failure aborts the run. Everything else can be fixed by
    /// changing the input and trying again.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ExplodeError::OutOfMemory { .. })
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ExplodeError::OutOfMemory { .. } => vec![
                "Reduce the explosion duration",
                "Raise the final speed factor (values below 1.0 lengthen the output)",
                "Lower the number of reverb reflections",
            ],
            ExplodeError::InvalidParameter { .. } => vec![
                "Adjust the parameter to be within its valid range",
                "Run with --help to see the defaults",
            ],
            ExplodeError::UnsupportedFormat { .. } => vec![
                "Use a bit depth of 16, 24 or 32",
                "Only mono WAV files can be read back",
            ],
            ExplodeError::AudioWrite { .. } | ExplodeError::Io(_) => vec![
                "Check that the output directory exists and is writable",
                "Free up disk space",
            ],
            ExplodeError::PresetNotFound { .. } => vec![
                "Check the preset path is correct",
                "Write one with --save-preset",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ExplodeError::OutOfMemory { requested: 10 };
        assert_eq!(err.error_code(), "OUT_OF_MEMORY");
        assert_eq!(ExplodeError::ComposerSpent.error_code(), "COMPOSER_SPENT");
    }

    #[test]
    fn test_out_of_memory_is_fatal() {
        let err = ExplodeError::OutOfMemory { requested: usize::MAX };
        assert!(!err.is_recoverable());
        assert!(!err.recovery_suggestions().is_empty());
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = ExplodeError::invalid_parameter("layer_count", 0, "1 to 10");
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Invalid parameter: layer_count = 0 (expected 1 to 10)"
        );
    }
}
