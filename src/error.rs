//! Error types for ffmpeg-module-core

use thiserror::Error;

/// Result type alias for ffmpeg-module-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for module lifecycle and reporting
#[derive(Error, Debug)]
pub enum Error {
    /// Lifecycle transition that cannot be honoured (e.g. init after shutdown)
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// Operation requires an initialized library
    #[error("Library not initialized")]
    NotInitialized,

    /// Memory allocation error
    #[error("Memory allocation failed")]
    Memory,

    /// Malformed configuration value
    #[error("Invalid configuration value {value:?} for {key}")]
    Configuration { key: String, value: String },

    /// FFmpeg error with code
    #[error("FFmpeg error {code}: {message}")]
    FFmpeg { code: i32, message: String },
}

impl From<ffmpeg_next::Error> for Error {
    fn from(e: ffmpeg_next::Error) -> Self {
        Error::FFmpeg {
            code: i32::from(e),
            message: e.to_string(),
        }
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::Memory
    }
}
