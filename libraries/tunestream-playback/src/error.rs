//! Error types for playback management

use thiserror::Error;
use tunestream_core::{CoreError, TrackId};

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Queue could not be built from the given ids
    #[error("Invalid queue: {0}")]
    InvalidQueue(String),

    /// Track is not part of the active queue
    #[error("Track not in queue: {0}")]
    NotInQueue(TrackId),

    /// Seek requested before the track duration is known
    #[error("Seek not ready: track duration unknown")]
    SeekNotReady,

    /// Media could not be loaded or decoded
    #[error("Load error: {0}")]
    Load(String),

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Catalog lookup failed
    #[error(transparent)]
    Catalog(#[from] CoreError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
