/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid command: {0}")]
    Parse(String),

    #[error("Unknown request token: #{0}")]
    UnknownToken(u64),

    #[error("Catalog error: {0}")]
    Catalog(#[from] tunestream_core::CoreError),

    #[error("Playback error: {0}")]
    Playback(#[from] tunestream_playback::PlaybackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
