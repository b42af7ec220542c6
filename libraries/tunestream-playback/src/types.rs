//! Core types for playback management

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tunestream_core::Track;

/// Player status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Nothing loaded
    Idle,

    /// Waiting for the media engine to report ready
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Reached the end of the track
    Ended,

    /// The last load or playback failed
    Errored,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Loading => "loading",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::Ended => "ended",
            PlaybackStatus::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Playback state owned by the controller
///
/// The media engine reports raw facts; only the controller writes this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Current status
    pub status: PlaybackStatus,

    /// Position in seconds (>= 0)
    pub position_seconds: f64,

    /// Duration in seconds, `None` until the engine reports it
    pub duration_seconds: Option<f64>,

    /// Volume level (0.0-1.0), independent of mute
    pub volume: f32,
}

impl PlaybackState {
    pub(crate) fn idle(volume: f32) -> Self {
        Self {
            status: PlaybackStatus::Idle,
            position_seconds: 0.0,
            duration_seconds: None,
            volume,
        }
    }
}

/// Queue navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Towards the end of the queue
    Next,

    /// Towards the start of the queue
    Previous,
}

/// What happens when navigation runs past either end of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueEndPolicy {
    /// Stop playback and go idle
    #[default]
    Stop,

    /// Jump to the other end of the queue
    Wrap,
}

/// Monotonic identifier of one load request
///
/// Every load gets a fresh token; the media engine tags its events with it
/// so results of superseded loads can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Wrap a raw token value
    ///
    /// The controller issues tokens itself; hosts driving a [`MediaEngine`]
    /// directly pick their own increasing values.
    ///
    /// [`MediaEngine`]: crate::MediaEngine
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw counter value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only view handed to UI subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    /// Track loaded (or being loaded), kept after errors for retry
    pub current_track: Option<Track>,

    /// Current status
    pub status: PlaybackStatus,

    /// Position in seconds
    pub position_seconds: f64,

    /// Duration in seconds, if known
    pub duration_seconds: Option<f64>,

    /// Volume level (0.0-1.0)
    pub volume: f32,

    /// Whether output is muted
    pub muted: bool,

    /// Reason of the last load/playback failure
    pub last_error: Option<String>,
}

/// Configuration for the player controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 0.8)
    pub initial_volume: f32,

    /// Behaviour past either end of the queue (default: Stop)
    pub queue_end: QueueEndPolicy,

    /// Start the next track when one ends (default: true)
    pub auto_advance: bool,

    /// Minimum spacing of progress updates in ms (default: 250)
    pub progress_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_volume: 0.8,
            queue_end: QueueEndPolicy::Stop,
            auto_advance: true,
            progress_interval_ms: 250,
        }
    }
}

impl PlaybackConfig {
    /// Progress throttle interval
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.initial_volume.is_finite() || !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(PlaybackError::InvalidConfig(format!(
                "initial_volume must be within 0.0-1.0, got {}",
                self.initial_volume
            )));
        }
        Ok(())
    }
}
