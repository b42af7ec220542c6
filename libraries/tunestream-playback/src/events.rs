//! Playback Events
//!
//! Two event families flow through the player:
//! - `MediaEvent`: raw facts reported by the media backend (ready, progress,
//!   ended, error), delivered by the host together with the request token of
//!   the load they belong to
//! - `PlayerEvent`: transitions emitted by the controller for UI
//!   synchronization, drained with `PlayerController::drain_events`

use crate::types::PlaybackStatus;
use serde::{Deserialize, Serialize};
use tunestream_core::TrackId;

/// Events reported by the media backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaEvent {
    /// Media is buffered enough to start
    Ready {
        /// Track length, `None` when the backend cannot tell
        duration_seconds: Option<f64>,
    },

    /// Playback position moved
    Progress {
        /// Current position
        position_seconds: f64,
    },

    /// Reached the end of the media
    Ended,

    /// Loading or decoding failed
    Error {
        /// Backend-provided reason
        reason: String,
    },
}

/// Events emitted by the player controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Status changed
    StateChanged {
        /// The new status
        status: PlaybackStatus,
    },

    /// A different track was loaded
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Track finished playing naturally (reached end)
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Position update (throttled)
    PositionUpdate {
        /// Current playback position
        position_seconds: f64,
        /// Total track duration, if known
        duration_seconds: Option<f64>,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0.0-1.0)
        volume: f32,
        /// Whether audio is muted
        muted: bool,
    },

    /// Queue replaced or cleared
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Navigation ran past the end of the queue
    QueueEnded,

    /// Loading or playback failed
    Error {
        /// Track that failed
        track_id: Option<TrackId>,
        /// Error message
        message: String,
    },
}
