//! TuneStream - Playback Core
//!
//! Platform-agnostic playback queue and player state machine.
//!
//! This crate provides:
//! - Playback queue (ordered ids, duplicates allowed, stop or wrap at the ends)
//! - Media engine adapter (single media slot, clamped seek and volume,
//!   throttled progress)
//! - Player controller (idle/loading/playing/paused/ended/errored)
//! - Request tokens so results of superseded loads are discarded
//! - Volume with mute that preserves the level
//!
//! # Architecture
//!
//! `tunestream-playback` does no I/O of its own:
//! - Track metadata comes from a `CatalogProvider`
//! - Audio comes from a `MediaBackend` (an HTML audio element, a native
//!   decoder, a console simulator)
//! - The host feeds backend outcomes back through
//!   `PlayerController::handle_media_event`
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use tunestream_core::{InMemoryCatalog, Track, TrackId};
//! use tunestream_playback::{
//!     MediaBackend, MediaEvent, PlaybackConfig, PlaybackStatus, PlayerController, RequestToken,
//! };
//!
//! // Backend that accepts every call
//! struct Silent;
//!
//! impl MediaBackend for Silent {
//!     fn load(&mut self, _token: RequestToken, _url: &str) -> Result<(), String> {
//!         Ok(())
//!     }
//!     fn release(&mut self, _token: RequestToken) {}
//!     fn play(&mut self, _token: RequestToken) {}
//!     fn pause(&mut self, _token: RequestToken) {}
//!     fn seek(&mut self, _token: RequestToken, _position_seconds: f64) {}
//!     fn set_volume(&mut self, _volume: f32) {}
//! }
//!
//! let catalog = InMemoryCatalog::from_tracks(vec![
//!     Track::new("s1", "Song One", "Artist", "https://cdn.example.com/s1.mp3"),
//!     Track::new("s2", "Song Two", "Artist", "https://cdn.example.com/s2.mp3"),
//! ])
//! .unwrap();
//!
//! let mut player =
//!     PlayerController::new(PlaybackConfig::default(), Box::new(catalog), Box::new(Silent));
//!
//! let ids = vec![TrackId::new("s1"), TrackId::new("s2")];
//! player.play_queue(ids, &TrackId::new("s1")).unwrap();
//! assert_eq!(player.status(), PlaybackStatus::Loading);
//!
//! // The backend reports ready for the request it was given
//! let token = player.current_request().unwrap();
//! player.handle_media_event(token, MediaEvent::Ready { duration_seconds: Some(200.0) });
//! assert_eq!(player.status(), PlaybackStatus::Playing);
//!
//! player.toggle_play();
//! assert_eq!(player.status(), PlaybackStatus::Paused);
//! ```

mod controller;
mod engine;
mod error;
mod events;
mod queue;
pub mod types;
mod volume;

// Public exports
pub use controller::{PlayerController, SubscriptionId};
pub use engine::{MediaBackend, MediaEngine, ProgressThrottle};
pub use error::{PlaybackError, Result};
pub use events::{MediaEvent, PlayerEvent};
pub use queue::{Queue, QueueStep};
pub use types::{
    Direction, PlaybackConfig, PlaybackState, PlaybackStatus, PlayerSnapshot, QueueEndPolicy,
    RequestToken,
};
pub use volume::Volume;
