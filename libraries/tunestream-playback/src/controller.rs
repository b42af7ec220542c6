//! Player controller - core orchestration
//!
//! Combines the queue, the media engine and the catalog into the public
//! playback API and keeps them synchronized:
//!
//! ```text
//! Idle ──play──▶ Loading ──ready──▶ Playing ◀──toggle──▶ Paused
//!                   │                  │
//!                   └──error──▶ Errored ◀┘      Playing ──ended──▶ Ended ──▶ next()
//! ```
//!
//! Any `play`/`next`/`previous` re-enters Loading with a fresh request token.
//! Media events carrying an older token are discarded, so a slow response
//! for an abandoned track can never overwrite the state of the current one.

use crate::{
    engine::{MediaBackend, MediaEngine, ProgressThrottle},
    error::{PlaybackError, Result},
    events::{MediaEvent, PlayerEvent},
    queue::Queue,
    types::{
        Direction, PlaybackConfig, PlaybackState, PlaybackStatus, PlayerSnapshot, RequestToken,
    },
    volume::Volume,
};
use governor::clock::FakeRelativeClock;
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};
use tunestream_core::{CatalogProvider, Track, TrackId};

/// Handle returned by [`PlayerController::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&PlayerSnapshot)>;

/// Central playback state machine
///
/// One instance per playback session. Dropping it releases the loaded
/// media handle.
pub struct PlayerController {
    config: PlaybackConfig,
    catalog: Box<dyn CatalogProvider>,

    // Queue and media slot
    queue: Queue,
    engine: MediaEngine,

    // State
    state: PlaybackState,
    volume: Volume,
    current_track: Option<Track>,
    last_error: Option<String>,

    // Display metadata for the current queue
    track_cache: HashMap<TrackId, Track>,

    // Request token bookkeeping
    issued_tokens: u64,
    active_token: Option<RequestToken>,

    // UI synchronization
    pending_events: Vec<PlayerEvent>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl PlayerController {
    /// Create a controller over a catalog and a media backend
    pub fn new(
        config: PlaybackConfig,
        catalog: Box<dyn CatalogProvider>,
        backend: Box<dyn MediaBackend>,
    ) -> Self {
        let throttle = ProgressThrottle::new(config.progress_interval());
        Self::with_throttle(config, catalog, backend, throttle)
    }

    /// Create a controller whose progress rate limit runs on `clock`
    ///
    /// For hosts that drive time themselves (and for tests).
    pub fn with_progress_clock(
        config: PlaybackConfig,
        catalog: Box<dyn CatalogProvider>,
        backend: Box<dyn MediaBackend>,
        clock: FakeRelativeClock,
    ) -> Self {
        let throttle = ProgressThrottle::with_clock(config.progress_interval(), clock);
        Self::with_throttle(config, catalog, backend, throttle)
    }

    fn with_throttle(
        config: PlaybackConfig,
        catalog: Box<dyn CatalogProvider>,
        backend: Box<dyn MediaBackend>,
        throttle: ProgressThrottle,
    ) -> Self {
        let volume = Volume::new(config.initial_volume);
        let mut engine = MediaEngine::with_throttle(backend, throttle);
        engine.set_volume(volume.effective());

        Self {
            queue: Queue::with_end_policy(config.queue_end),
            engine,
            state: PlaybackState::idle(volume.level()),
            volume,
            current_track: None,
            last_error: None,
            track_cache: HashMap::new(),
            issued_tokens: 0,
            active_token: None,
            pending_events: Vec::new(),
            listeners: Vec::new(),
            next_subscription: 0,
            config,
            catalog,
        }
    }

    // ===== Playback Control =====

    /// Replace the queue with `ids` and start playing `start`
    ///
    /// Entry point for "play this album / these liked songs". Fails with
    /// `InvalidQueue` if `ids` is empty or lacks `start`; nothing changes in
    /// that case.
    pub fn play_queue(&mut self, ids: Vec<TrackId>, start: &TrackId) -> Result<()> {
        Queue::validate(&ids, start)?;
        let track = self.resolve(start)?;

        let tracks = self.catalog.get_tracks(&ids)?;
        self.track_cache = tracks
            .into_iter()
            .map(|track| (track.id.clone(), track))
            .collect();

        self.queue.set_queue(ids, start)?;
        self.emit_queue_changed();

        self.begin_load(track);
        Ok(())
    }

    /// Play `id`
    ///
    /// Activates `id` in the current queue, or starts a one-track queue if
    /// it is not part of it. Always re-enters Loading, preempting whatever
    /// was playing or loading.
    pub fn play(&mut self, id: &TrackId) -> Result<()> {
        let track = self.resolve(id)?;

        if self.queue.contains(id) {
            self.queue.set_active(id)?;
        } else {
            self.queue.set_queue(vec![id.clone()], id)?;
            self.track_cache.clear();
            self.track_cache.insert(id.clone(), track.clone());
            self.emit_queue_changed();
        }

        self.begin_load(track);
        Ok(())
    }

    /// Skip to next track
    ///
    /// Goes idle when the queue is exhausted (unless wrapping is configured).
    pub fn next(&mut self) -> Result<()> {
        self.step(Direction::Next)
    }

    /// Go to previous track
    ///
    /// Goes idle before the first track (unless wrapping is configured).
    pub fn previous(&mut self) -> Result<()> {
        self.step(Direction::Previous)
    }

    /// Toggle between playing and paused
    ///
    /// From Ended playback resumes, restarting from the beginning unless the
    /// user seeked back into the track. In any other state this is a no-op;
    /// it never fails.
    pub fn toggle_play(&mut self) {
        match self.state.status {
            PlaybackStatus::Playing => {
                self.engine.pause();
                self.set_status(PlaybackStatus::Paused);
            }
            PlaybackStatus::Paused => {
                self.engine.play();
                self.set_status(PlaybackStatus::Playing);
            }
            PlaybackStatus::Ended => {
                if !self.engine.is_loaded() {
                    if let Some(track) = self.current_track.clone() {
                        debug!("Media handle gone, reloading {}", track.id);
                        self.begin_load(track);
                    }
                    return;
                }

                let at_end = match self.state.duration_seconds {
                    Some(duration) => self.state.position_seconds >= duration,
                    None => true,
                };
                if at_end {
                    if let Ok(position) = self.engine.seek(0.0) {
                        self.state.position_seconds = position;
                    }
                }
                self.engine.play();
                self.set_status(PlaybackStatus::Playing);
            }
            status => debug!("toggle_play ignored while {}", status),
        }
    }

    /// Load the failed queue entry again
    ///
    /// No-op unless the player is Errored. Fails with `Catalog` if the entry
    /// still cannot be resolved.
    pub fn retry(&mut self) -> Result<()> {
        if self.state.status != PlaybackStatus::Errored {
            return Ok(());
        }

        let track = match self.queue.active_id().cloned() {
            Some(id) => self.resolve(&id)?,
            None => match self.current_track.clone() {
                Some(track) => track,
                None => return Ok(()),
            },
        };
        info!("Retrying {}", track.id);
        self.begin_load(track);
        Ok(())
    }

    /// Stop playback and clear the queue
    pub fn stop(&mut self) {
        let had_queue = !self.queue.is_empty();
        self.queue.clear();
        self.track_cache.clear();
        if had_queue {
            self.emit_queue_changed();
        }
        self.go_idle();
    }

    // ===== Seek =====

    /// Seek to `seconds`, clamped to the track duration
    ///
    /// Fails with `SeekNotReady` while loading, idle, errored, or when the
    /// duration is unknown.
    pub fn seek(&mut self, seconds: f64) -> Result<()> {
        if !matches!(
            self.state.status,
            PlaybackStatus::Playing | PlaybackStatus::Paused | PlaybackStatus::Ended
        ) {
            return Err(PlaybackError::SeekNotReady);
        }

        let position = self.engine.seek(seconds)?;
        self.state.position_seconds = position;
        self.emit_position_update();
        self.publish();
        Ok(())
    }

    /// Seek to a fraction (0.0-1.0) of the track
    pub fn seek_to_fraction(&mut self, fraction: f64) -> Result<()> {
        let duration = self.engine.duration().ok_or(PlaybackError::SeekNotReady)?;
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.seek(duration * fraction)
    }

    // ===== Volume =====

    /// Set volume (0.0-1.0, clamped)
    pub fn set_volume(&mut self, volume: f32) {
        let level = self.volume.set_level(volume);
        self.state.volume = level;
        self.engine.set_volume(self.volume.effective());
        self.emit_volume_changed();
        self.publish();
    }

    /// Toggle mute, preserving the volume level
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.engine.set_volume(self.volume.effective());
        self.emit_volume_changed();
        self.publish();
    }

    // ===== Media Events =====

    /// Apply an event reported by the media backend
    ///
    /// `token` is the request token the backend received with `load`.
    /// Events of superseded requests are silently discarded.
    pub fn handle_media_event(&mut self, token: RequestToken, event: MediaEvent) {
        if self.active_token != Some(token) {
            trace!(
                "Discarding {:?} from stale request {} (active: {:?})",
                event,
                token,
                self.active_token
            );
            return;
        }

        let Some(event) = self.engine.accept(token, event) else {
            return;
        };

        match event {
            MediaEvent::Ready { duration_seconds } => self.on_ready(duration_seconds),
            MediaEvent::Progress { position_seconds } => self.on_progress(position_seconds),
            MediaEvent::Ended => self.on_ended(),
            MediaEvent::Error { reason } => self.on_error(reason),
        }
    }

    fn on_ready(&mut self, duration_seconds: Option<f64>) {
        self.state.duration_seconds = duration_seconds;

        if self.state.status == PlaybackStatus::Loading {
            debug!("Media ready, duration {:?}", duration_seconds);
            self.engine.play();
            self.set_status(PlaybackStatus::Playing);
        } else {
            self.publish();
        }
    }

    fn on_progress(&mut self, position_seconds: f64) {
        if matches!(
            self.state.status,
            PlaybackStatus::Playing | PlaybackStatus::Paused
        ) {
            self.state.position_seconds = position_seconds;
            self.emit_position_update();
            self.publish();
        }
    }

    fn on_ended(&mut self) {
        if self.state.status != PlaybackStatus::Playing {
            return;
        }

        if let Some(duration) = self.state.duration_seconds {
            self.state.position_seconds = duration;
        }
        if let Some(track) = &self.current_track {
            self.pending_events.push(PlayerEvent::TrackFinished {
                track_id: track.id.clone(),
            });
        }
        self.set_status(PlaybackStatus::Ended);

        if self.config.auto_advance {
            if let Err(e) = self.next() {
                warn!("Auto-advance failed: {}", e);
                // The cursor points at the entry that failed, so retry() targets it
                if let Some(step) = self.queue.advance(Direction::Next) {
                    self.queue.set_active_at(step.index).ok();
                }
                self.fail(e.to_string());
            }
        }
    }

    fn on_error(&mut self, reason: String) {
        if matches!(
            self.state.status,
            PlaybackStatus::Loading
                | PlaybackStatus::Playing
                | PlaybackStatus::Paused
                | PlaybackStatus::Ended
        ) {
            self.fail(reason);
        }
    }

    // ===== Subscriptions =====

    /// Register a listener called with a fresh snapshot after every change
    ///
    /// Listeners run synchronously on the caller's thread.
    pub fn subscribe(&mut self, listener: impl FnMut(&PlayerSnapshot) + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener, returns whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Drain all pending events
    ///
    /// Returns all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== State Queries =====

    /// Snapshot for rendering
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current_track: self.current_track.clone(),
            status: self.state.status,
            position_seconds: self.state.position_seconds,
            duration_seconds: self.state.duration_seconds,
            volume: self.state.volume,
            muted: self.volume.is_muted(),
            last_error: self.last_error.clone(),
        }
    }

    /// Current playback state
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Current status
    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    /// Track loaded or being loaded
    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// The queue
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Cached metadata for the queued tracks, in queue order
    pub fn queue_tracks(&self) -> Vec<&Track> {
        self.queue
            .ids()
            .iter()
            .filter_map(|id| self.track_cache.get(id))
            .collect()
    }

    /// Token of the load whose events are currently accepted
    pub fn current_request(&self) -> Option<RequestToken> {
        self.active_token
    }

    /// Reason of the last failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Active configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // ===== Internals =====

    fn resolve(&self, id: &TrackId) -> Result<Track> {
        if let Some(track) = self.track_cache.get(id) {
            return Ok(track.clone());
        }
        Ok(self.catalog.get_track(id)?)
    }

    fn step(&mut self, direction: Direction) -> Result<()> {
        let Some(step) = self.queue.advance(direction) else {
            if self.queue.active_index().is_some() {
                info!("Queue exhausted ({:?}), stopping", direction);
                self.pending_events.push(PlayerEvent::QueueEnded);
            }
            self.go_idle();
            return Ok(());
        };

        let track = self.resolve(&step.id)?;
        self.queue.set_active_at(step.index)?;
        self.begin_load(track);
        Ok(())
    }

    fn issue_token(&mut self) -> RequestToken {
        self.issued_tokens += 1;
        let token = RequestToken::new(self.issued_tokens);
        self.active_token = Some(token);
        token
    }

    fn begin_load(&mut self, track: Track) {
        let token = self.issue_token();
        let previous_track_id = self.current_track.as_ref().map(|t| t.id.clone());

        info!("Loading track {} ({}) as {}", track.id, track.title, token);
        self.pending_events.push(PlayerEvent::TrackChanged {
            track_id: track.id.clone(),
            previous_track_id,
        });

        let media_url = track.media_url.clone();
        self.current_track = Some(track);
        self.state.position_seconds = 0.0;
        self.state.duration_seconds = None;
        self.last_error = None;
        self.set_status(PlaybackStatus::Loading);

        if let Err(e) = self.engine.load(token, &media_url) {
            self.fail(e.to_string());
        }
    }

    fn go_idle(&mut self) {
        self.engine.stop();
        self.active_token = None;
        self.queue.clear_active();
        self.current_track = None;
        self.last_error = None;
        self.state.position_seconds = 0.0;
        self.state.duration_seconds = None;
        self.set_status(PlaybackStatus::Idle);
    }

    fn fail(&mut self, message: String) {
        let track_id = self
            .queue
            .active_id()
            .or_else(|| self.current_track.as_ref().map(|t| &t.id))
            .cloned();
        warn!("Playback failed for {:?}: {}", track_id, message);
        self.pending_events.push(PlayerEvent::Error {
            track_id,
            message: message.clone(),
        });
        self.last_error = Some(message);
        self.set_status(PlaybackStatus::Errored);
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.state.status != status {
            debug!("Status {} -> {}", self.state.status, status);
            self.state.status = status;
            self.pending_events
                .push(PlayerEvent::StateChanged { status });
        }
        self.publish();
    }

    fn publish(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    fn emit_volume_changed(&mut self) {
        self.pending_events.push(PlayerEvent::VolumeChanged {
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
        });
    }

    fn emit_position_update(&mut self) {
        self.pending_events.push(PlayerEvent::PositionUpdate {
            position_seconds: self.state.position_seconds,
            duration_seconds: self.state.duration_seconds,
        });
    }
}
