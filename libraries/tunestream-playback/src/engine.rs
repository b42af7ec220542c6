//! Media engine adapter
//!
//! `MediaEngine` owns the single playable slot. The platform side (an HTML
//! audio element, a native decoder, a test double) implements
//! `MediaBackend`; the engine guarantees that at most one handle is alive,
//! releases it on every exit path, clamps seeks and volume, filters events
//! of released handles and throttles progress reports.

use crate::error::{PlaybackError, Result};
use crate::events::MediaEvent;
use crate::types::RequestToken;
use crate::volume::Volume;
use governor::clock::{Clock, FakeRelativeClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Platform audio resource
///
/// Calls return immediately; outcomes (ready, progress, ended, error) are
/// reported later by the host through `PlayerController::handle_media_event`,
/// tagged with the token passed to `load`.
pub trait MediaBackend {
    /// Start loading `media_url` under `token`
    ///
    /// # Errors
    /// A reason string if the load cannot even be started
    fn load(&mut self, token: RequestToken, media_url: &str) -> std::result::Result<(), String>;

    /// Tear down the resource loaded under `token`
    fn release(&mut self, token: RequestToken);

    /// Resume producing audio
    fn play(&mut self, token: RequestToken);

    /// Halt producing audio
    fn pause(&mut self, token: RequestToken);

    /// Jump to `position_seconds` (already clamped)
    fn seek(&mut self, token: RequestToken, position_seconds: f64);

    /// Output volume (already clamped to 0.0-1.0)
    fn set_volume(&mut self, volume: f32);
}

/// Clock driving the progress limiter
#[derive(Clone)]
enum ThrottleClock {
    System,
    Manual(FakeRelativeClock),
}

enum Limiter {
    System(DefaultDirectRateLimiter),
    Manual(
        RateLimiter<
            NotKeyed,
            InMemoryState,
            FakeRelativeClock,
            NoOpMiddleware<<FakeRelativeClock as Clock>::Instant>,
        >,
    ),
}

impl Limiter {
    fn new(quota: Quota, clock: &ThrottleClock) -> Self {
        match clock {
            ThrottleClock::System => Limiter::System(RateLimiter::direct(quota)),
            ThrottleClock::Manual(clock) => {
                Limiter::Manual(RateLimiter::direct_with_clock(quota, clock.clone()))
            }
        }
    }

    fn check(&self) -> bool {
        match self {
            Limiter::System(limiter) => limiter.check().is_ok(),
            Limiter::Manual(limiter) => limiter.check().is_ok(),
        }
    }
}

/// Rate limiter for progress events
///
/// One event per `interval`, no bursts. A zero interval disables limiting.
pub struct ProgressThrottle {
    interval: Duration,
    clock: ThrottleClock,
    limiter: Option<Limiter>,
}

impl ProgressThrottle {
    /// Create a throttle on the system clock
    pub fn new(interval: Duration) -> Self {
        Self::build(interval, ThrottleClock::System)
    }

    /// Create a throttle on a manually advanced clock
    pub fn with_clock(interval: Duration, clock: FakeRelativeClock) -> Self {
        Self::build(interval, ThrottleClock::Manual(clock))
    }

    fn build(interval: Duration, clock: ThrottleClock) -> Self {
        let limiter = Self::limiter(interval, &clock);
        Self {
            interval,
            clock,
            limiter,
        }
    }

    fn limiter(interval: Duration, clock: &ThrottleClock) -> Option<Limiter> {
        let quota = Quota::with_period(interval)?.allow_burst(NonZeroU32::MIN);
        Some(Limiter::new(quota, clock))
    }

    /// Whether an event arriving now may pass
    pub fn admit(&self) -> bool {
        match &self.limiter {
            Some(limiter) => limiter.check(),
            None => true,
        }
    }

    /// Forget past emissions (next event passes)
    pub fn reset(&mut self) {
        self.limiter = Self::limiter(self.interval, &self.clock);
    }

    /// Minimum spacing between admitted events
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Single-slot media engine
pub struct MediaEngine {
    backend: Box<dyn MediaBackend>,

    /// Currently loaded handle
    handle: Option<RequestToken>,

    duration_seconds: Option<f64>,
    position_seconds: f64,
    volume: f32,

    throttle: ProgressThrottle,
}

impl MediaEngine {
    /// Wrap a backend
    pub fn new(backend: Box<dyn MediaBackend>, progress_interval: Duration) -> Self {
        Self::with_throttle(backend, ProgressThrottle::new(progress_interval))
    }

    /// Wrap a backend, limiting progress with the given throttle
    pub fn with_throttle(backend: Box<dyn MediaBackend>, throttle: ProgressThrottle) -> Self {
        Self {
            backend,
            handle: None,
            duration_seconds: None,
            position_seconds: 0.0,
            volume: 1.0,
            throttle,
        }
    }

    /// Load `media_url` as handle `token`
    ///
    /// Releases the previous handle first. If the backend refuses the load,
    /// the slot is left empty.
    pub fn load(&mut self, token: RequestToken, media_url: &str) -> Result<RequestToken> {
        self.release_current();

        self.handle = Some(token);
        self.duration_seconds = None;
        self.position_seconds = 0.0;
        self.throttle.reset();

        debug!("Loading media {} as {}", media_url, token);
        if let Err(reason) = self.backend.load(token, media_url) {
            warn!("Backend refused to load {}: {}", media_url, reason);
            self.release_current();
            return Err(PlaybackError::Load(reason));
        }

        Ok(token)
    }

    /// Resume; ignored without a handle
    pub fn play(&mut self) {
        match self.handle {
            Some(token) => self.backend.play(token),
            None => trace!("play ignored: nothing loaded"),
        }
    }

    /// Halt; ignored without a handle
    pub fn pause(&mut self) {
        match self.handle {
            Some(token) => self.backend.pause(token),
            None => trace!("pause ignored: nothing loaded"),
        }
    }

    /// Seek, clamped to `[0, duration]`
    ///
    /// Returns the position actually requested from the backend.
    /// Fails with `SeekNotReady` while nothing is loaded or the duration is
    /// unknown.
    pub fn seek(&mut self, seconds: f64) -> Result<f64> {
        let (Some(token), Some(duration)) = (self.handle, self.duration_seconds) else {
            return Err(PlaybackError::SeekNotReady);
        };

        let target = if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, duration)
        };

        self.backend.seek(token, target);
        self.position_seconds = target;
        Ok(target)
    }

    /// Set output volume, returns the clamped value
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = Volume::clamp_level(volume);
        self.backend.set_volume(self.volume);
        self.volume
    }

    /// Release the loaded handle, if any
    pub fn stop(&mut self) {
        self.release_current();
    }

    /// Filter a raw backend event
    ///
    /// Events for anything but the current handle are dropped, as are
    /// progress reports arriving faster than the throttle interval.
    pub fn accept(&mut self, token: RequestToken, event: MediaEvent) -> Option<MediaEvent> {
        if self.handle != Some(token) {
            trace!("Dropping {:?} for released handle {}", event, token);
            return None;
        }

        match event {
            MediaEvent::Ready { duration_seconds } => {
                let duration = duration_seconds.filter(|d| d.is_finite() && *d >= 0.0);
                self.duration_seconds = duration;
                Some(MediaEvent::Ready {
                    duration_seconds: duration,
                })
            }
            MediaEvent::Progress { position_seconds } => {
                let mut position = if position_seconds.is_finite() {
                    position_seconds.max(0.0)
                } else {
                    0.0
                };
                if let Some(duration) = self.duration_seconds {
                    position = position.min(duration);
                }
                self.position_seconds = position;

                self.throttle.admit().then_some(MediaEvent::Progress {
                    position_seconds: position,
                })
            }
            MediaEvent::Ended => {
                if let Some(duration) = self.duration_seconds {
                    self.position_seconds = duration;
                }
                Some(MediaEvent::Ended)
            }
            MediaEvent::Error { reason } => {
                warn!("Media error on {}: {}", token, reason);
                self.release_current();
                Some(MediaEvent::Error { reason })
            }
        }
    }

    /// Loaded handle
    pub fn handle(&self) -> Option<RequestToken> {
        self.handle
    }

    /// Whether a handle is loaded
    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    /// Duration reported by the last `Ready`
    pub fn duration(&self) -> Option<f64> {
        self.duration_seconds
    }

    /// Last known position
    pub fn position(&self) -> f64 {
        self.position_seconds
    }

    /// Last volume sent to the backend
    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn release_current(&mut self) {
        if let Some(token) = self.handle.take() {
            debug!("Releasing media handle {}", token);
            self.backend.release(token);
        }
        self.duration_seconds = None;
        self.position_seconds = 0.0;
    }
}

impl Drop for MediaEngine {
    fn drop(&mut self) {
        self.release_current();
    }
}
