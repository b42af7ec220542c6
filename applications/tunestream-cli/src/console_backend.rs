//! Console media backend
//!
//! Produces no audio. Every call is logged, and the tokens handed out by
//! the player are remembered so the operator can later deliver simulated
//! events for any of them (including superseded ones).

use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;
use tunestream_playback::{MediaBackend, RequestToken};

/// What the backend has seen so far
#[derive(Debug, Default)]
pub struct BackendLog {
    /// Every token passed to `load`, oldest first
    pub loaded: Vec<RequestToken>,

    /// Handle currently held, if any
    pub current: Option<RequestToken>,

    /// Whether the current handle is producing audio
    pub playing: bool,

    /// Last volume applied
    pub volume: f32,

    /// URL schemes refused by `load`
    pub refused_schemes: Vec<String>,
}

impl BackendLog {
    /// Look up a previously loaded token by its number
    pub fn find(&self, value: u64) -> Option<RequestToken> {
        self.loaded.iter().copied().find(|t| t.value() == value)
    }
}

pub type SharedLog = Rc<RefCell<BackendLog>>;

/// Backend printing what a real media element would do
pub struct ConsoleBackend {
    log: SharedLog,
}

impl ConsoleBackend {
    pub fn new(log: SharedLog) -> Self {
        Self { log }
    }

    /// Backend plus a handle to its log
    pub fn with_log() -> (Self, SharedLog) {
        let log = SharedLog::default();
        (Self::new(Rc::clone(&log)), log)
    }
}

impl MediaBackend for ConsoleBackend {
    fn load(&mut self, token: RequestToken, media_url: &str) -> Result<(), String> {
        let mut log = self.log.borrow_mut();
        log.loaded.push(token);

        let scheme = media_url.split_once("://").map(|(scheme, _)| scheme);
        if let Some(scheme) = scheme {
            if log.refused_schemes.iter().any(|s| s == scheme) {
                return Err(format!("unsupported scheme {}", scheme));
            }
        }

        info!("[media] load {} -> {}", token, media_url);
        log.current = Some(token);
        log.playing = false;
        Ok(())
    }

    fn release(&mut self, token: RequestToken) {
        info!("[media] release {}", token);
        let mut log = self.log.borrow_mut();
        if log.current == Some(token) {
            log.current = None;
            log.playing = false;
        }
    }

    fn play(&mut self, token: RequestToken) {
        info!("[media] play {}", token);
        self.log.borrow_mut().playing = true;
    }

    fn pause(&mut self, token: RequestToken) {
        info!("[media] pause {}", token);
        self.log.borrow_mut().playing = false;
    }

    fn seek(&mut self, token: RequestToken, position_seconds: f64) {
        info!("[media] seek {} to {:.1}s", token, position_seconds);
    }

    fn set_volume(&mut self, volume: f32) {
        info!("[media] volume {:.2}", volume);
        self.log.borrow_mut().volume = volume;
    }
}
