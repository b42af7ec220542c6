//! Interactive player session
//!
//! Owns the controller and the console backend log, and turns parsed
//! commands into controller calls or simulated media events.

use crate::{
    commands::{Command, HELP},
    console_backend::{ConsoleBackend, SharedLog},
    error::{CliError, Result},
};
use std::fmt::Write as _;
use tracing::debug;
use tunestream_core::{InMemoryCatalog, TrackId};
use tunestream_playback::{
    MediaEvent, PlaybackConfig, PlayerController, PlayerEvent, PlayerSnapshot, RequestToken,
};

/// Result of one command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Text to show the operator
    Text(String),
    /// Leave the session
    Quit,
}

pub struct Session {
    player: PlayerController,
    backend: SharedLog,
    track_ids: Vec<TrackId>,
    events: Vec<PlayerEvent>,
}

impl Session {
    pub fn new(config: PlaybackConfig, catalog: InMemoryCatalog) -> Self {
        let (backend, log) = ConsoleBackend::with_log();
        Self::with_backend(config, catalog, backend, log)
    }

    pub fn with_backend(
        config: PlaybackConfig,
        catalog: InMemoryCatalog,
        backend: ConsoleBackend,
        log: SharedLog,
    ) -> Self {
        let track_ids = catalog.ids();
        Self {
            player: PlayerController::new(config, Box::new(catalog), Box::new(backend)),
            backend: log,
            track_ids,
            events: Vec::new(),
        }
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    /// Apply one command
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        debug!("Executing {:?}", command);

        match command {
            Command::Play(id) => self.player.play(&id)?,
            Command::Queue { ids, start } => self.player.play_queue(ids, &start)?,
            Command::Next => self.player.next()?,
            Command::Previous => self.player.previous()?,
            Command::Toggle => self.player.toggle_play(),
            Command::Seek(seconds) => self.player.seek(seconds)?,
            Command::SeekFraction(fraction) => self.player.seek_to_fraction(fraction)?,
            Command::Volume(level) => self.player.set_volume(level),
            Command::Mute => self.player.toggle_mute(),
            Command::Stop => self.player.stop(),
            Command::Retry => self.player.retry()?,

            Command::Ready {
                token,
                duration_seconds,
            } => self.deliver(token, MediaEvent::Ready { duration_seconds })?,
            Command::Progress {
                token,
                position_seconds,
            } => self.deliver(token, MediaEvent::Progress { position_seconds })?,
            Command::Ended { token } => self.deliver(token, MediaEvent::Ended)?,
            Command::Fail { token, reason } => self.deliver(token, MediaEvent::Error { reason })?,

            Command::Status => {}
            Command::Queued => return Ok(Reply::Text(self.render_queue())),
            Command::Tracks => return Ok(Reply::Text(self.render_tracks())),
            Command::Events => return Ok(Reply::Text(self.render_events())),
            Command::Help => return Ok(Reply::Text(HELP.to_string())),
            Command::Quit => return Ok(Reply::Quit),
        }

        self.events.extend(self.player.drain_events());
        Ok(Reply::Text(render_snapshot(&self.player.snapshot())))
    }

    /// Deliver a simulated event for `#value`, or for the latest load
    fn deliver(&mut self, token: Option<u64>, event: MediaEvent) -> Result<()> {
        let token = self.resolve_token(token)?;
        self.player.handle_media_event(token, event);
        Ok(())
    }

    fn resolve_token(&self, value: Option<u64>) -> Result<RequestToken> {
        let log = self.backend.borrow();
        match value {
            Some(value) => log.find(value).ok_or(CliError::UnknownToken(value)),
            None => log
                .loaded
                .last()
                .copied()
                .ok_or_else(|| CliError::Parse("nothing has been loaded yet".to_string())),
        }
    }

    fn render_queue(&self) -> String {
        let queue = self.player.queue();
        if queue.is_empty() {
            return "queue is empty".to_string();
        }

        let mut out = String::new();
        for (index, id) in queue.ids().iter().enumerate() {
            let marker = if queue.active_index() == Some(index) {
                ">"
            } else {
                " "
            };
            let _ = writeln!(out, "{} {:>3}. {}", marker, index + 1, id);
        }
        out.trim_end().to_string()
    }

    fn render_tracks(&self) -> String {
        if self.track_ids.is_empty() {
            return "catalog is empty".to_string();
        }
        self.track_ids
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Events emitted since the last `events` command
    fn render_events(&mut self) -> String {
        self.events.extend(self.player.drain_events());
        if self.events.is_empty() {
            return "no events".to_string();
        }
        self.events
            .drain(..)
            .map(|event| serde_json::to_string(&event).unwrap_or_else(|e| e.to_string()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One-line rendering of the player state
pub fn render_snapshot(snapshot: &PlayerSnapshot) -> String {
    let track = snapshot
        .current_track
        .as_ref()
        .map(|t| format!("{} \"{}\" by {}", t.id, t.title, t.author))
        .unwrap_or_else(|| "-".to_string());

    let duration = snapshot
        .duration_seconds
        .map(|d| format!("{:.1}s", d))
        .unwrap_or_else(|| "?".to_string());

    let volume = if snapshot.muted {
        format!("{:.2} (muted)", snapshot.volume)
    } else {
        format!("{:.2}", snapshot.volume)
    };

    let mut line = format!(
        "[{}] {} | {:.1}s / {} | vol {}",
        snapshot.status, track, snapshot.position_seconds, duration, volume
    );
    if let Some(error) = &snapshot.last_error {
        let _ = write!(line, " | error: {}", error);
    }
    line
}
