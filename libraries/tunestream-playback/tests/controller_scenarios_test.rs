//! End-to-end scenarios for the player controller
//!
//! Drives the controller the way a host would: commands from the UI,
//! media events from a recording backend.


use governor::clock::FakeRelativeClock;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use test_helpers::*;
use tunestream_playback::{
    MediaEvent, PlaybackConfig, PlaybackError, PlaybackStatus, PlayerEvent, QueueEndPolicy,
};

// ============================================================================
// STALE LOADS
// ============================================================================

#[test]
fn test_stale_ready_after_newer_ready_is_ignored() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());

    player.play(&id("s1")).unwrap();
    let token_a = player.current_request().unwrap();
    player.play(&id("s2")).unwrap();
    let token_b = player.current_request().unwrap();
    assert_ne!(token_a, token_b);

    player.handle_media_event(
        token_b,
        MediaEvent::Ready {
            duration_seconds: Some(120.0),
        },
    );
    player.handle_media_event(
        token_a,
        MediaEvent::Ready {
            duration_seconds: Some(999.0),
        },
    );

    let snapshot = player.snapshot();
    assert_eq!(snapshot.current_track.unwrap().id, id("s2"));
    assert_eq!(snapshot.status, PlaybackStatus::Playing);
    assert_eq!(snapshot.duration_seconds, Some(120.0));
}

#[test]
fn test_stale_ready_before_newer_ready_is_ignored() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());

    player.play(&id("s1")).unwrap();
    let token_a = player.current_request().unwrap();
    player.play(&id("s2")).unwrap();

    player.handle_media_event(
        token_a,
        MediaEvent::Ready {
            duration_seconds: Some(999.0),
        },
    );
    assert_eq!(player.status(), PlaybackStatus::Loading);
    assert_eq!(player.snapshot().duration_seconds, None);

    ready(&mut player, 120.0);
    assert_eq!(player.status(), PlaybackStatus::Playing);
    assert_eq!(player.current_track().unwrap().id, id("s2"));
}

#[test]
fn test_stale_error_does_not_fail_current_track() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());

    player.play(&id("s1")).unwrap();
    let token_a = player.current_request().unwrap();
    player.play(&id("s2")).unwrap();
    ready(&mut player, 60.0);

    player.handle_media_event(
        token_a,
        MediaEvent::Error {
            reason: "network".to_string(),
        },
    );

    assert_eq!(player.status(), PlaybackStatus::Playing);
    assert_eq!(player.last_error(), None);
}

#[test]
fn test_switching_tracks_releases_previous_handle() {
    let (mut player, log) = create_test_player(PlaybackConfig::default());

    player.play(&id("s1")).unwrap();
    let token_a = player.current_request().unwrap();
    ready(&mut player, 100.0);
    player.play(&id("s2")).unwrap();

    let calls = log.borrow();
    let release = calls
        .iter()
        .position(|c| *c == BackendCall::Release(token_a))
        .expect("previous handle released");
    let second_load = calls
        .iter()
        .rposition(|c| matches!(c, BackendCall::Load(..)))
        .unwrap();
    assert!(release < second_load);
}

// ============================================================================
// TOGGLE / SEEK
// ============================================================================

#[test]
fn test_double_toggle_returns_to_playing() {
    let (mut player, log) = create_test_player(PlaybackConfig::default());
    player.play(&id("s1")).unwrap();
    ready(&mut player, 200.0);
    let token = player.current_request().unwrap();

    player.toggle_play();
    assert_eq!(player.status(), PlaybackStatus::Paused);
    player.toggle_play();
    assert_eq!(player.status(), PlaybackStatus::Playing);

    let calls = log.borrow();
    let tail = &calls[calls.len() - 2..];
    assert_eq!(
        tail,
        &[BackendCall::Pause(token), BackendCall::Play(token)]
    );
}

#[test]
fn test_seek_clamps_to_track_bounds() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    player.play(&id("s1")).unwrap();
    ready(&mut player, 200.0);

    player.seek(-5.0).unwrap();
    assert_eq!(player.snapshot().position_seconds, 0.0);

    player.seek(9999.0).unwrap();
    assert_eq!(player.snapshot().position_seconds, 200.0);
}

#[test]
fn test_seek_while_paused_keeps_paused() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    player.play(&id("s1")).unwrap();
    ready(&mut player, 200.0);
    player.toggle_play();

    player.seek(30.0).unwrap();
    assert_eq!(player.status(), PlaybackStatus::Paused);
    assert_eq!(player.snapshot().position_seconds, 30.0);
}

#[test]
fn test_seek_before_ready_is_rejected() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    assert!(matches!(player.seek(1.0), Err(PlaybackError::SeekNotReady)));

    player.play(&id("s1")).unwrap();
    assert!(matches!(player.seek(1.0), Err(PlaybackError::SeekNotReady)));
}

#[test]
fn test_progress_updates_position() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    player.play(&id("s1")).unwrap();
    ready(&mut player, 200.0);
    let token = player.current_request().unwrap();

    player.handle_media_event(
        token,
        MediaEvent::Progress {
            position_seconds: 12.5,
        },
    );
    assert_eq!(player.snapshot().position_seconds, 12.5);
}

#[test]
fn test_progress_is_coalesced_at_default_interval() {
    let clock = FakeRelativeClock::default();
    let (mut player, _log) = create_clocked_test_player(PlaybackConfig::default(), clock.clone());
    player.play(&id("s1")).unwrap();
    ready(&mut player, 200.0);
    player.drain_events();

    progress(&mut player, 1.0);
    clock.advance(Duration::from_millis(100));
    progress(&mut player, 1.1);
    assert_eq!(player.snapshot().position_seconds, 1.0);

    clock.advance(Duration::from_millis(160));
    progress(&mut player, 1.3);
    assert_eq!(player.snapshot().position_seconds, 1.3);

    let updates: Vec<f64> = player
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            PlayerEvent::PositionUpdate {
                position_seconds, ..
            } => Some(position_seconds),
            _ => None,
        })
        .collect();
    assert_eq!(updates, vec![1.0, 1.3]);
}

// ============================================================================
// AUTO-ADVANCE / QUEUE ENDS
// ============================================================================

#[test]
fn test_ended_advances_to_next_track() {
    let (mut player, log) = create_test_player(PlaybackConfig::default());
    player
        .play_queue(ids(&["s1", "s2", "s3"]), &id("s1"))
        .unwrap();
    ready(&mut player, 180.0);

    ended(&mut player);
    assert_eq!(player.queue().active_id(), Some(&id("s2")));
    assert_eq!(player.status(), PlaybackStatus::Loading);

    ready(&mut player, 200.0);
    assert_eq!(player.status(), PlaybackStatus::Playing);
    assert_eq!(
        loaded_urls(&log),
        vec![
            "https://cdn.example.com/songs/s1.mp3",
            "https://cdn.example.com/songs/s2.mp3",
        ]
    );

    let events = player.drain_events();
    assert!(events.contains(&PlayerEvent::TrackFinished { track_id: id("s1") }));
}

#[test]
fn test_ended_on_last_track_goes_idle() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    player.play_queue(ids(&["s1", "s2"]), &id("s2")).unwrap();
    ready(&mut player, 10.0);

    ended(&mut player);

    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert!(player.current_track().is_none());
    assert!(player.drain_events().contains(&PlayerEvent::QueueEnded));
}

#[test]
fn test_next_until_exhaustion_then_idle() {
    let (mut player, log) = create_test_player(PlaybackConfig::default());
    player
        .play_queue(ids(&["s1", "s2", "s3"]), &id("s2"))
        .unwrap();

    player.next().unwrap();
    assert_eq!(player.current_track().unwrap().id, id("s3"));

    player.next().unwrap();
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.current_request(), None);
    // Queue content survives, only the cursor is gone
    assert_eq!(player.queue().len(), 3);
    assert_eq!(loaded_urls(&log).len(), 2);
}

#[test]
fn test_previous_from_first_goes_idle() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    player
        .play_queue(ids(&["s1", "s2", "s3"]), &id("s1"))
        .unwrap();
    ready(&mut player, 100.0);

    player.previous().unwrap();

    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert!(player.current_track().is_none());
}

#[test]
fn test_wrap_policy_restarts_queue() {
    let (mut player, _log) = create_test_player(PlaybackConfig {
        queue_end: QueueEndPolicy::Wrap,
        ..PlaybackConfig::default()
    });
    player.play_queue(ids(&["s1", "s2"]), &id("s2")).unwrap();
    ready(&mut player, 100.0);

    ended(&mut player);
    assert_eq!(player.current_track().unwrap().id, id("s1"));
    assert_eq!(player.status(), PlaybackStatus::Loading);
}

#[test]
fn test_duplicate_ids_play_in_order() {
    let (mut player, log) = create_test_player(PlaybackConfig::default());
    player
        .play_queue(ids(&["s1", "s2", "s1"]), &id("s1"))
        .unwrap();

    player.next().unwrap();
    player.next().unwrap();
    assert_eq!(player.queue().active_index(), Some(2));
    player.next().unwrap();
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(loaded_urls(&log).len(), 3);
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_load_error_keeps_track_for_retry() {
    let (mut player, log) = create_test_player(PlaybackConfig::default());
    player
        .play_queue(ids(&["s1", "s2", "s3"]), &id("s1"))
        .unwrap();

    fail(&mut player, "network");

    let snapshot = player.snapshot();
    assert_eq!(snapshot.status, PlaybackStatus::Errored);
    assert_eq!(snapshot.current_track.unwrap().id, id("s1"));
    assert_eq!(snapshot.last_error.as_deref(), Some("network"));

    player.retry().unwrap();
    assert_eq!(player.status(), PlaybackStatus::Loading);
    assert_eq!(player.last_error(), None);
    assert_eq!(loaded_urls(&log).len(), 2);

    ready(&mut player, 90.0);
    assert_eq!(player.status(), PlaybackStatus::Playing);
}

#[test]
fn test_play_again_recovers_from_error() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    player.play(&id("s1")).unwrap();
    fail(&mut player, "decode");

    player.play(&id("s1")).unwrap();
    assert_eq!(player.status(), PlaybackStatus::Loading);
}

#[test]
fn test_error_while_playing_is_surfaced() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    player.play(&id("s1")).unwrap();
    ready(&mut player, 100.0);

    fail(&mut player, "stream dropped");

    assert_eq!(player.status(), PlaybackStatus::Errored);
    let events = player.drain_events();
    assert!(events.contains(&PlayerEvent::Error {
        track_id: Some(id("s1")),
        message: "stream dropped".to_string(),
    }));
}

#[test]
fn test_error_after_ended_is_surfaced_and_retry_reloads() {
    let (mut player, log) = create_test_player(PlaybackConfig {
        auto_advance: false,
        ..PlaybackConfig::default()
    });
    player.play_queue(ids(&["s1", "s2"]), &id("s1")).unwrap();
    ready(&mut player, 100.0);
    ended(&mut player);
    assert_eq!(player.status(), PlaybackStatus::Ended);

    fail(&mut player, "decoder gone");

    let snapshot = player.snapshot();
    assert_eq!(snapshot.status, PlaybackStatus::Errored);
    assert_eq!(snapshot.last_error.as_deref(), Some("decoder gone"));

    // Nothing is loaded any more, so resuming must not claim Playing
    player.toggle_play();
    assert_ne!(player.status(), PlaybackStatus::Playing);

    player.retry().unwrap();
    assert_eq!(player.status(), PlaybackStatus::Loading);
    assert_eq!(loaded_urls(&log).len(), 2);
    ready(&mut player, 100.0);
    assert_eq!(player.status(), PlaybackStatus::Playing);
    assert_eq!(player.current_track().unwrap().id, id("s1"));
}

#[test]
fn test_invalid_queue_changes_nothing() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    player.play_queue(ids(&["s1", "s2"]), &id("s1")).unwrap();
    ready(&mut player, 100.0);

    let result = player.play_queue(ids(&["s3"]), &id("s4"));
    assert!(matches!(result, Err(PlaybackError::InvalidQueue(_))));
    let result = player.play_queue(Vec::new(), &id("s1"));
    assert!(matches!(result, Err(PlaybackError::InvalidQueue(_))));

    assert_eq!(player.status(), PlaybackStatus::Playing);
    assert_eq!(player.queue().len(), 2);
}

// ============================================================================
// VOLUME / STOP / SUBSCRIPTIONS
// ============================================================================

#[test]
fn test_volume_clamped_and_mute_preserves_level() {
    let (mut player, log) = create_test_player(PlaybackConfig::default());

    player.set_volume(1.5);
    assert_eq!(player.snapshot().volume, 1.0);

    player.set_volume(0.25);
    player.toggle_mute();
    assert!(player.is_muted());
    assert_eq!(player.snapshot().volume, 0.25);
    assert_eq!(log.borrow().last(), Some(&BackendCall::SetVolume(0.0)));

    player.toggle_mute();
    assert_eq!(log.borrow().last(), Some(&BackendCall::SetVolume(0.25)));
}

#[test]
fn test_stop_resets_everything() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    player.play_queue(ids(&["s1", "s2"]), &id("s1")).unwrap();
    ready(&mut player, 100.0);
    let token = player.current_request().unwrap();

    player.stop();

    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert!(player.queue().is_empty());

    // Late events of the stopped track are ignored
    player.handle_media_event(token, MediaEvent::Ended);
    assert_eq!(player.status(), PlaybackStatus::Idle);
}

#[test]
fn test_subscribers_receive_each_transition() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    player.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.status));

    player.play(&id("s1")).unwrap();
    ready(&mut player, 100.0);
    player.toggle_play();

    assert_eq!(
        *seen.borrow(),
        vec![
            PlaybackStatus::Loading,
            PlaybackStatus::Playing,
            PlaybackStatus::Paused,
        ]
    );
}

#[test]
fn test_queue_tracks_resolved_for_display() {
    let (mut player, _log) = create_test_player(PlaybackConfig::default());
    player
        .play_queue(ids(&["s3", "missing", "s1"]), &id("s3"))
        .unwrap();

    let titles: Vec<&str> = player
        .queue_tracks()
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Track s3", "Track s1"]);
}
