//! Media player behaviour against a mocked speaker

mod common;

use std::time::Duration;

use common::{mock_set, Fixture};
use kef_sdk::{
    KefConnector, MediaPlayer, MediaPlayerState, PhysicalSource, PlayerCommand, RepeatMode,
    SdkError, SupportedFeatures,
};
use mockito::{Mock, Server, ServerGuard};
use serde_json::json;

/// Mount the fixture and run one update; keep the mocks alive for the test
fn updated_player(server: &mut ServerGuard, fixture: &Fixture) -> (MediaPlayer, Vec<Mock>) {
    let mocks = fixture.mount(server);
    let mut player = MediaPlayer::new(KefConnector::new(server.host_with_port()));
    player.update().unwrap();
    (player, mocks)
}

// ============================================================================
// Update
// ============================================================================

#[test]
fn test_update_while_playing() {
    let mut server = Server::new();
    let (player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi());
    let snapshot = player.snapshot();

    assert_eq!(player.name(), Some("Office"));
    assert_eq!(player.unique_id(), Some("KEF_84:17:15:0a:bc:de"));
    assert_eq!(player.state(), Some(MediaPlayerState::Playing));

    let info = snapshot.device_info.as_ref().unwrap();
    assert_eq!(info.model, "LSXII");
    assert_eq!(info.firmware_version, "V26120");

    assert_eq!(snapshot.volume_level, Some(0.3));
    assert_eq!(snapshot.volume_step, Some(0.02));
    assert_eq!(snapshot.volume_max, Some(0.8));
    assert_eq!(snapshot.is_volume_muted, Some(false));
    assert_eq!(snapshot.source, Some(PhysicalSource::Wifi));

    assert_eq!(snapshot.media_position, Some(45.0));
    assert_eq!(snapshot.media_duration, Some(180.0));
    assert!(snapshot.media_position_updated_at.is_some());
    assert_eq!(snapshot.media_title.as_deref(), Some("Track"));
    assert_eq!(snapshot.media_artist.as_deref(), Some("Artist"));
    assert_eq!(snapshot.media_album_name.as_deref(), Some("Album"));
    assert_eq!(snapshot.media_playlist.as_deref(), Some("Queue"));
    assert_eq!(snapshot.media_content_type.as_deref(), Some("audio/flac"));
    assert_eq!(snapshot.app_name.as_deref(), Some("spotify"));

    let features = player.supported_features();
    assert!(features.contains(SupportedFeatures::BASE));
    assert!(features.contains(SupportedFeatures::PLAY | SupportedFeatures::PAUSE));
    assert!(features.contains(SupportedFeatures::NEXT_TRACK | SupportedFeatures::PREVIOUS_TRACK));
    assert!(features.contains(SupportedFeatures::SEEK | SupportedFeatures::REPEAT_SET));
    assert!(!features.contains(SupportedFeatures::SHUFFLE_SET));

    assert_eq!(snapshot.repeat, Some(RepeatMode::All));
    assert_eq!(snapshot.shuffle, None);
}

#[test]
fn test_position_is_cleared_when_not_playing() {
    let mut server = Server::new();
    let (player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi().with_source("tv"));
    let snapshot = player.snapshot();

    assert_eq!(snapshot.state, Some(MediaPlayerState::On));
    assert_eq!(snapshot.media_position, None);
    assert_eq!(snapshot.media_duration, None);
    assert_eq!(snapshot.media_position_updated_at, None);
    assert_eq!(snapshot.media_title.as_deref(), Some("Track"));
}

#[test]
fn test_standby_is_off() {
    let mut server = Server::new();
    let (player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi().with_source("standby"));
    assert_eq!(player.state(), Some(MediaPlayerState::Off));
}

#[test]
fn test_unknown_source_is_on() {
    let mut server = Server::new();
    let (player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi().with_source("hdmi"));
    let snapshot = player.snapshot();

    assert_eq!(snapshot.state, Some(MediaPlayerState::On));
    assert_eq!(snapshot.source, Some(PhysicalSource::Other("hdmi".to_string())));
    assert_eq!(snapshot.media_position, None);
}

#[test]
fn test_unknown_play_mode_leaves_repeat_unset() {
    let mut server = Server::new();
    let (player, _mocks) =
        updated_player(&mut server, &Fixture::playing_wifi().with_play_mode("shuffleAll"));
    let snapshot = player.snapshot();

    assert_eq!(snapshot.state, Some(MediaPlayerState::Playing));
    assert!(player.supported_features().contains(SupportedFeatures::REPEAT_SET));
    assert_eq!(snapshot.repeat, None);
    assert_eq!(snapshot.shuffle, None);
}

#[test]
fn test_speaker_without_mac_is_not_ready() {
    let mut server = Server::new();
    let _mocks = Fixture::playing_wifi().without_mac().mount(&mut server);

    let mut player = MediaPlayer::new(KefConnector::new(server.host_with_port()));
    assert!(matches!(player.update(), Err(SdkError::NotReady(_))));
    assert_eq!(player.unique_id(), None);
}

// ============================================================================
// Volume
// ============================================================================

#[test]
fn test_volume_up_clamps_to_maximum() {
    let mut server = Server::new();
    let (mut player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi().with_volume(79));
    let set = mock_set(&mut server, "player:volume", "value", json!({"type": "i32_", "i32_": 80}));

    assert_eq!(player.volume_up().unwrap(), None);
    set.assert();
    assert_eq!(player.snapshot().volume_level, Some(0.8));
}

#[test]
fn test_volume_down_never_goes_below_zero() {
    let mut server = Server::new();
    let (mut player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi().with_volume(1));
    let set = mock_set(&mut server, "player:volume", "value", json!({"type": "i32_", "i32_": 0}));

    player.volume_down().unwrap();
    set.assert();
}

#[test]
fn test_set_volume_level_clamps_to_maximum() {
    let mut server = Server::new();
    let (mut player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi());
    let set = mock_set(&mut server, "player:volume", "value", json!({"type": "i32_", "i32_": 80}));

    player.set_volume_level(0.95).unwrap();
    set.assert();
}

#[test]
fn test_mute_needs_no_refresh() {
    let mut server = Server::new();
    let (mut player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi());
    let set = mock_set(
        &mut server,
        "settings:/mediaPlayer/mute",
        "value",
        json!({"type": "bool_", "bool_": true}),
    );

    assert_eq!(player.mute_volume(true).unwrap(), None);
    set.assert();
    assert_eq!(player.snapshot().is_volume_muted, Some(true));
}

// ============================================================================
// Power, source and transport
// ============================================================================

#[test]
fn test_select_source_requests_short_refresh() {
    let mut server = Server::new();
    let (mut player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi());
    let set = mock_set(
        &mut server,
        "settings:/kef/play/physicalSource",
        "value",
        json!({"type": "kefPhysicalSource", "kefPhysicalSource": "bluetooth"}),
    );

    let delay = player.select_source(PhysicalSource::Bluetooth).unwrap();
    assert_eq!(delay, Some(Duration::from_millis(250)));
    set.assert();
}

#[test]
fn test_turn_off_requests_power_refresh() {
    let mut server = Server::new();
    let (mut player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi());
    let standby = mock_set(
        &mut server,
        "settings:/kef/play/physicalSource",
        "value",
        json!({"type": "kefPhysicalSource", "kefPhysicalSource": "standby"}),
    );

    assert_eq!(player.turn_off().unwrap(), Some(Duration::from_secs(5)));
    standby.assert();
    assert_eq!(player.speaker().previous_source(), PhysicalSource::Wifi);
}

#[test]
fn test_seek_converts_seconds_to_milliseconds() {
    let mut server = Server::new();
    let (mut player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi());
    let control = mock_set(
        &mut server,
        "player:player/control",
        "activate",
        json!({"control": "seekTime", "time": 61500}),
    );

    player.execute(&PlayerCommand::Seek(61.5)).unwrap();
    control.assert();
}

#[test]
fn test_repeat_keeps_shuffle_setting() {
    let mut server = Server::new();
    let (mut player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi());
    let mode = mock_set(
        &mut server,
        "settings:/mediaPlayer/playMode",
        "value",
        json!({"type": "playerPlayMode", "playerPlayMode": "repeatOne"}),
    );

    player.set_repeat(RepeatMode::One).unwrap();
    mode.assert();
    assert!(matches!(
        player.set_shuffle(true),
        Err(SdkError::UnsupportedFeature("shuffle_set"))
    ));
}

#[test]
fn test_play_and_pause_respect_current_state() {
    let mut server = Server::new();
    let (mut player, _mocks) = updated_player(&mut server, &Fixture::playing_wifi());
    let toggle = mock_set(
        &mut server,
        "player:player/control",
        "activate",
        json!({"control": "pause"}),
    );

    // Already playing: nothing to send
    assert_eq!(player.media_play().unwrap(), None);
    assert_eq!(player.media_pause().unwrap(), Some(Duration::from_millis(250)));
    toggle.assert();
}
