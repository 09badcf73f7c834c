//! Media player entity
//!
//! [`MediaPlayer`] keeps the last known attributes of one speaker, refreshes
//! them with [`MediaPlayer::update`] and translates media-player commands
//! into connector calls. Every command returns the delay after which the
//! caller should refresh, or `None` when no refresh is needed.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kef_api::{
    ApiError, Controls, DeviceInfo, KefConnector, MediaSnapshot, PhysicalSource, PlayMode,
    PlayerState,
};
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::error::{Result, SdkError};

// ============================================================================
// Supported features
// ============================================================================

/// Bit set of the commands the player currently accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportedFeatures(u32);

impl SupportedFeatures {
    pub const PAUSE: Self = Self(1);
    pub const SEEK: Self = Self(1 << 1);
    pub const VOLUME_SET: Self = Self(1 << 2);
    pub const VOLUME_MUTE: Self = Self(1 << 3);
    pub const PREVIOUS_TRACK: Self = Self(1 << 4);
    pub const NEXT_TRACK: Self = Self(1 << 5);
    pub const TURN_ON: Self = Self(1 << 7);
    pub const TURN_OFF: Self = Self(1 << 8);
    pub const VOLUME_STEP: Self = Self(1 << 10);
    pub const SELECT_SOURCE: Self = Self(1 << 11);
    pub const PLAY: Self = Self(1 << 14);
    pub const SHUFFLE_SET: Self = Self(1 << 15);
    pub const REPEAT_SET: Self = Self(1 << 18);

    /// Features every speaker has regardless of the active player
    pub const BASE: Self = Self(
        Self::VOLUME_SET.0
            | Self::VOLUME_MUTE.0
            | Self::VOLUME_STEP.0
            | Self::TURN_ON.0
            | Self::TURN_OFF.0
            | Self::SELECT_SOURCE.0,
    );

    const NAMES: [(Self, &'static str); 13] = [
        (Self::PAUSE, "pause"),
        (Self::SEEK, "seek"),
        (Self::VOLUME_SET, "volume_set"),
        (Self::VOLUME_MUTE, "volume_mute"),
        (Self::PREVIOUS_TRACK, "previous_track"),
        (Self::NEXT_TRACK, "next_track"),
        (Self::TURN_ON, "turn_on"),
        (Self::TURN_OFF, "turn_off"),
        (Self::VOLUME_STEP, "volume_step"),
        (Self::SELECT_SOURCE, "select_source"),
        (Self::PLAY, "play"),
        (Self::SHUFFLE_SET, "shuffle_set"),
        (Self::REPEAT_SET, "repeat_set"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Base features plus whatever the active player's controls allow
    pub fn from_controls(controls: &Controls) -> Self {
        let mut features = Self::BASE;
        if controls.pause {
            features |= Self::PLAY | Self::PAUSE;
        }
        if controls.next {
            features |= Self::NEXT_TRACK;
        }
        if controls.previous {
            features |= Self::PREVIOUS_TRACK;
        }
        if controls.seek_time {
            features |= Self::SEEK;
        }
        if controls.repeat() {
            features |= Self::REPEAT_SET;
        }
        if controls.shuffle() {
            features |= Self::SHUFFLE_SET;
        }
        features
    }

    /// Names of the contained features, lowest bit first
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(feature, _)| self.contains(*feature))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for SupportedFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SupportedFeatures {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ============================================================================
// State, repeat mode and helpers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaPlayerState {
    Off,
    On,
    Idle,
    Playing,
    Paused,
}

impl fmt::Display for MediaPlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MediaPlayerState::Off => "off",
            MediaPlayerState::On => "on",
            MediaPlayerState::Idle => "idle",
            MediaPlayerState::Playing => "playing",
            MediaPlayerState::Paused => "paused",
        };
        f.write_str(s)
    }
}

/// Entity state for a source and the streaming player's transport state
///
/// Only wifi and bluetooth carry a player; any other input is simply on.
pub fn derive_state(
    source: Option<PhysicalSource>,
    player_state: Option<&PlayerState>,
) -> Option<MediaPlayerState> {
    let source = source?;
    let state = match source {
        PhysicalSource::Standby => MediaPlayerState::Off,
        s if s.has_player() => match player_state {
            Some(PlayerState::Playing) => MediaPlayerState::Playing,
            Some(PlayerState::Paused) => MediaPlayerState::Paused,
            _ => MediaPlayerState::Idle,
        },
        _ => MediaPlayerState::On,
    };
    Some(state)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    Off,
    All,
    One,
}

impl RepeatMode {
    pub fn from_play_mode(mode: PlayMode) -> Self {
        match mode.repeat_one() {
            Some(true) => RepeatMode::One,
            Some(false) => RepeatMode::All,
            None => RepeatMode::Off,
        }
    }

    /// Repeat setting as understood by [`PlayMode::from_parts`]
    pub fn repeat_one(&self) -> Option<bool> {
        match self {
            RepeatMode::Off => None,
            RepeatMode::All => Some(false),
            RepeatMode::One => Some(true),
        }
    }
}

impl FromStr for RepeatMode {
    type Err = SdkError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "off" => Ok(RepeatMode::Off),
            "all" => Ok(RepeatMode::All),
            "one" => Ok(RepeatMode::One),
            other => Err(ApiError::InvalidParameter(format!("unknown repeat mode '{}'", other)).into()),
        }
    }
}

/// Normalise a MAC address to lower-case colon-separated pairs
///
/// Input that is not twelve hex digits is only lower-cased.
pub fn format_mac(mac: &str) -> String {
    let digits: String = mac
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();

    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return mac.to_ascii_lowercase();
    }

    digits
        .to_ascii_lowercase()
        .as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect::<Vec<_>>()
        .join(":")
}

/// Clamp a raw volume to `[0, max_raw]`
pub fn clamp_volume(raw: i32, max_raw: i32) -> i32 {
    raw.clamp(0, max_raw.max(0))
}

/// Convert a volume fraction to a raw speaker volume within `[0, max_raw]`
pub fn volume_to_raw(level: f64, max_raw: i32) -> i32 {
    clamp_volume((level * 100.0).round() as i32, max_raw)
}

fn fraction(raw: i32) -> f64 {
    f64::from(raw) / 100.0
}

fn seconds(ms: i64) -> f64 {
    ms as f64 / 1000.0
}

// ============================================================================
// Snapshot
// ============================================================================

/// Attributes of the media player after the last update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub host: String,
    pub name: Option<String>,
    pub unique_id: Option<String>,
    pub device_info: Option<DeviceInfo>,
    pub state: Option<MediaPlayerState>,
    pub source: Option<PhysicalSource>,
    pub source_list: Vec<PhysicalSource>,
    pub supported_features: SupportedFeatures,

    /// Volume attributes are fractions in `[0, 1]`
    pub volume_level: Option<f64>,
    pub volume_step: Option<f64>,
    pub volume_max: Option<f64>,
    pub is_volume_muted: Option<bool>,

    pub repeat: Option<RepeatMode>,
    pub shuffle: Option<bool>,

    /// Seconds; only set while playing
    pub media_position: Option<f64>,
    /// Seconds; only set while playing
    pub media_duration: Option<f64>,
    pub media_position_updated_at: Option<DateTime<Utc>>,

    pub media_title: Option<String>,
    pub media_artist: Option<String>,
    pub media_album_name: Option<String>,
    pub media_playlist: Option<String>,
    pub media_image_url: Option<String>,
    pub media_content_id: Option<String>,
    pub media_content_type: Option<String>,
    pub app_id: Option<String>,
    pub app_name: Option<String>,
}

impl PlayerSnapshot {
    fn apply_media(&mut self, media: MediaSnapshot, playing: bool) {
        if playing {
            self.media_position = media.media_position.map(seconds);
            self.media_duration = media.media_duration.map(seconds);
            self.media_position_updated_at = Some(Utc::now());
        } else {
            self.media_position = None;
            self.media_duration = None;
            self.media_position_updated_at = None;
        }

        self.media_title = media.media_title;
        self.media_artist = media.media_artist;
        self.media_album_name = media.media_album_name;
        self.media_playlist = media.media_playlist;
        self.media_image_url = media.media_image_url;
        self.media_content_id = media.media_content_id;
        self.media_content_type = media.media_content_type;
        self.app_id = media.app_id;
        self.app_name = media.app_name;
    }
}

// ============================================================================
// Commands
// ============================================================================

/// A media-player command, for hosts that queue commands (see [`Poller`](crate::Poller))
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    TurnOn,
    TurnOff,
    Mute(bool),
    /// Fraction in `[0, 1]`
    SetVolumeLevel(f64),
    VolumeUp,
    VolumeDown,
    SelectSource(PhysicalSource),
    PlayPause,
    Play,
    Pause,
    NextTrack,
    PreviousTrack,
    /// Position in seconds
    Seek(f64),
    SetRepeat(RepeatMode),
    SetShuffle(bool),
    Like,
    Dislike,
    PlayMedia(String),
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerCommand::TurnOn => "turn_on",
            PlayerCommand::TurnOff => "turn_off",
            PlayerCommand::Mute(_) => "mute_volume",
            PlayerCommand::SetVolumeLevel(_) => "set_volume_level",
            PlayerCommand::VolumeUp => "volume_up",
            PlayerCommand::VolumeDown => "volume_down",
            PlayerCommand::SelectSource(_) => "select_source",
            PlayerCommand::PlayPause => "media_play_pause",
            PlayerCommand::Play => "media_play",
            PlayerCommand::Pause => "media_pause",
            PlayerCommand::NextTrack => "media_next_track",
            PlayerCommand::PreviousTrack => "media_previous_track",
            PlayerCommand::Seek(_) => "media_seek",
            PlayerCommand::SetRepeat(_) => "set_repeat",
            PlayerCommand::SetShuffle(_) => "set_shuffle",
            PlayerCommand::Like => "like",
            PlayerCommand::Dislike => "dislike",
            PlayerCommand::PlayMedia(_) => "play_media",
        }
    }
}

/// Refresh delay returned by commands
pub type RefreshDelay = Option<Duration>;

#[derive(Debug, Clone, Copy, Default)]
struct RawVolume {
    level: Option<i32>,
    step: Option<i32>,
    max: Option<i32>,
}

// ============================================================================
// Media player
// ============================================================================

/// Media-player view of one speaker
///
/// # Example
/// ```rust,no_run
/// use kef_api::KefConnector;
/// use kef_sdk::MediaPlayer;
///
/// let mut player = MediaPlayer::new(KefConnector::new("192.168.1.50"));
/// player.update()?;
/// println!("{:?} is {:?}", player.name(), player.state());
///
/// if let Some(delay) = player.media_play_pause()? {
///     std::thread::sleep(delay);
///     player.update()?;
/// }
/// # Ok::<(), kef_sdk::SdkError>(())
/// ```
#[derive(Debug)]
pub struct MediaPlayer {
    speaker: KefConnector,
    config: PlayerConfig,
    volume: RawVolume,
    play_mode: Option<PlayMode>,
    attributes: PlayerSnapshot,
}

impl MediaPlayer {
    pub fn new(speaker: KefConnector) -> Self {
        Self::with_config(speaker, PlayerConfig::default())
    }

    pub fn with_config(speaker: KefConnector, config: PlayerConfig) -> Self {
        let attributes = PlayerSnapshot {
            host: speaker.host().to_string(),
            source_list: config.source_list.clone(),
            supported_features: SupportedFeatures::BASE,
            ..Default::default()
        };

        Self {
            speaker,
            config,
            volume: RawVolume::default(),
            play_mode: None,
            attributes,
        }
    }

    pub fn speaker(&self) -> &KefConnector {
        &self.speaker
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.name.as_deref()
    }

    pub fn unique_id(&self) -> Option<&str> {
        self.attributes.unique_id.as_deref()
    }

    pub fn state(&self) -> Option<MediaPlayerState> {
        self.attributes.state
    }

    pub fn supported_features(&self) -> SupportedFeatures {
        self.attributes.supported_features
    }

    pub fn source_list(&self) -> &[PhysicalSource] {
        &self.config.source_list
    }

    /// Copy of the current attributes
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.attributes.clone()
    }

    /// Refresh every attribute from the speaker
    ///
    /// The first successful update also resolves the name, unique id and
    /// device info; a speaker without a MAC address is reported as not ready.
    pub fn update(&mut self) -> Result<()> {
        if self.attributes.unique_id.is_none() {
            self.resolve_identity()?;
        }

        let data = self.speaker.player_data()?;
        let features = SupportedFeatures::from_controls(&data.controls);

        let volume = RawVolume {
            level: self.speaker.volume_level()?,
            step: self.speaker.volume_step()?.map(i32::from),
            max: self.speaker.maximum_volume()?,
        };
        let is_volume_muted = self.speaker.is_volume_muted()?;
        let source = self.speaker.source()?;

        let play_mode = if features.contains(SupportedFeatures::REPEAT_SET)
            || features.contains(SupportedFeatures::SHUFFLE_SET)
        {
            self.speaker.play_mode()?
        } else {
            None
        };

        let play_time = self.speaker.play_time()?;
        let media = MediaSnapshot::from_player_data(play_time, &data);
        let state = derive_state(source.clone(), data.state.as_ref());

        self.volume = volume;
        self.play_mode = play_mode;

        let attributes = &mut self.attributes;
        attributes.supported_features = features;
        attributes.volume_level = volume.level.map(fraction);
        attributes.volume_step = volume.step.map(fraction);
        attributes.volume_max = volume.max.map(fraction);
        attributes.is_volume_muted = is_volume_muted;
        attributes.state = state;
        attributes.repeat = play_mode
            .filter(|_| features.contains(SupportedFeatures::REPEAT_SET))
            .map(RepeatMode::from_play_mode);
        attributes.shuffle = play_mode
            .filter(|_| features.contains(SupportedFeatures::SHUFFLE_SET))
            .map(|mode| mode.is_shuffle());
        attributes.apply_media(media, state == Some(MediaPlayerState::Playing));

        tracing::debug!(
            host = %self.speaker.host(),
            state = ?state,
            source = ?source,
            "media player updated"
        );
        self.attributes.source = source;
        Ok(())
    }

    fn resolve_identity(&mut self) -> Result<()> {
        let info = self.speaker.device_info()?;
        if info.mac_address.is_empty() {
            return Err(SdkError::NotReady(self.speaker.host().to_string()));
        }

        tracing::info!(
            host = %self.speaker.host(),
            name = %info.name,
            model = %info.model,
            "resolved speaker identity"
        );

        self.attributes.unique_id = Some(format!("KEF_{}", format_mac(&info.mac_address)));
        self.attributes.name = Some(info.name.clone());
        self.attributes.device_info = Some(info);
        Ok(())
    }

    /// Run a queued command
    pub fn execute(&mut self, command: &PlayerCommand) -> Result<RefreshDelay> {
        tracing::debug!(host = %self.speaker.host(), command = command.name(), "executing");

        match command {
            PlayerCommand::TurnOn => self.turn_on(),
            PlayerCommand::TurnOff => self.turn_off(),
            PlayerCommand::Mute(mute) => self.mute_volume(*mute),
            PlayerCommand::SetVolumeLevel(level) => self.set_volume_level(*level),
            PlayerCommand::VolumeUp => self.volume_up(),
            PlayerCommand::VolumeDown => self.volume_down(),
            PlayerCommand::SelectSource(source) => self.select_source(source.clone()),
            PlayerCommand::PlayPause => self.media_play_pause(),
            PlayerCommand::Play => self.media_play(),
            PlayerCommand::Pause => self.media_pause(),
            PlayerCommand::NextTrack => self.media_next_track(),
            PlayerCommand::PreviousTrack => self.media_previous_track(),
            PlayerCommand::Seek(position) => self.media_seek(*position),
            PlayerCommand::SetRepeat(repeat) => self.set_repeat(*repeat),
            PlayerCommand::SetShuffle(shuffle) => self.set_shuffle(*shuffle),
            PlayerCommand::Like => self.like(),
            PlayerCommand::Dislike => self.dislike(),
            PlayerCommand::PlayMedia(uri) => self.play_media(uri),
        }
    }

    // ========================================================================
    // Power and source
    // ========================================================================

    pub fn turn_on(&mut self) -> Result<RefreshDelay> {
        self.speaker.turn_on()?;
        Ok(Some(self.config.power_refresh_delay))
    }

    pub fn turn_off(&mut self) -> Result<RefreshDelay> {
        self.speaker.turn_off()?;
        Ok(Some(self.config.power_refresh_delay))
    }

    /// Select one of the configured inputs
    pub fn select_source(&mut self, source: PhysicalSource) -> Result<RefreshDelay> {
        if !self.config.source_list.contains(&source) {
            return Err(ApiError::InvalidParameter(format!(
                "'{}' is not in the source list",
                source
            ))
            .into());
        }

        self.speaker.set_source(source)?;
        self.command_delay()
    }

    // ========================================================================
    // Volume
    // ========================================================================

    pub fn mute_volume(&mut self, mute: bool) -> Result<RefreshDelay> {
        if mute {
            self.speaker.mute()?;
        } else {
            self.speaker.unmute()?;
        }
        self.attributes.is_volume_muted = Some(mute);
        Ok(None)
    }

    /// Set the volume from a fraction, clamped to `[0, volume_max]`
    pub fn set_volume_level(&mut self, level: f64) -> Result<RefreshDelay> {
        if !level.is_finite() {
            return Err(ApiError::InvalidParameter(format!("volume level {}", level)).into());
        }
        let max = self.max_volume_raw()?;
        self.apply_volume(volume_to_raw(level, max))
    }

    pub fn volume_up(&mut self) -> Result<RefreshDelay> {
        let (level, step, max) = (self.level_raw()?, self.step_raw()?, self.max_volume_raw()?);
        self.apply_volume(clamp_volume(level.saturating_add(step), max))
    }

    pub fn volume_down(&mut self) -> Result<RefreshDelay> {
        let (level, step, max) = (self.level_raw()?, self.step_raw()?, self.max_volume_raw()?);
        self.apply_volume(clamp_volume(level.saturating_sub(step), max))
    }

    fn apply_volume(&mut self, raw: i32) -> Result<RefreshDelay> {
        self.speaker.set_volume(raw)?;
        self.volume.level = Some(raw);
        self.attributes.volume_level = Some(fraction(raw));
        Ok(None)
    }

    // Cached values are used when present; otherwise ask the speaker.

    fn level_raw(&self) -> Result<i32> {
        match self.volume.level {
            Some(level) => Ok(level),
            None => Ok(self.speaker.volume_level()?.unwrap_or(0)),
        }
    }

    fn step_raw(&self) -> Result<i32> {
        match self.volume.step {
            Some(step) => Ok(step),
            None => Ok(self.speaker.volume_step()?.map(i32::from).unwrap_or(1)),
        }
    }

    fn max_volume_raw(&self) -> Result<i32> {
        match self.volume.max {
            Some(max) => Ok(max),
            None => Ok(self.speaker.maximum_volume()?.unwrap_or(100)),
        }
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub fn media_play_pause(&mut self) -> Result<RefreshDelay> {
        self.speaker.play_pause()?;
        self.command_delay()
    }

    /// Resume playback; a no-op when already playing
    pub fn media_play(&mut self) -> Result<RefreshDelay> {
        if self.attributes.state == Some(MediaPlayerState::Playing) {
            return Ok(None);
        }
        self.media_play_pause()
    }

    /// Pause playback; a no-op when known not to be playing
    pub fn media_pause(&mut self) -> Result<RefreshDelay> {
        if matches!(self.attributes.state, Some(state) if state != MediaPlayerState::Playing) {
            return Ok(None);
        }
        self.media_play_pause()
    }

    pub fn media_next_track(&mut self) -> Result<RefreshDelay> {
        self.speaker.next_track()?;
        self.command_delay()
    }

    pub fn media_previous_track(&mut self) -> Result<RefreshDelay> {
        self.speaker.previous_track()?;
        self.command_delay()
    }

    /// Seek to `position` seconds in the current track
    pub fn media_seek(&mut self, position: f64) -> Result<RefreshDelay> {
        self.require(SupportedFeatures::SEEK, "seek")?;
        if !position.is_finite() || position < 0.0 {
            return Err(ApiError::InvalidParameter(format!("seek position {}", position)).into());
        }

        self.speaker.seek((position * 1000.0).round() as u64)?;
        self.command_delay()
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) -> Result<RefreshDelay> {
        self.require(SupportedFeatures::REPEAT_SET, "repeat_set")?;
        let current = self.current_play_mode()?;
        self.apply_play_mode(PlayMode::from_parts(current.is_shuffle(), repeat.repeat_one()))
    }

    pub fn set_shuffle(&mut self, shuffle: bool) -> Result<RefreshDelay> {
        self.require(SupportedFeatures::SHUFFLE_SET, "shuffle_set")?;
        let current = self.current_play_mode()?;
        self.apply_play_mode(PlayMode::from_parts(shuffle, current.repeat_one()))
    }

    pub fn like(&mut self) -> Result<RefreshDelay> {
        self.speaker.like()?;
        self.command_delay()
    }

    pub fn dislike(&mut self) -> Result<RefreshDelay> {
        self.speaker.dislike()?;
        self.command_delay()
    }

    pub fn play_media(&mut self, uri: &str) -> Result<RefreshDelay> {
        self.speaker.play_media(uri)?;
        self.command_delay()
    }

    fn current_play_mode(&self) -> Result<PlayMode> {
        match self.play_mode {
            Some(mode) => Ok(mode),
            None => Ok(self.speaker.play_mode()?.unwrap_or(PlayMode::Normal)),
        }
    }

    fn apply_play_mode(&mut self, mode: PlayMode) -> Result<RefreshDelay> {
        self.speaker.set_play_mode(mode)?;
        self.play_mode = Some(mode);
        self.command_delay()
    }

    fn require(&self, feature: SupportedFeatures, name: &'static str) -> Result<()> {
        if self.attributes.supported_features.contains(feature) {
            Ok(())
        } else {
            Err(SdkError::UnsupportedFeature(name))
        }
    }

    fn command_delay(&self) -> Result<RefreshDelay> {
        Ok(Some(self.config.command_refresh_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn offline_player() -> MediaPlayer {
        MediaPlayer::new(KefConnector::new("127.0.0.1:1"))
    }

    #[test]
    fn test_base_features() {
        let features = SupportedFeatures::from_controls(&Controls::default());
        assert_eq!(features, SupportedFeatures::BASE);
        assert!(!features.contains(SupportedFeatures::PLAY));
        assert_eq!(
            features.names(),
            vec!["volume_set", "volume_mute", "turn_on", "turn_off", "volume_step", "select_source"]
        );
    }

    #[test]
    fn test_features_follow_controls() {
        let controls: Controls = serde_json::from_value(serde_json::json!({
            "pause": true,
            "next_": true,
            "seekTime": true,
            "playMode": {"shuffle": true}
        }))
        .unwrap();

        let features = SupportedFeatures::from_controls(&controls);
        assert!(features.contains(SupportedFeatures::PLAY | SupportedFeatures::PAUSE));
        assert!(features.contains(SupportedFeatures::NEXT_TRACK));
        assert!(features.contains(SupportedFeatures::SEEK));
        assert!(features.contains(SupportedFeatures::SHUFFLE_SET));
        assert!(!features.contains(SupportedFeatures::PREVIOUS_TRACK));
        assert!(!features.contains(SupportedFeatures::REPEAT_SET));
    }

    #[rstest]
    #[case(Some(PhysicalSource::Standby), Some(PlayerState::Playing), Some(MediaPlayerState::Off))]
    #[case(Some(PhysicalSource::Wifi), Some(PlayerState::Playing), Some(MediaPlayerState::Playing))]
    #[case(Some(PhysicalSource::Bluetooth), Some(PlayerState::Paused), Some(MediaPlayerState::Paused))]
    #[case(Some(PhysicalSource::Wifi), Some(PlayerState::Stopped), Some(MediaPlayerState::Idle))]
    #[case(Some(PhysicalSource::Bluetooth), None, Some(MediaPlayerState::Idle))]
    #[case(Some(PhysicalSource::Tv), Some(PlayerState::Playing), Some(MediaPlayerState::On))]
    #[case(Some(PhysicalSource::Optical), None, Some(MediaPlayerState::On))]
    #[case(None, Some(PlayerState::Playing), None)]
    fn test_state_derivation(
        #[case] source: Option<PhysicalSource>,
        #[case] player: Option<PlayerState>,
        #[case] expected: Option<MediaPlayerState>,
    ) {
        assert_eq!(derive_state(source, player.as_ref()), expected);
    }

    #[rstest]
    #[case("84:17:15:0A:BC:DE", "84:17:15:0a:bc:de")]
    #[case("84-17-15-0A-BC-DE", "84:17:15:0a:bc:de")]
    #[case("8417150ABCDE", "84:17:15:0a:bc:de")]
    #[case("NOT-A-MAC", "not-a-mac")]
    fn test_format_mac(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(format_mac(raw), expected);
    }

    #[rstest]
    #[case(PlayMode::Normal, RepeatMode::Off)]
    #[case(PlayMode::RepeatAll, RepeatMode::All)]
    #[case(PlayMode::ShuffleRepeatOne, RepeatMode::One)]
    fn test_repeat_mode_from_play_mode(#[case] mode: PlayMode, #[case] expected: RepeatMode) {
        assert_eq!(RepeatMode::from_play_mode(mode), expected);
    }

    #[test]
    fn test_volume_conversion() {
        assert_eq!(volume_to_raw(0.3, 100), 30);
        assert_eq!(volume_to_raw(0.29, 100), 29);
        assert_eq!(volume_to_raw(0.9, 70), 70);
        assert_eq!(volume_to_raw(-0.5, 100), 0);
        assert_eq!(clamp_volume(50, -1), 0);
    }

    #[test]
    fn test_new_player_defaults() {
        let player = offline_player();
        let snapshot = player.snapshot();

        assert_eq!(snapshot.host, "127.0.0.1:1");
        assert_eq!(snapshot.source_list, PhysicalSource::SELECTABLE.to_vec());
        assert_eq!(player.supported_features(), SupportedFeatures::BASE);
        assert_eq!(player.state(), None);
        assert_eq!(player.name(), None);
    }

    #[test]
    fn test_gated_commands_require_features() {
        let mut player = offline_player();

        assert!(matches!(player.media_seek(10.0), Err(SdkError::UnsupportedFeature("seek"))));
        assert!(matches!(
            player.set_repeat(RepeatMode::All),
            Err(SdkError::UnsupportedFeature("repeat_set"))
        ));
        assert!(matches!(
            player.set_shuffle(true),
            Err(SdkError::UnsupportedFeature("shuffle_set"))
        ));
    }

    #[test]
    fn test_select_source_outside_list_is_rejected() {
        let mut player = offline_player();
        let result = player.select_source(PhysicalSource::Coaxial);
        assert!(matches!(result, Err(SdkError::Api(ApiError::InvalidParameter(_)))));
    }

    #[test]
    fn test_non_finite_volume_is_rejected() {
        let mut player = offline_player();
        assert!(matches!(
            player.set_volume_level(f64::NAN),
            Err(SdkError::Api(ApiError::InvalidParameter(_)))
        ));
    }

    #[test]
    fn test_update_against_unreachable_speaker_fails() {
        let mut player = offline_player();
        let error = player.update().unwrap_err();
        assert!(matches!(error, SdkError::Api(ref e) if e.is_connection_failure()));
    }
}
