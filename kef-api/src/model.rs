//! Speaker data model
//!
//! Enums for the vendor's string-valued settings and typed views of the
//! `player:player/data` object.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ============================================================================
// Physical source
// ============================================================================

/// Input selected on the speaker (`kefPhysicalSource`)
///
/// `Standby` and `PowerOn` are power states that the speaker reports through
/// the same node; the remaining variants are real inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PhysicalSource {
    Standby,
    PowerOn,
    Wifi,
    Bluetooth,
    Tv,
    Optical,
    Coaxial,
    Usb,
    Analog,
    /// An input name this crate does not know about, kept as reported
    Other(String),
}

impl PhysicalSource {
    /// Inputs offered for selection, in display order
    pub const SELECTABLE: [PhysicalSource; 6] = [
        PhysicalSource::Wifi,
        PhysicalSource::Bluetooth,
        PhysicalSource::Tv,
        PhysicalSource::Optical,
        PhysicalSource::Usb,
        PhysicalSource::Analog,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            PhysicalSource::Standby => "standby",
            PhysicalSource::PowerOn => "powerOn",
            PhysicalSource::Wifi => "wifi",
            PhysicalSource::Bluetooth => "bluetooth",
            PhysicalSource::Tv => "tv",
            PhysicalSource::Optical => "optical",
            PhysicalSource::Coaxial => "coaxial",
            PhysicalSource::Usb => "usb",
            PhysicalSource::Analog => "analog",
            PhysicalSource::Other(name) => name.as_str(),
        }
    }

    /// True for real inputs, false for the power pseudo-sources
    pub fn is_input(&self) -> bool {
        !matches!(self, PhysicalSource::Standby | PhysicalSource::PowerOn)
    }

    /// Sources that carry a streaming player with transport state
    pub fn has_player(&self) -> bool {
        matches!(self, PhysicalSource::Wifi | PhysicalSource::Bluetooth)
    }
}

/// Parses the known input names only; use `From<String>` for speaker answers
impl FromStr for PhysicalSource {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standby" => Ok(PhysicalSource::Standby),
            "powerOn" => Ok(PhysicalSource::PowerOn),
            "wifi" => Ok(PhysicalSource::Wifi),
            "bluetooth" => Ok(PhysicalSource::Bluetooth),
            "tv" => Ok(PhysicalSource::Tv),
            "optical" | "optic" => Ok(PhysicalSource::Optical),
            "coaxial" => Ok(PhysicalSource::Coaxial),
            "usb" => Ok(PhysicalSource::Usb),
            "analog" => Ok(PhysicalSource::Analog),
            other => Err(ApiError::InvalidParameter(format!(
                "unknown physical source '{}'",
                other
            ))),
        }
    }
}

impl From<String> for PhysicalSource {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(PhysicalSource::Other(value))
    }
}

impl From<PhysicalSource> for String {
    fn from(source: PhysicalSource) -> Self {
        match source {
            PhysicalSource::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PhysicalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Speaker status
// ============================================================================

/// Power status of the speaker (`kefSpeakerStatus`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeakerStatus {
    #[serde(rename = "standby")]
    Standby,
    #[serde(rename = "powerOn")]
    PowerOn,
}

impl SpeakerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeakerStatus::Standby => "standby",
            SpeakerStatus::PowerOn => "powerOn",
        }
    }
}

impl FromStr for SpeakerStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standby" => Ok(SpeakerStatus::Standby),
            "powerOn" | "on" => Ok(SpeakerStatus::PowerOn),
            other => Err(ApiError::InvalidParameter(format!(
                "unknown speaker status '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// Player state and play mode
// ============================================================================

/// Transport state of the streaming player
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlayerState {
    Playing,
    Paused,
    Stopped,
    /// Any state string this crate does not know about (e.g. "transitioning")
    Other(String),
}

impl From<String> for PlayerState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "playing" => PlayerState::Playing,
            "paused" => PlayerState::Paused,
            "stopped" => PlayerState::Stopped,
            _ => PlayerState::Other(value),
        }
    }
}

impl From<PlayerState> for String {
    fn from(state: PlayerState) -> Self {
        match state {
            PlayerState::Playing => "playing".to_string(),
            PlayerState::Paused => "paused".to_string(),
            PlayerState::Stopped => "stopped".to_string(),
            PlayerState::Other(other) => other,
        }
    }
}

/// Repeat/shuffle mode (`playerPlayMode`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayMode {
    Normal,
    RepeatOne,
    RepeatAll,
    Shuffle,
    ShuffleRepeatAll,
    ShuffleRepeatOne,
}

impl PlayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayMode::Normal => "normal",
            PlayMode::RepeatOne => "repeatOne",
            PlayMode::RepeatAll => "repeatAll",
            PlayMode::Shuffle => "shuffle",
            PlayMode::ShuffleRepeatAll => "shuffleRepeatAll",
            PlayMode::ShuffleRepeatOne => "shuffleRepeatOne",
        }
    }

    pub fn is_shuffle(&self) -> bool {
        matches!(
            self,
            PlayMode::Shuffle | PlayMode::ShuffleRepeatAll | PlayMode::ShuffleRepeatOne
        )
    }

    /// `Some(true)` for repeat-one, `Some(false)` for repeat-all, `None` when not repeating
    pub fn repeat_one(&self) -> Option<bool> {
        match self {
            PlayMode::RepeatOne | PlayMode::ShuffleRepeatOne => Some(true),
            PlayMode::RepeatAll | PlayMode::ShuffleRepeatAll => Some(false),
            PlayMode::Normal | PlayMode::Shuffle => None,
        }
    }

    /// Combine a shuffle flag and a repeat setting into a play mode
    pub fn from_parts(shuffle: bool, repeat_one: Option<bool>) -> Self {
        match (shuffle, repeat_one) {
            (false, None) => PlayMode::Normal,
            (false, Some(true)) => PlayMode::RepeatOne,
            (false, Some(false)) => PlayMode::RepeatAll,
            (true, None) => PlayMode::Shuffle,
            (true, Some(true)) => PlayMode::ShuffleRepeatOne,
            (true, Some(false)) => PlayMode::ShuffleRepeatAll,
        }
    }
}

impl FromStr for PlayMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| ApiError::InvalidParameter(format!("unknown play mode '{}'", s)))
    }
}

// ============================================================================
// Player data (player:player/data)
// ============================================================================

/// Actions the current player accepts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Controls {
    pub previous: bool,
    pub pause: bool,
    #[serde(rename = "next_", alias = "next")]
    pub next: bool,
    pub seek_track: bool,
    pub seek_time: bool,
    pub seek_bytes: bool,
    pub like: bool,
    pub dislike: bool,
    pub play_mode: PlayModeControls,
}

/// Play modes the current player accepts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayModeControls {
    pub repeat_all: bool,
    pub shuffle_repeat_all: bool,
    pub shuffle: bool,
    pub repeat_one: bool,
    pub shuffle_repeat_one: bool,
}

impl Controls {
    /// Some form of repeat is available
    pub fn repeat(&self) -> bool {
        self.play_mode.repeat_all || self.play_mode.repeat_one
    }

    /// Shuffle is available
    pub fn shuffle(&self) -> bool {
        self.play_mode.shuffle
    }
}

/// Typed view of the `player:player/data` node
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerData {
    pub state: Option<PlayerState>,
    pub status: PlaybackStatus,
    pub track_roles: ItemRoles,
    pub media_roles: ItemRoles,
    pub controls: Controls,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackStatus {
    /// Track duration in milliseconds
    pub duration: Option<i64>,
}

/// Description of the current track (`trackRoles`) or container (`mediaRoles`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemRoles {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub media_data: MediaData,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaData {
    pub meta_data: MetaData,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MetaData {
    pub artist: Option<String>,
    pub album: Option<String>,
    #[serde(rename = "serviceID")]
    pub service_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    pub mime_type: Option<String>,
}

impl ItemRoles {
    fn first_mime_type(&self) -> Option<&String> {
        self.media_data
            .resources
            .first()
            .and_then(|r| r.mime_type.as_ref())
    }
}

// ============================================================================
// Media snapshot
// ============================================================================

/// Media metadata gathered by one poll of the speaker
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaSnapshot {
    /// Position in the current track, milliseconds
    pub media_position: Option<i64>,
    /// Duration of the current track, milliseconds
    pub media_duration: Option<i64>,
    pub media_image_url: Option<String>,
    pub media_title: Option<String>,
    pub media_artist: Option<String>,
    pub media_album_name: Option<String>,
    pub media_playlist: Option<String>,
    pub media_content_id: Option<String>,
    pub media_content_type: Option<String>,
    pub app_id: Option<String>,
    pub app_name: Option<String>,
}

impl MediaSnapshot {
    /// Map a play time and the player data onto media attributes
    ///
    /// Track fields win over container fields where both exist, except for
    /// the content type where the container's resource MIME type is checked
    /// first.
    pub fn from_player_data(play_time: Option<i64>, data: &PlayerData) -> Self {
        let track = &data.track_roles;
        let media = &data.media_roles;

        let media_content_type = media
            .first_mime_type()
            .or_else(|| track.first_mime_type())
            .or(media.kind.as_ref())
            .or(track.kind.as_ref())
            .cloned();

        let app_id = track
            .media_data
            .meta_data
            .service_id
            .clone()
            .or_else(|| media.media_data.meta_data.service_id.clone());

        Self {
            media_position: play_time,
            media_duration: data.status.duration,
            media_image_url: track.icon.clone(),
            media_title: track.title.clone(),
            media_artist: track.media_data.meta_data.artist.clone(),
            media_album_name: track.media_data.meta_data.album.clone(),
            media_playlist: media.title.clone(),
            media_content_id: track.id.clone().or_else(|| media.id.clone()),
            media_content_type,
            app_name: app_id.clone(),
            app_id,
        }
    }
}

// ============================================================================
// Device info
// ============================================================================

/// Identity of a speaker as shown in a device registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub mac_address: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub firmware_version: String,
    pub configuration_url: String,
}

/// Split a release text such as `LSXII_V26120` into model and firmware
///
/// Missing parts come back as `"?"`.
pub fn split_release_text(release_text: Option<&str>) -> (String, String) {
    let mut parts = release_text.unwrap_or("?_?").split('_');
    let model = parts.next().filter(|s| !s.is_empty()).unwrap_or("?");
    let firmware = parts.next().filter(|s| !s.is_empty()).unwrap_or("?");
    (model.to_string(), firmware.to_string())
}
