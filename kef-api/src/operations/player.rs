//! Operations on `player:` nodes
//!
//! Volume, play time, the player data object and transport controls.

use serde_json::{json, Value};

use crate::define_setting;
use crate::error::{ApiError, Result};
use crate::leaf::first_node;
use crate::model::PlayerData;
use crate::operation::{Access, KefOperation};

define_setting! {
    /// Current volume, 0..=100
    setting: volume,
    path: "player:volume",
    leaf: I32 => i32,
    access: read_write,
}

define_setting! {
    /// Position in the current track, milliseconds
    setting: play_time,
    path: "player:player/data/playTime",
    leaf: I64 => i64,
    access: read_only,
}

/// Reads `player:player/data`: transport state, track metadata and controls
#[derive(Debug, Clone, Copy, Default)]
pub struct GetPlayerDataOperation;

impl KefOperation for GetPlayerDataOperation {
    type Request = ();
    type Response = PlayerData;

    const PATH: &'static str = "player:player/data";
    const ACCESS: Access = Access::Read;

    fn build_value(_request: &()) -> Result<Option<Value>> {
        Ok(None)
    }

    fn parse_response(nodes: &[Value]) -> Result<PlayerData> {
        let first = first_node(nodes)?;
        serde_json::from_value(first.clone())
            .map_err(|e| ApiError::ParseError(format!("player data: {}", e)))
    }
}

/// Transport action sent to `player:player/control`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerControl {
    /// Toggles between playing and paused
    Pause,
    Next,
    Previous,
    Like,
    Dislike,
    /// Jump to a position, milliseconds
    SeekTime(u64),
    /// Start playing a media URI
    Play(String),
}

impl PlayerControl {
    /// Wire name of the control
    pub fn name(&self) -> &'static str {
        match self {
            PlayerControl::Pause => "pause",
            PlayerControl::Next => "next",
            PlayerControl::Previous => "previous",
            PlayerControl::Like => "like",
            PlayerControl::Dislike => "dislike",
            PlayerControl::SeekTime(_) => "seekTime",
            PlayerControl::Play(_) => "play",
        }
    }

    /// `{"control": name}` plus the control's parameter, if any
    pub fn to_value(&self) -> Value {
        match self {
            PlayerControl::SeekTime(position_ms) => {
                json!({"control": self.name(), "time": position_ms})
            }
            PlayerControl::Play(uri) => json!({"control": self.name(), "media": uri}),
            _ => json!({"control": self.name()}),
        }
    }
}

/// Activates `player:player/control`
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerControlOperation;

impl KefOperation for PlayerControlOperation {
    type Request = PlayerControl;
    type Response = ();

    const PATH: &'static str = "player:player/control";
    const ACCESS: Access = Access::Activate;

    fn build_value(request: &PlayerControl) -> Result<Option<Value>> {
        if let PlayerControl::Play(uri) = request {
            if uri.trim().is_empty() {
                return Err(ApiError::InvalidParameter("media URI is empty".to_string()));
            }
        }
        Ok(Some(request.to_value()))
    }

    fn parse_response(_nodes: &[Value]) -> Result<()> {
        Ok(())
    }
}
