//! Mocked speaker shared by the integration tests

#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};

pub const MAC: &str = "84:17:15:0A:BC:DE";
pub const NAME: &str = "Office";

/// What the mocked speaker reports
pub struct Fixture {
    pub source: &'static str,
    pub play_mode: &'static str,
    pub volume: i32,
    pub volume_step: i16,
    pub maximum_volume: i32,
    pub mac: Option<&'static str>,
    pub player_data: Value,
}

impl Fixture {
    /// Streaming a track over wifi with most controls available
    pub fn playing_wifi() -> Self {
        Self {
            source: "wifi",
            play_mode: "repeatAll",
            volume: 30,
            volume_step: 2,
            maximum_volume: 80,
            mac: Some(MAC),
            player_data: json!({
                "state": "playing",
                "status": {"duration": 180000},
                "trackRoles": {
                    "title": "Track",
                    "icon": "http://art/cover.jpg",
                    "mediaData": {
                        "metaData": {"artist": "Artist", "album": "Album", "serviceID": "spotify"},
                        "resources": [{"mimeType": "audio/flac"}]
                    }
                },
                "mediaRoles": {"title": "Queue"},
                "controls": {
                    "pause": true,
                    "next_": true,
                    "previous": true,
                    "seekTime": true,
                    "playMode": {"repeatAll": true, "repeatOne": true}
                }
            }),
        }
    }

    pub fn with_source(mut self, source: &'static str) -> Self {
        self.source = source;
        self
    }

    pub fn with_play_mode(mut self, play_mode: &'static str) -> Self {
        self.play_mode = play_mode;
        self
    }

    pub fn with_volume(mut self, volume: i32) -> Self {
        self.volume = volume;
        self
    }

    pub fn without_mac(mut self) -> Self {
        self.mac = None;
        self
    }

    /// Register `getData` mocks for every node a media player update reads
    pub fn mount(&self, server: &mut ServerGuard) -> Vec<Mock> {
        let mac = match self.mac {
            Some(mac) => json!({"type": "string_", "string_": mac}),
            None => json!({"type": "string_"}),
        };

        vec![
            mock_get(server, "settings:/system/primaryMacAddress", mac),
            mock_get(
                server,
                "settings:/deviceName",
                json!({"type": "string_", "string_": NAME}),
            ),
            mock_get(
                server,
                "settings:/releasetext",
                json!({"type": "string_", "string_": "LSXII_V26120"}),
            ),
            mock_get(server, "player:player/data", self.player_data.clone()),
            mock_get(
                server,
                "player:player/data/playTime",
                json!({"type": "i64_", "i64_": 45000}),
            ),
            mock_get(
                server,
                "player:volume",
                json!({"type": "i32_", "i32_": self.volume}),
            ),
            mock_get(
                server,
                "settings:/kef/host/volumeStep",
                json!({"type": "i16_", "i16_": self.volume_step}),
            ),
            mock_get(
                server,
                "settings:/kef/host/maximumVolume",
                json!({"type": "i32_", "i32_": self.maximum_volume}),
            ),
            mock_get(
                server,
                "settings:/mediaPlayer/mute",
                json!({"type": "bool_", "bool_": false}),
            ),
            mock_get(
                server,
                "settings:/kef/play/physicalSource",
                json!({"type": "kefPhysicalSource", "kefPhysicalSource": self.source}),
            ),
            mock_get(
                server,
                "settings:/mediaPlayer/playMode",
                json!({"type": "playerPlayMode", "playerPlayMode": self.play_mode}),
            ),
        ]
    }
}

pub fn mock_get(server: &mut ServerGuard, path: &str, node: Value) -> Mock {
    server
        .mock("GET", "/api/getData")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("path".into(), path.into()),
            Matcher::UrlEncoded("roles".into(), "value".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(Value::Array(vec![node]).to_string())
        .create()
}

pub fn mock_set(server: &mut ServerGuard, path: &str, roles: &str, value: Value) -> Mock {
    server
        .mock("GET", "/api/setData")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("path".into(), path.into()),
            Matcher::UrlEncoded("roles".into(), roles.into()),
            Matcher::UrlEncoded("value".into(), value.to_string()),
        ]))
        .with_status(200)
        .with_body("{}")
        .create()
}
