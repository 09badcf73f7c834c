//! Configuration for the media player and its poller
//!
//! Durations are stored as whole milliseconds when (de)serialised so the
//! values read naturally in a JSON settings file.

use std::time::Duration;

use kef_api::PhysicalSource;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SdkError};

/// Settings shared by [`MediaPlayer`](crate::MediaPlayer) and [`Poller`](crate::Poller)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Interval between scheduled refreshes
    /// Default: 10 seconds
    #[serde(rename = "poll_interval_ms", with = "duration_ms")]
    pub poll_interval: Duration,

    /// Refresh delay after turning the speaker on or off
    /// Default: 5 seconds
    #[serde(rename = "power_refresh_delay_ms", with = "duration_ms")]
    pub power_refresh_delay: Duration,

    /// Refresh delay after source and transport commands
    /// Default: 250 milliseconds
    #[serde(rename = "command_refresh_delay_ms", with = "duration_ms")]
    pub command_refresh_delay: Duration,

    /// Inputs offered for selection
    /// Default: wifi, bluetooth, tv, optical, usb, analog
    pub source_list: Vec<PhysicalSource>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            power_refresh_delay: Duration::from_secs(5),
            command_refresh_delay: Duration::from_millis(250),
            source_list: PhysicalSource::SELECTABLE.to_vec(),
        }
    }
}

impl PlayerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short intervals for interactive front ends
    pub fn responsive() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            power_refresh_delay: Duration::from_secs(3),
            command_refresh_delay: Duration::from_millis(100),
            ..Default::default()
        }
    }

    /// Long intervals for unattended hosts that only need occasional state
    pub fn relaxed() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            power_refresh_delay: Duration::from_secs(10),
            command_refresh_delay: Duration::from_secs(1),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(SdkError::Configuration(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.source_list.is_empty() {
            return Err(SdkError::Configuration(
                "Source list must not be empty".to_string(),
            ));
        }

        if let Some(source) = self.source_list.iter().find(|s| !s.is_input()) {
            return Err(SdkError::Configuration(format!(
                "'{}' is not a selectable input",
                source
            )));
        }

        Ok(())
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_source_list(mut self, sources: Vec<PhysicalSource>) -> Self {
        self.source_list = sources;
        self
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.power_refresh_delay, Duration::from_secs(5));
        assert_eq!(config.command_refresh_delay, Duration::from_millis(250));
        assert_eq!(config.source_list.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(PlayerConfig::responsive().validate().is_ok());
        assert!(PlayerConfig::relaxed().validate().is_ok());
        assert!(PlayerConfig::responsive().poll_interval < PlayerConfig::relaxed().poll_interval);
    }

    #[test]
    fn test_config_validation() {
        let zero_interval = PlayerConfig::default().with_poll_interval(Duration::ZERO);
        assert!(zero_interval.validate().is_err());

        let no_sources = PlayerConfig::default().with_source_list(Vec::new());
        assert!(no_sources.validate().is_err());

        let standby_source =
            PlayerConfig::default().with_source_list(vec![PhysicalSource::Standby]);
        assert!(matches!(
            standby_source.validate(),
            Err(SdkError::Configuration(_))
        ));
    }

    #[test]
    fn test_durations_serialise_as_milliseconds() {
        let json = serde_json::to_value(PlayerConfig::default()).unwrap();
        assert_eq!(json["poll_interval_ms"], 10_000);
        assert_eq!(json["command_refresh_delay_ms"], 250);
        assert_eq!(json["source_list"][0], "wifi");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PlayerConfig =
            serde_json::from_str(r#"{"poll_interval_ms": 1500, "source_list": ["tv", "optic"]}"#)
                .unwrap();

        assert_eq!(config.poll_interval, Duration::from_millis(1500));
        assert_eq!(config.power_refresh_delay, Duration::from_secs(5));
        assert_eq!(config.source_list, vec![PhysicalSource::Tv, PhysicalSource::Optical]);
    }
}
