//! Operations on `settings:/` nodes
//!
//! Identity, power, input and volume limits of the speaker.

use serde_json::Value;

use crate::define_setting;
use crate::error::Result;
use crate::leaf::{extract, Flag, LeafType};
use crate::model::{PhysicalSource, PlayMode, SpeakerStatus};
use crate::operation::{Access, KefOperation};

define_setting! {
    /// Primary MAC address, e.g. `84:17:15:0A:BC:DE`
    setting: mac_address,
    path: "settings:/system/primaryMacAddress",
    leaf: String => String,
    access: read_only,
}

define_setting! {
    /// Friendly name chosen in the KEF Connect app
    setting: device_name,
    path: "settings:/deviceName",
    leaf: String => String,
    access: read_only,
}

define_setting! {
    /// Model and firmware joined by an underscore, e.g. `LSXII_V26120`
    setting: release_text,
    path: "settings:/releasetext",
    leaf: String => String,
    access: read_only,
}

define_setting! {
    /// Power status (`standby` or `powerOn`)
    setting: speaker_status,
    path: "settings:/kef/host/speakerStatus",
    leaf: SpeakerStatus => SpeakerStatus,
    access: read_write,
}

define_setting! {
    /// Selected input; writing `standby` turns the speaker off
    setting: physical_source,
    path: "settings:/kef/play/physicalSource",
    leaf: PhysicalSource => PhysicalSource,
    access: read_write,
}

define_setting! {
    /// Increment used by the speaker's own volume buttons
    setting: volume_step,
    path: "settings:/kef/host/volumeStep",
    leaf: I16 => i16,
    access: read_only,
}

define_setting! {
    /// Whether the volume limiter is enabled
    setting: volume_limit,
    path: "settings:/kef/host/volumeLimit",
    leaf: Bool => Flag,
    access: read_only,
}

define_setting! {
    /// Upper bound of the volume when the limiter is on
    setting: maximum_volume,
    path: "settings:/kef/host/maximumVolume",
    leaf: I32 => i32,
    access: read_only,
}

define_setting! {
    /// Mute state
    setting: mute,
    path: "settings:/mediaPlayer/mute",
    leaf: Bool => Flag,
    access: read_write,
}

define_setting! {
    /// Repeat/shuffle mode of the streaming player
    setting: play_mode,
    path: "settings:/mediaPlayer/playMode",
    leaf: PlayMode => PlayMode,
    access: write_only,
}

/// Reads `settings:/mediaPlayer/playMode`.
///
/// A mode name this crate does not know reads as `None` rather than failing
/// the whole refresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetPlayModeOperation;

impl KefOperation for GetPlayModeOperation {
    type Request = ();
    type Response = Option<PlayMode>;

    const PATH: &'static str = SetPlayModeOperation::PATH;
    const ACCESS: Access = Access::Read;

    fn build_value(_request: &()) -> Result<Option<Value>> {
        Ok(None)
    }

    fn parse_response(nodes: &[Value]) -> Result<Option<PlayMode>> {
        let reported = extract::<String>(nodes, LeafType::PlayMode)?;
        Ok(reported.and_then(|name| match name.parse() {
            Ok(mode) => Some(mode),
            Err(_) => {
                tracing::debug!(play_mode = %name, "ignoring unknown play mode");
                None
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generated_getter_reads_its_leaf() {
        let nodes = vec![json!({"type": "string_", "string_": "84:17:15:0A:BC:DE"})];
        let mac = GetMacAddressOperation::parse_response(&nodes).unwrap();

        assert_eq!(mac.as_deref(), Some("84:17:15:0A:BC:DE"));
        assert_eq!(GetMacAddressOperation::ACCESS, Access::Read);
        assert_eq!(GetMacAddressOperation::build_value(&()).unwrap(), None);
    }

    #[test]
    fn test_generated_setter_encodes_its_leaf() {
        let value = SetPhysicalSourceOperation::build_value(&PhysicalSource::Bluetooth).unwrap();
        assert_eq!(
            value,
            Some(json!({"type": "kefPhysicalSource", "kefPhysicalSource": "bluetooth"}))
        );
        assert_eq!(SetPhysicalSourceOperation::ACCESS, Access::Write);
        assert_eq!(SetPhysicalSourceOperation::PATH, "settings:/kef/play/physicalSource");
    }

    #[test]
    fn test_mute_setter_sends_json_boolean() {
        let value = SetMuteOperation::build_value(&Flag(true)).unwrap();
        assert_eq!(value, Some(json!({"type": "bool_", "bool_": true})));
    }

    #[test]
    fn test_vendor_enum_leaves() {
        let nodes = vec![json!({"type": "kefSpeakerStatus", "kefSpeakerStatus": "powerOn"})];
        assert_eq!(
            GetSpeakerStatusOperation::parse_response(&nodes).unwrap(),
            Some(SpeakerStatus::PowerOn)
        );

        let nodes = vec![json!({"type": "playerPlayMode", "playerPlayMode": "repeatAll"})];
        assert_eq!(
            GetPlayModeOperation::parse_response(&nodes).unwrap(),
            Some(PlayMode::RepeatAll)
        );
    }

    #[test]
    fn test_unknown_play_mode_reads_as_none() {
        let nodes = vec![json!({"type": "playerPlayMode", "playerPlayMode": "shuffleAll"})];
        assert_eq!(GetPlayModeOperation::parse_response(&nodes).unwrap(), None);
        assert_eq!(GetPlayModeOperation::PATH, "settings:/mediaPlayer/playMode");
        assert!(GetPlayModeOperation::parse_response(&[]).is_err());
    }

    #[test]
    fn test_volume_step_is_i16() {
        let nodes = vec![json!({"type": "i16_", "i16_": 3})];
        assert_eq!(GetVolumeStepOperation::parse_response(&nodes).unwrap(), Some(3));
    }
}
