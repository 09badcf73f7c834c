//! KEF API operations organized by node family
//!
//! `settings` covers `settings:/...` nodes, `player` covers `player:...`
//! nodes including transport controls.

pub mod player;
pub mod settings;

pub use player::{
    GetPlayTimeOperation, GetPlayerDataOperation, GetVolumeOperation, PlayerControl,
    PlayerControlOperation, SetVolumeOperation,
};
pub use settings::{
    GetDeviceNameOperation, GetMacAddressOperation, GetMaximumVolumeOperation, GetMuteOperation,
    GetPhysicalSourceOperation, GetPlayModeOperation, GetReleaseTextOperation,
    GetSpeakerStatusOperation, GetVolumeLimitOperation, GetVolumeStepOperation, SetMuteOperation,
    SetPhysicalSourceOperation, SetPlayModeOperation, SetSpeakerStatusOperation,
};
