//! Speaker connector
//!
//! [`KefConnector`] binds a [`KefClient`] to one speaker and exposes the
//! accessors and commands a media player needs. Nothing is cached: every
//! accessor is a live round trip.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::client::KefClient;
use crate::error::Result;
use crate::leaf::Flag;
use crate::model::{
    split_release_text, Controls, DeviceInfo, MediaSnapshot, PhysicalSource, PlayMode, PlayerData,
    PlayerState, SpeakerStatus,
};
use crate::operation::KefOperation;
use crate::operations::player::{
    GetPlayTimeOperation, GetPlayerDataOperation, GetVolumeOperation, PlayerControl,
    PlayerControlOperation, SetVolumeOperation,
};
use crate::operations::settings::{
    GetDeviceNameOperation, GetMacAddressOperation, GetMaximumVolumeOperation, GetMuteOperation,
    GetPhysicalSourceOperation, GetPlayModeOperation, GetReleaseTextOperation,
    GetSpeakerStatusOperation, GetVolumeLimitOperation, GetVolumeStepOperation, SetMuteOperation,
    SetPhysicalSourceOperation, SetPlayModeOperation, SetSpeakerStatusOperation,
};

/// Source restored by `turn_on` when nothing has been remembered yet
pub const DEFAULT_PREVIOUS_SOURCE: PhysicalSource = PhysicalSource::Wifi;

/// Connector for one KEF LSX II / LS50 Wireless II / LS60 speaker
///
/// Clones share the HTTP connection pool and the remembered source.
#[derive(Debug, Clone)]
pub struct KefConnector {
    host: String,
    client: KefClient,
    previous_source: Arc<Mutex<PhysicalSource>>,
}

impl KefConnector {
    /// Create a connector with its own client
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_client(host, KefClient::new())
    }

    /// Create a connector that shares an existing client
    pub fn with_client(host: impl Into<String>, client: KefClient) -> Self {
        Self {
            host: host.into(),
            client,
            previous_source: Arc::new(Mutex::new(DEFAULT_PREVIOUS_SOURCE)),
        }
    }

    /// Host this connector talks to
    pub fn host(&self) -> &str {
        &self.host
    }

    fn execute<Op: KefOperation>(&self, request: &Op::Request) -> Result<Op::Response> {
        self.client.execute::<Op>(&self.host, request)
    }

    fn read<Op: KefOperation<Request = ()>>(&self) -> Result<Op::Response> {
        self.execute::<Op>(&())
    }

    // ========================================================================
    // Identity
    // ========================================================================

    pub fn mac_address(&self) -> Result<Option<String>> {
        self.read::<GetMacAddressOperation>()
    }

    /// The configured host; no request is made
    pub fn ip_address(&self) -> &str {
        &self.host
    }

    pub fn device_name(&self) -> Result<Option<String>> {
        self.read::<GetDeviceNameOperation>()
    }

    /// Model name, the part of the release text before the underscore
    pub fn model(&self) -> Result<String> {
        let release_text = self.read::<GetReleaseTextOperation>()?;
        Ok(split_release_text(release_text.as_deref()).0)
    }

    /// Firmware version, the part of the release text after the underscore
    pub fn firmware_version(&self) -> Result<String> {
        let release_text = self.read::<GetReleaseTextOperation>()?;
        Ok(split_release_text(release_text.as_deref()).1)
    }

    /// Everything a device registry wants to know, in four round trips
    pub fn device_info(&self) -> Result<DeviceInfo> {
        let mac_address = self.mac_address()?.unwrap_or_default();
        let name = self.device_name()?.unwrap_or_default();
        let release_text = self.read::<GetReleaseTextOperation>()?;
        let (model, firmware_version) = split_release_text(release_text.as_deref());

        Ok(DeviceInfo {
            mac_address,
            name,
            manufacturer: "KEF".to_string(),
            model,
            firmware_version,
            configuration_url: format!("http://{}", self.host),
        })
    }

    // ========================================================================
    // Player state
    // ========================================================================

    /// Transport state of the streaming player
    pub fn state(&self) -> Result<Option<PlayerState>> {
        Ok(self.player_data()?.state)
    }

    /// Actions the current player accepts
    pub fn controls(&self) -> Result<Controls> {
        Ok(self.player_data()?.controls)
    }

    pub fn player_data(&self) -> Result<PlayerData> {
        self.read::<GetPlayerDataOperation>()
    }

    /// Position in the current track, milliseconds
    pub fn play_time(&self) -> Result<Option<i64>> {
        self.read::<GetPlayTimeOperation>()
    }

    pub fn play_mode(&self) -> Result<Option<PlayMode>> {
        self.read::<GetPlayModeOperation>()
    }

    /// Power status: standby or powerOn
    pub fn status(&self) -> Result<Option<SpeakerStatus>> {
        self.read::<GetSpeakerStatusOperation>()
    }

    /// Selected input, `standby` when the speaker is off
    pub fn source(&self) -> Result<Option<PhysicalSource>> {
        self.read::<GetPhysicalSourceOperation>()
    }

    // ========================================================================
    // Volume
    // ========================================================================

    /// Volume, 0..=100, exactly as the speaker reports it
    pub fn volume_level(&self) -> Result<Option<i32>> {
        self.read::<GetVolumeOperation>()
    }

    pub fn volume_step(&self) -> Result<Option<i16>> {
        self.read::<GetVolumeStepOperation>()
    }

    pub fn is_volume_limited(&self) -> Result<Option<bool>> {
        Ok(self.read::<GetVolumeLimitOperation>()?.map(|flag| flag.value()))
    }

    pub fn is_volume_muted(&self) -> Result<Option<bool>> {
        Ok(self.read::<GetMuteOperation>()?.map(|flag| flag.value()))
    }

    pub fn maximum_volume(&self) -> Result<Option<i32>> {
        self.read::<GetMaximumVolumeOperation>()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn set_status(&self, status: SpeakerStatus) -> Result<()> {
        self.execute::<SetSpeakerStatusOperation>(&status)
    }

    pub fn set_source(&self, source: PhysicalSource) -> Result<()> {
        tracing::debug!(host = %self.host, source = %source, "selecting source");
        self.execute::<SetPhysicalSourceOperation>(&source)
    }

    /// Turn the speaker on by selecting the source it had before `turn_off`
    pub fn turn_on(&self) -> Result<()> {
        let source = self.previous_source.lock().clone();
        self.set_source(source)
    }

    /// Remember the current input, then put the speaker in standby
    pub fn turn_off(&self) -> Result<()> {
        if let Some(current) = self.source()?.filter(|s| s.is_input()) {
            *self.previous_source.lock() = current;
        }
        self.set_source(PhysicalSource::Standby)
    }

    /// Source `turn_on` will select
    pub fn previous_source(&self) -> PhysicalSource {
        self.previous_source.lock().clone()
    }

    pub fn set_volume(&self, volume: i32) -> Result<()> {
        self.execute::<SetVolumeOperation>(&volume)
    }

    pub fn mute(&self) -> Result<()> {
        self.execute::<SetMuteOperation>(&Flag(true))
    }

    pub fn unmute(&self) -> Result<()> {
        self.execute::<SetMuteOperation>(&Flag(false))
    }

    /// Toggle between playing and paused
    pub fn play_pause(&self) -> Result<()> {
        self.control(PlayerControl::Pause)
    }

    pub fn next_track(&self) -> Result<()> {
        self.control(PlayerControl::Next)
    }

    pub fn previous_track(&self) -> Result<()> {
        self.control(PlayerControl::Previous)
    }

    pub fn like(&self) -> Result<()> {
        self.control(PlayerControl::Like)
    }

    pub fn dislike(&self) -> Result<()> {
        self.control(PlayerControl::Dislike)
    }

    /// Jump to `position_ms` in the current track
    pub fn seek(&self, position_ms: u64) -> Result<()> {
        self.control(PlayerControl::SeekTime(position_ms))
    }

    pub fn set_play_mode(&self, play_mode: PlayMode) -> Result<()> {
        self.execute::<SetPlayModeOperation>(&play_mode)
    }

    pub fn play_media(&self, uri: &str) -> Result<()> {
        self.control(PlayerControl::Play(uri.to_string()))
    }

    fn control(&self, control: PlayerControl) -> Result<()> {
        tracing::debug!(host = %self.host, control = control.name(), "player control");
        self.execute::<PlayerControlOperation>(&control)
    }

    // ========================================================================
    // Polling
    // ========================================================================

    /// Read play time and player data and map them onto media attributes
    pub fn poll_speaker(&self) -> Result<MediaSnapshot> {
        let play_time = self.play_time()?;
        let data = self.player_data()?;
        Ok(MediaSnapshot::from_player_data(play_time, &data))
    }
}
