//! # KEF SDK - media player control for KEF W2 speakers
//!
//! Builds the pieces a home-automation host needs on top of `kef-api`:
//!
//! ```rust,no_run
//! use kef_sdk::{ConfigFlow, EntryStore, FlowResult, KefClient, MediaPlayer, Poller};
//!
//! let client = KefClient::new();
//! let mut store = EntryStore::load_default()?;
//!
//! // Guided setup: validate the host and remember it
//! if let FlowResult::CreateEntry(entry) = ConfigFlow::new(client.clone(), &mut store).step_user(Some("192.168.1.50")) {
//!     println!("added {}", entry.title);
//! }
//! store.save()?;
//!
//! // Connect and poll in the background
//! let entry = store.first().cloned().ok_or(kef_sdk::SdkError::Store("no speakers".into()))?;
//! let speaker = kef_sdk::setup_entry(&client, &entry)?;
//! let (poller, snapshots) = Poller::spawn(MediaPlayer::new(speaker))?;
//! for snapshot in snapshots.iter().take(3) {
//!     println!("{:?} {:?}", snapshot.state, snapshot.media_title);
//! }
//! poller.shutdown()?;
//! # Ok::<(), kef_sdk::SdkError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! kef-sdk (MediaPlayer, ConfigFlow, Poller)
//!     ↓
//! kef-api (KefConnector, typed operations)
//!     ↓
//! kef-http (getData / setData round trips)
//! ```

pub use config::PlayerConfig;
pub use error::{Result, SdkError, SetupError};
pub use media_player::{
    clamp_volume, derive_state, format_mac, volume_to_raw, MediaPlayer, MediaPlayerState,
    PlayerCommand, PlayerSnapshot, RefreshDelay, RepeatMode, SupportedFeatures,
};
pub use poller::{Poller, PollerCommand, PollerStats};
pub use setup::{
    setup_entry, validate_input, AbortReason, ConfigEntry, ConfigFlow, EntryStore, FlowResult,
    SetupInfo,
};

// Re-export the types hosts need alongside the SDK
pub use kef_api::{KefClient, KefConnector, PhysicalSource, PlayMode};

pub mod logging;

mod config;
mod error;
mod media_player;
mod poller;
mod setup;
