//! High-level KEF speaker API
//!
//! This crate provides a type-safe, trait-based API for controlling KEF W2
//! platform speakers (LSX II, LS50 Wireless II, LS60). It uses the private
//! `kef-http` crate for the `getData`/`setData` round trips.
//!
//! Every readable or writable speaker setting is modelled as a
//! [`KefOperation`] with a node path, an access mode and typed request and
//! response values. [`KefConnector`] bundles the operations into the
//! accessors and commands a media player needs:
//!
//! ```rust,no_run
//! use kef_api::{KefConnector, PhysicalSource};
//!
//! let speaker = KefConnector::new("192.168.1.50");
//! println!("{:?} at volume {:?}", speaker.device_name()?, speaker.volume_level()?);
//!
//! speaker.set_source(PhysicalSource::Bluetooth)?;
//! speaker.play_pause()?;
//! # Ok::<(), kef_api::ApiError>(())
//! ```

pub mod client;
pub mod connector;
pub mod error;
pub mod leaf;
pub mod model;
pub mod operation;
pub mod operations;

pub use client::KefClient;
pub use connector::{KefConnector, DEFAULT_PREVIOUS_SOURCE};
pub use error::{ApiError, Result};
pub use leaf::{Flag, LeafType};
pub use model::{
    Controls, DeviceInfo, MediaSnapshot, PhysicalSource, PlayMode, PlayModeControls, PlayerData,
    PlayerState, SpeakerStatus,
};
pub use operation::{Access, KefOperation};

// Re-exported for the transport types that appear in public signatures
pub use kef_http::{ClientConfig, KefHttpClient, Roles};

#[doc(hidden)]
pub use paste;
