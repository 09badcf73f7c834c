//! Guided setup for adding a speaker
//!
//! A host entered by the user is validated by reading the speaker's MAC
//! address and name. Accepted speakers become [`ConfigEntry`] records kept
//! in an [`EntryStore`], a JSON file in the user's config directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use kef_api::{KefClient, KefConnector};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SdkError, SetupError};

/// Environment variable overriding the entry store location
pub const CONFIG_ENV: &str = "KEF_CONFIG";

const STORE_DIR: &str = "kef-sdk";
const STORE_FILE: &str = "entries.json";

// ============================================================================
// Validation
// ============================================================================

/// What a successful validation learned about the speaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupInfo {
    /// Title for the new entry, the speaker's name
    pub title: String,
    pub host: String,
}

/// Check that `host` is a reachable KEF speaker
///
/// A missing MAC address and every transport or parse failure collapse into
/// [`SetupError::CannotConnect`]. The title falls back to the host when the
/// speaker has no name.
pub fn validate_input(client: &KefClient, host: &str) -> std::result::Result<SetupInfo, SetupError> {
    let speaker = KefConnector::with_client(host, client.clone());
    tracing::info!(host, "trying to connect to speaker");

    let identity = speaker
        .mac_address()
        .and_then(|mac| Ok((mac, speaker.device_name()?)));

    match identity {
        Ok((Some(_), name)) => Ok(SetupInfo {
            title: name.filter(|n| !n.is_empty()).unwrap_or_else(|| host.to_string()),
            host: host.to_string(),
        }),
        Ok((None, _)) => {
            tracing::error!(host, "speaker did not report a MAC address");
            Err(SetupError::CannotConnect)
        }
        Err(e) => {
            tracing::error!(host, error = %e, "speaker validation failed");
            Err(SetupError::CannotConnect)
        }
    }
}

// ============================================================================
// Config entries and their store
// ============================================================================

/// A configured speaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Random id assigned when the entry is created
    pub entry_id: String,
    /// Identifies the entry; the host the speaker was added with
    pub unique_id: String,
    pub title: String,
    pub host: String,
    pub created_at: DateTime<Utc>,
}

impl ConfigEntry {
    pub fn new(info: SetupInfo) -> Self {
        Self {
            entry_id: Uuid::new_v4().simple().to_string(),
            unique_id: info.host.clone(),
            title: info.title,
            host: info.host,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: Vec<ConfigEntry>,
}

/// Config entries persisted as JSON
#[derive(Debug, Clone)]
pub struct EntryStore {
    path: PathBuf,
    entries: Vec<ConfigEntry>,
}

impl EntryStore {
    /// `$KEF_CONFIG`, else `<config dir>/kef-sdk/entries.json`
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        dirs::config_dir()
            .map(|dir| dir.join(STORE_DIR).join(STORE_FILE))
            .ok_or_else(|| SdkError::Store("no user config directory".to_string()))
    }

    /// Load the store at the default location
    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_path()?)
    }

    /// Load a store; a missing file is an empty store
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(content) => {
                let file: StoreFile = serde_json::from_str(&content).map_err(|e| {
                    SdkError::Store(format!("{}: {}", path.display(), e))
                })?;
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(SdkError::Store(format!("{}: {}", path.display(), e))),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "loaded entry store");
        Ok(Self { path, entries })
    }

    /// Write the store, creating parent directories as needed
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| SdkError::Store(format!("{}: {}", parent.display(), e)))?;
        }

        let file = StoreFile {
            entries: self.entries.clone(),
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| SdkError::Store(e.to_string()))?;

        fs::write(&self.path, content)
            .map_err(|e| SdkError::Store(format!("{}: {}", self.path.display(), e)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    pub fn first(&self) -> Option<&ConfigEntry> {
        self.entries.first()
    }

    pub fn find(&self, unique_id: &str) -> Option<&ConfigEntry> {
        self.entries.iter().find(|e| e.unique_id == unique_id)
    }

    fn find_mut(&mut self, unique_id: &str) -> Option<&mut ConfigEntry> {
        self.entries.iter_mut().find(|e| e.unique_id == unique_id)
    }

    pub fn insert(&mut self, entry: ConfigEntry) {
        self.entries.push(entry);
    }

    /// Remove an entry; returns whether one was removed
    pub fn remove(&mut self, unique_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.unique_id != unique_id);
        self.entries.len() != before
    }
}

// ============================================================================
// Config flow
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    AlreadyConfigured,
}

/// Result of one step of the config flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowResult {
    /// Ask for a host; `errors` maps a field (or `base`) to an error key
    ShowForm {
        step_id: &'static str,
        errors: BTreeMap<&'static str, &'static str>,
    },
    /// A new entry was added to the store
    CreateEntry(ConfigEntry),
    Abort(AbortReason),
}

/// Adds speakers to an [`EntryStore`]
///
/// The flow only changes the in-memory store; call [`EntryStore::save`] to
/// persist the result.
pub struct ConfigFlow<'a> {
    client: KefClient,
    store: &'a mut EntryStore,
}

impl<'a> ConfigFlow<'a> {
    pub fn new(client: KefClient, store: &'a mut EntryStore) -> Self {
        Self { client, store }
    }

    /// Setup started by a user
    pub fn step_user(&mut self, host: Option<&str>) -> FlowResult {
        let mut errors = BTreeMap::new();

        if let Some(host) = host {
            match validate_input(&self.client, host) {
                Ok(info) => {
                    if self.store.find(&info.host).is_some() {
                        tracing::info!(host, "speaker already configured");
                        return FlowResult::Abort(AbortReason::AlreadyConfigured);
                    }
                    return self.create_entry(info);
                }
                Err(SetupError::CannotConnect) => {
                    errors.insert("base", "cannot_connect");
                }
            }
        }

        FlowResult::ShowForm {
            step_id: "user",
            errors,
        }
    }

    /// Setup imported from a configuration file
    ///
    /// An existing entry is updated in place and the flow aborts.
    pub fn step_import(&mut self, host: &str) -> Result<FlowResult> {
        let info = validate_input(&self.client, host)
            .map_err(|_| SdkError::CannotConnect(host.to_string()))?;

        if let Some(existing) = self.store.find_mut(&info.host) {
            existing.host = info.host;
            tracing::info!(host, "updated imported speaker");
            return Ok(FlowResult::Abort(AbortReason::AlreadyConfigured));
        }

        Ok(self.create_entry(info))
    }

    fn create_entry(&mut self, info: SetupInfo) -> FlowResult {
        let entry = ConfigEntry::new(info);
        tracing::info!(host = %entry.host, title = %entry.title, "created entry");
        self.store.insert(entry.clone());
        FlowResult::CreateEntry(entry)
    }
}

/// Connect to a configured speaker
///
/// Fails with [`SdkError::NotReady`] when the speaker does not answer with
/// its MAC address, so the host can retry later.
pub fn setup_entry(client: &KefClient, entry: &ConfigEntry) -> Result<KefConnector> {
    let speaker = KefConnector::with_client(entry.host.as_str(), client.clone());
    tracing::info!(host = %entry.host, "connecting to configured speaker");

    match speaker.mac_address() {
        Ok(Some(_)) => Ok(speaker),
        Ok(None) => {
            tracing::error!(host = %entry.host, "connection refused");
            Err(SdkError::NotReady(entry.host.clone()))
        }
        Err(e) => {
            tracing::error!(host = %entry.host, error = %e, "connection refused");
            Err(SdkError::NotReady(entry.host.clone()))
        }
    }
}
