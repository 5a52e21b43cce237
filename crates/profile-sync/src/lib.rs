//! Profile synchronisation: the remote store contract and the adapter that
//! moves slot collections in and out of it.

pub mod file;
pub mod http;
pub mod memory;
pub mod store;
pub mod sync;

pub use file::FileProfileStore;
pub use http::HttpProfileStore;
pub use memory::MemoryProfileStore;
pub use store::{AllProfiles, ProfileStore};
pub use sync::{ProfileSync, SaveOutcome};

use loadout::Slot;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("profile '{profile}' not found for user '{user}'")]
    NotFound { user: String, profile: String },
    #[error("profile name is empty")]
    InvalidName,
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("unexpected response from store: {0}")]
    BadResponse(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::RemoteUnavailable(e.to_string())
    }
}

/// Canonical, case-insensitive profile name: trimmed and lower-cased.
pub fn normalize_profile_name(name: &str) -> Result<String, SyncError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SyncError::InvalidName);
    }
    Ok(name.to_lowercase())
}

/// Profile wire form of a slot list. See [`loadout::profile_keys`].
pub fn serialize_slots(slots: &[Slot]) -> Vec<String> {
    loadout::profile_keys(slots)
}
