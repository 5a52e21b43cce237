use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::SyncError;

/// user -> profile name -> macro keys.
pub type AllProfiles = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// The remote profile store. Transport failures surface as
/// [`SyncError::RemoteUnavailable`]; no implementation retries.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn list_profiles(&self, user: &str) -> Result<Vec<String>, SyncError>;

    /// `Ok(None)` when the store has no such profile.
    async fn fetch_profile(
        &self,
        user: &str,
        profile: &str,
    ) -> Result<Option<Vec<String>>, SyncError>;

    async fn fetch_all(&self) -> Result<AllProfiles, SyncError>;

    /// Creates or overwrites a profile.
    async fn save_profile(
        &self,
        user: &str,
        profile: &str,
        macros: &[String],
    ) -> Result<(), SyncError>;

    async fn rename_profile(&self, user: &str, old: &str, new: &str) -> Result<(), SyncError>;

    async fn delete_profile(&self, user: &str, profile: &str) -> Result<(), SyncError>;

    /// Fires a macro on the controller the store fronts.
    async fn trigger_macro(&self, macro_key: &str, user: &str) -> Result<(), SyncError>;
}
