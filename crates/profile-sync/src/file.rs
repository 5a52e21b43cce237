//! Offline store backed by the local profile book.
//!
//! Triggers have nowhere to go offline, so they are only logged.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use storage::profiles::ProfileBook;
use tracing::info;

use crate::{AllProfiles, ProfileStore, SyncError};

#[derive(Debug)]
pub struct FileProfileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl FileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::new(ProfileBook::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<ProfileBook, SyncError> {
        ProfileBook::load(&self.path).map_err(|e| SyncError::RemoteUnavailable(e.to_string()))
    }

    fn modify<T>(&self, f: impl FnOnce(&mut ProfileBook) -> T) -> Result<T, SyncError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| SyncError::RemoteUnavailable("profile book lock poisoned".to_string()))?;
        let mut book = self.read()?;
        let out = f(&mut book);
        book.save(&self.path)
            .map_err(|e| SyncError::RemoteUnavailable(e.to_string()))?;
        Ok(out)
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn list_profiles(&self, user: &str) -> Result<Vec<String>, SyncError> {
        Ok(self.read()?.list(user))
    }

    async fn fetch_profile(
        &self,
        user: &str,
        profile: &str,
    ) -> Result<Option<Vec<String>>, SyncError> {
        Ok(self.read()?.get(user, profile).map(<[String]>::to_vec))
    }

    async fn fetch_all(&self) -> Result<AllProfiles, SyncError> {
        Ok(self.read()?.all().clone())
    }

    async fn save_profile(
        &self,
        user: &str,
        profile: &str,
        macros: &[String],
    ) -> Result<(), SyncError> {
        self.modify(|b| {
            b.upsert(user, profile, macros.to_vec());
        })
    }

    async fn rename_profile(&self, user: &str, old: &str, new: &str) -> Result<(), SyncError> {
        if !self.modify(|b| b.rename(user, old, new))? {
            return Err(SyncError::NotFound {
                user: user.to_string(),
                profile: old.to_string(),
            });
        }
        Ok(())
    }

    async fn delete_profile(&self, user: &str, profile: &str) -> Result<(), SyncError> {
        if !self.modify(|b| b.delete(user, profile))? {
            return Err(SyncError::NotFound {
                user: user.to_string(),
                profile: profile.to_string(),
            });
        }
        Ok(())
    }

    async fn trigger_macro(&self, macro_key: &str, user: &str) -> Result<(), SyncError> {
        info!(macro_key, user, "offline: trigger not sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");

        let store = FileProfileStore::new(&path);
        store
            .save_profile("green", "bugs", &keys(&["Reinforce", "Resupply", "Railgun"]))
            .await
            .unwrap();

        let reopened = FileProfileStore::new(&path);
        assert_eq!(reopened.list_profiles("green").await.unwrap(), ["bugs"]);
        assert_eq!(
            reopened.fetch_profile("green", "bugs").await.unwrap().unwrap()[2],
            "Railgun"
        );
        assert!(reopened.fetch_profile("green", "bots").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rename_and_delete_missing_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::new(dir.path().join("profiles.json"));

        assert!(matches!(
            store.rename_profile("green", "a", "b").await,
            Err(SyncError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete_profile("green", "a").await,
            Err(SyncError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn corrupt_book_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let store = FileProfileStore::new(&path);
        assert!(matches!(
            store.list_profiles("green").await,
            Err(SyncError::RemoteUnavailable(_))
        ));
    }
}
