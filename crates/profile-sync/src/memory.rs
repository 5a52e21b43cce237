//! In-process store; useful for tests and for running the panel without a server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use storage::profiles::ProfileBook;
use tracing::debug;

use crate::{AllProfiles, ProfileStore, SyncError};

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    book: Mutex<ProfileBook>,
    triggered: Mutex<Vec<(String, String)>>,
    offline: AtomicBool,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(book: ProfileBook) -> Self {
        Self {
            book: Mutex::new(book),
            ..Self::default()
        }
    }

    /// Simulates a transport failure on every call while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// `(macro, user)` pairs in trigger order.
    pub fn triggered(&self) -> Vec<(String, String)> {
        self.triggered
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> ProfileBook {
        self.book.lock().map(|b| b.clone()).unwrap_or_default()
    }

    fn check_online(&self) -> Result<(), SyncError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::RemoteUnavailable("memory store offline".to_string()));
        }
        Ok(())
    }

    fn with_book_mut<T>(&self, f: impl FnOnce(&mut ProfileBook) -> T) -> Result<T, SyncError> {
        self.check_online()?;
        let mut book = self
            .book
            .lock()
            .map_err(|_| SyncError::RemoteUnavailable("memory store poisoned".to_string()))?;
        Ok(f(&mut book))
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn list_profiles(&self, user: &str) -> Result<Vec<String>, SyncError> {
        self.with_book_mut(|b| b.list(user))
    }

    async fn fetch_profile(
        &self,
        user: &str,
        profile: &str,
    ) -> Result<Option<Vec<String>>, SyncError> {
        self.with_book_mut(|b| b.get(user, profile).map(<[String]>::to_vec))
    }

    async fn fetch_all(&self) -> Result<AllProfiles, SyncError> {
        self.with_book_mut(|b| b.all().clone())
    }

    async fn save_profile(
        &self,
        user: &str,
        profile: &str,
        macros: &[String],
    ) -> Result<(), SyncError> {
        self.with_book_mut(|b| {
            b.upsert(user, profile, macros.to_vec());
        })
    }

    async fn rename_profile(&self, user: &str, old: &str, new: &str) -> Result<(), SyncError> {
        let found = self.with_book_mut(|b| b.rename(user, old, new))?;
        if !found {
            return Err(SyncError::NotFound {
                user: user.to_string(),
                profile: old.to_string(),
            });
        }
        Ok(())
    }

    async fn delete_profile(&self, user: &str, profile: &str) -> Result<(), SyncError> {
        let found = self.with_book_mut(|b| b.delete(user, profile))?;
        if !found {
            return Err(SyncError::NotFound {
                user: user.to_string(),
                profile: profile.to_string(),
            });
        }
        Ok(())
    }

    async fn trigger_macro(&self, macro_key: &str, user: &str) -> Result<(), SyncError> {
        self.check_online()?;
        debug!(macro_key, user, "memory trigger");
        if let Ok(mut t) = self.triggered.lock() {
            t.push((macro_key.to_string(), user.to_string()));
        }
        Ok(())
    }
}
