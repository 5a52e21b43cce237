use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use actions::FIXED_MACROS;
use loadout::Slot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{normalize_profile_name, serialize_slots, AllProfiles, ProfileStore, SyncError};

/// Most icons shown in a profile preview.
const PREVIEW_LIMIT: usize = 10;

/// Result of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    /// The name was already taken and the old profile was replaced.
    Overwritten,
}

/// Translates between slot collections and the store's macro-key lists.
///
/// Every operation leaves local state alone until the store has answered
/// successfully.
pub struct ProfileSync<S> {
    store: Arc<S>,
    // user -> last profile list seen from the store
    known: HashMap<String, Vec<String>>,
    user_aliases: BTreeMap<String, String>,
}

impl<S: ProfileStore + 'static> ProfileSync<S> {
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            store,
            known: HashMap::new(),
            user_aliases: BTreeMap::new(),
        }
    }

    /// Display user -> key used in the all-profiles mapping.
    pub fn with_user_aliases(mut self, aliases: BTreeMap<String, String>) -> Self {
        self.user_aliases = aliases;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Profile names from the most recent successful listing for `user`.
    pub fn known_profiles(&self, user: &str) -> &[String] {
        self.known.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    pub async fn list_profiles(&mut self, user: &str) -> Result<Vec<String>, SyncError> {
        let names = self.store.list_profiles(user).await?;
        self.known.insert(user.to_string(), names.clone());
        Ok(names)
    }

    pub async fn fetch_profile(&self, user: &str, profile: &str) -> Result<Vec<String>, SyncError> {
        let name = normalize_profile_name(profile)?;
        self.store
            .fetch_profile(user, &name)
            .await?
            .ok_or_else(|| SyncError::NotFound {
                user: user.to_string(),
                profile: name,
            })
    }

    pub async fn fetch_all(&self) -> Result<AllProfiles, SyncError> {
        self.store.fetch_all().await
    }

    /// Looks a profile up through the all-profiles mapping, resolving the
    /// user alias first.
    pub async fn fetch_from_all(&self, user: &str, profile: &str) -> Result<Vec<String>, SyncError> {
        let all = self.store.fetch_all().await?;
        let key = self.user_aliases.get(user).map(String::as_str).unwrap_or(user);
        let normalized = normalize_profile_name(profile)?;

        all.get(key)
            .and_then(|profiles| {
                profiles
                    .get(profile)
                    .or_else(|| profiles.get(&normalized))
                    .cloned()
            })
            .ok_or_else(|| SyncError::NotFound {
                user: user.to_string(),
                profile: normalized,
            })
    }

    /// Whether saving `profile` would replace an existing one (case-insensitive).
    pub fn overwrite_warning(&self, user: &str, profile: &str) -> bool {
        let Ok(name) = normalize_profile_name(profile) else {
            return false;
        };
        self.known_profiles(user)
            .iter()
            .any(|p| p.to_lowercase() == name)
    }

    /// Saves the grid under a (normalized) name.
    ///
    /// Overwriting is allowed; the caller is expected to have shown the
    /// overwrite warning first.
    pub async fn save_profile(
        &mut self,
        user: &str,
        profile: &str,
        slots: &[Slot],
    ) -> Result<SaveOutcome, SyncError> {
        let name = normalize_profile_name(profile)?;
        let overwrite = self.overwrite_warning(user, &name);
        let macros = serialize_slots(slots);

        self.store.save_profile(user, &name, &macros).await?;
        info!(user, profile = %name, overwrite, "profile saved");

        if !overwrite {
            self.known.entry(user.to_string()).or_default().push(name);
        }
        Ok(if overwrite {
            SaveOutcome::Overwritten
        } else {
            SaveOutcome::Created
        })
    }

    /// Overwrites the given profile with the grid, no name prompt involved.
    pub async fn quick_update(
        &mut self,
        user: &str,
        profile: &str,
        slots: &[Slot],
    ) -> Result<(), SyncError> {
        let name = normalize_profile_name(profile)?;
        let macros = serialize_slots(slots);
        self.store.save_profile(user, &name, &macros).await?;
        info!(user, profile = %name, "profile updated");

        let known = self.known.entry(user.to_string()).or_default();
        if !known.iter().any(|p| p.to_lowercase() == name) {
            known.push(name);
        }
        Ok(())
    }

    /// Renames a profile. If `new` is already taken the caller must have
    /// obtained confirmation (see [`overwrite_warning`](Self::overwrite_warning)).
    pub async fn rename_profile(&mut self, user: &str, old: &str, new: &str) -> Result<(), SyncError> {
        let old = normalize_profile_name(old)?;
        let new = normalize_profile_name(new)?;

        self.store.rename_profile(user, &old, &new).await?;
        info!(user, old = %old, new = %new, "profile renamed");

        if let Some(known) = self.known.get_mut(user) {
            known.retain(|p| {
                let p = p.to_lowercase();
                p != old && p != new
            });
            known.push(new);
        }
        Ok(())
    }

    pub async fn delete_profile(&mut self, user: &str, profile: &str) -> Result<(), SyncError> {
        let name = normalize_profile_name(profile)?;
        self.store.delete_profile(user, &name).await?;
        info!(user, profile = %name, "profile deleted");

        if let Some(known) = self.known.get_mut(user) {
            known.retain(|p| p.to_lowercase() != name);
        }
        Ok(())
    }

    /// Dynamic macro keys of a profile, for the profile picker's icon row.
    pub async fn preview(&self, user: &str, profile: &str) -> Result<Vec<String>, SyncError> {
        let macros = self.fetch_profile(user, profile).await?;
        Ok(macros
            .into_iter()
            .filter(|m| {
                let m = m.trim();
                !FIXED_MACROS.iter().any(|f| f.eq_ignore_ascii_case(m))
            })
            .take(PREVIEW_LIMIT)
            .collect())
    }

    /// Fires a macro without waiting for it. Failures are logged, never
    /// returned; the handle only exists so callers can join in tests.
    pub fn trigger_macro(&self, user: &str, macro_key: &str) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let user = user.to_string();
        let macro_key = macro_key.to_string();
        tokio::spawn(async move {
            match store.trigger_macro(&macro_key, &user).await {
                Ok(()) => info!(macro_key = %macro_key, user = %user, "triggered"),
                Err(e) => warn!(macro_key = %macro_key, user = %user, error = %e, "trigger failed"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryProfileStore;
    use actions::MacroCatalog;
    use loadout::MacroCollection;
    use storage::profiles::ProfileBook;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn grid(macros: &[(&str, &str)]) -> MacroCollection {
        let mut c = MacroCollection::new();
        for (icon, key) in macros {
            c.add_or_toggle(icon, key).unwrap();
        }
        c
    }

    #[tokio::test]
    async fn save_fetch_replace_round_trip() {
        let catalog = MacroCatalog::builtin();
        let mut sync = ProfileSync::new(MemoryProfileStore::new());
        let mut original = grid(&[
            ("eagle_strike", "EagleStrike"),
            ("railgun", "Railgun"),
            ("shield_generator", "ShieldGenerator"),
        ]);
        // Make ids non-contiguous; only order matters for the round trip.
        original.remove(app_core::ids::SlotId(4)).unwrap();
        original.add_or_toggle("spear", "Spear").unwrap();

        sync.save_profile("green", "Bug Hunt", original.slots())
            .await
            .unwrap();
        let fetched = sync.fetch_profile("green", "bug hunt").await.unwrap();

        let mut restored = MacroCollection::new();
        restored.replace_from_profile(&fetched, &catalog);

        let dynamic_keys = |c: &MacroCollection| -> Vec<String> {
            c.dynamic_slots().iter().map(|s| s.macro_key.clone()).collect()
        };
        assert_eq!(dynamic_keys(&restored), dynamic_keys(&original));
        assert_eq!(restored.slots()[..2], original.slots()[..2]);
    }

    #[tokio::test]
    async fn save_normalizes_and_reports_overwrite() {
        let store = MemoryProfileStore::new();
        let mut sync = ProfileSync::new(store);
        let g = grid(&[("railgun", "Railgun")]);

        sync.list_profiles("green").await.unwrap();
        assert_eq!(
            sync.save_profile("green", "  Bots ", g.slots()).await.unwrap(),
            SaveOutcome::Created
        );
        assert!(sync.overwrite_warning("green", "BOTS"));
        assert!(!sync.overwrite_warning("blue", "bots"));
        assert_eq!(
            sync.save_profile("green", "bots", g.slots()).await.unwrap(),
            SaveOutcome::Overwritten
        );

        let book = sync.store().snapshot();
        assert_eq!(book.list("green"), ["bots"]);
        assert_eq!(
            book.get("green", "bots").unwrap(),
            keys(&["Reinforce", "Resupply", "Railgun"]).as_slice()
        );
    }

    #[tokio::test]
    async fn empty_name_is_rejected_before_any_call() {
        let mut sync = ProfileSync::new(MemoryProfileStore::new());
        let g = MacroCollection::new();
        assert!(matches!(
            sync.save_profile("green", "  ", g.slots()).await,
            Err(SyncError::InvalidName)
        ));
        assert!(sync.store().snapshot().all().is_empty());
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let sync = ProfileSync::new(MemoryProfileStore::new());
        assert!(matches!(
            sync.fetch_profile("green", "nothing").await,
            Err(SyncError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn failures_leave_cached_list_untouched() {
        let mut sync = ProfileSync::new(MemoryProfileStore::new());
        let g = grid(&[("spear", "Spear")]);
        sync.save_profile("green", "a", g.slots()).await.unwrap();
        sync.list_profiles("green").await.unwrap();

        sync.store().set_offline(true);
        let err = sync.delete_profile("green", "a").await.unwrap_err();
        assert!(matches!(err, SyncError::RemoteUnavailable(_)));
        assert!(sync.list_profiles("green").await.is_err());
        assert_eq!(sync.known_profiles("green"), ["a"]);

        let err = sync.save_profile("green", "b", g.slots()).await.unwrap_err();
        assert!(matches!(err, SyncError::RemoteUnavailable(_)));
        assert_eq!(sync.known_profiles("green"), ["a"]);
    }

    #[tokio::test]
    async fn rename_and_delete_update_cache() {
        let mut sync = ProfileSync::new(MemoryProfileStore::new());
        let g = grid(&[("spear", "Spear")]);
        sync.save_profile("green", "a", g.slots()).await.unwrap();
        sync.save_profile("green", "b", g.slots()).await.unwrap();
        sync.list_profiles("green").await.unwrap();

        assert!(sync.overwrite_warning("green", "b"));
        sync.rename_profile("green", "a", "B").await.unwrap();
        assert_eq!(sync.known_profiles("green"), ["b"]);
        assert_eq!(sync.store().snapshot().list("green"), ["b"]);

        sync.delete_profile("green", "b").await.unwrap();
        assert!(sync.known_profiles("green").is_empty());
        assert!(sync.list_profiles("green").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn quick_update_overwrites_in_place() {
        let mut sync = ProfileSync::new(MemoryProfileStore::new());
        sync.save_profile("green", "bugs", grid(&[("spear", "Spear")]).slots())
            .await
            .unwrap();

        let updated = grid(&[("railgun", "Railgun"), ("hellbomb", "Hellbomb")]);
        sync.quick_update("green", "Bugs", updated.slots()).await.unwrap();

        assert_eq!(
            sync.fetch_profile("green", "bugs").await.unwrap(),
            keys(&["Reinforce", "Resupply", "Railgun", "Hellbomb"])
        );
        assert_eq!(sync.known_profiles("green"), ["bugs"]);
    }

    #[tokio::test]
    async fn fetch_from_all_resolves_aliases() {
        let mut book = ProfileBook::new();
        book.upsert("user1", "bugs", keys(&["Reinforce", "Resupply", "Railgun"]));
        let sync = ProfileSync::new(MemoryProfileStore::with_book(book)).with_user_aliases(
            BTreeMap::from([("green".to_string(), "user1".to_string())]),
        );

        let macros = sync.fetch_from_all("green", "Bugs").await.unwrap();
        assert_eq!(macros[2], "Railgun");
        assert!(matches!(
            sync.fetch_from_all("blue", "bugs").await,
            Err(SyncError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn preview_skips_fixed_and_caps_at_ten() {
        let mut list = keys(&["reinforce", "RESUPPLY"]);
        list.extend((0..12).map(|i| format!("Macro{i}")));
        let mut book = ProfileBook::new();
        book.upsert("green", "big", list);
        let sync = ProfileSync::new(MemoryProfileStore::with_book(book));

        let preview = sync.preview("green", "big").await.unwrap();
        assert_eq!(preview.len(), 10);
        assert_eq!(preview[0], "Macro0");
    }

    #[tokio::test]
    async fn trigger_failure_is_swallowed() {
        let sync = ProfileSync::new(MemoryProfileStore::new());
        sync.trigger_macro("green", "EagleStrike").await.unwrap();
        assert_eq!(
            sync.store().triggered(),
            [("EagleStrike".to_string(), "green".to_string())]
        );

        sync.store().set_offline(true);
        // The task completes normally even though the store failed.
        sync.trigger_macro("green", "Railgun").await.unwrap();
        assert_eq!(sync.store().triggered().len(), 1);
    }
}
