//! Offline profile book: every user's loadouts in one JSON file.
//!
//! Shape on disk matches the server's all-profiles response:
//! `{ "<user>": { "<profile>": ["Reinforce", "Resupply", ...] } }`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{json_file, paths};

pub type UserProfiles = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileBook {
    users: BTreeMap<String, UserProfiles>,
}

impl ProfileBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        paths::profile_book_path()
    }

    /// Missing file means an empty book.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        Ok(json_file::load_optional(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        json_file::save_atomic(self, path)
    }

    /// Profile names for a user, sorted case-insensitively.
    pub fn list(&self, user: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .users
            .get(user)
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default();
        names.sort_by_key(|a| a.to_lowercase());
        names
    }

    pub fn get(&self, user: &str, profile: &str) -> Option<&[String]> {
        self.users
            .get(user)
            .and_then(|p| p.get(profile))
            .map(Vec::as_slice)
    }

    pub fn all(&self) -> &BTreeMap<String, UserProfiles> {
        &self.users
    }

    /// Inserts or overwrites; returns true when a profile was replaced.
    pub fn upsert(&mut self, user: &str, profile: &str, macros: Vec<String>) -> bool {
        let replaced = self
            .users
            .entry(user.to_string())
            .or_default()
            .insert(profile.to_string(), macros)
            .is_some();
        debug!(user, profile, replaced, "stored profile");
        replaced
    }

    /// Moves `old` to `new`, overwriting `new` if present. False if `old` is absent.
    pub fn rename(&mut self, user: &str, old: &str, new: &str) -> bool {
        let Some(profiles) = self.users.get_mut(user) else {
            return false;
        };
        let Some(macros) = profiles.remove(old) else {
            return false;
        };
        profiles.insert(new.to_string(), macros);
        true
    }

    /// False if the profile did not exist. Users without profiles are dropped.
    pub fn delete(&mut self, user: &str, profile: &str) -> bool {
        let Some(profiles) = self.users.get_mut(user) else {
            return false;
        };
        let removed = profiles.remove(profile).is_some();
        if profiles.is_empty() {
            self.users.remove(user);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn upsert_list_and_get() {
        let mut book = ProfileBook::new();
        assert!(!book.upsert("green", "bugs", keys(&["Reinforce", "Resupply", "Railgun"])));
        assert!(!book.upsert("green", "Automatons", keys(&["Reinforce", "Resupply"])));
        assert!(book.upsert("green", "bugs", keys(&["Reinforce", "Resupply", "Spear"])));

        assert_eq!(book.list("green"), ["Automatons", "bugs"]);
        assert_eq!(book.get("green", "bugs").unwrap()[2], "Spear");
        assert!(book.list("blue").is_empty());
        assert!(book.get("blue", "bugs").is_none());
    }

    #[test]
    fn rename_overwrites_target() {
        let mut book = ProfileBook::new();
        book.upsert("green", "a", keys(&["Reinforce", "Resupply", "Railgun"]));
        book.upsert("green", "b", keys(&["Reinforce", "Resupply"]));

        assert!(book.rename("green", "a", "b"));
        assert_eq!(book.list("green"), ["b"]);
        assert_eq!(book.get("green", "b").unwrap().len(), 3);
        assert!(!book.rename("green", "missing", "c"));
        assert!(!book.rename("blue", "a", "c"));
    }

    #[test]
    fn delete_drops_empty_users() {
        let mut book = ProfileBook::new();
        book.upsert("green", "a", keys(&["Reinforce", "Resupply"]));

        assert!(book.delete("green", "a"));
        assert!(!book.delete("green", "a"));
        assert!(book.all().is_empty());
    }

    #[test]
    fn file_shape_is_nested_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");

        let mut book = ProfileBook::new();
        book.upsert("user1", "bugs", keys(&["Reinforce", "Resupply", "EagleStrike"]));
        book.save(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["user1"]["bugs"][2], "EagleStrike");
        assert_eq!(ProfileBook::load(&path).unwrap(), book);
    }
}
