//! Persisted user/profile selection (survives restarts).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{json_file, paths};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::new(paths::selection_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored selection. A corrupt file is treated as empty.
    pub fn load(&self) -> Selection {
        match json_file::load_optional::<Selection>(&self.path) {
            Ok(sel) => sel.unwrap_or_default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable selection");
                Selection::default()
            }
        }
    }

    pub fn save(&self, selection: &Selection) -> anyhow::Result<()> {
        json_file::save_atomic(selection, &self.path)
    }

    /// Persists a new user and clears the stored profile.
    ///
    /// A blank user clears the stored user, matching `AppCore::select_user`.
    pub fn set_user(&self, user: &str) -> anyhow::Result<Selection> {
        let user = user.trim();
        let sel = Selection {
            user: (!user.is_empty()).then(|| user.to_string()),
            profile: None,
        };
        debug!(user, "persisting user selection");
        self.save(&sel)?;
        Ok(sel)
    }

    /// Persists the selected profile; `None` removes it.
    pub fn set_profile(&self, profile: Option<&str>) -> anyhow::Result<Selection> {
        let mut sel = self.load();
        sel.profile = profile
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        self.save(&sel)?;
        Ok(sel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SelectionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SelectionStore::new(dir.path().join("selection.json"));
        (dir, store)
    }

    #[test]
    fn empty_when_nothing_stored() {
        let (_dir, store) = store();
        assert_eq!(store.load(), Selection::default());
    }

    #[test]
    fn user_change_clears_profile() {
        let (_dir, store) = store();
        store.set_user("green").unwrap();
        store.set_profile(Some("bugs")).unwrap();
        assert_eq!(store.load().profile.as_deref(), Some("bugs"));

        let sel = store.set_user("blue").unwrap();
        assert_eq!(sel.user.as_deref(), Some("blue"));
        assert_eq!(sel.profile, None);
        assert_eq!(store.load(), sel);
    }

    #[test]
    fn blank_user_clears_selection() {
        let (_dir, store) = store();
        store.set_user("green").unwrap();
        store.set_profile(Some("bugs")).unwrap();

        let sel = store.set_user("  ").unwrap();
        assert_eq!(sel, Selection::default());
        assert_eq!(store.load(), Selection::default());
    }

    #[test]
    fn clearing_profile_removes_it() {
        let (_dir, store) = store();
        store.set_user("green").unwrap();
        store.set_profile(Some("bots")).unwrap();
        store.set_profile(None).unwrap();
        assert_eq!(store.load().profile, None);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "garbage").unwrap();
        assert_eq!(store.load(), Selection::default());
    }
}
