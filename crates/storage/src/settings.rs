//! User-editable settings (`settings.json` in the config dir).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{json_file, paths};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8888";

/// Environment variable overriding `server_url`.
pub const ENV_SERVER: &str = "MACROLINK_SERVER";
/// Environment variable forcing the offline profile book (`1`/`true`).
pub const ENV_OFFLINE: &str = "MACROLINK_OFFLINE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntry {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Display colour for the user picker.
    #[serde(default = "default_user_color")]
    pub color: String,
}

fn default_user_color() -> String {
    "white".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_users")]
    pub users: Vec<UserEntry>,
    /// Display user id -> key used by the store's all-profiles mapping.
    #[serde(default = "default_user_aliases")]
    pub user_aliases: BTreeMap<String, String>,
    /// Use the local profile book instead of the server.
    #[serde(default)]
    pub offline: bool,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_users() -> Vec<UserEntry> {
    vec![
        UserEntry {
            id: "green".to_string(),
            label: "Green".to_string(),
            color: "green".to_string(),
        },
        UserEntry {
            id: "blue".to_string(),
            label: "Blue".to_string(),
            color: "blue".to_string(),
        },
    ]
}

fn default_user_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("green".to_string(), "user1".to_string()),
        ("blue".to_string(), "user2".to_string()),
    ])
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            users: default_users(),
            user_aliases: default_user_aliases(),
            offline: false,
        }
    }
}

impl Settings {
    /// Settings file from the config dir with environment overrides applied.
    pub fn load() -> anyhow::Result<Self> {
        let mut settings = Self::load_from(&paths::settings_path()?)?;
        settings.apply_env(|k| std::env::var(k).ok());
        Ok(settings)
    }

    /// Missing file means defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let settings = json_file::load_optional::<Settings>(path)?.unwrap_or_default();
        debug!(path = %path.display(), server = %settings.server_url, "loaded settings");
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        json_file::save_atomic(self, path)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVER).filter(|u| !u.trim().is_empty()) {
            self.server_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_OFFLINE) {
            self.offline = matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Store-side key for a display user id (identity when no alias exists).
    pub fn store_user<'a>(&'a self, user: &'a str) -> &'a str {
        self.user_aliases
            .get(user)
            .map(String::as_str)
            .unwrap_or(user)
    }

    pub fn user(&self, id: &str) -> Option<&UserEntry> {
        self.users.iter().find(|u| u.id == id)
    }
}
