pub mod ids;

use tracing::debug;

/// Session selection shared by every front end.
///
/// A user owns profiles, so changing the user always drops the profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppCore {
    pub selected_user: Option<String>,
    pub selected_profile: Option<String>,
}

impl AppCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches the active user and clears the active profile.
    ///
    /// Returns `true` when the user actually changed.
    pub fn select_user(&mut self, user: &str) -> bool {
        let user = user.trim();
        let changed = self.selected_user.as_deref() != Some(user);
        debug!(user, changed, "select user");
        self.selected_user = if user.is_empty() {
            None
        } else {
            Some(user.to_string())
        };
        self.selected_profile = None;
        changed
    }

    pub fn select_profile(&mut self, profile: Option<&str>) {
        self.selected_profile = profile
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
    }

    pub fn user(&self) -> Option<&str> {
        self.selected_user.as_deref()
    }

    pub fn profile(&self) -> Option<&str> {
        self.selected_profile.as_deref()
    }
}
