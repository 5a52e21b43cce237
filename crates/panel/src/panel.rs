use std::time::{Duration, Instant};

use actions::MacroCatalog;
use app_core::ids::SlotId;
use app_core::AppCore;
use loadout::{MacroCollection, RemoveCountdown, Slot, SlotError, SlotEvent, Toggle, MAX_SLOTS};
use profile_sync::{ProfileStore, ProfileSync, SaveOutcome};
use storage::selection::SelectionStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::feedback::{glow_color, Cue, Feedback, Notice, SlotView};
use crate::menus::Menus;
use crate::modal::{Modal, ModalKind};
use crate::PanelError;

/// Menu sounds stay quiet this long after a user pick, so the click that
/// closed the user menu does not also chirp.
pub const MENU_CUE_SUPPRESSION: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum PressOutcome {
    /// Remove mode removed the slot; the countdown was restarted.
    Removed(Slot),
    /// The macro was sent; the handle resolves once the request settles.
    Triggered(JoinHandle<()>),
}

pub struct Panel<S> {
    core: AppCore,
    grid: MacroCollection,
    countdown: RemoveCountdown,
    menus: Menus,
    modal: Modal,
    sync: ProfileSync<S>,
    catalog: MacroCatalog,
    selection: Option<SelectionStore>,
    profiles: Vec<String>,
    feedback: Vec<Feedback>,
    suppress_menu_cue_until: Option<Instant>,
}

impl<S: ProfileStore + 'static> Panel<S> {
    pub fn new(sync: ProfileSync<S>, catalog: MacroCatalog) -> Self {
        Self {
            core: AppCore::new(),
            grid: MacroCollection::new(),
            countdown: RemoveCountdown::default(),
            menus: Menus::default(),
            modal: Modal::Closed,
            sync,
            catalog,
            selection: None,
            profiles: Vec::new(),
            feedback: Vec::new(),
            suppress_menu_cue_until: None,
        }
    }

    /// Persist user/profile choices through `store`.
    pub fn with_selection_store(mut self, store: SelectionStore) -> Self {
        self.selection = Some(store);
        self
    }

    pub fn with_countdown(mut self, countdown: RemoveCountdown) -> Self {
        self.countdown = countdown;
        self
    }

    // ---- read side ----

    pub fn core(&self) -> &AppCore {
        &self.core
    }

    pub fn slots(&self) -> &[Slot] {
        self.grid.slots()
    }

    pub fn grid(&self) -> &MacroCollection {
        &self.grid
    }

    /// Change stream for reactive front ends.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SlotEvent> {
        self.grid.subscribe()
    }

    pub fn catalog(&self) -> &MacroCatalog {
        &self.catalog
    }

    pub fn sync(&self) -> &ProfileSync<S> {
        &self.sync
    }

    pub fn menus(&self) -> Menus {
        self.menus
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    pub fn remove_mode(&self) -> bool {
        self.grid.remove_mode_active()
    }

    /// The "add" affordance is disabled exactly when the grid is full.
    pub fn add_disabled(&self) -> bool {
        self.grid.len() == MAX_SLOTS
    }

    pub fn stratagem_label(&self) -> &'static str {
        if self.add_disabled() {
            "Max Reached"
        } else {
            "Stratagems"
        }
    }

    /// `ON (3)` / `OFF`, as shown next to the remove button.
    pub fn remove_status(&self, now: Instant) -> String {
        match (self.remove_mode(), self.countdown.remaining_secs(now)) {
            (true, Some(secs)) => format!("ON ({secs})"),
            (true, None) => "ON".to_string(),
            (false, _) => "OFF".to_string(),
        }
    }

    /// Cells to draw, in grid order, never more than the grid capacity.
    pub fn grid_view(&self) -> Vec<SlotView> {
        self.grid
            .slots()
            .iter()
            .take(MAX_SLOTS)
            .map(|slot| {
                let color = self.catalog.color(&slot.macro_key);
                SlotView {
                    id: slot.id,
                    icon: slot.icon.clone(),
                    macro_key: slot.macro_key.clone(),
                    label: self.catalog.label(&slot.macro_key).to_string(),
                    fixed: slot.is_fixed(),
                    border: color.map(|c| c.border()),
                    glow: color.map(glow_color),
                }
            })
            .collect()
    }

    /// Takes everything queued for the front end since the last call.
    pub fn drain_feedback(&mut self) -> Vec<Feedback> {
        std::mem::take(&mut self.feedback)
    }

    // ---- menus ----

    pub fn toggle_stratagem_menu(&mut self, now: Instant) -> bool {
        if self.add_disabled() {
            self.sound(Cue::MacroMax);
            return false;
        }
        let open = self.menus.toggle_stratagems();
        self.menu_cue(now);
        open
    }

    pub fn toggle_profile_menu(&mut self, now: Instant) -> bool {
        let open = self.menus.toggle_profiles();
        self.menu_cue(now);
        open
    }

    pub fn toggle_user_menu(&mut self, now: Instant) -> bool {
        let open = self.menus.toggle_users();
        self.menu_cue(now);
        open
    }

    /// Click outside every dropdown.
    pub fn close_menus(&mut self, now: Instant) {
        if self.menus.close_all() {
            self.menu_cue(now);
        }
    }

    // ---- grid ----

    /// Adds the macro behind `icon` from the stratagem menu, or removes it if
    /// it is already on the grid.
    pub fn pick_macro(&mut self, icon: &str) -> Result<Toggle, PanelError> {
        let macro_key = self.catalog.resolve_icon(icon);
        match self.grid.add_or_toggle(icon, &macro_key) {
            Ok(toggle) => {
                match &toggle {
                    Toggle::Added(_) => {
                        self.sound(Cue::MacroAdd);
                        self.menus.stratagems = false;
                    }
                    Toggle::Removed(_) => self.sound(Cue::MacroRemove),
                }
                Ok(toggle)
            }
            Err(e) => {
                if matches!(e, SlotError::CapacityExceeded { .. }) {
                    self.sound(Cue::MacroMax);
                }
                self.notice(Notice::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    pub fn toggle_remove_mode(&mut self, now: Instant) -> bool {
        self.feedback.push(Feedback::haptic());
        self.sound(Cue::RemoveToggle);

        let active = self.grid.toggle_remove_mode();
        if active {
            self.countdown.start(now);
            self.menus.close_grid_menus();
        } else {
            self.countdown.cancel();
        }
        active
    }

    /// Advances the remove-mode countdown; returns true when it just lapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.countdown.take_expired(now) {
            return false;
        }
        self.grid.set_remove_mode(false);
        self.feedback.push(Feedback::haptic());
        debug!("remove mode expired");
        true
    }

    /// A tap on a grid cell: removes it in remove mode, triggers it otherwise.
    pub fn press_slot(&mut self, id: SlotId, now: Instant) -> Result<PressOutcome, PanelError> {
        if self.remove_mode() {
            return match self.grid.remove(id) {
                Ok(slot) => {
                    self.countdown.restart(now);
                    self.sound(Cue::MacroRemove);
                    Ok(PressOutcome::Removed(slot))
                }
                Err(e) => {
                    let text = match (&e, self.grid.get(id)) {
                        (SlotError::ProtectedSlot(_), Some(slot)) => {
                            format!("'{}' cannot be removed.", slot.macro_key)
                        }
                        _ => e.to_string(),
                    };
                    self.notice(Notice::error(text));
                    Err(e.into())
                }
            };
        }

        let macro_key = self
            .grid
            .get(id)
            .map(|s| s.macro_key.clone())
            .ok_or(SlotError::NotFound(id))?;
        let Some(user) = self.core.user().map(str::to_string) else {
            self.notice(Notice::error("Select a user first."));
            return Err(PanelError::NoUser);
        };
        let handle = self.sync.trigger_macro(&user, &macro_key);
        self.sound(Cue::MacroTrigger);
        self.feedback.push(Feedback::haptic());
        Ok(PressOutcome::Triggered(handle))
    }

    // ---- user / profile selection ----

    /// Switches user: resets the grid and profile, persists the choice and
    /// reloads the profile list. `silent` skips the menu-cue suppression
    /// (used when restoring on start).
    pub async fn select_user(&mut self, user: &str, silent: bool, now: Instant) -> Result<(), PanelError> {
        if let Some(store) = &self.selection {
            if let Err(e) = store.set_user(user) {
                warn!(error = %e, "failed to persist user selection");
            }
        }
        self.switch_user(user, silent, now).await
    }

    /// In-memory half of [`select_user`](Self::select_user); leaves the
    /// persisted selection alone.
    async fn switch_user(&mut self, user: &str, silent: bool, now: Instant) -> Result<(), PanelError> {
        self.core.select_user(user);
        self.grid.reset_to_default();
        self.profiles.clear();
        self.menus.users = false;
        self.sound(Cue::Login);
        if !silent {
            self.suppress_menu_cue_until = Some(now + MENU_CUE_SUPPRESSION);
        }
        info!(user, "switched user");

        self.refresh_profiles().await
    }

    pub async fn refresh_profiles(&mut self) -> Result<(), PanelError> {
        let user = self.core.user().ok_or(PanelError::NoUser)?.to_string();
        match self.sync.list_profiles(&user).await {
            Ok(names) => {
                self.profiles = names;
                Ok(())
            }
            Err(e) => {
                warn!(user = %user, error = %e, "loadout list fetch failed");
                self.notice(Notice::error("Failed to load loadouts."));
                Err(e.into())
            }
        }
    }

    /// Icon ids for a profile's dynamic macros, for the profile menu.
    pub async fn preview(&self, profile: &str) -> Result<Vec<String>, PanelError> {
        let user = self.core.user().ok_or(PanelError::NoUser)?;
        let keys = self.sync.preview(user, profile).await?;
        Ok(keys.iter().map(|k| self.catalog.icon_for(k)).collect())
    }

    /// Loads a profile into the grid. The grid is untouched if the fetch fails.
    pub async fn select_profile(&mut self, profile: &str) -> Result<(), PanelError> {
        let user = self.core.user().ok_or(PanelError::NoUser)?.to_string();
        self.menus.profiles = false;

        let macros = match self.sync.fetch_profile(&user, profile).await {
            Ok(m) => m,
            Err(e) => {
                warn!(user = %user, profile, error = %e, "loadout load failed");
                self.notice(Notice::error("Failed to load macros for selected profile."));
                return Err(e.into());
            }
        };

        self.grid.replace_from_profile(&macros, &self.catalog);
        self.set_selected_profile(Some(&profile.trim().to_lowercase()));
        Ok(())
    }

    /// Re-applies the persisted selection: the user silently, then the
    /// stored profile if there was one. The stored selection is only
    /// rewritten once the profile has loaded, so a failed restore keeps it.
    pub async fn restore(&mut self, now: Instant) -> Result<(), PanelError> {
        let Some(store) = &self.selection else {
            return Ok(());
        };
        let saved = store.load();
        let Some(user) = saved.user else {
            return Ok(());
        };

        self.switch_user(&user, true, now).await?;
        if let Some(profile) = saved.profile {
            self.select_profile(&profile).await?;
        }
        Ok(())
    }

    // ---- dialogs ----

    pub fn open_save(&mut self) {
        self.modal = Modal::Save {
            input: String::new(),
        };
        self.sound(Cue::Pip);
    }

    /// Updates the save dialog's name field; returns whether the overwrite
    /// warning should show.
    pub fn set_save_input(&mut self, name: &str) -> bool {
        if let Modal::Save { input } = &mut self.modal {
            *input = name.to_string();
        }
        self.save_warning()
    }

    pub fn save_warning(&self) -> bool {
        match (&self.modal, self.core.user()) {
            (Modal::Save { input }, Some(user)) => self.sync.overwrite_warning(user, input),
            _ => false,
        }
    }

    pub fn open_rename(&mut self) -> Result<(), PanelError> {
        let old = self.require_profile()?;
        self.modal = Modal::Rename { old };
        self.sound(Cue::Pip);
        Ok(())
    }

    pub fn open_delete(&mut self) -> Result<(), PanelError> {
        let profile = self.require_profile()?;
        self.modal = Modal::Delete { profile };
        self.sound(Cue::Pip);
        Ok(())
    }

    pub fn open_quick_update(&mut self) -> Result<(), PanelError> {
        let profile = self.require_profile()?;
        self.modal = Modal::QuickUpdate { profile };
        self.sound(Cue::Pip);
        Ok(())
    }

    pub fn cancel_modal(&mut self) {
        if self.modal.is_open() {
            self.modal = Modal::Closed;
            self.sound(Cue::Cancel);
        }
    }

    pub async fn confirm_save(&mut self) -> Result<SaveOutcome, PanelError> {
        let Modal::Save { input } = &self.modal else {
            return Err(PanelError::ModalNotOpen(ModalKind::Save));
        };
        let name = input.trim().to_lowercase();
        let user = self.core.user().ok_or(PanelError::NoUser)?.to_string();
        if name.is_empty() {
            self.notice(Notice::error("Enter a loadout name"));
            return Err(profile_sync::SyncError::InvalidName.into());
        }
        self.sound(Cue::Confirm);

        let outcome = match self
            .sync
            .save_profile(&user, &name, self.grid.slots())
            .await
        {
            Ok(o) => o,
            Err(e) => {
                warn!(error = %e, "save error");
                self.notice(Notice::error("Failed to save loadout"));
                return Err(e.into());
            }
        };

        self.close_modal(ModalKind::Save);
        self.notice(Notice::info("Loadout saved."));
        self.set_selected_profile(Some(&name));
        self.reload_profiles().await;
        Ok(outcome)
    }

    /// Renames the selected profile. When `new_name` is already taken the
    /// call fails with [`PanelError::NeedsConfirmation`] unless `overwrite`
    /// is set.
    pub async fn confirm_rename(&mut self, new_name: &str, overwrite: bool) -> Result<(), PanelError> {
        let Modal::Rename { old } = &self.modal else {
            return Err(PanelError::ModalNotOpen(ModalKind::Rename));
        };
        let old = old.clone();
        let user = self.core.user().ok_or(PanelError::NoUser)?.to_string();
        let new_name = new_name.trim().to_lowercase();
        if new_name.is_empty() {
            self.notice(Notice::error("Missing loadout name"));
            return Err(profile_sync::SyncError::InvalidName.into());
        }
        if !overwrite && self.sync.overwrite_warning(&user, &new_name) {
            return Err(PanelError::NeedsConfirmation(new_name));
        }
        self.sound(Cue::Confirm);

        if let Err(e) = self.sync.rename_profile(&user, &old, &new_name).await {
            warn!(error = %e, "rename error");
            self.notice(Notice::error("Rename failed"));
            return Err(e.into());
        }

        self.close_modal(ModalKind::Rename);
        self.notice(Notice::info("Renamed."));
        self.set_selected_profile(Some(&new_name));
        self.reload_profiles().await;
        Ok(())
    }

    pub async fn confirm_delete(&mut self) -> Result<(), PanelError> {
        let Modal::Delete { profile } = &self.modal else {
            return Err(PanelError::ModalNotOpen(ModalKind::Delete));
        };
        let profile = profile.clone();
        let user = self.core.user().ok_or(PanelError::NoUser)?.to_string();
        self.sound(Cue::Confirm);

        let res = self.sync.delete_profile(&user, &profile).await;
        self.close_modal(ModalKind::Delete);
        if let Err(e) = res {
            warn!(error = %e, "failed to delete loadout");
            self.notice(Notice::error("Error deleting loadout."));
            return Err(e.into());
        }

        self.notice(Notice::info("Loadout deleted."));
        self.set_selected_profile(None);
        self.reload_profiles().await;
        Ok(())
    }

    pub async fn confirm_quick_update(&mut self) -> Result<(), PanelError> {
        let Modal::QuickUpdate { profile } = &self.modal else {
            return Err(PanelError::ModalNotOpen(ModalKind::QuickUpdate));
        };
        let profile = profile.clone();
        let user = self.core.user().ok_or(PanelError::NoUser)?.to_string();

        let res = self
            .sync
            .quick_update(&user, &profile, self.grid.slots())
            .await;
        self.close_modal(ModalKind::QuickUpdate);
        if let Err(e) = res {
            warn!(error = %e, "quick update failed");
            self.notice(Notice::error("Failed to update loadout."));
            return Err(e.into());
        }

        self.notice(Notice::info(format!("Loadout '{profile}' updated.")));
        self.sound(Cue::Confirm);
        self.reload_profiles().await;
        Ok(())
    }

    // ---- helpers ----

    /// Profile list refresh after a successful store write. A failure has
    /// already raised a notice in `refresh_profiles`; the write itself stands.
    async fn reload_profiles(&mut self) {
        match self.refresh_profiles().await {
            Ok(()) => debug!(count = self.profiles.len(), "profile list reloaded"),
            Err(e) => debug!(error = %e, "profile list stale after write"),
        }
    }

    fn require_profile(&mut self) -> Result<String, PanelError> {
        match self.core.profile() {
            Some(p) => Ok(p.to_string()),
            None => {
                self.notice(Notice::error("Select a profile first."));
                Err(PanelError::NoProfile)
            }
        }
    }

    /// Closes the dialog if it is still the one the request came from; the
    /// user may already have dismissed it.
    fn close_modal(&mut self, kind: ModalKind) {
        if self.modal.kind() == Some(kind) {
            self.modal = Modal::Closed;
        }
    }

    fn set_selected_profile(&mut self, profile: Option<&str>) {
        self.core.select_profile(profile);
        if let Some(store) = &self.selection {
            if let Err(e) = store.set_profile(profile) {
                warn!(error = %e, "failed to persist profile selection");
            }
        }
    }

    fn menu_cue(&mut self, now: Instant) {
        let suppressed = self
            .suppress_menu_cue_until
            .is_some_and(|until| now < until);
        if !suppressed {
            self.sound(Cue::MacroMenu);
        }
    }

    fn sound(&mut self, cue: Cue) {
        self.feedback.push(Feedback::Sound(cue));
    }

    fn notice(&mut self, notice: Notice) {
        self.feedback.push(Feedback::Notice(notice));
    }
}
