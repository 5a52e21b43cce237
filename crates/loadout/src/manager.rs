use actions::{MacroCatalog, FIXED_MACROS};
use app_core::ids::SlotId;
use tokio::sync::mpsc;
use tracing::debug;

use crate::events::Subscribers;
use crate::slot::{fixed_slots, is_fixed_id, profile_keys};
use crate::{Slot, SlotEvent, FIRST_DYNAMIC_ID, FIXED_SLOTS, MAX_DYNAMIC, MAX_SLOTS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("maximum {max} macros allowed")]
    CapacityExceeded { max: usize },
    #[error("slot {0} is fixed and cannot be removed")]
    ProtectedSlot(SlotId),
    #[error("slot {0} not found")]
    NotFound(SlotId),
}

/// Outcome of [`MacroCollection::add_or_toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    Added(Slot),
    Removed(Slot),
}

/// Ordered slot list with the fixed/dynamic invariants enforced.
///
/// - Slots 1 and 2 are always `Reinforce` and `Resupply`, in that order.
/// - At most [`MAX_SLOTS`] slots; no two share an icon or a macro key.
#[derive(Debug)]
pub struct MacroCollection {
    slots: Vec<Slot>,
    remove_mode: bool,
    subscribers: Subscribers,
}

impl Default for MacroCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroCollection {
    pub fn new() -> Self {
        Self {
            slots: fixed_slots(),
            remove_mode: false,
            subscribers: Subscribers::default(),
        }
    }

    /// Receives every subsequent change to the collection.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SlotEvent> {
        self.subscribers.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slots after the two fixed ones, in grid order.
    pub fn dynamic_slots(&self) -> &[Slot] {
        &self.slots[FIXED_SLOTS..]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Never true: the fixed slots are always present.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Capacity reached; the "add" affordance must be disabled.
    pub fn is_full(&self) -> bool {
        self.slots.len() >= MAX_SLOTS
    }

    pub fn get(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn contains_icon(&self, icon: &str) -> bool {
        self.slots.iter().any(|s| s.icon == icon)
    }

    /// Macro keys as stored in a profile.
    pub fn macro_keys(&self) -> Vec<String> {
        profile_keys(&self.slots)
    }

    /// Adds a macro, or removes it when it is already on the grid.
    ///
    /// Fixed slots never toggle off. A full grid rejects new macros without
    /// touching the list.
    pub fn add_or_toggle(&mut self, icon: &str, macro_key: &str) -> Result<Toggle, SlotError> {
        if let Some(idx) = self
            .slots
            .iter()
            .position(|s| s.icon == icon || s.macro_key == macro_key)
        {
            let id = self.slots[idx].id;
            if is_fixed_id(id) {
                return Err(SlotError::ProtectedSlot(id));
            }
            let removed = self.slots.remove(idx);
            debug!(id = %removed.id, icon = %removed.icon, "toggled macro off");
            self.subscribers.emit(SlotEvent::SlotRemoved { id: removed.id });
            return Ok(Toggle::Removed(removed));
        }

        if self.slots.len() >= MAX_SLOTS {
            return Err(SlotError::CapacityExceeded { max: MAX_SLOTS });
        }

        let slot = Slot::new(self.next_id(), icon, macro_key);
        debug!(id = %slot.id, icon, macro_key, "added macro");
        self.slots.push(slot.clone());
        self.subscribers
            .emit(SlotEvent::SlotAdded { slot: slot.clone() });
        Ok(Toggle::Added(slot))
    }

    /// Removes a dynamic slot by id.
    pub fn remove(&mut self, id: SlotId) -> Result<Slot, SlotError> {
        if is_fixed_id(id) {
            return Err(SlotError::ProtectedSlot(id));
        }
        let idx = self
            .slots
            .iter()
            .position(|s| s.id == id)
            .ok_or(SlotError::NotFound(id))?;

        let removed = self.slots.remove(idx);
        debug!(id = %id, icon = %removed.icon, "removed macro");
        self.subscribers.emit(SlotEvent::SlotRemoved { id });
        Ok(removed)
    }

    /// Replaces the dynamic slots with the macros of a stored profile.
    ///
    /// Fixed keys in the input are ignored (the fixed slots are always
    /// re-prepended), duplicates keep their first occurrence, and anything
    /// past the eighth dynamic entry is dropped. Ids restart at 3.
    pub fn replace_from_profile<S: AsRef<str>>(&mut self, keys: &[S], catalog: &MacroCatalog) {
        let mut dynamic: Vec<Slot> = Vec::with_capacity(MAX_DYNAMIC);

        for key in keys {
            let key = key.as_ref().trim();
            if key.is_empty() || FIXED_MACROS.iter().any(|f| f.eq_ignore_ascii_case(key)) {
                continue;
            }
            let icon = catalog.icon_for(key);
            if dynamic.iter().any(|s| s.icon == icon || s.macro_key == key) {
                debug!(key, "dropping duplicate profile entry");
                continue;
            }
            if dynamic.len() == MAX_DYNAMIC {
                debug!(total = keys.len(), "profile exceeds dynamic capacity, truncating");
                break;
            }
            let id = SlotId(FIRST_DYNAMIC_ID + dynamic.len() as u32);
            dynamic.push(Slot::new(id, icon, key));
        }

        let mut slots = fixed_slots();
        slots.extend(dynamic);
        debug!(count = slots.len(), "replaced collection from profile");
        self.slots = slots;
        self.subscribers.emit(SlotEvent::CollectionReplaced {
            slots: self.slots.clone(),
        });
    }

    /// Back to exactly the two fixed slots.
    pub fn reset_to_default(&mut self) {
        self.slots = fixed_slots();
        debug!("reset collection to fixed slots");
        self.subscribers.emit(SlotEvent::CollectionReset);
    }

    pub fn remove_mode_active(&self) -> bool {
        self.remove_mode
    }

    /// Flips remove mode and returns the new state.
    pub fn toggle_remove_mode(&mut self) -> bool {
        self.set_remove_mode(!self.remove_mode);
        self.remove_mode
    }

    /// Sets remove mode explicitly (used when the countdown lapses).
    pub fn set_remove_mode(&mut self, active: bool) {
        if self.remove_mode == active {
            return;
        }
        self.remove_mode = active;
        debug!(active, "remove mode changed");
        self.subscribers
            .emit(SlotEvent::RemoveModeChanged { active });
    }

    fn next_id(&self) -> SlotId {
        self.slots
            .iter()
            .map(|s| s.id.0)
            .max()
            .map(|max| SlotId(max + 1))
            .unwrap_or(SlotId(FIRST_DYNAMIC_ID))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actions::{REINFORCE, RESUPPLY};

    fn catalog() -> MacroCatalog {
        MacroCatalog::builtin()
    }

    /// Adds the first `n` selectable catalog macros.
    fn fill(c: &mut MacroCollection, n: usize) {
        let cat = catalog();
        for m in cat.selectable().take(n) {
            c.add_or_toggle(&m.icon(), &m.key).unwrap();
        }
    }

    fn assert_fixed_present(c: &MacroCollection) {
        assert_eq!(c.slots()[0], Slot::new(SlotId(1), "redeploy", REINFORCE));
        assert_eq!(c.slots()[1], Slot::new(SlotId(2), "resupply", RESUPPLY));
    }

    #[test]
    fn add_appends_with_next_id() {
        let mut c = MacroCollection::new();
        let out = c.add_or_toggle("eagle_strike", "EagleStrike").unwrap();

        let expected = Slot::new(SlotId(3), "eagle_strike", "EagleStrike");
        assert_eq!(out, Toggle::Added(expected.clone()));
        assert_eq!(
            c.slots(),
            &[
                Slot::new(SlotId(1), "redeploy", REINFORCE),
                Slot::new(SlotId(2), "resupply", RESUPPLY),
                expected,
            ]
        );
    }

    #[test]
    fn toggle_twice_restores_collection() {
        let mut c = MacroCollection::new();
        fill(&mut c, 3);
        let before = c.slots().to_vec();

        c.add_or_toggle("orbital_laser", "OrbitalLaser").unwrap();
        let out = c.add_or_toggle("orbital_laser", "OrbitalLaser").unwrap();

        assert!(matches!(out, Toggle::Removed(s) if s.icon == "orbital_laser"));
        assert_eq!(c.slots(), before.as_slice());
    }

    #[test]
    fn toggle_off_existing_dynamic_slot() {
        let mut c = MacroCollection::new();
        c.add_or_toggle("eagle_strike", "EagleStrike").unwrap();
        c.add_or_toggle("railgun", "Railgun").unwrap();

        c.add_or_toggle("eagle_strike", "EagleStrike").unwrap();
        let icons: Vec<&str> = c.dynamic_slots().iter().map(|s| s.icon.as_str()).collect();
        assert_eq!(icons, ["railgun"]);
    }

    #[test]
    fn ids_continue_from_max_after_removal() {
        let mut c = MacroCollection::new();
        fill(&mut c, 3); // ids 3, 4, 5
        c.remove(SlotId(4)).unwrap();

        let out = c.add_or_toggle("spear", "Spear").unwrap();
        assert!(matches!(out, Toggle::Added(s) if s.id == SlotId(6)));

        let ids: Vec<u32> = c.slots().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, [1, 2, 3, 5, 6]);
    }

    #[test]
    fn full_grid_rejects_new_macro_without_mutation() {
        let mut c = MacroCollection::new();
        fill(&mut c, MAX_DYNAMIC);
        assert_eq!(c.len(), MAX_SLOTS);
        assert!(c.is_full());
        let before = c.slots().to_vec();

        // Pick a macro that is not already on the grid.
        let cat = catalog();
        let extra = cat.selectable().nth(MAX_DYNAMIC).unwrap();
        let err = c.add_or_toggle(&extra.icon(), &extra.key).unwrap_err();

        assert_eq!(err, SlotError::CapacityExceeded { max: MAX_SLOTS });
        assert_eq!(c.slots(), before.as_slice());
    }

    #[test]
    fn full_grid_still_toggles_existing_off() {
        let mut c = MacroCollection::new();
        fill(&mut c, MAX_DYNAMIC);
        let last = c.dynamic_slots().last().unwrap().clone();

        c.add_or_toggle(&last.icon, &last.macro_key).unwrap();
        assert_eq!(c.len(), MAX_SLOTS - 1);
        assert!(!c.is_full());
    }

    #[test]
    fn fixed_slots_survive_any_add_sequence() {
        let mut c = MacroCollection::new();
        let cat = catalog();
        // Cycle through the catalog twice so adds, toggles and capacity
        // rejections all occur.
        for m in cat.selectable().chain(cat.selectable()) {
            let _ = c.add_or_toggle(&m.icon(), &m.key);
            assert_fixed_present(&c);
            assert!(c.len() <= MAX_SLOTS);
            assert!(c.dynamic_slots().len() <= MAX_DYNAMIC);
        }
    }

    #[test]
    fn fixed_slots_cannot_be_toggled_off() {
        let mut c = MacroCollection::new();
        assert_eq!(
            c.add_or_toggle("redeploy", REINFORCE),
            Err(SlotError::ProtectedSlot(SlotId(1)))
        );
        assert_eq!(
            c.add_or_toggle("something", RESUPPLY),
            Err(SlotError::ProtectedSlot(SlotId(2)))
        );
        assert_fixed_present(&c);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn removing_fixed_slots_is_rejected() {
        let mut c = MacroCollection::new();
        fill(&mut c, 2);
        let before = c.slots().to_vec();

        assert_eq!(c.remove(SlotId(1)), Err(SlotError::ProtectedSlot(SlotId(1))));
        assert_eq!(c.remove(SlotId(2)), Err(SlotError::ProtectedSlot(SlotId(2))));
        assert_eq!(c.slots(), before.as_slice());
    }

    #[test]
    fn removing_unknown_slot_is_not_found() {
        let mut c = MacroCollection::new();
        assert_eq!(c.remove(SlotId(9)), Err(SlotError::NotFound(SlotId(9))));
    }

    #[test]
    fn replace_from_profile_maps_keys_and_renumbers() {
        let mut c = MacroCollection::new();
        c.add_or_toggle("spear", "Spear").unwrap();
        c.replace_from_profile(
            &[REINFORCE, RESUPPLY, "EagleStrike", "Unlisted"],
            &catalog(),
        );

        assert_fixed_present(&c);
        assert_eq!(
            c.dynamic_slots(),
            &[
                Slot::new(SlotId(3), "eagle_strike", "EagleStrike"),
                Slot::new(SlotId(4), "unlisted", "Unlisted"),
            ]
        );
    }

    #[test]
    fn replace_from_profile_dedupes_and_truncates() {
        let cat = catalog();
        let mut keys: Vec<String> = vec![
            REINFORCE.into(),
            RESUPPLY.into(),
            "EagleStrike".into(),
            "EagleStrike".into(),
            "OrbitalRailcannon".into(),
        ];
        keys.extend(cat.selectable().skip(2).take(11).map(|m| m.key.clone()));

        let mut c = MacroCollection::new();
        c.replace_from_profile(&keys, &cat);

        assert_fixed_present(&c);
        assert_eq!(c.dynamic_slots().len(), MAX_DYNAMIC);
        let eagle = c
            .dynamic_slots()
            .iter()
            .filter(|s| s.macro_key == "EagleStrike")
            .count();
        assert_eq!(eagle, 1);
        let ids: Vec<u32> = c.dynamic_slots().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, (3..=10).collect::<Vec<_>>());
        assert_eq!(c.dynamic_slots()[1].macro_key, "OrbitalRailcannon");
    }

    #[test]
    fn replace_from_profile_ignores_fixed_keys_anywhere() {
        let mut c = MacroCollection::new();
        c.replace_from_profile(&["Railgun", "resupply", REINFORCE, "Spear"], &catalog());

        assert_fixed_present(&c);
        let keys: Vec<&str> = c.dynamic_slots().iter().map(|s| s.macro_key.as_str()).collect();
        assert_eq!(keys, ["Railgun", "Spear"]);
    }

    #[test]
    fn reset_returns_to_fixed_slots() {
        let mut c = MacroCollection::new();
        fill(&mut c, 5);
        c.reset_to_default();
        assert_eq!(c.slots(), fixed_slots().as_slice());
    }

    #[test]
    fn remove_mode_toggles() {
        let mut c = MacroCollection::new();
        assert!(c.toggle_remove_mode());
        assert!(c.remove_mode_active());
        assert!(!c.toggle_remove_mode());
        assert!(!c.remove_mode_active());
    }

    #[test]
    fn subscribers_receive_typed_events() {
        let mut c = MacroCollection::new();
        let mut rx = c.subscribe();

        c.add_or_toggle("railgun", "Railgun").unwrap();
        c.remove(SlotId(3)).unwrap();
        c.toggle_remove_mode();
        c.reset_to_default();

        assert_eq!(
            rx.try_recv().unwrap(),
            SlotEvent::SlotAdded {
                slot: Slot::new(SlotId(3), "railgun", "Railgun")
            }
        );
        assert_eq!(rx.try_recv().unwrap(), SlotEvent::SlotRemoved { id: SlotId(3) });
        assert_eq!(
            rx.try_recv().unwrap(),
            SlotEvent::RemoveModeChanged { active: true }
        );
        assert_eq!(rx.try_recv().unwrap(), SlotEvent::CollectionReset);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn rejected_operations_emit_nothing() {
        let mut c = MacroCollection::new();
        fill(&mut c, MAX_DYNAMIC);
        let mut rx = c.subscribe();

        let _ = c.remove(SlotId(1));
        let _ = c.remove(SlotId(99));
        let _ = c.add_or_toggle("railgun", "Railgun");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut c = MacroCollection::new();
        let rx = c.subscribe();
        let _keep = c.subscribe();
        drop(rx);

        c.reset_to_default();
        assert_eq!(c.subscriber_count(), 1);
    }

    #[test]
    fn macro_keys_lead_with_fixed() {
        let mut c = MacroCollection::new();
        c.add_or_toggle("railgun", "Railgun").unwrap();
        c.add_or_toggle("spear", "Spear").unwrap();
        c.add_or_toggle("railgun", "Railgun").unwrap();
        assert_eq!(c.macro_keys(), ["Reinforce", "Resupply", "Spear"]);

        c.reset_to_default();
        assert_eq!(c.macro_keys(), ["Reinforce", "Resupply"]);
    }
}
