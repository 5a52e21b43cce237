//! Macro slot collection for Macrolink.
//!
//! The grid holds two fixed slots (`Reinforce`, `Resupply`) followed by up to
//! eight dynamic slots. [`MacroCollection`] owns the ordered slot list and is
//! the only place that mutates it; front ends observe it through
//! [`SlotEvent`]s.

pub mod countdown;
pub mod events;
pub mod manager;
pub mod slot;

pub use countdown::{RemoveCountdown, REMOVE_MODE_DURATION};
pub use events::SlotEvent;
pub use manager::{MacroCollection, SlotError, Toggle};
pub use slot::{fixed_slots, profile_keys, Slot};

/// Total grid capacity (fixed + dynamic).
pub const MAX_SLOTS: usize = 10;
/// Number of always-present fixed slots.
pub const FIXED_SLOTS: usize = 2;
/// Dynamic slot capacity.
pub const MAX_DYNAMIC: usize = MAX_SLOTS - FIXED_SLOTS;
/// First id handed to a dynamic slot.
pub const FIRST_DYNAMIC_ID: u32 = 3;
