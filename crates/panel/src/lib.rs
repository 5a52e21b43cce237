//! Interaction layer for the macro grid.
//!
//! [`Panel`] wires the slot collection, the profile adapter, and the
//! persisted selection together and turns user gestures into state changes
//! plus [`Feedback`] for whatever front end is rendering it. It owns no
//! business rules of its own; those live in `loadout` and `profile-sync`.

pub mod feedback;
pub mod menus;
pub mod modal;
mod panel;

pub use feedback::{glow_color, Cue, Feedback, Notice, NoticeLevel, SlotView, HAPTIC_PULSE};
pub use menus::Menus;
pub use modal::{Modal, ModalKind};
pub use panel::{Panel, PressOutcome, MENU_CUE_SUPPRESSION};

use loadout::SlotError;
use profile_sync::SyncError;

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("select a user first")]
    NoUser,
    #[error("select a loadout first")]
    NoProfile,
    #[error("no {0} dialog is open")]
    ModalNotOpen(ModalKind),
    #[error("loadout '{0}' exists; confirm to overwrite it")]
    NeedsConfirmation(String),
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}
