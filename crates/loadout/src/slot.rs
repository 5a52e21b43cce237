use actions::{is_fixed_macro, FIXED_MACROS, REINFORCE, REINFORCE_ICON, RESUPPLY, RESUPPLY_ICON};
use app_core::ids::SlotId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    /// Image identifier (image file stem).
    pub icon: String,
    /// Canonical macro name sent to the backend.
    pub macro_key: String,
}

impl Slot {
    pub fn new(id: SlotId, icon: impl Into<String>, macro_key: impl Into<String>) -> Self {
        Self {
            id,
            icon: icon.into(),
            macro_key: macro_key.into(),
        }
    }

    pub fn is_fixed(&self) -> bool {
        is_fixed_id(self.id)
    }
}

pub fn is_fixed_id(id: SlotId) -> bool {
    id == SlotId(1) || id == SlotId(2)
}

/// The two permanent slots, in grid order.
pub fn fixed_slots() -> Vec<Slot> {
    vec![
        Slot::new(SlotId(1), REINFORCE_ICON, REINFORCE),
        Slot::new(SlotId(2), RESUPPLY_ICON, RESUPPLY),
    ]
}

/// Profile form of a slot list: the fixed keys first, wherever they sit in
/// the grid, then every other macro key in grid order.
pub fn profile_keys(slots: &[Slot]) -> Vec<String> {
    let mut keys: Vec<String> = FIXED_MACROS.iter().map(|k| k.to_string()).collect();
    for slot in slots {
        let key = slot.macro_key.trim();
        if key.is_empty() || is_fixed_macro(key) || keys.iter().any(|k| k == key) {
            continue;
        }
        keys.push(key.to_string());
    }
    keys
}
