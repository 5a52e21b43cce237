use app_core::ids::SlotId;
use tokio::sync::mpsc;

use crate::Slot;

/// Change notifications emitted by [`crate::MacroCollection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotEvent {
    SlotAdded { slot: Slot },
    SlotRemoved { id: SlotId },
    /// Collection went back to the two fixed slots.
    CollectionReset,
    /// Dynamic slots were replaced wholesale from a profile.
    CollectionReplaced { slots: Vec<Slot> },
    RemoveModeChanged { active: bool },
}

#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    txs: Vec<mpsc::UnboundedSender<SlotEvent>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SlotEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.txs.push(tx);
        rx
    }

    /// Delivers to every live subscriber and forgets dropped ones.
    pub(crate) fn emit(&mut self, event: SlotEvent) {
        self.txs.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn len(&self) -> usize {
        self.txs.len()
    }
}
