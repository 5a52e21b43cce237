use std::fmt;

/// Which confirmation dialog is showing.
///
/// Every dialog follows `Closed -> Open -> Closed`; confirming runs one store
/// request, cancelling runs none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    Closed,
    Save { input: String },
    Rename { old: String },
    Delete { profile: String },
    QuickUpdate { profile: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Save,
    Rename,
    Delete,
    QuickUpdate,
}

impl fmt::Display for ModalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModalKind::Save => "save",
            ModalKind::Rename => "rename",
            ModalKind::Delete => "delete",
            ModalKind::QuickUpdate => "update",
        };
        f.write_str(s)
    }
}

impl Modal {
    pub fn kind(&self) -> Option<ModalKind> {
        match self {
            Modal::Closed => None,
            Modal::Save { .. } => Some(ModalKind::Save),
            Modal::Rename { .. } => Some(ModalKind::Rename),
            Modal::Delete { .. } => Some(ModalKind::Delete),
            Modal::QuickUpdate { .. } => Some(ModalKind::QuickUpdate),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::Closed)
    }

    /// Prompt text shown in the dialog body.
    pub fn message(&self) -> Option<String> {
        match self {
            Modal::Closed => None,
            Modal::Save { .. } => Some("Enter a loadout name".to_string()),
            Modal::Rename { old } => Some(format!("Rename loadout '{old}' to:")),
            Modal::Delete { profile } => Some(format!("Delete loadout '{profile}'?")),
            Modal::QuickUpdate { profile } => Some(format!(
                "Are you sure you want to overwrite the loadout '{profile}'?"
            )),
        }
    }
}
