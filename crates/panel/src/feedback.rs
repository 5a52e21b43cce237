use actions::ColorCategory;
use app_core::ids::SlotId;

/// Sounds the front end plays. Names match the bundled audio files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    MacroAdd,
    MacroRemove,
    MacroMax,
    MacroMenu,
    MacroTrigger,
    RemoveToggle,
    Login,
    Pip,
    Confirm,
    Cancel,
}

impl Cue {
    pub fn file_name(self) -> &'static str {
        match self {
            Cue::MacroAdd => "macro_add.mp3",
            Cue::MacroRemove => "macro_remove.mp3",
            Cue::MacroMax => "macro_max.mp3",
            Cue::MacroMenu => "macro_menu.mp3",
            Cue::MacroTrigger => "macro.mp3",
            Cue::RemoveToggle => "remove_toggle.mp3",
            Cue::Login => "login.mp3",
            Cue::Pip => "pip.mp3",
            Cue::Confirm => "confirm.mp3",
            Cue::Cancel => "cancel.mp3",
        }
    }
}

/// (duration ms, amplitude) of the single vibration pulse used everywhere.
pub const HAPTIC_PULSE: (u32, u8) = (30, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Sound(Cue),
    Haptic { duration_ms: u32, amplitude: u8 },
    Notice(Notice),
}

impl Feedback {
    pub fn haptic() -> Self {
        Feedback::Haptic {
            duration_ms: HAPTIC_PULSE.0,
            amplitude: HAPTIC_PULSE.1,
        }
    }
}

/// Glow colour drawn around a slot of the given category.
pub fn glow_color(color: ColorCategory) -> &'static str {
    match color {
        ColorCategory::Red => "rgba(255, 80, 80, 0.75)",
        ColorCategory::Blue => "rgba(80, 180, 255, 0.75)",
        ColorCategory::Green => "rgba(120, 255, 160, 0.45)",
        ColorCategory::Yellow => "rgba(255, 220, 100, 0.6)",
    }
}

/// What a front end needs to draw one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub id: SlotId,
    pub icon: String,
    pub macro_key: String,
    pub label: String,
    pub fixed: bool,
    pub border: Option<&'static str>,
    pub glow: Option<&'static str>,
}
