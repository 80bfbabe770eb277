//! Engine parameter sets.
//!
//! A [`Profile`] bundles the chord bindings, overlay tables and case rules
//! the engine runs with. Hardware variants differ only in their profile,
//! never in engine code.

use crate::hid::usage;

/// A persistent mode change triggered by an fn chord.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeAction {
    ToggleCapsLock,
    ToggleCursorOverlay,
    CycleAutoPowerOff,
}

impl ModeAction {
    /// Short name used in the chord legend.
    pub fn short_label(self) -> &'static str {
        match self {
            ModeAction::ToggleCapsLock => "Cap",
            ModeAction::ToggleCursorOverlay => "CurM",
            ModeAction::CycleAutoPowerOff => "Apo",
        }
    }
}

/// fn + one of `keys` → `action`.
///
/// `keys` lists every character the physical key can resolve to, so the
/// shifted variant matches the same chord.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chord {
    pub keys: &'static [char],
    pub action: ModeAction,
}

/// Raw key code → replacement usage code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Remap {
    pub from: u8,
    pub to: u8,
}

const fn remap(from: u8, to: u8) -> Remap {
    Remap { from, to }
}

/// Look up `code` in an overlay table.
pub fn lookup(table: &[Remap], code: u8) -> Option<u8> {
    table.iter().find(|r| r.from == code).map(|r| r.to)
}

/// Engine configuration.
#[derive(Clone, Copy, Debug)]
pub struct Profile {
    /// Mode chords in priority order; the first match wins.
    pub chords: &'static [Chord],
    /// Overlay active while fn is held. Beats the cursor overlay.
    pub fn_layer: &'static [Remap],
    /// Overlay active while fn is held or cursor mode is on.
    pub cursor_layer: &'static [Remap],
    /// Force ctrl+letter to lower case when shift is not held. Works around
    /// hosts that apply caps lock to ctrl chords a second time.
    pub ctrl_lowercase: bool,
    /// Tap the host's Caps Lock when caps-lock emulation toggles, so the
    /// host's letter case follows the device state.
    pub sync_host_caps_lock: bool,
    /// Re-send the last report on every tick while keys stay held.
    pub repeat_while_held: bool,
}

pub const DEFAULT_CHORDS: &[Chord] = &[
    Chord {
        keys: &['1', '!'],
        action: ModeAction::ToggleCapsLock,
    },
    Chord {
        keys: &['3', '#'],
        action: ModeAction::ToggleCursorOverlay,
    },
    Chord {
        keys: &['2', '@'],
        action: ModeAction::CycleAutoPowerOff,
    },
];

pub const DEFAULT_FN_LAYER: &[Remap] = &[
    remap(usage::GRAVE, usage::ESCAPE),
    remap(usage::BACKSPACE, usage::DELETE_FORWARD),
    remap(usage::DIGIT_5, usage::F5),
    remap(usage::DIGIT_6, usage::F6),
    remap(usage::DIGIT_7, usage::F7),
    remap(usage::DIGIT_8, usage::F8),
    remap(usage::DIGIT_9, usage::F9),
    remap(usage::DIGIT_0, usage::F10),
];

pub const DEFAULT_CURSOR_LAYER: &[Remap] = &[
    remap(usage::SEMICOLON, usage::UP_ARROW),
    remap(usage::PERIOD, usage::DOWN_ARROW),
    remap(usage::COMMA, usage::LEFT_ARROW),
    remap(usage::SLASH, usage::RIGHT_ARROW),
    remap(usage::MINUS, usage::HOME),
    remap(usage::LEFT_BRACKET, usage::END),
    remap(usage::EQUAL, usage::PAGE_UP),
    remap(usage::RIGHT_BRACKET, usage::PAGE_DOWN),
    remap(usage::BACKSLASH, usage::INSERT),
    remap(usage::QUOTE, usage::PRINT_SCREEN),
];

pub const DEFAULT_PROFILE: Profile = Profile {
    chords: DEFAULT_CHORDS,
    fn_layer: DEFAULT_FN_LAYER,
    cursor_layer: DEFAULT_CURSOR_LAYER,
    ctrl_lowercase: true,
    sync_host_caps_lock: true,
    repeat_while_held: true,
};

impl Default for Profile {
    fn default() -> Self {
        DEFAULT_PROFILE
    }
}
