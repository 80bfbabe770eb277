//! Special-mode dispatch: fn chords that toggle persistent modes.
//!
//! Chords are checked before anything is mapped or sent. A matched chord
//! absorbs the whole tick.

use super::profile::{Chord, ModeAction};
use crate::keys::KeySnapshot;
use crate::settings::AutoPowerOff;

/// Persistent modes, changed only by chords.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeState {
    pub caps_lock: bool,
    pub cursor_overlay: bool,
    pub auto_power_off: AutoPowerOff,
}

impl ModeState {
    pub fn new(auto_power_off: AutoPowerOff) -> Self {
        Self {
            caps_lock: false,
            cursor_overlay: false,
            auto_power_off,
        }
    }

    /// Apply a chord action.
    pub fn apply(&mut self, action: ModeAction) {
        match action {
            ModeAction::ToggleCapsLock => self.caps_lock = !self.caps_lock,
            ModeAction::ToggleCursorOverlay => self.cursor_overlay = !self.cursor_overlay,
            ModeAction::CycleAutoPowerOff => self.auto_power_off = self.auto_power_off.next(),
        }
    }
}

/// First chord in `chords` matching fn + the snapshot's first character.
pub fn match_chord(chords: &[Chord], snapshot: &KeySnapshot) -> Option<ModeAction> {
    if !snapshot.flags.function {
        return None;
    }
    let ch = snapshot.first_char()?;
    chords
        .iter()
        .find(|chord| chord.keys.contains(&ch))
        .map(|chord| chord.action)
}
