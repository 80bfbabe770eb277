//! Key snapshots - the scanner's per-tick view of the keyboard.
//!
//! A [`KeySnapshot`] is produced once per tick by the matrix front end
//! ([`layout::MatrixScanner`]) or by any other scanner, and is the only
//! input the engine consumes.

pub mod layout;

use heapless::Vec;

/// Maximum number of pressed keys a snapshot carries.
///
/// Larger than the 6 reportable slots so that over-long scans can be
/// truncated by the mapper in scan order rather than by the scanner.
pub const MAX_SNAPSHOT_KEYS: usize = 10;

/// Modifier and special-key flags of a snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Flags {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Opt key, reported to the host as GUI.
    pub opt: bool,
    /// Function layer key. Never reported to the host.
    pub function: bool,
    pub tab: bool,
    pub enter: bool,
    pub delete: bool,
}

impl Flags {
    pub const NONE: Flags = Flags {
        ctrl: false,
        shift: false,
        alt: false,
        opt: false,
        function: false,
        tab: false,
        enter: false,
        delete: false,
    };

    /// True if any modifier-class key (ctrl/shift/alt/opt/fn) is down.
    pub fn any_modifier(&self) -> bool {
        self.ctrl || self.shift || self.alt || self.opt || self.function
    }
}

/// One pressed non-modifier key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Key {
    /// Raw HID usage code of the physical key.
    pub code: u8,
    /// Printable character the key resolves to (shift applied), if any.
    pub ch: Option<char>,
}

impl Key {
    /// Printable key.
    pub const fn printable(code: u8, ch: char) -> Self {
        Self { code, ch: Some(ch) }
    }

    /// Non-printable key (tab, enter, backspace).
    pub const fn special(code: u8) -> Self {
        Self { code, ch: None }
    }
}

/// The scanner's result for one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    /// The pressed set differs from the previous tick.
    pub changed: bool,
    /// At least one key (including modifiers) is held.
    pub held: bool,
    /// Pressed non-modifier keys in scan order.
    pub keys: Vec<Key, MAX_SNAPSHOT_KEYS>,
    pub flags: Flags,
}

impl KeySnapshot {
    /// A freshly changed snapshot holding `keys` with `flags`.
    ///
    /// Keys beyond [`MAX_SNAPSHOT_KEYS`] are dropped.
    pub fn pressed(keys: &[Key], flags: Flags) -> Self {
        let mut held_keys = Vec::new();
        for key in keys {
            if held_keys.push(*key).is_err() {
                break;
            }
        }
        Self {
            changed: true,
            held: !held_keys.is_empty() || flags.any_modifier(),
            keys: held_keys,
            flags,
        }
    }

    /// The "all keys released" transition.
    pub fn released() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    /// Nothing changed and nothing is held.
    pub fn idle() -> Self {
        Self::default()
    }

    /// The same key state one tick later (key held, no transition).
    pub fn unchanged(&self) -> Self {
        Self {
            changed: false,
            ..self.clone()
        }
    }

    /// Resolved printable characters in scan order.
    pub fn word(&self) -> impl Iterator<Item = char> + '_ {
        self.keys.iter().filter_map(|k| k.ch)
    }

    /// First resolved character, used for chord matching.
    pub fn first_char(&self) -> Option<char> {
        self.word().next()
    }
}
