//! Key/overlay mapping: raw key codes → outgoing usage codes.
//!
//! Precedence per slot, first match wins:
//! 1. fn layer (only while fn is held)
//! 2. cursor layer (while fn is held or cursor mode is on)
//! 3. the raw code unchanged
//!
//! A slot rewritten by an overlay is *fixed*: later rules and case folding
//! never touch it.

use heapless::Vec;

use super::chord::ModeState;
use super::profile::{lookup, Profile};
use crate::hid::keyboard::REPORT_SLOTS;
use crate::keys::KeySnapshot;

/// Outgoing state of one report slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResolvedKey {
    pub usage: u8,
    /// Character after case folding; `None` for overlay keys and specials.
    pub ch: Option<char>,
    pub fixed: bool,
}

pub type ResolvedKeys = Vec<ResolvedKey, REPORT_SLOTS>;

/// Map the snapshot's keys, in scan order, to at most six report slots.
///
/// Keys past the sixth are dropped.
pub fn map_keys(profile: &Profile, modes: &ModeState, snapshot: &KeySnapshot) -> ResolvedKeys {
    let flags = &snapshot.flags;
    let mut out = ResolvedKeys::new();

    for key in snapshot.keys.iter().take(REPORT_SLOTS) {
        let mut usage = key.code;
        let mut fixed = false;

        if flags.function {
            if let Some(to) = lookup(profile.fn_layer, usage) {
                usage = to;
                fixed = true;
            }
        }

        if !fixed && (flags.function || modes.cursor_overlay) {
            if let Some(to) = lookup(profile.cursor_layer, usage) {
                usage = to;
                fixed = true;
            }
        }

        let ch = if fixed {
            None
        } else {
            key.ch.map(|c| fold_case(profile, modes, snapshot, c))
        };

        // Capacity equals the take() bound.
        let _ = out.push(ResolvedKey { usage, ch, fixed });
    }

    if snapshot.keys.len() > REPORT_SLOTS {
        debug!(
            "Mapper: dropped {} keys past slot {}",
            snapshot.keys.len() - REPORT_SLOTS,
            REPORT_SLOTS
        );
    }

    out
}

fn fold_case(profile: &Profile, modes: &ModeState, snapshot: &KeySnapshot, c: char) -> char {
    let mut c = c;
    if modes.caps_lock {
        c = invert_case(c);
    }
    if profile.ctrl_lowercase && snapshot.flags.ctrl && !snapshot.flags.shift {
        c = c.to_ascii_lowercase();
    }
    c
}

fn invert_case(c: char) -> char {
    if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c.to_ascii_uppercase()
    }
}
