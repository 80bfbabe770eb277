//! Text composition for the individual status lines.

use core::fmt::Write;

use heapless::Vec;

use super::{line_text, Color, LineText};
use crate::engine::chord::ModeState;
use crate::engine::profile::Chord;

pub const BANNER: &str = "- tiny bleKeyboard -";
pub const SLEEP_WARNING: &str = "  SLEEP TIME";
pub const POWER_OFF: &str = "  POWER OFF";

/// Chords listed on the legend line; the panel has no room for more.
const MAX_LEGEND_ENTRIES: usize = 8;

/// Banner text and color for the BLE link state.
pub fn banner(connected: bool) -> (LineText, Color) {
    let color = if connected { Color::Blue } else { Color::Red };
    (line_text(BANNER), color)
}

/// Chord legend ordered by key, e.g. "fn1:Cap 2:Apo 3:CurM".
pub fn legend(chords: &[Chord]) -> LineText {
    let mut entries: Vec<(char, &'static str), MAX_LEGEND_ENTRIES> = Vec::new();
    for chord in chords {
        let Some(&key) = chord.keys.first() else {
            continue;
        };
        if entries.push((key, chord.action.short_label())).is_err() {
            break;
        }
    }
    entries.sort_unstable_by_key(|&(key, _)| key);

    let mut s = LineText::new();
    let _ = s.push_str("fn");
    for (i, (key, label)) in entries.iter().enumerate() {
        if i > 0 {
            let _ = s.push(' ');
        }
        let _ = write!(&mut s, "{}:{}", key, label);
    }
    s
}

/// Mode status line: caps state, auto power-off step, cursor mode.
///
/// Highlighted while caps lock or cursor mode is on.
pub fn mode_status(modes: &ModeState) -> (LineText, Color) {
    let caps = if modes.caps_lock { "lock" } else { "unlock" };
    let cursor = if modes.cursor_overlay { "on" } else { "off" };

    let mut s = LineText::new();
    let _ = write!(
        &mut s,
        " {:>6}  {:>3}    {:>3}",
        caps,
        modes.auto_power_off.label().as_str(),
        cursor
    );

    let color = if modes.caps_lock || modes.cursor_overlay {
        Color::Yellow
    } else {
        Color::White
    };
    (s, color)
}
