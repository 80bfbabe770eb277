//! Report assembly: modifier byte + resolved slots → one keyboard report.

use core::fmt::Write;

use super::overlay::ResolvedKey;
use crate::hid::KeyboardReport;
use crate::ui::LineText;

/// Pack the modifier byte and resolved usages into a full report.
///
/// Slots beyond `keys` stay zero, so the report replaces whatever the host
/// held before.
pub fn assemble(modifier: u8, keys: &[ResolvedKey]) -> KeyboardReport {
    let mut report = KeyboardReport::empty();
    report.modifier = modifier;
    for (slot, key) in report.keycodes.iter_mut().zip(keys) {
        *slot = key.usage;
    }
    report
}

/// Status text for a sent report: " HID Code: 0x4 0x52 (A)".
///
/// The parenthesised part lists the characters the slots stand for after
/// case folding. Empty when the report carries no keys.
pub fn sent_label(report: &KeyboardReport, keys: &[ResolvedKey]) -> LineText {
    let mut s = LineText::new();
    if report.key_count() == 0 {
        return s;
    }
    let _ = s.push_str(" HID Code:");
    for code in report.keycodes.iter().filter(|&&k| k != 0) {
        let _ = write!(&mut s, " {:#x}", code);
    }
    let typed = typed_text(keys);
    if !typed.is_empty() {
        let _ = write!(&mut s, " ({})", typed);
    }
    s
}

/// Characters carried by the resolved slots, after case folding.
pub fn typed_text(keys: &[ResolvedKey]) -> heapless::String<6> {
    let mut typed = heapless::String::new();
    for c in keys.iter().filter_map(|k| k.ch) {
        if typed.push(c).is_err() {
            break;
        }
    }
    typed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::usage;

    fn key(usage: u8, ch: Option<char>) -> ResolvedKey {
        ResolvedKey {
            usage,
            ch,
            fixed: false,
        }
    }

    #[test]
    fn unused_slots_are_zero() {
        let report = assemble(0x02, &[key(usage::A, Some('A'))]);
        assert_eq!(report.modifier, 0x02);
        assert_eq!(report.keycodes, [usage::A, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn six_slots_fill_in_order() {
        let keys: heapless::Vec<ResolvedKey, 6> =
            (0..6u8).map(|i| key(usage::A + i, None)).collect();
        let report = assemble(0, &keys);
        assert_eq!(report.keycodes, [0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
    }

    #[test]
    fn sent_label_lists_codes_in_hex() {
        let keys = [key(usage::A, Some('A')), key(usage::UP_ARROW, None)];
        let report = assemble(0, &keys);
        assert_eq!(sent_label(&report, &keys).as_str(), " HID Code: 0x4 0x52 (A)");

        let arrows = [key(usage::UP_ARROW, None)];
        let report = assemble(0, &arrows);
        assert_eq!(sent_label(&report, &arrows).as_str(), " HID Code: 0x52");
        assert_eq!(sent_label(&KeyboardReport::empty(), &[]).as_str(), "");
    }

    #[test]
    fn typed_text_skips_keys_without_characters() {
        let keys = [key(usage::A, Some('A')), key(usage::UP_ARROW, None), key(0x05, Some('b'))];
        assert_eq!(typed_text(&keys).as_str(), "Ab");
    }
}
