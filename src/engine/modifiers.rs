//! Modifier resolution: snapshot flags → HID modifier byte and label.

use crate::hid::modifier;
use crate::keys::Flags;
use crate::ui::LineText;

/// HID modifier byte for the held modifier keys. fn has no HID bit.
pub fn modifier_bits(flags: &Flags) -> u8 {
    let mut bits = 0;
    if flags.ctrl {
        bits |= modifier::LEFT_CTRL;
    }
    if flags.shift {
        bits |= modifier::LEFT_SHIFT;
    }
    if flags.alt {
        bits |= modifier::LEFT_ALT;
    }
    if flags.opt {
        bits |= modifier::LEFT_GUI;
    }
    bits
}

/// Held modifier names in fixed order, space separated ("Ctrl Shift Fn").
pub fn modifier_label(flags: &Flags) -> LineText {
    let names = [
        (flags.ctrl, "Ctrl"),
        (flags.shift, "Shift"),
        (flags.alt, "Alt"),
        (flags.opt, "Opt"),
        (flags.function, "Fn"),
    ];

    let mut label = LineText::new();
    for (_, name) in names.iter().filter(|(held, _)| *held) {
        if !label.is_empty() {
            let _ = label.push(' ');
        }
        let _ = label.push_str(name);
    }
    label
}
