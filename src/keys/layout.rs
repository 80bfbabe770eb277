//! Physical layout of the handheld's 4×14 key matrix and the pure scanner
//! front end that turns pressed matrix positions into [`KeySnapshot`]s.
//!
//! ```text
//!  `  1  2  3  4  5  6  7  8  9  0  -  =  BS
//!  TAB q  w  e  r  t  y  u  i  o  p  [  ]  \
//!  FN SH a  s  d  f  g  h  j  k  l  ;  '  ENT
//!  CT OP AL z  x  c  v  b  n  m  ,  .  /  SPC
//! ```
//!
//! The GPIO side (driving rows, sampling columns) lives in the firmware
//! binary; everything here is host-testable.

use heapless::Vec;

use super::{Flags, Key, KeySnapshot};
use crate::hid::usage;

pub const ROWS: usize = 4;
pub const COLS: usize = 14;

/// Upper bound of simultaneously pressed positions tracked by the scanner.
pub const MAX_PRESSED: usize = 16;

/// What a matrix position produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyDef {
    /// Printable key with its unshifted and shifted characters.
    Char {
        usage: u8,
        normal: char,
        shifted: char,
    },
    Tab,
    Enter,
    Backspace,
    Fn,
    Shift,
    Ctrl,
    Opt,
    Alt,
}

const fn key(usage: u8, normal: char, shifted: char) -> KeyDef {
    KeyDef::Char {
        usage,
        normal,
        shifted,
    }
}

const fn letter(usage: u8, c: char) -> KeyDef {
    key(usage, c, c.to_ascii_uppercase())
}

pub type Layout = [[KeyDef; COLS]; ROWS];

/// US layout of the handheld keyboard.
pub static HANDHELD_LAYOUT: Layout = [
    [
        key(usage::GRAVE, '`', '~'),
        key(usage::DIGIT_1, '1', '!'),
        key(usage::DIGIT_2, '2', '@'),
        key(usage::DIGIT_3, '3', '#'),
        key(usage::DIGIT_4, '4', '$'),
        key(usage::DIGIT_5, '5', '%'),
        key(usage::DIGIT_6, '6', '^'),
        key(usage::DIGIT_7, '7', '&'),
        key(usage::DIGIT_8, '8', '*'),
        key(usage::DIGIT_9, '9', '('),
        key(usage::DIGIT_0, '0', ')'),
        key(usage::MINUS, '-', '_'),
        key(usage::EQUAL, '=', '+'),
        KeyDef::Backspace,
    ],
    [
        KeyDef::Tab,
        letter(0x14, 'q'),
        letter(0x1A, 'w'),
        letter(0x08, 'e'),
        letter(0x15, 'r'),
        letter(0x17, 't'),
        letter(0x1C, 'y'),
        letter(0x18, 'u'),
        letter(0x0C, 'i'),
        letter(0x12, 'o'),
        letter(0x13, 'p'),
        key(usage::LEFT_BRACKET, '[', '{'),
        key(usage::RIGHT_BRACKET, ']', '}'),
        key(usage::BACKSLASH, '\\', '|'),
    ],
    [
        KeyDef::Fn,
        KeyDef::Shift,
        letter(0x04, 'a'),
        letter(0x16, 's'),
        letter(0x07, 'd'),
        letter(0x09, 'f'),
        letter(0x0A, 'g'),
        letter(0x0B, 'h'),
        letter(0x0D, 'j'),
        letter(0x0E, 'k'),
        letter(0x0F, 'l'),
        key(usage::SEMICOLON, ';', ':'),
        key(usage::QUOTE, '\'', '"'),
        KeyDef::Enter,
    ],
    [
        KeyDef::Ctrl,
        KeyDef::Opt,
        KeyDef::Alt,
        letter(0x1D, 'z'),
        letter(0x1B, 'x'),
        letter(0x06, 'c'),
        letter(0x19, 'v'),
        letter(0x05, 'b'),
        letter(0x11, 'n'),
        letter(0x10, 'm'),
        key(usage::COMMA, ',', '<'),
        key(usage::PERIOD, '.', '>'),
        key(usage::SLASH, '/', '?'),
        key(usage::SPACE, ' ', ' '),
    ],
];

/// A matrix position (row, column).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Resolve pressed positions (in scan order) into a snapshot.
///
/// Positions outside the layout are ignored. The returned snapshot has
/// `changed == false`; change detection is the [`MatrixScanner`]'s job.
pub fn resolve(layout: &Layout, pressed: &[Position]) -> KeySnapshot {
    let mut flags = Flags::NONE;

    // Modifiers first: shift decides which character printable keys produce.
    for def in pressed.iter().filter_map(|p| lookup(layout, *p)) {
        match def {
            KeyDef::Fn => flags.function = true,
            KeyDef::Shift => flags.shift = true,
            KeyDef::Ctrl => flags.ctrl = true,
            KeyDef::Opt => flags.opt = true,
            KeyDef::Alt => flags.alt = true,
            _ => {}
        }
    }

    let mut snapshot = KeySnapshot::default();
    for def in pressed.iter().filter_map(|p| lookup(layout, *p)) {
        let key = match def {
            KeyDef::Char {
                usage,
                normal,
                shifted,
            } => Key::printable(usage, if flags.shift { shifted } else { normal }),
            KeyDef::Tab => {
                flags.tab = true;
                Key::special(usage::TAB)
            }
            KeyDef::Enter => {
                flags.enter = true;
                Key::special(usage::ENTER)
            }
            KeyDef::Backspace => {
                flags.delete = true;
                Key::special(usage::BACKSPACE)
            }
            _ => continue,
        };
        if snapshot.keys.push(key).is_err() {
            break;
        }
    }

    snapshot.held = !snapshot.keys.is_empty() || flags.any_modifier();
    snapshot.flags = flags;
    snapshot
}

fn lookup(layout: &Layout, pos: Position) -> Option<KeyDef> {
    layout
        .get(pos.row as usize)
        .and_then(|row| row.get(pos.col as usize))
        .copied()
}

/// Stateful front end: remembers the previous scan to report transitions.
pub struct MatrixScanner {
    layout: &'static Layout,
    previous: Vec<Position, MAX_PRESSED>,
}

impl MatrixScanner {
    pub const fn new(layout: &'static Layout) -> Self {
        Self {
            layout,
            previous: Vec::new(),
        }
    }

    /// Produce this tick's snapshot from the raw pressed positions.
    pub fn scan(&mut self, pressed: &[Position]) -> KeySnapshot {
        let mut current: Vec<Position, MAX_PRESSED> = Vec::new();
        for pos in pressed {
            if current.push(*pos).is_err() {
                break;
            }
        }

        let mut snapshot = resolve(self.layout, &current);
        snapshot.changed = current != self.previous;
        self.previous = current;
        snapshot
    }
}
