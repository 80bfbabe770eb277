//! Status screen model - six text lines, each redrawn whole.
//!
//! ```text
//! L0  Banner     "- tiny bleKeyboard -"   (blue when linked, red when not)
//! L1  Legend     "fn1:Cap 2:Apo 3:CurM"   chord bindings
//! L2  Status     caps / auto power-off / cursor mode
//! L3  Notice     sleep warning, power-off message
//! L4  Modifiers  "Ctrl Shift"
//! L5  Sent       " HID Code: 0x4 (a)"
//! ```
//!
//! Rendering happens behind [`crate::device::StatusDisplay`]; this module
//! only decides what each line says.

pub mod status;

use heapless::String;

use crate::config::LINE_CAPACITY;

/// Text of one status line.
pub type LineText = String<LINE_CAPACITY>;

/// Display rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    Banner,
    Legend,
    Status,
    Notice,
    Modifiers,
    Sent,
}

impl Line {
    pub const COUNT: usize = 6;

    /// Row index, top to bottom.
    pub fn index(self) -> usize {
        match self {
            Line::Banner => 0,
            Line::Legend => 1,
            Line::Status => 2,
            Line::Notice => 3,
            Line::Modifiers => 4,
            Line::Sent => 5,
        }
    }
}

/// Foreground colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    White,
    Green,
    Yellow,
    Blue,
    Red,
}

impl Color {
    /// Colors that a monochrome panel should render inverted.
    pub fn is_highlight(self) -> bool {
        matches!(self, Color::Yellow | Color::Blue | Color::Red)
    }
}

/// Copy `s` into a line buffer, truncating at capacity.
pub fn line_text(s: &str) -> LineText {
    let mut text = LineText::new();
    for c in s.chars() {
        if text.push(c).is_err() {
            break;
        }
    }
    text
}
