//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, idle thresholds, hardware pin assignments and
//! protocol constants live here so they can be tuned in one place.

// Main loop

/// Nominal period of one scan/report tick (ms).
pub const TICK_MS: u64 = 20;

/// Pause after a mode chord so the chord keys are not re-read mid-bounce (ms).
pub const CHORD_DEBOUNCE_MS: u32 = 50;

/// Pause after a changed report so the status lines settle (ms).
pub const SEND_PACING_MS: u32 = 50;

/// Interval between BLE connection-status polls (ms).
/// 1009 is the smallest prime above one second, so the poll drifts
/// against the 20 ms tick instead of always landing on the same phase.
pub const LINK_POLL_MS: u64 = 1009;

// Idle / auto power-off

/// Inactivity before the display is dimmed (ms).
pub const DIM_AFTER_MS: u64 = 60 * 1000;

/// Warning window before auto power-off (ms).
pub const WARN_WINDOW_MS: u64 = 30 * 1000;

/// Blink half-period of the warning message (ms).
pub const WARN_BLINK_MS: u64 = 500;

/// How long the power-off message stays on screen (ms).
pub const POWER_OFF_MESSAGE_MS: u32 = 5 * 1000;

/// Grace delay for pending flash writes before power is cut (ms).
pub const POWER_OFF_GRACE_MS: u32 = 2 * 1000;

/// Auto power-off steps in minutes; `None` disables auto power-off and
/// must stay the last entry.
pub const AUTO_POWER_OFF_STEPS: [Option<u32>; 7] =
    [Some(3), Some(5), Some(10), Some(15), Some(20), Some(30), None];

/// Step used when nothing valid is stored (20 minutes).
pub const DEFAULT_AUTO_POWER_OFF_INDEX: u8 = 4;

// Display

/// Display brightness while active (0-255).
pub const BRIGHTNESS_ACTIVE: u8 = 70;

/// Display brightness while dimmed or warning (0-255).
pub const BRIGHTNESS_DIMMED: u8 = 10;

/// Maximum characters kept per status line (the panel clips the rest).
pub const LINE_CAPACITY: usize = 48;

// BLE

/// Name advertised to hosts.
pub const BLE_DEVICE_NAME: &str = "cardkey";

/// GAP appearance: HID keyboard.
pub const BLE_APPEARANCE_KEYBOARD: u16 = 0x03C1;

/// Advertising interval (in 0.625 ms units). 160 = 100 ms.
pub const BLE_ADV_INTERVAL: u32 = 160;

/// Duration between advertising restarts after a disconnect (ms).
pub const BLE_READVERTISE_DELAY_MS: u64 = 500;

/// Bonded hosts remembered in RAM; the oldest is evicted when full.
pub const BLE_MAX_BONDS: usize = 4;

/// Reports buffered between the keyboard loop and the connection task.
pub const BLE_REPORT_QUEUE: usize = 16;

// GPIO pin assignments (nRF52840 custom handheld PCB)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your board.
//
//   Matrix rows (outputs, active-low)  → P0.02, P0.03, P0.04, P0.05
//   Matrix cols (inputs, pull-up)      → P0.13..P0.17, P0.19..P0.21, P1.01..P1.06
//   Wake button (G0)                   → P0.11
//   I²C SDA                            → P0.26
//   I²C SCL                            → P0.27

/// Settle time after driving a matrix row before sampling columns (µs).
pub const MATRIX_SETTLE_US: u64 = 5;

/// Wake button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

// Settings storage

/// Flash page index where settings storage starts (4 KB per page on nRF52840).
pub const STORAGE_FLASH_PAGE_START: u32 = 240;

/// Number of flash pages reserved for settings storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 2;
