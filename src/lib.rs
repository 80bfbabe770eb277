//! cardkey: BLE HID keyboard firmware core for a handheld QWERTY board.
//!
//! Everything in this library is hardware independent and runs on the host:
//! key snapshots go in, HID reports, display updates and power actions come
//! out. The embedded binary (`src/main.rs`, feature `embedded`) wires the
//! [`device`] traits to the nRF52840 SoftDevice, the OLED and flash.
//!
//! Usage: `cargo test` on the host.
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main].

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible in every module.
#[macro_use]
mod fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Core Modules
// ═══════════════════════════════════════════════════════════════════════════

pub mod config;
pub mod error;
pub mod hid;
pub mod keys;
pub mod settings;

pub mod engine;
pub mod power;
pub mod ui;

// ═══════════════════════════════════════════════════════════════════════════
// Hardware Seams
// ═══════════════════════════════════════════════════════════════════════════

pub mod device;

pub use device::{HidTransport, Keyboard, PowerControl, SettingsStore, StatusDisplay};
pub use engine::profile::{Profile, DEFAULT_PROFILE};
pub use engine::{Effect, Effects, Session};
pub use error::Error;
pub use hid::KeyboardReport;
pub use keys::{Flags, Key, KeySnapshot};
pub use power::{IdleConfig, PowerState};
