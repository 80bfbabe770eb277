//! Persisted user settings.
//!
//! The only persisted value is the auto power-off step, stored as a single
//! byte index into [`config::AUTO_POWER_OFF_STEPS`]. Reads that fail or
//! return an out-of-range index fall back to the default step, which is then
//! written back so the store heals itself.

use core::fmt::Write;

use heapless::String;

use crate::config::{AUTO_POWER_OFF_STEPS, DEFAULT_AUTO_POWER_OFF_INDEX};
use crate::error::Error;

/// Store key of the auto power-off index.
pub const KEY_AUTO_POWER_OFF: u8 = 0x01;

/// One step of the auto power-off table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoPowerOff {
    index: u8,
}

impl AutoPowerOff {
    pub const DEFAULT: AutoPowerOff = AutoPowerOff {
        index: DEFAULT_AUTO_POWER_OFF_INDEX,
    };

    /// Step at `index`, if it exists.
    pub fn from_index(index: u8) -> Option<Self> {
        ((index as usize) < AUTO_POWER_OFF_STEPS.len()).then_some(Self { index })
    }

    pub fn index(self) -> u8 {
        self.index
    }

    /// Next step, wrapping from the disabled step back to the first.
    pub fn next(self) -> Self {
        let next = (self.index as usize + 1) % AUTO_POWER_OFF_STEPS.len();
        Self { index: next as u8 }
    }

    /// Timeout in minutes, `None` when auto power-off is disabled.
    pub fn minutes(self) -> Option<u32> {
        AUTO_POWER_OFF_STEPS[self.index as usize]
    }

    /// Timeout in milliseconds, `None` when auto power-off is disabled.
    pub fn duration_ms(self) -> Option<u64> {
        self.minutes().map(|m| m as u64 * 60 * 1000)
    }

    /// Three-character label for the status line (" 3m", "20m", "off").
    pub fn label(self) -> String<4> {
        let mut s = String::new();
        match self.minutes() {
            Some(m) => {
                let _ = write!(&mut s, "{:>2}m", m);
            }
            None => {
                let _ = s.push_str("off");
            }
        }
        s
    }
}

impl Default for AutoPowerOff {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Outcome of reading the stored step at boot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Restored {
    pub setting: AutoPowerOff,
    /// The default was substituted and should be persisted.
    pub write_back: bool,
}

/// Interpret the raw store read for [`KEY_AUTO_POWER_OFF`].
pub fn restore(stored: Result<Option<u8>, Error>) -> Restored {
    let setting = match stored {
        Ok(Some(raw)) => match AutoPowerOff::from_index(raw) {
            Some(setting) => {
                info!("Settings: auto power-off index {}", raw);
                return Restored {
                    setting,
                    write_back: false,
                };
            }
            None => {
                warn!("Settings: stored index {} out of range", raw);
                AutoPowerOff::DEFAULT
            }
        },
        Ok(None) => {
            info!("Settings: no stored auto power-off index");
            AutoPowerOff::DEFAULT
        }
        Err(e) => {
            warn!("Settings: read failed: {:?}", e);
            AutoPowerOff::DEFAULT
        }
    };

    Restored {
        setting,
        write_back: true,
    }
}
